mod interaction;
mod view;

pub(crate) use interaction::InteractionController;

#[cfg(test)]
pub(crate) use interaction::{InteractionTargets, PointerEvent};
