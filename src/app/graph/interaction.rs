use eframe::egui::{Pos2, Vec2};

use crate::analysis::GraphModel;

use super::super::physics::Simulation;
use super::super::projection::node_radius;
use super::super::render_utils::ViewTransform;
use super::super::selection::SelectionState;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Gesture {
    Idle,
    Dragging { node_id: String, index: usize },
    Panning { last: Pos2 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PointerEvent {
    Pressed { at: Pos2 },
    Moved { at: Pos2 },
    Released,
    Clicked { at: Pos2 },
    Scrolled { at: Pos2, delta: f32 },
    Pinched { at: Pos2, factor: f32 },
    Left,
}

pub(crate) struct InteractionTargets<'a> {
    pub model: &'a GraphModel,
    pub simulation: &'a mut Simulation,
    pub selection: &'a mut SelectionState,
    pub transform: &'a mut ViewTransform,
}

#[derive(Debug)]
pub(crate) struct InteractionController {
    gesture: Gesture,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }
}

impl InteractionController {
    pub(crate) fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub(crate) fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub(crate) fn handle(&mut self, event: PointerEvent, targets: &mut InteractionTargets<'_>) -> bool {
        let changed = self.apply(event, targets);
        debug_assert!(
            self.owns_every_pin(&*targets.simulation),
            "pin left behind by {event:?}"
        );
        changed
    }

    /// The only pinned node, if any, is the one being dragged.
    fn owns_every_pin(&self, simulation: &Simulation) -> bool {
        let dragged = match &self.gesture {
            Gesture::Dragging { index, .. } => Some(*index),
            Gesture::Idle | Gesture::Panning { .. } => None,
        };
        simulation
            .pinned_indices()
            .all(|index| Some(index) == dragged)
    }

    fn apply(&mut self, event: PointerEvent, targets: &mut InteractionTargets<'_>) -> bool {
        match event {
            PointerEvent::Pressed { at } => self.press(at, targets),
            PointerEvent::Moved { at } => self.moved(at, targets),
            PointerEvent::Released => self.release(targets),
            PointerEvent::Clicked { at } => {
                let hit = hit_test(targets.model, &*targets.simulation, *targets.transform, at);
                let selected = hit.map(|index| targets.model.nodes()[index].id.clone());
                targets.selection.select(selected)
            }
            PointerEvent::Scrolled { at, delta } => {
                if delta.abs() <= f32::EPSILON {
                    return false;
                }
                targets
                    .transform
                    .zoom_at(at, ViewTransform::scroll_zoom_factor(delta));
                true
            }
            PointerEvent::Pinched { at, factor } => {
                if (factor - 1.0).abs() <= f32::EPSILON {
                    return false;
                }
                targets.transform.zoom_at(at, factor);
                true
            }
            PointerEvent::Left => {
                let released = self.release(targets);
                targets.selection.clear_hover() || released
            }
        }
    }

    fn press(&mut self, at: Pos2, targets: &mut InteractionTargets<'_>) -> bool {
        if !matches!(self.gesture, Gesture::Idle) {
            return false;
        }

        let transform = *targets.transform;
        match hit_test(targets.model, &*targets.simulation, transform, at) {
            Some(index) => {
                let simulation = &mut *targets.simulation;
                let drag_target = simulation.config().drag_alpha_target;
                simulation.set_alpha_target(drag_target);
                simulation.restart();
                simulation.pin(index, transform.to_world(at));
                self.gesture = Gesture::Dragging {
                    node_id: targets.model.nodes()[index].id.clone(),
                    index,
                };
                true
            }
            None => {
                self.gesture = Gesture::Panning { last: at };
                false
            }
        }
    }

    fn moved(&mut self, at: Pos2, targets: &mut InteractionTargets<'_>) -> bool {
        match &mut self.gesture {
            Gesture::Dragging { index, .. } => {
                let world = targets.transform.to_world(at);
                targets.simulation.pin(*index, world);
                targets.simulation.restart();
                true
            }
            Gesture::Panning { last } => {
                let delta: Vec2 = at - *last;
                *last = at;
                targets.transform.pan(delta);
                delta != Vec2::ZERO
            }
            Gesture::Idle => {
                let transform = *targets.transform;
                match hit_test(targets.model, &*targets.simulation, transform, at) {
                    Some(index) => {
                        let node_id = &targets.model.nodes()[index].id;
                        targets.selection.set_hover(node_id, at)
                    }
                    None => targets.selection.clear_hover(),
                }
            }
        }
    }

    fn release(&mut self, targets: &mut InteractionTargets<'_>) -> bool {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Dragging { index, .. } => {
                targets.simulation.unpin(index);
                targets.simulation.set_alpha_target(0.0);
                true
            }
            Gesture::Panning { .. } | Gesture::Idle => false,
        }
    }
}

pub(crate) fn hit_test(
    model: &GraphModel,
    simulation: &Simulation,
    transform: ViewTransform,
    at: Pos2,
) -> Option<usize> {
    let world = transform.to_world(at);
    model
        .nodes()
        .iter()
        .zip(&simulation.state().nodes)
        .enumerate()
        .filter_map(|(index, (node, physical))| {
            let distance = (physical.position - world).length();
            (distance <= node_radius(node)).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
