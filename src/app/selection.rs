use eframe::egui::Pos2;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Hover {
    pub node_id: String,
    pub pointer: Pos2,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SelectionState {
    hover: Option<Hover>,
    selected: Option<String>,
}

impl SelectionState {
    pub(crate) fn hover(&self) -> Option<&Hover> {
        self.hover.as_ref()
    }

    pub(crate) fn hovered_id(&self) -> Option<&str> {
        self.hover.as_ref().map(|hover| hover.node_id.as_str())
    }

    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    // Re-entering the same node keeps the first anchor.
    pub(crate) fn set_hover(&mut self, node_id: &str, pointer: Pos2) -> bool {
        if self.hovered_id() == Some(node_id) {
            return false;
        }
        self.hover = Some(Hover {
            node_id: node_id.to_owned(),
            pointer,
        });
        true
    }

    pub(crate) fn clear_hover(&mut self) -> bool {
        self.hover.take().is_some()
    }

    pub(crate) fn select(&mut self, selected: Option<String>) -> bool {
        if self.selected == selected {
            return false;
        }
        self.selected = selected;
        true
    }
}
