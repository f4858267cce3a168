use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Pos2, Sense, Ui, vec2};

use super::super::ViewModel;
use super::super::projection::project;
use super::super::render_utils::{draw_background, paint_scene};
use super::interaction::{Gesture, InteractionTargets, PointerEvent};

impl ViewModel {
    fn collect_pointer_events(
        &self,
        ui: &Ui,
        response: &egui::Response,
        origin: Pos2,
    ) -> Vec<PointerEvent> {
        let local = |pos: Pos2| Pos2::ZERO + (pos - origin);
        let mut events = Vec::new();

        if response.drag_started_by(PointerButton::Primary)
            && let Some(press) = ui.input(|input| input.pointer.press_origin())
        {
            events.push(PointerEvent::Pressed { at: local(press) });
        }

        if response.dragged_by(PointerButton::Primary) {
            if let Some(pointer) = response.interact_pointer_pos() {
                events.push(PointerEvent::Moved { at: local(pointer) });
            }
        } else if let Some(pointer) = response.hover_pos() {
            events.push(PointerEvent::Moved { at: local(pointer) });
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            events.push(PointerEvent::Released);
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            events.push(PointerEvent::Clicked { at: local(pointer) });
        }

        if let Some(pointer) = response.hover_pos() {
            // Ctrl+wheel shows up in both, so a zoom delta takes precedence.
            let (pinch, scroll) =
                ui.input(|input| (input.zoom_delta(), input.raw_scroll_delta.y));
            if (pinch - 1.0).abs() > f32::EPSILON {
                events.push(PointerEvent::Pinched {
                    at: local(pointer),
                    factor: pinch,
                });
            } else if scroll.abs() > f32::EPSILON {
                events.push(PointerEvent::Scrolled {
                    at: local(pointer),
                    delta: scroll,
                });
            }
        }

        let pointer_in_window = ui.input(|input| input.pointer.has_pointer());
        let lost_drag = self.controller.is_dragging() && !pointer_in_window;
        if lost_drag || (!response.hovered() && !response.dragged()) {
            events.push(PointerEvent::Left);
        }

        events
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.transform);
        self.simulation.set_center(rect.size() / 2.0);

        let events = self.collect_pointer_events(ui, &response, rect.min);
        let mut targets = InteractionTargets {
            model: &self.model,
            simulation: &mut self.simulation,
            selection: &mut self.selection,
            transform: &mut self.transform,
        };
        let mut changed = false;
        for event in events {
            changed |= self.controller.handle(event, &mut targets);
        }

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.transform.pan(response.drag_delta());
            changed = true;
        }

        let moving = self.simulation.step();
        if moving || changed || response.dragged() {
            ui.ctx().request_repaint();
        }

        match self.controller.gesture() {
            Gesture::Dragging { .. } => ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing),
            Gesture::Panning { .. } => ui.ctx().set_cursor_icon(egui::CursorIcon::Move),
            Gesture::Idle if self.selection.hover().is_some() => {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            Gesture::Idle => {}
        }

        let scene = project(&self.model, self.simulation.state(), &self.selection);
        paint_scene(&painter, rect, self.transform, &scene);

        if self.model.node_count() == 0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "This result contains no accounts.",
                FontId::proportional(15.0),
                Color32::from_gray(180),
            );
        }

        let mut footer = format!("zoom {:.0}%", self.transform.scale * 100.0);
        if let Gesture::Dragging { node_id, .. } = self.controller.gesture() {
            footer.push_str(&format!("  |  dragging {node_id}"));
        } else if self.simulation.is_running() {
            footer.push_str("  |  layout running");
        }
        painter.text(
            rect.left_bottom() + vec2(10.0, -10.0),
            Align2::LEFT_BOTTOM,
            footer,
            FontId::proportional(12.0),
            Color32::from_gray(150),
        );
    }
}
