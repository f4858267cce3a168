use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2, vec2};

use super::projection::{Emphasis, Scene, Tooltip};

const MIN_SCALE: f32 = 0.05;
const MAX_SCALE: f32 = 6.0;
const TOOLTIP_OFFSET: Vec2 = Vec2::new(-20.0, -40.0);
const LABEL_MIN_SCALE: f32 = 1.35;

/// `viewport = world * scale + translate`
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub(crate) const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub(crate) fn to_viewport(self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translate).to_pos2()
    }

    pub(crate) fn to_world(self, viewport: Pos2) -> Vec2 {
        let inverse = self.inverse();
        viewport.to_vec2() * inverse.scale + inverse.translate
    }

    pub(crate) fn pan(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    pub(crate) fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let world_before = self.to_world(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translate = anchor.to_vec2() - world_before * self.scale;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    pub(crate) fn inverse(self) -> Self {
        Self {
            translate: -self.translate / self.scale,
            scale: 1.0 / self.scale,
        }
    }

    pub(crate) fn scroll_zoom_factor(scroll: f32) -> f32 {
        (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 23, 42));

    let step = (56.0 * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(51, 65, 85, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn paint_scene(painter: &Painter, rect: Rect, transform: ViewTransform, scene: &Scene) {
    let origin = rect.min.to_vec2();
    let to_screen = |world: Vec2| transform.to_viewport(world) + origin;
    let scale = transform.scale;

    for edge in &scene.edges {
        if edge.source == edge.target {
            continue;
        }
        let start = to_screen(edge.start);
        let end = to_screen(edge.end);
        if !edge_visible(rect, start, end, 12.0 * scale) {
            continue;
        }

        painter.line_segment([start, end], Stroke::new(edge.width * scale, edge.color));
        if let Some(arrow) = &edge.arrow {
            let points = arrow.iter().map(|point| to_screen(*point)).collect::<Vec<_>>();
            painter.add(Shape::convex_polygon(points, edge.arrow_color, Stroke::NONE));
        }
    }

    for node in &scene.nodes {
        let center = to_screen(node.position);
        let radius = node.radius * scale;
        if !circle_visible(rect, center, radius + 6.0 * scale) {
            continue;
        }

        painter.circle_filled(center, radius, node.fill);
        painter.circle_stroke(center, radius, Stroke::new(node.outline_width * scale, node.outline));

        match node.emphasis {
            Emphasis::None => {}
            Emphasis::Hovered => {
                painter.circle_stroke(
                    center,
                    radius + 2.0 * scale,
                    Stroke::new(1.5 * scale, Color32::from_rgb(226, 232, 240)),
                );
            }
            Emphasis::Selected => {
                painter.circle_stroke(
                    center,
                    radius + 4.0 * scale,
                    Stroke::new(2.0 * scale, Color32::from_rgb(245, 206, 93)),
                );
            }
        }

        if node.emphasis == Emphasis::Selected || scale > LABEL_MIN_SCALE {
            painter.text(
                center + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                node.id.as_str(),
                FontId::proportional(12.0),
                Color32::from_gray(226),
            );
        }
    }

    if let Some(tooltip) = &scene.tooltip {
        paint_tooltip(painter, rect, tooltip);
    }
}

fn paint_tooltip(painter: &Painter, rect: Rect, tooltip: &Tooltip) {
    let galley = painter.layout_no_wrap(
        tooltip.text.clone(),
        FontId::proportional(12.0),
        Color32::from_rgb(226, 232, 240),
    );
    let padding = vec2(10.0, 6.0);
    let top_left = rect.min + tooltip.anchor.to_vec2() + TOOLTIP_OFFSET;
    let frame = Rect::from_min_size(top_left, galley.size() + padding * 2.0);

    painter.rect_filled(frame, 6.0, Color32::from_rgb(30, 41, 59));
    painter.line_segment(
        [frame.left_bottom(), frame.right_bottom()],
        Stroke::new(1.0, Color32::from_rgb(51, 65, 85)),
    );
    painter.galley(top_left + padding, galley, Color32::from_rgb(226, 232, 240));
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn close(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1.0e-2
    }

    #[test]
    fn identity_maps_world_to_viewport_unchanged() {
        let transform = ViewTransform::default();
        assert_eq!(transform.to_viewport(vec2(12.0, -3.0)), pos2(12.0, -3.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut transform = ViewTransform::IDENTITY;
        let anchor = pos2(300.0, 200.0);
        let world = transform.to_world(anchor);
        transform.zoom_at(anchor, 2.5);
        assert!(close(transform.to_viewport(world), anchor));
        assert_eq!(transform.scale, 2.5);
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut transform = ViewTransform::IDENTITY;
        transform.pan(vec2(40.0, -10.0));
        transform.zoom_at(pos2(5.0, 5.0), 1.1);
        transform.reset();
        assert_eq!(transform, ViewTransform::IDENTITY);
    }

    #[test]
    fn composing_with_inverse_is_identity() {
        let transform = ViewTransform {
            translate: vec2(120.0, -35.0),
            scale: 1.75,
        };
        let world = vec2(-64.0, 210.5);
        let screen = transform.to_viewport(world);
        let back = transform.inverse().to_viewport(screen.to_vec2());
        assert!(close(back, world.to_pos2()));
        assert!(close(transform.to_world(screen).to_pos2(), world.to_pos2()));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut transform = ViewTransform::IDENTITY;
        for _ in 0..100 {
            transform.zoom_at(Pos2::ZERO, 1.15);
        }
        assert_eq!(transform.scale, MAX_SCALE);
    }

    proptest! {
        #[test]
        fn pan_zoom_then_inverse_restores_screen_positions(
            dx in -500.0f32..500.0,
            dy in -500.0f32..500.0,
            factor in 0.5f32..2.0,
            ax in 0.0f32..1000.0,
            ay in 0.0f32..800.0,
            wx in -400.0f32..400.0,
            wy in -400.0f32..400.0,
        ) {
            let world = vec2(wx, wy);
            let anchor = pos2(ax, ay);
            let mut transform = ViewTransform::IDENTITY;
            let before = transform.to_viewport(world);

            transform.pan(vec2(dx, dy));
            transform.zoom_at(anchor, factor);
            transform.zoom_at(anchor, 1.0 / factor);
            transform.pan(vec2(-dx, -dy));

            prop_assert!(close(transform.to_viewport(world), before));
        }
    }
}
