use std::collections::HashMap;

use eframe::egui::{Color32, Pos2, Vec2, vec2};

use crate::analysis::{GraphModel, GraphNode, SuspiciousAccount};
use crate::util::format_score;

use super::physics::SimulationState;
use super::selection::SelectionState;

pub(crate) const SUSPICIOUS_RADIUS: f32 = 12.0;
pub(crate) const NORMAL_RADIUS: f32 = 8.0;
pub(crate) const ALERT_FILL: Color32 = Color32::from_rgb(239, 68, 68);
pub(crate) const NORMAL_FILL: Color32 = Color32::from_rgb(59, 130, 246);
const NODE_OUTLINE: Color32 = Color32::from_rgb(30, 41, 59);
const NODE_OUTLINE_WIDTH: f32 = 2.0;
const EDGE_WIDTH: f32 = 1.5;
const ARROW_COLOR: Color32 = Color32::from_rgb(100, 116, 139);
const ARROW_LENGTH: f32 = 9.0;
const ARROW_HALF_WIDTH: f32 = 4.5;
const ARROW_GAP: f32 = 2.0;
pub(crate) const NO_RING: &str = "N/A";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Emphasis {
    None,
    Hovered,
    Selected,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SceneNode {
    pub id: String,
    pub position: Vec2,
    pub radius: f32,
    pub fill: Color32,
    pub outline: Color32,
    pub outline_width: f32,
    pub emphasis: Emphasis,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SceneEdge {
    pub source: usize,
    pub target: usize,
    pub start: Vec2,
    pub end: Vec2,
    pub arrow: Option<[Vec2; 3]>,
    pub width: f32,
    pub color: Color32,
    pub arrow_color: Color32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Tooltip {
    pub text: String,
    pub anchor: Pos2,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct AccountDetail {
    pub account_id: String,
    pub score: String,
    pub ring: String,
    pub patterns: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DetailPanel {
    Found(AccountDetail),
    NotFound { account_id: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
    pub tooltip: Option<Tooltip>,
}

pub(crate) fn node_radius(node: &GraphNode) -> f32 {
    if node.is_suspicious {
        SUSPICIOUS_RADIUS
    } else {
        NORMAL_RADIUS
    }
}

pub(crate) fn node_fill(node: &GraphNode) -> Color32 {
    if node.is_suspicious {
        ALERT_FILL
    } else {
        NORMAL_FILL
    }
}

fn edge_color() -> Color32 {
    Color32::from_rgba_unmultiplied(71, 85, 105, 153)
}

pub(crate) fn project(
    model: &GraphModel,
    state: &SimulationState,
    selection: &SelectionState,
) -> Scene {
    let hovered = selection.hovered_id();
    let selected = selection.selected();

    let nodes = model
        .nodes()
        .iter()
        .zip(&state.nodes)
        .map(|(node, physical)| {
            let emphasis = if selected == Some(node.id.as_str()) {
                Emphasis::Selected
            } else if hovered == Some(node.id.as_str()) {
                Emphasis::Hovered
            } else {
                Emphasis::None
            };

            SceneNode {
                id: node.id.clone(),
                position: physical.position,
                radius: node_radius(node),
                fill: node_fill(node),
                outline: NODE_OUTLINE,
                outline_width: NODE_OUTLINE_WIDTH,
                emphasis,
            }
        })
        .collect::<Vec<_>>();

    let edges = model
        .link_endpoints()
        .iter()
        .filter_map(|&(source, target)| {
            let start = state.position(source)?;
            let center = state.position(target)?;
            let target_radius = nodes.get(target)?.radius;
            let (end, arrow) = arrow_geometry(start, center, target_radius);
            Some(SceneEdge {
                source,
                target,
                start,
                end,
                arrow,
                width: EDGE_WIDTH,
                color: edge_color(),
                arrow_color: ARROW_COLOR,
            })
        })
        .collect();

    let tooltip = selection.hover().and_then(|hover| {
        model.node(&hover.node_id).map(|node| Tooltip {
            text: node.id.clone(),
            anchor: hover.pointer,
        })
    });

    Scene {
        nodes,
        edges,
        tooltip,
    }
}

pub(crate) fn account_detail(
    selected: Option<&str>,
    accounts: &HashMap<String, SuspiciousAccount>,
) -> Option<DetailPanel> {
    let account_id = selected?;
    Some(match accounts.get(account_id) {
        Some(account) => DetailPanel::Found(AccountDetail {
            account_id: account.account_id.clone(),
            score: format_score(account.suspicion_score),
            ring: account
                .ring_id
                .clone()
                .filter(|ring| !ring.is_empty())
                .unwrap_or_else(|| NO_RING.to_owned()),
            patterns: account.detected_patterns.clone(),
        }),
        None => DetailPanel::NotFound {
            account_id: account_id.to_owned(),
        },
    })
}

fn arrow_geometry(start: Vec2, center: Vec2, target_radius: f32) -> (Vec2, Option<[Vec2; 3]>) {
    let delta = center - start;
    let length = delta.length();
    let inset = target_radius + ARROW_GAP;
    if length <= inset + ARROW_LENGTH {
        return (center, None);
    }

    let direction = delta / length;
    let tip = center - direction * inset;
    let base = tip - direction * ARROW_LENGTH;
    let normal = vec2(-direction.y, direction.x) * ARROW_HALF_WIDTH;
    (base, Some([tip, base + normal, base - normal]))
}
