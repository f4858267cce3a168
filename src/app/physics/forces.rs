use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

#[derive(Clone, Copy, Debug)]
pub(super) struct LinkSpring {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    pub(super) bias: f32,
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) distance_min_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) min_distance: f32,
    pub(super) strength: f32,
}

pub(super) fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1.0e-6
}

// Self-loops carry no force.
pub(super) fn link_springs(endpoints: &[(usize, usize)], node_count: usize) -> Vec<LinkSpring> {
    let mut counts = vec![0usize; node_count];
    for &(source, target) in endpoints {
        if source == target || source >= node_count || target >= node_count {
            continue;
        }
        counts[source] += 1;
        counts[target] += 1;
    }

    endpoints
        .iter()
        .filter(|(source, target)| source != target && *source < node_count && *target < node_count)
        .map(|&(source, target)| {
            let source_count = counts[source] as f32;
            let target_count = counts[target] as f32;
            LinkSpring {
                source,
                target,
                strength: 1.0 / source_count.min(target_count),
                bias: source_count / (source_count + target_count),
            }
        })
        .collect()
}

pub(super) fn apply_link_springs(
    springs: &[LinkSpring],
    positions: &[Vec2],
    velocities: &mut [Vec2],
    distance: f32,
    alpha: f32,
) {
    for spring in springs {
        let (source, target) = (spring.source, spring.target);
        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta == Vec2::ZERO {
            delta = jiggle(source, target);
        }

        let length = delta.length();
        let scale = (length - distance) / length * alpha * spring.strength;
        let correction = delta * scale;

        velocities[target] -= correction * spring.bias;
        velocities[source] += correction * (1.0 - spring.bias);
    }
}

fn charge_between(delta: Vec2, mass: f32, params: ChargeParams) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    if distance_sq < params.distance_min_sq {
        distance_sq = (params.distance_min_sq * distance_sq).sqrt();
    }
    delta * (params.strength * mass / distance_sq)
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut delta = positions[other_index] - point;
            if delta == Vec2::ZERO {
                delta = jiggle(index, other_index);
            }
            *velocity += charge_between(delta, 1.0, params);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance = delta.length();
    let can_approximate = !node.square.contains(point)
        && distance > 0.0
        && (node.square.size / distance) < params.theta;

    if can_approximate {
        *velocity += charge_between(delta, node.mass, params);
        return;
    }

    for child in &node.children {
        accumulate_charge_for_node(child, index, positions, params, velocity);
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let mut delta = predicted[from] - predicted[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= params.min_distance * params.min_distance {
        return;
    }

    if delta == Vec2::ZERO {
        delta = jiggle(from, to);
    }
    let distance = delta.length();
    let push = delta * ((params.min_distance - distance) / distance * params.strength);

    // Equal radii split the correction evenly.
    velocities[from] += push * 0.5;
    velocities[to] -= push * 0.5;
}

pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    if node_a.square.gap_sq(node_b.square) > params.min_distance * params.min_distance {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, predicted, params, velocities);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, predicted, params, velocities);
                }
            }
        }
        return;
    }

    if same_node {
        for (offset, child_a) in node_a.children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, predicted, params, velocities);
            for child_b in &node_a.children[offset + 1..] {
                accumulate_collision_pairs(child_a, child_b, false, predicted, params, velocities);
            }
        }
        return;
    }

    // Descend into the larger cell; a leaf cannot be split further.
    let split_a = !node_a.is_leaf() && (node_b.is_leaf() || node_a.square.size >= node_b.square.size);
    if split_a {
        for child in &node_a.children {
            accumulate_collision_pairs(child, node_b, false, predicted, params, velocities);
        }
    } else {
        for child in &node_b.children {
            accumulate_collision_pairs(node_a, child, false, predicted, params, velocities);
        }
    }
}
