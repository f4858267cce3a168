mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::analysis::GraphModel;
use crate::util::stable_pair;

use forces::{
    ChargeParams, CollisionParams, LinkSpring, accumulate_charge_for_node,
    accumulate_collision_pairs, apply_link_springs, link_springs,
};
use quadtree::QuadNode;

const INITIAL_SPACING: f32 = 10.0;
const INITIAL_JITTER: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimulationConfig {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub drag_alpha_target: f32,
    pub velocity_decay: f32,
    pub theta: f32,
    pub distance_min: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            link_distance: 100.0,
            charge_strength: -200.0,
            collision_radius: 20.0,
            collision_strength: 1.0,
            alpha_min,
            // Reaches alpha_min from 1.0 in 300 ticks.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            drag_alpha_target: 0.3,
            velocity_decay: 0.4,
            theta: 0.9,
            distance_min: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SimulationNode {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Overrides physics while set; the node sits exactly here after a tick.
    pub pin: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SimulationState {
    pub nodes: Vec<SimulationNode>,
    pub alpha: f32,
    pub alpha_target: f32,
}

impl SimulationState {
    pub(crate) fn position(&self, index: usize) -> Option<Vec2> {
        self.nodes.get(index).map(|node| node.position)
    }
}

struct PhysicsScratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    velocities: Vec<Vec2>,
}

pub(crate) struct Simulation {
    config: SimulationConfig,
    state: SimulationState,
    springs: Vec<LinkSpring>,
    center: Vec2,
    running: bool,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub(crate) fn new(model: &GraphModel, center: Vec2, config: SimulationConfig) -> Self {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        let nodes = model
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let radius = INITIAL_SPACING * (0.5 + index as f32).sqrt();
                let angle = index as f32 * golden_angle;
                let (jx, jy) = stable_pair(&node.id);
                SimulationNode {
                    position: center
                        + vec2(angle.cos(), angle.sin()) * radius
                        + vec2(jx, jy) * INITIAL_JITTER,
                    velocity: Vec2::ZERO,
                    pin: None,
                }
            })
            .collect::<Vec<_>>();

        Self {
            config,
            springs: link_springs(model.link_endpoints(), nodes.len()),
            state: SimulationState {
                nodes,
                alpha: 1.0,
                alpha_target: 0.0,
            },
            center,
            running: true,
            scratch: PhysicsScratch {
                positions: Vec::new(),
                predicted: Vec::new(),
                velocities: Vec::new(),
            },
        }
    }

    pub(crate) fn config(&self) -> SimulationConfig {
        self.config
    }

    pub(crate) fn state(&self) -> &SimulationState {
        &self.state
    }

    pub(crate) fn set_center(&mut self, center: Vec2) {
        if (center - self.center).length_sq() > f32::EPSILON {
            self.center = center;
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.state.alpha < self.config.alpha_min
    }

    pub(crate) fn set_alpha_target(&mut self, alpha_target: f32) {
        self.state.alpha_target = alpha_target.clamp(0.0, 1.0);
    }

    pub(crate) fn restart(&mut self) {
        if !self.running {
            debug!(alpha = self.state.alpha, "layout restarted");
        }
        self.running = true;
    }

    pub(crate) fn pin(&mut self, index: usize, at: Vec2) {
        if let Some(node) = self.state.nodes.get_mut(index) {
            node.pin = Some(at);
            node.position = at;
            node.velocity = Vec2::ZERO;
        }
    }

    pub(crate) fn unpin(&mut self, index: usize) {
        if let Some(node) = self.state.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    pub(crate) fn pinned_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.state
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.pin.map(|_| index))
    }

    pub(crate) fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.tick();

        if self.is_settled() {
            self.running = false;
            debug!(nodes = self.state.nodes.len(), "layout settled");
        }
        true
    }

    pub(crate) fn tick(&mut self) {
        advance(
            &mut self.state,
            &self.springs,
            self.center,
            &self.config,
            &mut self.scratch,
        );
    }
}

fn advance(
    state: &mut SimulationState,
    springs: &[LinkSpring],
    center: Vec2,
    config: &SimulationConfig,
    scratch: &mut PhysicsScratch,
) {
    state.alpha += (state.alpha_target - state.alpha) * config.alpha_decay;

    let node_count = state.nodes.len();
    if node_count == 0 {
        return;
    }
    let alpha = state.alpha;

    scratch.positions.clear();
    scratch.velocities.clear();
    scratch.positions.reserve(node_count);
    scratch.velocities.reserve(node_count);
    for node in &state.nodes {
        scratch.positions.push(node.position);
        scratch.velocities.push(node.velocity);
    }
    let positions = &mut scratch.positions;
    let velocities = &mut scratch.velocities;

    apply_link_springs(springs, positions, velocities, config.link_distance, alpha);

    if config.charge_strength != 0.0
        && let Some(tree) = QuadNode::build(positions)
    {
        let params = ChargeParams {
            strength: config.charge_strength * alpha,
            theta: config.theta,
            distance_min_sq: config.distance_min * config.distance_min,
        };
        for (index, velocity) in velocities.iter_mut().enumerate() {
            accumulate_charge_for_node(&tree, index, positions, params, velocity);
        }
    }

    let mut centroid = Vec2::ZERO;
    for position in positions.iter() {
        centroid += *position;
    }
    let shift = centroid / node_count as f32 - center;
    for position in positions.iter_mut() {
        *position -= shift;
    }

    if config.collision_radius > 0.0 {
        scratch.predicted.clear();
        scratch.predicted.extend(
            positions
                .iter()
                .zip(velocities.iter())
                .map(|(position, velocity)| *position + *velocity),
        );
        if let Some(tree) = QuadNode::build(&scratch.predicted) {
            let params = CollisionParams {
                min_distance: config.collision_radius * 2.0,
                strength: config.collision_strength,
            };
            accumulate_collision_pairs(&tree, &tree, true, &scratch.predicted, params, velocities);
        }
    }

    let retain = 1.0 - config.velocity_decay;
    for ((node, position), velocity) in state
        .nodes
        .iter_mut()
        .zip(positions.iter())
        .zip(velocities.iter())
    {
        if let Some(pin) = node.pin {
            node.position = pin;
            node.velocity = Vec2::ZERO;
            continue;
        }

        node.velocity = *velocity * retain;
        node.position = *position + node.velocity;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::analysis::GraphModel;
    use crate::analysis::fixtures::{link, node, two_accounts};

    const CENTER: Vec2 = Vec2::new(400.0, 300.0);

    fn settle(simulation: &mut Simulation) -> usize {
        let mut ticks = 0;
        while simulation.step() {
            ticks += 1;
            assert!(ticks < 5_000, "layout never settled");
        }
        ticks
    }

    fn isolated(count: usize) -> GraphModel {
        let nodes = (0..count)
            .map(|index| node(&format!("ACC_{index:03}"), index % 3 == 0))
            .collect();
        GraphModel::new(nodes, Vec::new()).unwrap()
    }

    #[test]
    fn empty_graph_ticks_to_nothing() {
        let model = GraphModel::new(Vec::new(), Vec::new()).unwrap();
        let mut simulation = Simulation::new(&model, CENTER, SimulationConfig::default());
        simulation.tick();
        assert!(simulation.state().nodes.is_empty());
        settle(&mut simulation);
        assert!(simulation.is_settled());
    }

    #[test]
    fn default_decay_settles_in_a_few_hundred_ticks() {
        let mut simulation =
            Simulation::new(&two_accounts(), CENTER, SimulationConfig::default());
        let ticks = settle(&mut simulation);
        assert!((250..=350).contains(&ticks), "settled after {ticks} ticks");
        assert!(!simulation.step());
    }

    #[test]
    fn linked_pair_rests_near_link_distance() {
        let config = SimulationConfig {
            charge_strength: 0.0,
            ..SimulationConfig::default()
        };
        let mut simulation = Simulation::new(&two_accounts(), CENTER, config);
        settle(&mut simulation);

        let state = simulation.state();
        let distance = (state.nodes[0].position - state.nodes[1].position).length();
        assert!((90.0..=110.0).contains(&distance), "distance {distance}");
    }

    #[test]
    fn centroid_follows_viewport_center() {
        let mut simulation = Simulation::new(&isolated(12), CENTER, SimulationConfig::default());
        simulation.set_center(vec2(0.0, 0.0));
        simulation.tick();

        let sum = simulation
            .state()
            .nodes
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.position);
        // Velocities move the centroid only by their (near-zero) mean.
        assert!((sum / 12.0).length() < 1.0);
    }

    #[test]
    fn isolated_node_is_kept_and_placed() {
        let model = GraphModel::new(
            vec![node("A", false), node("B", false), node("LONE", true)],
            vec![link("A", "B")],
        )
        .unwrap();
        let mut simulation = Simulation::new(&model, CENTER, SimulationConfig::default());
        settle(&mut simulation);
        let lone = simulation.state().position(2).unwrap();
        assert!(lone.x.is_finite() && lone.y.is_finite());
    }

    #[test]
    fn pinned_node_sits_exactly_on_its_pin_every_tick() {
        let model = isolated(20);
        let mut simulation = Simulation::new(&model, CENTER, SimulationConfig::default());
        let pin = vec2(123.25, -47.5);
        simulation.pin(4, pin);
        assert_eq!(simulation.state().position(4), Some(pin));

        for _ in 0..60 {
            simulation.tick();
            assert_eq!(simulation.state().position(4), Some(pin));
        }
    }

    #[test]
    fn unpinned_node_resumes_moving() {
        let mut simulation =
            Simulation::new(&two_accounts(), CENTER, SimulationConfig::default());
        let pin = CENTER + vec2(450.0, 0.0);
        simulation.pin(0, pin);
        for _ in 0..10 {
            simulation.tick();
        }
        simulation.unpin(0);
        simulation.tick();
        assert_ne!(simulation.state().position(0), Some(pin));
    }

    #[test]
    fn alpha_target_keeps_layout_warm_and_restart_reheats() {
        let mut simulation =
            Simulation::new(&two_accounts(), CENTER, SimulationConfig::default());
        settle(&mut simulation);
        assert!(!simulation.is_running());

        simulation.set_alpha_target(0.3);
        simulation.restart();
        for _ in 0..1_000 {
            assert!(simulation.step());
        }
        assert!((simulation.state().alpha - 0.3).abs() < 0.01);

        simulation.set_alpha_target(0.0);
        settle(&mut simulation);
        assert!(simulation.is_settled());
    }

    #[test]
    fn coincident_pair_separates_to_contact_distance() {
        let config = SimulationConfig {
            charge_strength: 0.0,
            ..SimulationConfig::default()
        };
        let model = GraphModel::new(vec![node("A", false), node("B", false)], Vec::new()).unwrap();
        let mut simulation = Simulation::new(&model, CENTER, config);
        simulation.state.nodes[1].position = simulation.state.nodes[0].position;
        settle(&mut simulation);

        let state = simulation.state();
        let distance = (state.nodes[0].position - state.nodes[1].position).length();
        assert!(distance >= 40.0 * 0.99, "distance {distance}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn settled_isolated_nodes_do_not_overlap(count in 2usize..48) {
            let config = SimulationConfig::default();
            let mut simulation = Simulation::new(&isolated(count), CENTER, config);
            settle(&mut simulation);

            let nodes = &simulation.state().nodes;
            let contact = config.collision_radius * 2.0 * 0.99;
            for first in 0..nodes.len() {
                for second in (first + 1)..nodes.len() {
                    let distance = (nodes[first].position - nodes[second].position).length();
                    prop_assert!(distance >= contact, "{first}/{second} at {distance}");
                }
            }
        }
    }
}
