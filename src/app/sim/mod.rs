mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::ring::{Motion, RingGraph, RingNode};
use forces::{
    accumulate_center_pull, accumulate_link_springs, accumulate_repulsion, relax_collisions,
};

/// Energy level the engine is held at while a drag is active.
pub const DRAG_ALPHA: f32 = 0.3;

/// Below this the layout is considered settled (motion is residual).
pub const ALPHA_SETTLED: f32 = 0.05;

/// Below this the engine stops ticking entirely.
pub const ALPHA_MIN: f32 = 0.001;

/// Force parameter set for one layout instance. Read-only inputs to the
/// engine; out-of-range values are the caller's problem, not validated here.
#[derive(Clone, Copy, Debug)]
pub struct SimParams {
    pub link_distance: f32,
    pub link_strength: f32,
    pub charge_strength: f32,
    pub charge_max_distance: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub collision_passes: usize,
    pub center_strength: f32,
    pub velocity_damping: f32,
    pub alpha_decay: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            link_distance: 120.0,
            link_strength: 0.12,
            charge_strength: 40_000.0,
            charge_max_distance: 600.0,
            collision_radius: 16.0,
            collision_strength: 0.7,
            collision_passes: 2,
            center_strength: 0.015,
            velocity_damping: 0.6,
            // d3's default: alpha reaches alpha_min in ~300 ticks.
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPhase {
    /// Fewer than two nodes: nothing to integrate, the engine never starts.
    Cold,
    Running,
    Settled,
    Idle,
}

impl SimPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Running => "running",
            Self::Settled => "settled",
            Self::Idle => "idle",
        }
    }
}

/// The force simulation for one ring layout. Created whole from a freshly
/// built topology and replaced whole on any structural change; never patched
/// incrementally.
pub struct Simulation {
    nodes: Vec<RingNode>,
    edges: Vec<(usize, usize)>,
    params: SimParams,
    alpha: f32,
    alpha_target: f32,
    has_run: bool,
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

impl Simulation {
    pub fn new(graph: RingGraph, params: SimParams) -> Self {
        let node_count = graph.nodes.len();
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            params,
            alpha: 1.0,
            alpha_target: 0.0,
            has_run: false,
            forces: vec![Vec2::ZERO; node_count],
            positions: Vec::with_capacity(node_count),
        }
    }

    pub fn nodes(&self) -> &[RingNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// True once the engine has ever been observed Running.
    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn phase(&self) -> SimPhase {
        if self.nodes.len() < 2 {
            SimPhase::Cold
        } else if self.alpha > ALPHA_SETTLED {
            SimPhase::Running
        } else if self.alpha > ALPHA_MIN {
            SimPhase::Settled
        } else {
            SimPhase::Idle
        }
    }

    /// Pin a node for dragging and hold the engine's energy open so the rest
    /// of the ring reacts. Idempotent while a drag is already active.
    pub fn begin_drag(&mut self, index: usize) {
        let Some(node) = self.nodes.get_mut(index) else {
            return;
        };
        let at = node.pos;
        node.pin(at);
        self.alpha_target = DRAG_ALPHA;
        self.alpha = self.alpha.max(DRAG_ALPHA);
    }

    /// Move an active drag's pin. The next tick reads the override.
    pub fn drag_to(&mut self, index: usize, at: Vec2) {
        if let Some(node) = self.nodes.get_mut(index)
            && node.is_pinned()
        {
            node.pin(at);
        }
    }

    /// Release a dragged node and let energy decay naturally again.
    pub fn end_drag(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.release();
        }
        self.alpha_target = 0.0;
    }

    /// One Euler integration step. Returns whether a tick happened; callers
    /// re-read node state rather than receiving positions.
    pub fn step(&mut self) -> bool {
        match self.phase() {
            SimPhase::Cold | SimPhase::Idle => return false,
            SimPhase::Running => self.has_run = true,
            SimPhase::Settled => {}
        }

        self.forces.resize(self.nodes.len(), Vec2::ZERO);
        self.forces.fill(Vec2::ZERO);
        self.positions.clear();
        self.positions.extend(self.nodes.iter().map(|node| node.pos));

        accumulate_link_springs(
            &self.nodes,
            &self.edges,
            self.alpha,
            &self.params,
            &mut self.forces,
        );
        accumulate_repulsion(&self.positions, self.alpha, &self.params, &mut self.forces);
        accumulate_center_pull(&self.nodes, self.alpha, &self.params, &mut self.forces);

        for (node, force) in self.nodes.iter_mut().zip(self.forces.iter()) {
            match &mut node.motion {
                Motion::Pinned { at } => node.pos = *at,
                Motion::Free { vel } => {
                    *vel = (*vel + *force) * self.params.velocity_damping;
                    node.pos += *vel;
                }
            }
        }

        relax_collisions(&mut self.nodes, &self.params);

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ring::build_ring;
    use crate::sites::SiteRecord;
    use eframe::egui::vec2;

    const SURFACE: Vec2 = vec2(1280.0, 800.0);

    fn ring_of(n: usize) -> RingGraph {
        let sites = (0..n)
            .map(|i| SiteRecord {
                name: format!("site-{i}"),
                url: format!("https://site-{i}.example"),
                program: "p".to_owned(),
                year: 2024,
            })
            .collect::<Vec<_>>();
        build_ring(&sites, SURFACE)
    }

    fn sim_of(n: usize) -> Simulation {
        Simulation::new(ring_of(n), SimParams::default())
    }

    #[test]
    fn empty_engine_stays_cold_and_never_ticks() {
        let mut sim = sim_of(0);
        assert_eq!(sim.phase(), SimPhase::Cold);
        assert!(!sim.step());
        assert!(!sim.has_run());
    }

    #[test]
    fn single_node_is_a_static_no_op() {
        let mut sim = sim_of(1);
        let before = sim.nodes()[0].pos;
        assert_eq!(sim.phase(), SimPhase::Cold);
        assert!(!sim.step());
        assert_eq!(sim.nodes()[0].pos, before);
    }

    #[test]
    fn alpha_decays_monotonically_without_a_drag() {
        let mut sim = sim_of(6);
        let mut previous = sim.alpha();
        assert!(previous <= 1.0);

        for _ in 0..200 {
            sim.step();
            let alpha = sim.alpha();
            assert!(alpha < previous);
            assert!(alpha > 0.0);
            previous = alpha;
        }
    }

    #[test]
    fn engine_settles_then_idles_and_stops() {
        let mut sim = sim_of(5);
        let mut ticks = 0usize;
        while sim.step() {
            ticks += 1;
            assert!(ticks < 1_000, "engine failed to go idle");
        }

        assert_eq!(sim.phase(), SimPhase::Idle);
        assert!(sim.has_run());

        let frozen = sim.nodes().iter().map(|n| n.pos).collect::<Vec<_>>();
        assert!(!sim.step());
        let still = sim.nodes().iter().map(|n| n.pos).collect::<Vec<_>>();
        assert_eq!(frozen, still);
    }

    #[test]
    fn linked_pair_relaxes_toward_rest_distance() {
        let mut sim = sim_of(2);
        let gap = |sim: &Simulation| (sim.nodes()[0].pos - sim.nodes()[1].pos).length();
        let rest = sim.params().link_distance;
        let initial_error = (gap(&sim) - rest).abs();

        for _ in 0..400 {
            sim.step();
        }

        assert!((gap(&sim) - rest).abs() < initial_error.max(rest * 0.5));
    }

    #[test]
    fn dragged_node_tracks_its_override_exactly() {
        let mut sim = sim_of(4);
        sim.begin_drag(2);
        sim.step();
        let pinned_at = sim.nodes()[2].pos;

        sim.drag_to(2, vec2(75.0, -40.0));
        sim.step();
        assert_eq!(sim.nodes()[2].pos, vec2(75.0, -40.0));
        assert_ne!(sim.nodes()[2].pos, pinned_at);

        // Override holds across ticks, never the integrated value.
        for _ in 0..20 {
            sim.step();
            assert_eq!(sim.nodes()[2].pos, vec2(75.0, -40.0));
        }
    }

    #[test]
    fn drag_reheats_a_settled_engine() {
        let mut sim = sim_of(4);
        while sim.phase() == SimPhase::Running {
            sim.step();
        }
        assert!(sim.alpha() < DRAG_ALPHA);

        sim.begin_drag(0);
        assert_eq!(sim.phase(), SimPhase::Running);
        assert!((sim.alpha() - DRAG_ALPHA).abs() < f32::EPSILON);

        // Energy is held at the active floor for the drag's duration.
        for _ in 0..50 {
            sim.step();
            assert!(sim.alpha() >= DRAG_ALPHA - 0.001);
        }

        sim.end_drag(0);
        for _ in 0..200 {
            sim.step();
        }
        assert!(sim.alpha() < DRAG_ALPHA);
        assert!(!sim.nodes()[0].is_pinned());
    }

    #[test]
    fn free_nodes_keep_integrating_while_one_is_pinned() {
        let mut sim = sim_of(3);
        sim.begin_drag(0);
        sim.drag_to(0, vec2(0.0, 0.0));

        let before = sim.nodes()[1].pos;
        for _ in 0..10 {
            sim.step();
        }
        assert_ne!(sim.nodes()[1].pos, before);
    }

    #[test]
    fn drag_move_on_free_node_is_ignored() {
        let mut sim = sim_of(3);
        let before = sim.nodes()[1].pos;
        sim.drag_to(1, vec2(999.0, 999.0));
        assert_eq!(sim.nodes()[1].pos, before);
        assert!(!sim.nodes()[1].is_pinned());
    }
}
