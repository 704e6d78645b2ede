use eframe::egui::{Pos2, Vec2};

use super::sim::Simulation;

/// Pointer travel (in screen pixels) beyond which a press stops being a
/// click and becomes a drag.
const CLICK_SLOP: f32 = 4.0;

struct PendingDrag {
    node: usize,
    press_screen: Pos2,
    /// Node position relative to the pointer at press time, so the node does
    /// not snap its center to the cursor when the drag engages.
    grab_offset: Vec2,
    engaged: bool,
}

/// What a pointer release amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Press and release without exceeding the movement threshold.
    Click { node: usize },
    /// A completed drag; suppresses the click.
    DragEnd { node: usize },
    /// The press did not start on a node.
    None,
}

/// Per-node drag protocol. The node is pinned only once the pointer actually
/// travels, so a clean click never perturbs the simulation at all. At most
/// one drag is tracked at a time.
pub struct DragController {
    pending: Option<PendingDrag>,
}

impl DragController {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// The node currently held by an engaged drag, if any.
    pub fn dragging(&self) -> Option<usize> {
        self.pending
            .as_ref()
            .filter(|drag| drag.engaged)
            .map(|drag| drag.node)
    }

    /// True when no press is being tracked, engaged or not.
    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    pub fn on_press(&mut self, hit: Option<usize>, screen: Pos2, world: Vec2, sim: &Simulation) {
        if self.pending.is_some() {
            return;
        }
        let Some(node) = hit else {
            return;
        };
        let Some(node_state) = sim.nodes().get(node) else {
            return;
        };

        self.pending = Some(PendingDrag {
            node,
            press_screen: screen,
            grab_offset: node_state.pos - world,
            engaged: false,
        });
    }

    pub fn on_move(&mut self, screen: Pos2, world: Vec2, sim: &mut Simulation) {
        let Some(drag) = &mut self.pending else {
            return;
        };

        if !drag.engaged && (screen - drag.press_screen).length() > CLICK_SLOP {
            drag.engaged = true;
            sim.begin_drag(drag.node);
        }
        if drag.engaged {
            sim.drag_to(drag.node, world + drag.grab_offset);
        }
    }

    pub fn on_release(&mut self, sim: &mut Simulation) -> Release {
        let Some(drag) = self.pending.take() else {
            return Release::None;
        };

        if drag.engaged {
            sim.end_drag(drag.node);
            Release::DragEnd { node: drag.node }
        } else {
            Release::Click { node: drag.node }
        }
    }

    /// Drop any tracked press without touching the simulation. Used when the
    /// layout is rebuilt mid-gesture: the old engine dies with its drag.
    pub fn abandon(&mut self) {
        self.pending = None;
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ring::build_ring;
    use crate::app::sim::{SimParams, Simulation};
    use crate::sites::SiteRecord;
    use eframe::egui::{pos2, vec2};

    fn sim_of(n: usize) -> Simulation {
        let sites = (0..n)
            .map(|i| SiteRecord {
                name: format!("site-{i}"),
                url: format!("https://site-{i}.example"),
                program: "p".to_owned(),
                year: 2024,
            })
            .collect::<Vec<_>>();
        Simulation::new(build_ring(&sites, vec2(1280.0, 800.0)), SimParams::default())
    }

    #[test]
    fn press_release_without_movement_is_a_click() {
        let mut sim = sim_of(3);
        let mut drag = DragController::new();
        let alpha_before = sim.alpha();

        drag.on_press(Some(1), pos2(100.0, 100.0), vec2(0.0, 0.0), &sim);
        let release = drag.on_release(&mut sim);

        assert_eq!(release, Release::Click { node: 1 });
        // A clean click never pinned the node or perturbed the energy.
        assert!(!sim.nodes()[1].is_pinned());
        assert_eq!(sim.alpha(), alpha_before);
    }

    #[test]
    fn movement_within_the_slop_still_clicks() {
        let mut sim = sim_of(3);
        let mut drag = DragController::new();

        drag.on_press(Some(0), pos2(100.0, 100.0), vec2(0.0, 0.0), &sim);
        drag.on_move(pos2(102.0, 101.0), vec2(2.0, 1.0), &mut sim);
        let release = drag.on_release(&mut sim);

        assert_eq!(release, Release::Click { node: 0 });
        assert!(!sim.nodes()[0].is_pinned());
    }

    #[test]
    fn movement_beyond_the_slop_becomes_a_drag() {
        let mut sim = sim_of(3);
        let mut drag = DragController::new();

        drag.on_press(Some(2), pos2(100.0, 100.0), vec2(0.0, 0.0), &sim);
        drag.on_move(pos2(140.0, 100.0), vec2(40.0, 0.0), &mut sim);

        assert_eq!(drag.dragging(), Some(2));
        assert!(sim.nodes()[2].is_pinned());

        let release = drag.on_release(&mut sim);
        assert_eq!(release, Release::DragEnd { node: 2 });
        assert!(!sim.nodes()[2].is_pinned());
        assert!(drag.is_idle());
    }

    #[test]
    fn drag_preserves_the_grab_offset() {
        let mut sim = sim_of(3);
        let node_pos = sim.nodes()[0].pos;
        // Grab 10 units left of the node center.
        let grab_world = node_pos - vec2(10.0, 0.0);

        let mut drag = DragController::new();
        drag.on_press(Some(0), pos2(0.0, 0.0), grab_world, &sim);
        drag.on_move(pos2(50.0, 0.0), grab_world + vec2(50.0, 0.0), &mut sim);
        sim.step();

        let expected = node_pos + vec2(50.0, 0.0);
        assert!((sim.nodes()[0].pos - expected).length() < 0.001);
        drag.on_release(&mut sim);
    }

    #[test]
    fn press_on_empty_space_releases_to_none() {
        let mut sim = sim_of(3);
        let mut drag = DragController::new();

        drag.on_press(None, pos2(10.0, 10.0), vec2(0.0, 0.0), &sim);
        assert!(drag.is_idle());
        assert_eq!(drag.on_release(&mut sim), Release::None);
    }

    #[test]
    fn only_one_drag_is_tracked_at_a_time() {
        let mut sim = sim_of(3);
        let mut drag = DragController::new();

        drag.on_press(Some(0), pos2(0.0, 0.0), vec2(0.0, 0.0), &sim);
        drag.on_press(Some(1), pos2(5.0, 5.0), vec2(5.0, 5.0), &sim);
        drag.on_move(pos2(50.0, 0.0), vec2(50.0, 0.0), &mut sim);

        assert_eq!(drag.dragging(), Some(0));
        assert!(!sim.nodes()[1].is_pinned());
        drag.on_release(&mut sim);
    }

    #[test]
    fn abandon_drops_state_without_touching_the_engine() {
        let mut sim = sim_of(3);
        let mut drag = DragController::new();

        drag.on_press(Some(0), pos2(0.0, 0.0), vec2(0.0, 0.0), &sim);
        drag.on_move(pos2(50.0, 0.0), vec2(50.0, 0.0), &mut sim);
        drag.abandon();

        assert!(drag.is_idle());
        assert_eq!(drag.on_release(&mut sim), Release::None);
    }
}
