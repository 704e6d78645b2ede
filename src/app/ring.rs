use eframe::egui::{Vec2, vec2};

use crate::sites::SiteRecord;
use crate::util::stable_pair;

/// Kinematic interpretation of a node. A node is either integrated by the
/// simulation or pinned to an externally driven position, never both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    Free { vel: Vec2 },
    Pinned { at: Vec2 },
}

#[derive(Clone, Debug)]
pub struct RingNode {
    pub site: SiteRecord,
    pub pos: Vec2,
    pub motion: Motion,
}

impl RingNode {
    pub fn is_pinned(&self) -> bool {
        matches!(self.motion, Motion::Pinned { .. })
    }

    pub fn pin(&mut self, at: Vec2) {
        self.motion = Motion::Pinned { at };
    }

    /// Resume free integration from the current position, at rest.
    pub fn release(&mut self) {
        self.motion = Motion::Free { vel: Vec2::ZERO };
    }
}

/// The ring layout graph: one node per site, node `i` linked to `(i + 1) % n`.
/// Node ids are the vector indices, assigned fresh on every build. Edges are
/// derived state; a rebuild discards and regenerates all of them.
#[derive(Clone, Debug, Default)]
pub struct RingGraph {
    pub nodes: Vec<RingNode>,
    pub edges: Vec<(usize, usize)>,
}

impl RingGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Build the cyclic topology for an already-sorted site list. Initial
/// positions are scattered across the surface from a hash of the site name,
/// so rebuilding never stacks distinct sites while the cycle structure stays
/// a pure function of the input order. A single site gets no edges (the
/// self-loop is omitted).
pub fn build_ring(sites: &[SiteRecord], surface: Vec2) -> RingGraph {
    let spread = surface * 0.4;
    let nodes = sites
        .iter()
        .map(|site| {
            let (jx, jy) = stable_pair(&site.name);
            RingNode {
                site: site.clone(),
                pos: vec2(jx * spread.x, jy * spread.y),
                motion: Motion::Free { vel: Vec2::ZERO },
            }
        })
        .collect::<Vec<_>>();

    let edges = if nodes.len() < 2 {
        Vec::new()
    } else {
        (0..nodes.len())
            .map(|index| (index, (index + 1) % nodes.len()))
            .collect()
    };

    RingGraph { nodes, edges }
}
