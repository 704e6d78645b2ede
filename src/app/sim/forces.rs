use eframe::egui::{Vec2, vec2};

use crate::app::ring::RingNode;

use super::SimParams;
use super::quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.72;
const CHARGE_SOFTENING: f32 = 600.0;

/// Direction between two nearly coincident points, derived from their
/// indices so the tie-break is stable across ticks.
fn separation_axis(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Spring correction per edge, pulling both endpoints toward the configured
/// rest distance. Scaled by link strength and the current energy level.
pub(super) fn accumulate_link_springs(
    nodes: &[RingNode],
    edges: &[(usize, usize)],
    alpha: f32,
    params: &SimParams,
    forces: &mut [Vec2],
) {
    for &(from, to) in edges {
        if from == to || from >= nodes.len() || to >= nodes.len() {
            continue;
        }

        let delta = nodes[to].pos - nodes[from].pos;
        let distance = delta.length();
        let direction = if distance > 0.0001 {
            delta / distance
        } else {
            separation_axis(from, to)
        };

        let stretch = distance - params.link_distance;
        let correction = direction * (stretch * params.link_strength * alpha * 0.5);
        forces[from] += correction;
        forces[to] -= correction;
    }
}

fn repulsion_between(point: Vec2, other: Vec2, scaled_strength: f32, mass: f32) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        vec2(1.0, 0.0)
    };
    direction * ((scaled_strength * mass) / (distance_sq + CHARGE_SOFTENING))
}

fn accumulate_repulsion_for_node(
    tree: &QuadNode,
    index: usize,
    positions: &[Vec2],
    scaled_strength: f32,
    max_distance_sq: f32,
    force: &mut Vec2,
) {
    if tree.mass <= 0.0 {
        return;
    }

    let point = positions[index];
    if tree.bounds.distance_sq_to_point(point) > max_distance_sq {
        return;
    }

    if tree.is_leaf() {
        for &other in &tree.indices {
            if other == index {
                continue;
            }
            if (positions[other] - point).length_sq() > max_distance_sq {
                continue;
            }
            *force += repulsion_between(point, positions[other], scaled_strength, 1.0);
        }
        return;
    }

    let delta = point - tree.center_of_mass;
    let distance = delta.length_sq().max(0.0001).sqrt();
    let can_approximate = !tree.bounds.contains(point)
        && ((tree.bounds.side_length() / distance) < BARNES_HUT_THETA)
        && tree.mass > 1.0;

    if can_approximate {
        *force += repulsion_between(point, tree.center_of_mass, scaled_strength, tree.mass);
        return;
    }

    for child in tree.children.iter().flatten() {
        accumulate_repulsion_for_node(
            child,
            index,
            positions,
            scaled_strength,
            max_distance_sq,
            force,
        );
    }
}

/// Range-limited many-body repulsion, approximated with a quadtree so distant
/// clusters contribute one aggregate push instead of one per node.
pub(super) fn accumulate_repulsion(
    positions: &[Vec2],
    alpha: f32,
    params: &SimParams,
    forces: &mut [Vec2],
) {
    let Some(tree) = QuadNode::build(positions) else {
        return;
    };

    let scaled_strength = params.charge_strength * alpha;
    let max_distance_sq = params.charge_max_distance * params.charge_max_distance;
    for (index, force) in forces.iter_mut().enumerate() {
        accumulate_repulsion_for_node(
            &tree,
            index,
            positions,
            scaled_strength,
            max_distance_sq,
            force,
        );
    }
}

/// Weak pull of every free node toward the surface center. Keeps the ring
/// from drifting without imposing a rigid rest position.
pub(super) fn accumulate_center_pull(
    nodes: &[RingNode],
    alpha: f32,
    params: &SimParams,
    forces: &mut [Vec2],
) {
    for (node, force) in nodes.iter().zip(forces.iter_mut()) {
        if !node.is_pinned() {
            *force -= node.pos * (params.center_strength * alpha);
        }
    }
}

/// Pairwise overlap relaxation. Each pass moves overlapping pairs apart by a
/// fraction of the overlap; pinned nodes stay put and their partner absorbs
/// the whole correction.
pub(super) fn relax_collisions(nodes: &mut [RingNode], params: &SimParams) {
    let min_distance = params.collision_radius * 2.0;
    if min_distance <= 0.0 || nodes.len() < 2 {
        return;
    }

    for _ in 0..params.collision_passes {
        for first in 0..nodes.len() {
            for second in (first + 1)..nodes.len() {
                let (head, tail) = nodes.split_at_mut(second);
                let a = &mut head[first];
                let b = &mut tail[0];

                let delta = a.pos - b.pos;
                let distance = delta.length();
                if distance >= min_distance {
                    continue;
                }

                let direction = if distance > 0.0001 {
                    delta / distance
                } else {
                    separation_axis(first, second)
                };
                let push = (min_distance - distance) * 0.5 * params.collision_strength;

                match (a.is_pinned(), b.is_pinned()) {
                    (false, false) => {
                        a.pos += direction * push;
                        b.pos -= direction * push;
                    }
                    (true, false) => b.pos -= direction * (push * 2.0),
                    (false, true) => a.pos += direction * (push * 2.0),
                    (true, true) => {}
                }
            }
        }
    }
}
