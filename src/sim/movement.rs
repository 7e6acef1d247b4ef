//! Per-axis movement resolution
//!
//! Moves are applied one axis at a time and rolled back on overlap, so a tank
//! pushing diagonally into a wall slides along it.

use glam::Vec2;

use super::geometry::{Rect, Wall, circles_overlap};
use super::state::Combatant;

/// Outcome of a move request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    /// Displacement actually applied
    pub applied: Vec2,
    /// True if either axis was rolled back
    pub blocked: bool,
}

/// Would the combatant at `index` overlap something if it stood at `pos`?
fn is_blocked(combatants: &[Combatant], index: usize, pos: Vec2, walls: &[Wall]) -> bool {
    let mover = &combatants[index];
    let footprint = Rect::centered(pos, mover.width, mover.height);
    if walls.iter().any(|w| footprint.overlaps(w)) {
        return true;
    }
    let radius = mover.collision_radius();
    combatants.iter().enumerate().any(|(i, other)| {
        i != index
            && other.is_alive()
            && circles_overlap(pos, radius, other.pos, other.collision_radius())
    })
}

/// Move `combatants[index]` by `delta`, rolling back each blocked axis.
///
/// AI tanks that hit something get their decision timer zeroed so they pick
/// a new action on the next tick.
pub fn move_combatant(
    combatants: &mut [Combatant],
    index: usize,
    delta: Vec2,
    walls: &[Wall],
) -> MoveResult {
    let mut pos = combatants[index].pos;
    let mut applied = Vec2::ZERO;
    let mut blocked = false;

    if delta.x != 0.0 {
        let candidate = Vec2::new(pos.x + delta.x, pos.y);
        if is_blocked(combatants, index, candidate, walls) {
            blocked = true;
        } else {
            pos = candidate;
            applied.x = delta.x;
        }
    }

    if delta.y != 0.0 {
        let candidate = Vec2::new(pos.x, pos.y + delta.y);
        if is_blocked(combatants, index, candidate, walls) {
            blocked = true;
        } else {
            pos = candidate;
            applied.y = delta.y;
        }
    }

    let mover = &mut combatants[index];
    mover.pos = pos;
    if blocked && !mover.is_player() {
        mover.ai.decision_timer = 0.0;
    }
    MoveResult { applied, blocked }
}

/// Apply every pending movement intent, in combatant order
pub fn apply_intents(combatants: &mut [Combatant], walls: &[Wall]) {
    for i in 0..combatants.len() {
        let delta = std::mem::take(&mut combatants[i].intent);
        if combatants[i].is_alive() && delta != Vec2::ZERO {
            move_combatant(combatants, i, delta, walls);
        }
    }
}
