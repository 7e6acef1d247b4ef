//! AI decision controller
//!
//! Each AI tank re-picks a coarse movement action on a jittered timer, turns
//! toward whatever it cares about at its own rotation rate, and fires on a
//! separate timer once its gun is roughly lined up.

use glam::Vec2;
use rand::Rng;

use super::state::{AiAction, CombatantId, GameEvent, GameState, Pickup};
use crate::{bearing, normalize_angle, rotate_towards};

/// Weighted action tables, weights sum to 1
const CHASE: &[(AiAction, f32)] = &[
    (AiAction::Forward, 0.8),
    (AiAction::RotateLeft, 0.1),
    (AiAction::RotateRight, 0.1),
];
const STRAFE: &[(AiAction, f32)] = &[
    (AiAction::Forward, 0.3),
    (AiAction::Backward, 0.3),
    (AiAction::RotateLeft, 0.2),
    (AiAction::RotateRight, 0.2),
];
const CLOSE_IN: &[(AiAction, f32)] = &[
    (AiAction::Forward, 0.4),
    (AiAction::RotateLeft, 0.3),
    (AiAction::RotateRight, 0.3),
];
const WANDER: &[(AiAction, f32)] = &[
    (AiAction::Idle, 0.2),
    (AiAction::RotateLeft, 0.2),
    (AiAction::RotateRight, 0.2),
    (AiAction::Forward, 0.2),
    (AiAction::Backward, 0.2),
];

/// Where the target sits relative to the preferred band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Farther than 1.5 × band
    TooFar,
    /// Between band and 1.5 × band
    InBand,
    /// Closer than band
    Inside,
}

impl Zone {
    pub fn of(distance: f32, band: f32) -> Self {
        if distance > band * 1.5 {
            Zone::TooFar
        } else if distance >= band {
            Zone::InBand
        } else {
            Zone::Inside
        }
    }

    fn table(self) -> &'static [(AiAction, f32)] {
        match self {
            Zone::TooFar => CHASE,
            Zone::InBand => STRAFE,
            Zone::Inside => CLOSE_IN,
        }
    }
}

/// A located target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub id: CombatantId,
    pub pos: Vec2,
    pub distance: f32,
}

fn pick<R: Rng + ?Sized>(rng: &mut R, table: &[(AiAction, f32)]) -> AiAction {
    let mut roll = rng.random::<f32>();
    for &(action, weight) in table {
        if roll < weight {
            return action;
        }
        roll -= weight;
    }
    table.last().map(|&(action, _)| action).unwrap_or_default()
}

/// Nearest tank `state.combatants[index]` may shoot, within `radius`
pub fn find_target(state: &GameState, index: usize, radius: f32) -> Option<Sighting> {
    let me = &state.combatants[index];
    let mut best: Option<Sighting> = None;
    let mut best_dist = radius;
    for (i, other) in state.combatants.iter().enumerate() {
        if i == index || !other.is_alive() || !state.can_damage(me.faction, other) {
            continue;
        }
        let distance = me.pos.distance(other.pos);
        if distance < best_dist {
            best_dist = distance;
            best = Some(Sighting {
                id: other.id,
                pos: other.pos,
                distance,
            });
        }
    }
    best
}

/// Nearest pickup an AI at `pos` wants, within `radius`
pub fn find_pickup(pickups: &[Pickup], pos: Vec2, radius: f32) -> Option<Vec2> {
    let mut best = None;
    let mut best_dist = radius;
    // Experience and weapon drops are left for the player
    for p in pickups.iter().filter(|p| p.active && p.is_ai_collectible()) {
        let d = pos.distance(p.pos);
        if d < best_dist {
            best_dist = d;
            best = Some(p.pos);
        }
    }
    best
}

/// Run one AI tank for `dt`: pick an action, steer, queue movement, fire
fn think(state: &mut GameState, index: usize, dt: f32) {
    let cfg = state.tuning.ai.clone();
    let target = find_target(state, index, cfg.search_radius);
    let me = &state.combatants[index];
    let pickup = find_pickup(&state.pickups, me.pos, cfg.pickup_radius);
    let band = me.role.profile().preferred_range;

    let tank = &mut state.combatants[index];
    let rng = &mut state.rng;
    tank.ai.target = target.map(|t| t.id);

    tank.ai.decision_timer -= dt;
    if tank.ai.decision_timer <= 0.0 {
        tank.ai.decision_timer = rng.random_range(cfg.decision_min..=cfg.decision_max);
        tank.ai.action = match (pickup, target) {
            (Some(_), _) => AiAction::Forward,
            (None, Some(t)) => pick(rng, Zone::of(t.distance, band).table()),
            (None, None) => pick(rng, WANDER),
        };
    }

    let step = tank.rotation_speed * dt;
    match pickup.or(target.map(|t| t.pos)) {
        Some(point) => {
            tank.facing = rotate_towards(tank.facing, bearing(tank.pos, point), step);
        }
        None => match tank.ai.action {
            AiAction::RotateLeft => tank.facing = normalize_angle(tank.facing - step),
            AiAction::RotateRight => tank.facing = normalize_angle(tank.facing + step),
            _ => {}
        },
    }

    let throttle = match tank.ai.action {
        AiAction::Forward => 1.0,
        AiAction::Backward => -1.0,
        _ => 0.0,
    };
    tank.intent = tank.forward() * tank.speed * dt * throttle;

    tank.ai.fire_timer -= dt;
    if tank.ai.fire_timer > 0.0 {
        return;
    }
    // No target: hold fire, shoot as soon as one shows up
    let Some(target) = target else {
        return;
    };
    let aim_error = normalize_angle(bearing(tank.pos, target.pos) - tank.facing);
    if aim_error.abs() >= cfg.aim_tolerance {
        tank.ai.fire_timer = cfg.fire_recheck;
        return;
    }

    let jitter = (rng.random::<f32>() - 0.5) * cfg.aim_jitter;
    let shots = tank.fire(jitter);
    if shots.is_empty() {
        tank.ai.fire_timer = cfg.fire_recheck;
        return;
    }
    tank.ai.fire_timer = tank.weapon.fire_rate * rng.random_range(0.8f32..=1.2);

    let (owner, pos) = (tank.id, tank.pos);
    state.add_bullets(shots);
    state.push_event(GameEvent::ShotFired { owner, pos });
}

/// Update every live AI tank
pub fn update_ai(state: &mut GameState, dt: f32) {
    for i in 0..state.combatants.len() {
        let c = &state.combatants[i];
        if c.is_player() || !c.is_alive() {
            continue;
        }
        think(state, i, dt);
    }
}
