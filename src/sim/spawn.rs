//! Spawn and wave director
//!
//! Populates the arena when a round starts and keeps injecting tanks, bosses
//! and gems while it runs.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::geometry::{Rect, circles_overlap};
use super::role::Role;
use super::state::{Combatant, CombatantId, GameEvent, GameMode, GameState, PickupKind};
use crate::consts::*;
use crate::tuning::DifficultyTuning;
use crate::{angle_to_dir, bearing};

/// Stage roles by (minimum stage level, roll threshold), checked in order
const STAGE_ROLES: [(u32, f32, Role); 6] = [
    (5, 0.15, Role::Armored),
    (4, 0.30, Role::Shotgunner),
    (3, 0.45, Role::MachineGunner),
    (2, 0.60, Role::Sniper),
    (2, 0.75, Role::Heavy),
    (2, 0.90, Role::Dasher),
];

/// Stage spawns land in the right half of the arena, away from the player
const STAGE_REGION: Rect = Rect::new(400.0, 100.0, 300.0, 400.0);

/// Seconds of survival that count as one stage level for role rolls
const SURVIVAL_SECS_PER_LEVEL: f32 = 30.0;

/// Multipliers applied on top of a role profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub hp: f32,
    pub damage: f32,
    /// Scales the fire period (below 1 fires faster)
    pub fire_rate: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            hp: 1.0,
            damage: 1.0,
            fire_rate: 1.0,
        }
    }
}

impl Difficulty {
    /// Stage mode: grows with the stage index
    pub fn for_stage(stage: u32, t: &DifficultyTuning) -> Self {
        let s = stage as f32;
        Self {
            hp: 1.0 + s * t.stage_hp_step,
            damage: 1.0 + s * t.stage_damage_step,
            fire_rate: (1.0 - s * t.stage_fire_step).max(0.4),
        }
    }

    /// Survival: grows with elapsed time
    pub fn for_survival(elapsed: f32, t: &DifficultyTuning) -> Self {
        let m = 1.0 + (elapsed / 60.0) * t.survival_per_minute;
        Self {
            hp: m,
            damage: m,
            fire_rate: (1.0 / m).max(0.5),
        }
    }

    /// Battle royale: flat
    pub fn for_royale(t: &DifficultyTuning) -> Self {
        Self {
            hp: t.royale_hp,
            damage: t.royale_damage,
            fire_rate: 1.0,
        }
    }

    /// Extra bulk for a boss of the given tier (1 = first boss)
    pub fn boss(self, tier: u32, t: &DifficultyTuning) -> Self {
        Self {
            hp: self.hp * (1.0 + tier.saturating_sub(1) as f32 * t.boss_hp_per_tier),
            ..self
        }
    }

    pub fn apply(&self, tank: &mut Combatant) {
        tank.max_hp *= self.hp;
        tank.hp = tank.max_hp;
        tank.weapon.bullet_damage *= self.damage;
        tank.weapon.fire_rate *= self.fire_rate;
    }
}

/// Role for one stage spawn
pub fn roll_stage_role<R: Rng + ?Sized>(rng: &mut R, level: u32) -> Role {
    let roll = rng.random::<f32>();
    STAGE_ROLES
        .iter()
        .find(|&&(min_level, threshold, _)| level >= min_level && roll < threshold)
        .map(|&(_, _, role)| role)
        .unwrap_or(Role::Standard)
}

#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0)
}

/// Playable area inside the border, shrunk by `inset`
fn interior(inset: f32) -> Rect {
    let edge = BORDER_THICKNESS + inset;
    Rect::new(edge, edge, ARENA_WIDTH - 2.0 * edge, ARENA_HEIGHT - 2.0 * edge)
}

fn point_in<R: Rng + ?Sized>(rng: &mut R, region: &Rect) -> Vec2 {
    Vec2::new(
        region.x + rng.random::<f32>() * region.w,
        region.y + rng.random::<f32>() * region.h,
    )
}

/// Can something of `size` stand at `pos`?
///
/// Rejects points outside the border, wall overlap (with the configured
/// margin), live tanks, and anything within `spacing` of `keep_away`.
pub fn is_clear(state: &GameState, pos: Vec2, size: f32, keep_away: &[Vec2], spacing: f32) -> bool {
    if !interior(size / 2.0).contains(pos) {
        return false;
    }
    let footprint = Rect::centered(pos, size, size).inflate(state.tuning.spawn.wall_margin);
    if state.walls.iter().any(|w| footprint.overlaps(w)) {
        return false;
    }
    if state
        .combatants
        .iter()
        .any(|c| c.is_alive() && circles_overlap(pos, size / 2.0, c.pos, c.collision_radius()))
    {
        return false;
    }
    keep_away.iter().all(|p| p.distance(pos) >= spacing)
}

/// Fixed fallback points, clear of the obstacles of every fixed layout even
/// for a boss footprint plus the wall margin
const FALLBACK_SPOTS: [Vec2; 9] = [
    Vec2::new(700.0, 300.0),
    Vec2::new(700.0, 100.0),
    Vec2::new(700.0, 500.0),
    Vec2::new(550.0, 100.0),
    Vec2::new(550.0, 500.0),
    Vec2::new(250.0, 100.0),
    Vec2::new(250.0, 500.0),
    Vec2::new(100.0, 100.0),
    Vec2::new(100.0, 500.0),
];

/// Bounded random search for a clear spot.
///
/// When the search runs dry the fixed fallback points are tried, nearest to
/// the first sample first: with the full spacing rules, then ignoring
/// `keep_away`. If every one is taken the first fallback point is used.
pub fn find_spot<F>(
    state: &mut GameState,
    size: f32,
    keep_away: &[Vec2],
    spacing: f32,
    mut sample: F,
) -> Vec2
where
    F: FnMut(&mut Pcg32) -> Vec2,
{
    let mut preferred = None;
    for _ in 0..state.tuning.spawn.spawn_attempts {
        let pos = sample(&mut state.rng);
        if is_clear(state, pos, size, keep_away, spacing) {
            return pos;
        }
        if preferred.is_none() {
            preferred = Some(pos);
        }
    }

    let mut spots = FALLBACK_SPOTS;
    if let Some(p) = preferred {
        spots.sort_by(|a, b| a.distance_squared(p).total_cmp(&b.distance_squared(p)));
    }
    let fallback = spots
        .iter()
        .copied()
        .find(|&s| is_clear(state, s, size, keep_away, spacing))
        .or_else(|| spots.iter().copied().find(|&s| is_clear(state, s, size, &[], 0.0)));
    match fallback {
        Some(pos) => {
            log::debug!(
                "No clear spawn after {} attempts, using fallback {}",
                state.tuning.spawn.spawn_attempts,
                pos
            );
            pos
        }
        None => {
            log::warn!("Every fallback spawn is occupied, stacking at {}", FALLBACK_SPOTS[0]);
            FALLBACK_SPOTS[0]
        }
    }
}

/// Put an AI tank into the arena, scaled by `difficulty`
pub fn spawn_ai(state: &mut GameState, role: Role, pos: Vec2, difficulty: Difficulty) -> CombatantId {
    let id = CombatantId(state.next_entity_id());
    let mut tank = Combatant::ai(id, role, pos);
    difficulty.apply(&mut tank);
    let ai = &state.tuning.ai;
    tank.ai.fire_timer = state.rng.random_range(ai.first_shot_min..=ai.first_shot_max);
    if state.mode != GameMode::Stage {
        tank.facing = bearing(pos, arena_center());
    }
    if role.is_boss() {
        state.push_event(GameEvent::BossSpawned { pos });
        log::info!("Boss spawned at {}", pos);
    }
    state.combatants.push(tank);
    id
}

fn player_pos(state: &GameState) -> Vec2 {
    state
        .player()
        .map(|p| p.pos)
        .unwrap_or(Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y))
}

/// Stage roster: `1 + stage_index` tanks, or a boss and escort every Nth stage
pub fn populate_stage(state: &mut GameState) {
    let stage = state.stage_index;
    let level = stage + 1;
    let cfg = state.tuning.spawn.clone();
    let difficulty = Difficulty::for_stage(stage, &state.tuning.difficulty);
    let avoid = [player_pos(state)];

    let count = (1 + stage).min(cfg.max_wave_size);
    let boss_every = cfg.boss_every.max(1);
    let boss_wave = level % boss_every == 0;
    let escorts = if boss_wave { count / 3 } else { count };

    if boss_wave {
        let tier = level / boss_every;
        let pos = find_spot(state, BOSS_SIZE, &avoid, cfg.player_clearance, |rng| {
            point_in(rng, &STAGE_REGION)
        });
        let boss = difficulty.boss(tier, &state.tuning.difficulty);
        spawn_ai(state, Role::Boss, pos, boss);
    }
    for _ in 0..escorts {
        let role = roll_stage_role(&mut state.rng, level);
        let pos = find_spot(state, role.profile().size, &avoid, cfg.player_clearance, |rng| {
            point_in(rng, &STAGE_REGION)
        });
        spawn_ai(state, role, pos, difficulty);
    }

    state.push_event(GameEvent::WaveStarted { stage });
    log::info!("Stage {} started with {} hostiles", level, state.hostiles_alive());
}

/// Battle royale roster, spread out so nobody starts on top of anyone
pub fn populate_royale(state: &mut GameState) {
    let cfg = state.tuning.spawn.clone();
    let difficulty = Difficulty::for_royale(&state.tuning.difficulty);
    let region = interior(cfg.wall_margin + TANK_SIZE);
    let mut taken = vec![player_pos(state)];

    for _ in 0..cfg.royale_roster {
        let role = Role::ALL[state.rng.random_range(0..Role::ALL.len())];
        let role = if role.is_boss() { Role::Standard } else { role };
        let pos = find_spot(state, role.profile().size, &taken, cfg.royale_spacing, |rng| {
            point_in(rng, &region)
        });
        spawn_ai(state, role, pos, difficulty);
        taken.push(pos);
    }
    log::info!("Battle royale started with {} rivals", cfg.royale_roster);
}

/// Sample a point in the spawn annulus around `around`
fn annulus_point(rng: &mut Pcg32, around: Vec2, min: f32, max: f32) -> Vec2 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let radius = min + rng.random::<f32>() * (max - min);
    around + angle_to_dir(angle) * radius
}

/// Spawn one survival tank in the annulus around the player
fn spawn_survival(state: &mut GameState, role: Role) {
    let cfg = state.tuning.spawn.clone();
    let around = player_pos(state);
    let size = role.profile().size;
    let pos = find_spot(state, size, &[around], cfg.annulus_min, |rng| {
        annulus_point(rng, around, cfg.annulus_min, cfg.annulus_max)
    });

    let mut difficulty = Difficulty::for_survival(state.elapsed, &state.tuning.difficulty);
    if role.is_boss() {
        let tier = 1 + (state.elapsed / cfg.survival_boss_period) as u32;
        difficulty = difficulty.boss(tier, &state.tuning.difficulty);
    }
    spawn_ai(state, role, pos, difficulty);
}

fn survival_role(state: &mut GameState) -> Role {
    let level = 1 + (state.elapsed / SURVIVAL_SECS_PER_LEVEL) as u32;
    roll_stage_role(&mut state.rng, level)
}

/// Opening survival wave
pub fn populate_survival(state: &mut GameState) {
    state.boss_timer = state.tuning.spawn.survival_boss_period;
    for _ in 0..state.tuning.spawn.survival_opening {
        let role = survival_role(state);
        spawn_survival(state, role);
    }
    log::info!("Survival started");
}

/// Per-tick injections for the running mode
pub fn try_spawn(state: &mut GameState, dt: f32) {
    match state.mode {
        GameMode::Stage => {}
        GameMode::BattleRoyale => {
            let rate = state.tuning.spawn.royale_gem_rate;
            if state.rng.random::<f32>() < rate * dt {
                let region = interior(state.tuning.spawn.wall_margin);
                let pos = find_spot(state, PICKUP_SIZE, &[], 0.0, |rng| point_in(rng, &region));
                state.spawn_pickup(PickupKind::PowerGem { value: 1 }, pos);
            }
        }
        GameMode::Survival => {
            let cfg = state.tuning.spawn.clone();
            state.boss_timer -= dt;
            if state.boss_timer <= 0.0 {
                state.boss_timer = cfg.survival_boss_period;
                spawn_survival(state, Role::Boss);
            }

            if state.hostiles_alive() >= cfg.survival_population_cap as usize {
                return;
            }
            let rate = (cfg.survival_base_rate + cfg.survival_rate_growth * state.elapsed)
                .min(cfg.survival_max_rate);
            if state.rng.random::<f32>() < rate * dt {
                let role = survival_role(state);
                spawn_survival(state, role);
            }
        }
    }
}
