//! Per-frame state machine
//!
//! Core game loop: gates everything on the current phase and, while playing,
//! runs the fixed pipeline AI → movement → bullets → judge → spawns →
//! terminal checks.

use glam::Vec2;

use super::ai::update_ai;
use super::arena::{self, Layout};
use super::ballistics::advance_bullet;
use super::collision;
use super::movement::apply_intents;
use super::spawn;
use super::state::{Combatant, CombatantId, GameEvent, GameMode, GamePhase, GameState, Progress};
use super::upgrade::{Roulette, roll_offer};
use crate::consts::*;
use crate::{bearing, rotate_towards};

/// How the player wants to aim this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Aim {
    /// Face the movement direction
    #[default]
    None,
    /// Snap to face a world point (mouse)
    Point(Vec2),
    /// Turn toward a direction at the tank's rotation rate (stick)
    Direction(Vec2),
}

/// Upgrade choice on the Win / LevelUp screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Pick the option at this index
    Index(usize),
    /// Let the roulette pick
    Roulette,
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction, length clamped to 1
    pub movement: Vec2,
    pub aim: Aim,
    pub fire: bool,
    /// Acknowledge the Lose / Victory screen
    pub confirm: bool,
    /// Return to the menu from anywhere
    pub menu: bool,
    /// Mode picked on the menu
    pub select_mode: Option<GameMode>,
    pub selection: Option<Selection>,
}

/// A phase change reported by [`advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: GamePhase,
    pub to: GamePhase,
}

/// Stick deflection below this is treated as centered
const STICK_DEADZONE: f32 = 0.1;

fn transition(state: &mut GameState, to: GamePhase) -> PhaseTransition {
    let from = state.phase;
    state.phase = to;
    state.push_event(GameEvent::PhaseChanged { from, to });
    log::info!("Phase {:?} -> {:?} ({:?})", from, to, state.mode);
    PhaseTransition { from, to }
}

/// Advance the game by `dt` seconds
pub fn advance(state: &mut GameState, input: &TickInput, dt: f32) -> Option<PhaseTransition> {
    state.events.clear();
    state.time_ticks += 1;

    if input.menu && state.phase != GamePhase::Menu {
        return Some(return_to_menu(state));
    }

    match state.phase {
        GamePhase::Menu => {
            let mode = input.select_mode?;
            start_mode(state, mode);
            Some(transition(state, GamePhase::Countdown))
        }
        GamePhase::Countdown => {
            state.countdown -= dt;
            (state.countdown <= 0.0).then(|| {
                state.countdown = 0.0;
                transition(state, GamePhase::Playing)
            })
        }
        GamePhase::Playing => play(state, input, dt),
        GamePhase::Win | GamePhase::LevelUp => choose_upgrade(state, input, dt),
        GamePhase::Lose | GamePhase::Victory => {
            input.confirm.then(|| return_to_menu(state))
        }
    }
}

/// Drop the run and go back to the menu
fn return_to_menu(state: &mut GameState) -> PhaseTransition {
    state.clear_transient();
    state.stage_index = 0;
    state.progress = Progress::new(&state.tuning.player);
    transition(state, GamePhase::Menu)
}

/// Reset the world for `mode` and populate it
pub fn start_mode(state: &mut GameState, mode: GameMode) {
    state.clear_transient();
    state.mode = mode;
    state.stage_index = 0;
    state.score = 0;
    state.progress = Progress::new(&state.tuning.player);

    let id = CombatantId(state.next_entity_id());
    state.player_id = id;
    let spawn_at = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
    state
        .combatants
        .push(Combatant::player(id, spawn_at, &state.tuning.player));

    let layout = match mode {
        GameMode::Stage => Layout::for_stage(0),
        GameMode::BattleRoyale => Layout::Open,
        GameMode::Survival => Layout::Pillars,
    };
    state.walls = arena::build(layout, &mut state.rng);

    match mode {
        GameMode::Stage => spawn::populate_stage(state),
        GameMode::BattleRoyale => spawn::populate_royale(state),
        GameMode::Survival => spawn::populate_survival(state),
    }
    state.countdown = state.tuning.countdown_secs;
}

/// Clear the arena and set up the next stage, keeping the player's upgrades
fn next_stage(state: &mut GameState) {
    state.stage_index += 1;
    state.bullets.clear();
    state.pickups.clear();
    state.combatants.retain(|c| c.is_player());
    state.walls = arena::build(Layout::for_stage(state.stage_index), &mut state.rng);

    let invincibility = state.tuning.player.spawn_invincibility;
    if let Some(player) = state.player_mut() {
        player.pos = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
        player.facing = 0.0;
        player.invincible = invincibility;
        player.weapon.cooldown = 0.0;
    }
    spawn::populate_stage(state);
}

/// Player steering, aiming and shooting
fn control_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let Some(player) = state.player_mut() else {
        return;
    };
    if !player.is_alive() {
        return;
    }

    let movement = input.movement.clamp_length_max(1.0);
    player.intent = movement * player.speed * dt;

    let step = player.rotation_speed * dt;
    match input.aim {
        Aim::Point(p) => {
            if p != player.pos {
                player.facing = bearing(player.pos, p);
            }
        }
        Aim::Direction(d) if d.length() > STICK_DEADZONE => {
            player.facing = rotate_towards(player.facing, d.y.atan2(d.x), step);
        }
        _ if movement != Vec2::ZERO => {
            player.facing = rotate_towards(player.facing, movement.y.atan2(movement.x), step);
        }
        _ => {}
    }

    if !input.fire {
        return;
    }
    let shots = player.fire(0.0);
    if shots.is_empty() {
        return;
    }
    let (owner, pos) = (player.id, player.pos);
    state.add_bullets(shots);
    state.push_event(GameEvent::ShotFired { owner, pos });
}

/// One tick of active play
fn play(state: &mut GameState, input: &TickInput, dt: f32) -> Option<PhaseTransition> {
    state.elapsed += dt;
    for c in &mut state.combatants {
        c.tick_timers(dt);
    }

    control_player(state, input, dt);
    update_ai(state, dt);
    apply_intents(&mut state.combatants, &state.walls);

    let friendly_fire = state.mode == GameMode::BattleRoyale;
    for bullet in &mut state.bullets {
        advance_bullet(bullet, dt, &state.walls, &state.combatants, friendly_fire);
    }

    collision::resolve(state);
    for pickup in &mut state.pickups {
        pickup.update(dt);
    }
    spawn::try_spawn(state, dt);
    state.compact();

    check_terminal(state)
}

/// End-of-tick win / lose / level-up evaluation
fn check_terminal(state: &mut GameState) -> Option<PhaseTransition> {
    if !state.player_alive() {
        if state.mode == GameMode::Stage {
            let stage_reached = state.stage_index + 1;
            state.push_event(GameEvent::RunEnded {
                mode: state.mode,
                stage_reached,
            });
        }
        return Some(transition(state, GamePhase::Lose));
    }

    match state.mode {
        GameMode::Stage if state.hostiles_alive() == 0 => {
            state.offer = roll_offer(&mut state.rng);
            Some(transition(state, GamePhase::Win))
        }
        GameMode::BattleRoyale if state.hostiles_alive() == 0 => {
            Some(transition(state, GamePhase::Victory))
        }
        GameMode::Survival if state.progress.xp >= state.progress.xp_to_next => {
            let progress = &mut state.progress;
            progress.xp -= progress.xp_to_next;
            progress.level += 1;
            progress.xp_to_next += state.tuning.player.xp_threshold_step;
            let level = progress.level;
            state.push_event(GameEvent::LevelUp { level });
            state.offer = roll_offer(&mut state.rng);
            Some(transition(state, GamePhase::LevelUp))
        }
        _ => None,
    }
}

/// Win / LevelUp screen: direct pick or roulette reveal
fn choose_upgrade(state: &mut GameState, input: &TickInput, dt: f32) -> Option<PhaseTransition> {
    let options = state.offer.len();
    let step = state.tuning.roulette_step_secs;

    if let Some(roulette) = state.roulette.as_mut() {
        let chosen = roulette.advance(dt, options, step)?;
        return Some(apply_choice(state, chosen));
    }

    match input.selection? {
        Selection::Index(i) if i < options => Some(apply_choice(state, i)),
        Selection::Roulette if options > 0 => {
            let duration = state.tuning.roulette_secs;
            state.roulette = Some(Roulette::start(&mut state.rng, options, duration));
            None
        }
        _ => None,
    }
}

fn apply_choice(state: &mut GameState, index: usize) -> PhaseTransition {
    let upgrade = state.offer[index];
    if let Some(player) = state.player_mut() {
        upgrade.apply(player);
    }
    state.push_event(GameEvent::UpgradeApplied { upgrade });
    log::info!("Upgrade applied: {}", upgrade.label());
    state.offer.clear();
    state.roulette = None;

    if state.phase == GamePhase::Win {
        next_stage(state);
    }
    transition(state, GamePhase::Playing)
}
