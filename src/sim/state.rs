//! Game state and core simulation types
//!
//! Everything the tick mutates lives here. Entities reference each other by
//! [`CombatantId`], never by pointer, so a bullet can outlive its shooter.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Wall};
use super::role::Role;
use super::upgrade::{Roulette, Upgrade};
use crate::consts::*;
use crate::tuning::{PlayerTuning, Tuning};
use crate::{angle_to_dir, normalize_angle};

/// Game mode selected from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Sequential waves with escalating difficulty
    #[default]
    Stage,
    /// Fixed roster, last tank standing, friendly fire on
    BattleRoyale,
    /// Endless time-scaled spawning with experience levels
    Survival,
}

/// Current phase of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a mode selection
    Menu,
    /// Pre-round delay
    Countdown,
    /// Active gameplay
    Playing,
    /// Stage cleared, choosing an upgrade
    Win,
    /// Survival level-up, choosing an upgrade
    LevelUp,
    /// Player destroyed
    Lose,
    /// Battle royale won
    Victory,
}

/// Which side a tank or bullet is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Ai,
}

/// Stable combatant handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

/// AI movement action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiAction {
    #[default]
    Idle,
    RotateLeft,
    RotateRight,
    Forward,
    Backward,
}

/// Transient AI bookkeeping (unused for the player)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiState {
    /// Seconds until the next action pick
    pub decision_timer: f32,
    pub action: AiAction,
    /// Seconds until the next fire check
    pub fire_timer: f32,
    pub target: Option<CombatantId>,
}

/// Weapon stats carried by a tank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Seconds until the gun can fire again
    pub cooldown: f32,
    /// Seconds between shots
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    /// 0 = single shot, n = 2n + 1 bullets
    pub shot_spread: u32,
    /// Extra wall bounces
    pub ricochet: u32,
    pub homing: f32,
    /// Fraction of dealt damage returned as hp
    pub drain: f32,
    /// Tanks a bullet may pass through
    pub penetration: u32,
}

impl Weapon {
    fn from_profile(role: Role) -> Self {
        let p = role.profile();
        Self {
            cooldown: 0.0,
            fire_rate: p.fire_rate,
            bullet_speed: p.bullet_speed,
            bullet_damage: p.bullet_damage,
            shot_spread: p.shot_spread,
            ricochet: 0,
            homing: 0.0,
            drain: 0.0,
            penetration: 0,
        }
    }
}

/// A tank, either the player's or an AI's
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub faction: Faction,
    pub role: Role,
    pub pos: Vec2,
    /// Facing angle (radians)
    pub facing: f32,
    pub speed: f32,
    pub rotation_speed: f32,
    pub width: f32,
    pub height: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub weapon: Weapon,
    pub ai: AiState,
    /// Seconds of damage immunity left
    pub invincible: f32,
    /// Power gems collected
    pub gem_count: u32,
    /// Displacement requested this tick, applied by the movement resolver
    #[serde(skip)]
    pub intent: Vec2,
}

impl Combatant {
    /// Create the player tank
    pub fn player(id: CombatantId, pos: Vec2, tuning: &PlayerTuning) -> Self {
        Self {
            id,
            faction: Faction::Player,
            role: Role::Standard,
            pos,
            facing: 0.0,
            speed: tuning.speed,
            rotation_speed: tuning.rotation_speed,
            width: TANK_SIZE,
            height: TANK_SIZE,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            weapon: Weapon {
                cooldown: 0.0,
                fire_rate: tuning.fire_rate,
                bullet_speed: tuning.bullet_speed,
                bullet_damage: tuning.bullet_damage,
                shot_spread: 0,
                ricochet: 0,
                homing: 0.0,
                drain: 0.0,
                penetration: 0,
            },
            ai: AiState::default(),
            invincible: tuning.spawn_invincibility,
            gem_count: 0,
            intent: Vec2::ZERO,
        }
    }

    /// Create an AI tank from its role profile (unscaled)
    pub fn ai(id: CombatantId, role: Role, pos: Vec2) -> Self {
        let p = role.profile();
        Self {
            id,
            faction: Faction::Ai,
            role,
            pos,
            // AI starts facing the player's side of the arena
            facing: std::f32::consts::PI,
            speed: p.speed,
            rotation_speed: p.rotation_speed,
            width: p.size,
            height: p.size,
            hp: p.max_hp,
            max_hp: p.max_hp,
            weapon: Weapon::from_profile(role),
            ai: AiState::default(),
            invincible: 0.0,
            gem_count: 0,
            intent: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.faction == Faction::Player
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Axis-aligned footprint
    pub fn footprint(&self) -> Rect {
        Rect::centered(self.pos, self.width, self.height)
    }

    /// Radius of the circle used for tank-vs-tank blocking
    #[inline]
    pub fn collision_radius(&self) -> f32 {
        self.width / 2.0
    }

    /// Unit vector the tank is facing
    pub fn forward(&self) -> Vec2 {
        angle_to_dir(self.facing)
    }

    /// Count down timers
    pub fn tick_timers(&mut self, dt: f32) {
        self.invincible = (self.invincible - dt).max(0.0);
        self.weapon.cooldown = (self.weapon.cooldown - dt).max(0.0);
    }

    /// Apply damage, returns the amount actually taken
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.invincible > 0.0 || amount <= 0.0 {
            return 0.0;
        }
        self.hp -= amount;
        amount
    }

    /// Heal without exceeding max hp
    pub fn heal(&mut self, amount: f32) {
        if amount > 0.0 && self.is_alive() {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }

    /// Battle royale gem: permanent stat boost
    pub fn collect_gem(&mut self, value: u32) {
        let v = value as f32;
        self.gem_count += value;
        self.max_hp += 10.0 * v;
        self.hp = (self.hp + 20.0 * v).min(self.max_hp);
        self.weapon.bullet_damage += 2.0 * v;
        self.speed *= 1.0 + 0.01 * v;
    }

    /// Adopt the weapon profile of a role (weapon drop pickup)
    pub fn equip_role_weapon(&mut self, role: Role) {
        let p = role.profile();
        self.role = role;
        self.weapon.fire_rate = p.player_fire_rate;
        self.weapon.bullet_speed = p.bullet_speed;
        self.weapon.shot_spread = self.weapon.shot_spread.max(p.shot_spread);
    }

    /// Fire the weapon along `facing + offset`.
    ///
    /// Returns the bullets to add (ids unassigned), or nothing while the gun
    /// is cooling down.
    pub fn fire(&mut self, offset: f32) -> Vec<Bullet> {
        if self.weapon.cooldown > 0.0 {
            return Vec::new();
        }
        let count = self.weapon.shot_spread as i32;
        let mut shots = Vec::with_capacity((2 * count + 1) as usize);
        for i in -count..=count {
            let angle = normalize_angle(self.facing + offset + i as f32 * SPREAD_STEP);
            let dir = angle_to_dir(angle);
            shots.push(Bullet::new(self, self.pos + dir * MUZZLE_OFFSET, dir));
        }
        self.weapon.cooldown = self.weapon.fire_rate;
        shots
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed speed (homing only steers)
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    pub bounces: u32,
    pub max_bounces: u32,
    pub homing: f32,
    /// Tanks left to pass through
    pub penetration: u32,
    /// Boss bullets win bullet-vs-bullet clashes
    pub boss_tier: bool,
    pub owner: CombatantId,
    pub faction: Faction,
    /// Seconds left before the bullet fizzles
    pub ttl: f32,
    pub active: bool,
    /// Last tank hit, so a penetrating bullet doesn't hit it again next tick
    pub last_hit: Option<CombatantId>,
}

impl Bullet {
    fn new(owner: &Combatant, pos: Vec2, dir: Vec2) -> Self {
        let boss_tier = owner.role.is_boss() && !owner.is_player();
        Self {
            id: 0,
            pos,
            vel: dir * owner.weapon.bullet_speed,
            speed: owner.weapon.bullet_speed,
            radius: if boss_tier { BOSS_BULLET_RADIUS } else { BULLET_RADIUS },
            damage: owner.weapon.bullet_damage,
            bounces: 0,
            max_bounces: 1 + owner.weapon.ricochet,
            homing: owner.weapon.homing,
            penetration: owner.weapon.penetration,
            boss_tier,
            owner: owner.id,
            faction: owner.faction,
            ttl: BULLET_LIFETIME,
            active: true,
            last_hit: None,
        }
    }
}

/// Pickup payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Battle royale stat boost
    PowerGem { value: u32 },
    /// Survival experience
    XpGem { value: u32 },
    /// Swaps the player's weapon profile
    WeaponDrop { role: Role },
}

/// A collectible lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    /// Seconds until it disappears
    pub ttl: f32,
    pub active: bool,
}

impl Pickup {
    pub fn new(id: u32, kind: PickupKind, pos: Vec2) -> Self {
        let ttl = match kind {
            PickupKind::WeaponDrop { .. } => WEAPON_DROP_LIFESPAN,
            _ => GEM_LIFESPAN,
        };
        Self {
            id,
            kind,
            pos,
            ttl,
            active: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.ttl -= dt;
        if self.ttl <= 0.0 {
            self.active = false;
        }
    }

    pub fn footprint(&self) -> Rect {
        Rect::centered(self.pos, PICKUP_SIZE, PICKUP_SIZE)
    }

    /// Whether an AI tank can pick this up (only power gems)
    pub fn is_ai_collectible(&self) -> bool {
        matches!(self.kind, PickupKind::PowerGem { .. })
    }
}

/// Discrete things that happened during a tick, for the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    ShotFired { owner: CombatantId, pos: Vec2 },
    Explosion { pos: Vec2, big: bool },
    Damaged { target: CombatantId, amount: f32 },
    Killed { victim: CombatantId, role: Role, killer: Option<CombatantId> },
    PickupSpawned { kind: PickupKind, pos: Vec2 },
    PickupCollected { by: CombatantId, kind: PickupKind },
    WaveStarted { stage: u32 },
    BossSpawned { pos: Vec2 },
    LevelUp { level: u32 },
    UpgradeApplied { upgrade: Upgrade },
    /// Stage run over; the host records `stage_reached` in the ranking
    RunEnded { mode: GameMode, stage_reached: u32 },
}

/// Survival experience track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
}

impl Progress {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next: tuning.base_xp_threshold,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Countdown seconds remaining
    pub countdown: f32,
    /// Current stage (0-based)
    pub stage_index: u32,
    /// Seconds of active play in the current run
    pub elapsed: f32,
    /// Seconds until the next survival boss
    pub boss_timer: f32,
    pub score: u64,
    pub progress: Progress,
    pub player_id: CombatantId,
    pub combatants: Vec<Combatant>,
    pub bullets: Vec<Bullet>,
    pub pickups: Vec<Pickup>,
    pub walls: Vec<Wall>,
    /// Upgrades on offer in `Win` / `LevelUp`
    pub offer: Vec<Upgrade>,
    pub roulette: Option<Roulette>,
    /// Events raised by the last tick
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Create a new game sitting in the menu
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a game with custom tuning. An invalid set is replaced by the
    /// defaults.
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Rejecting tuning: {}, using defaults", e);
                Tuning::default()
            }
        };
        let progress = Progress::new(&tuning.player);
        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode: GameMode::Stage,
            phase: GamePhase::Menu,
            countdown: 0.0,
            stage_index: 0,
            elapsed: 0.0,
            boss_timer: 0.0,
            score: 0,
            progress,
            player_id: CombatantId(0),
            combatants: Vec::new(),
            bullets: Vec::new(),
            pickups: Vec::new(),
            walls: Vec::new(),
            offer: Vec::new(),
            roulette: None,
            events: Vec::new(),
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Index of a combatant by id
    pub fn index_of(&self, id: CombatantId) -> Option<usize> {
        self.combatants.iter().position(|c| c.id == id)
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// The player tank, if it is still in the arena
    pub fn player(&self) -> Option<&Combatant> {
        self.combatant(self.player_id)
    }

    pub fn player_mut(&mut self) -> Option<&mut Combatant> {
        let id = self.player_id;
        self.combatant_mut(id)
    }

    pub fn player_alive(&self) -> bool {
        self.player().is_some_and(|p| p.is_alive())
    }

    /// Living tanks the player must destroy
    pub fn hostiles_alive(&self) -> usize {
        self.combatants
            .iter()
            .filter(|c| !c.is_player() && c.is_alive())
            .count()
    }

    /// Whether `a`'s bullets may hurt `b` in the current mode
    pub fn can_damage(&self, attacker: Faction, victim: &Combatant) -> bool {
        match self.mode {
            GameMode::BattleRoyale => true,
            _ => attacker != victim.faction,
        }
    }

    /// Add freshly fired bullets, assigning ids
    pub fn add_bullets(&mut self, shots: Vec<Bullet>) {
        for mut bullet in shots {
            bullet.id = self.next_entity_id();
            self.bullets.push(bullet);
        }
    }

    /// Drop a pickup into the arena
    pub fn spawn_pickup(&mut self, kind: PickupKind, pos: Vec2) {
        let id = self.next_entity_id();
        self.pickups.push(Pickup::new(id, kind, pos));
        self.push_event(GameEvent::PickupSpawned { kind, pos });
    }

    /// Remove dead tanks, spent bullets and expired pickups (once per tick)
    pub fn compact(&mut self) {
        self.combatants.retain(|c| c.is_alive());
        self.bullets.retain(|b| b.active);
        self.pickups.retain(|p| p.active);
    }

    /// Drop every transient entity and timer
    pub fn clear_transient(&mut self) {
        self.combatants.clear();
        self.bullets.clear();
        self.pickups.clear();
        self.walls.clear();
        self.offer.clear();
        self.roulette = None;
        self.countdown = 0.0;
        self.elapsed = 0.0;
        self.boss_timer = 0.0;
    }
}
