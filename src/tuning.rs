//! Data-driven game balance
//!
//! Every number the simulation treats as a knob lives here. Hosts can ship a
//! JSON file with partial overrides; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised while reading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{name}`: {reason}")]
    Invalid { name: &'static str, reason: &'static str },
}

/// Player base stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: f32,
    pub speed: f32,
    pub rotation_speed: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    /// Invincibility granted at the start of every round (seconds)
    pub spawn_invincibility: f32,
    /// Invincibility granted after taking a hit (seconds)
    pub hit_invincibility: f32,
    /// Experience needed for the first survival level-up
    pub base_xp_threshold: u32,
    /// Extra experience needed per level after the first
    pub xp_threshold_step: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            speed: 120.0,
            rotation_speed: 10.0,
            fire_rate: 0.5,
            bullet_speed: 250.0,
            bullet_damage: 10.0,
            spawn_invincibility: 1.5,
            hit_invincibility: 0.3,
            base_xp_threshold: 5,
            xp_threshold_step: 5,
        }
    }
}

/// AI controller knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Targets farther than this are ignored
    pub search_radius: f32,
    /// Non-experience pickups inside this radius override tactics
    pub pickup_radius: f32,
    /// Maximum aim error (radians) that still allows firing
    pub aim_tolerance: f32,
    /// Full width of the random shot jitter (radians)
    pub aim_jitter: f32,
    /// Decision interval bounds (seconds)
    pub decision_min: f32,
    pub decision_max: f32,
    /// Re-check delay after a misaligned fire check (seconds)
    pub fire_recheck: f32,
    /// First-shot delay bounds for newly spawned AI (seconds)
    pub first_shot_min: f32,
    pub first_shot_max: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            search_radius: 600.0,
            pickup_radius: 200.0,
            aim_tolerance: 0.3,
            aim_jitter: 0.15,
            decision_min: 0.5,
            decision_max: 2.0,
            fire_recheck: 0.1,
            first_shot_min: 1.0,
            first_shot_max: 3.0,
        }
    }
}

/// Spawn director knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Attempts before the safe-spawn search gives up
    pub spawn_attempts: u32,
    /// Clearance kept between spawns and walls
    pub wall_margin: f32,
    /// Minimum distance between a stage spawn and the player
    pub player_clearance: f32,
    /// Stage roster cap (bosses excluded)
    pub max_wave_size: u32,
    /// A boss wave every N stages
    pub boss_every: u32,
    /// Enemies placed in a battle royale
    pub royale_roster: u32,
    /// Minimum spacing between battle royale spawns
    pub royale_spacing: f32,
    /// Expected battle royale gem drops per second
    pub royale_gem_rate: f32,
    /// Enemies placed when a survival run starts
    pub survival_opening: u32,
    /// Survival spawn rate at t=0 (expected spawns per second)
    pub survival_base_rate: f32,
    /// Added spawn rate per elapsed second
    pub survival_rate_growth: f32,
    /// Upper bound on the survival spawn rate
    pub survival_max_rate: f32,
    /// Living enemy cap in survival
    pub survival_population_cap: u32,
    /// Seconds between survival bosses
    pub survival_boss_period: f32,
    /// Survival spawn annulus around the player
    pub annulus_min: f32,
    pub annulus_max: f32,
    /// Chance a stage kill leaves a weapon drop
    pub weapon_drop_chance: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            spawn_attempts: 10,
            wall_margin: 20.0,
            player_clearance: 150.0,
            max_wave_size: 12,
            boss_every: 5,
            royale_roster: 9,
            royale_spacing: 120.0,
            royale_gem_rate: 0.5,
            survival_opening: 3,
            survival_base_rate: 0.4,
            survival_rate_growth: 0.02,
            survival_max_rate: 3.0,
            survival_population_cap: 25,
            survival_boss_period: 60.0,
            annulus_min: 250.0,
            annulus_max: 600.0,
            weapon_drop_chance: 0.25,
        }
    }
}

/// Per-mode difficulty curve coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Stage: hp multiplier gained per stage
    pub stage_hp_step: f32,
    /// Stage: damage multiplier gained per stage
    pub stage_damage_step: f32,
    /// Stage: fire-rate period shrink per stage (fraction)
    pub stage_fire_step: f32,
    /// Survival: multiplier gained per elapsed minute
    pub survival_per_minute: f32,
    /// Battle royale: flat hp multiplier
    pub royale_hp: f32,
    /// Battle royale: flat damage multiplier
    pub royale_damage: f32,
    /// Boss hp multiplier on top of the mode curve
    pub boss_hp_per_tier: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            stage_hp_step: 0.1,
            stage_damage_step: 0.05,
            stage_fire_step: 0.03,
            survival_per_minute: 0.25,
            royale_hp: 3.0,
            royale_damage: 1.0,
            boss_hp_per_tier: 0.5,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Seconds spent in the pre-round countdown
    pub countdown_secs: f32,
    /// Duration of the roulette reveal (seconds)
    pub roulette_secs: f32,
    /// Seconds each roulette option stays highlighted
    pub roulette_step_secs: f32,
    pub player: PlayerTuning,
    pub ai: AiTuning,
    pub spawn: SpawnTuning,
    pub difficulty: DifficultyTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            countdown_secs: 3.0,
            roulette_secs: 1.5,
            roulette_step_secs: 0.1,
            player: PlayerTuning::default(),
            ai: AiTuning::default(),
            spawn: SpawnTuning::default(),
            difficulty: DifficultyTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a tuning override file
    pub fn parse(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse a tuning file, falling back to defaults on any error
    pub fn from_json(json: &str) -> Self {
        match Self::parse(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file: {}", e);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.ai.decision_max < self.ai.decision_min {
            return Err(TuningError::Invalid {
                name: "ai.decision_max",
                reason: "must be >= ai.decision_min",
            });
        }
        if self.spawn.annulus_max < self.spawn.annulus_min {
            return Err(TuningError::Invalid {
                name: "spawn.annulus_max",
                reason: "must be >= spawn.annulus_min",
            });
        }
        if self.spawn.boss_every == 0 {
            return Err(TuningError::Invalid {
                name: "spawn.boss_every",
                reason: "must be at least 1",
            });
        }
        if self.roulette_step_secs <= 0.0 {
            return Err(TuningError::Invalid {
                name: "roulette_step_secs",
                reason: "must be positive",
            });
        }
        if self.player.max_hp <= 0.0 {
            return Err(TuningError::Invalid {
                name: "player.max_hp",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
