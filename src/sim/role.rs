//! Tank archetypes
//!
//! Each role maps to a static [`RoleProfile`]: base stats, the distance the AI
//! likes to fight at, and how much the kill is worth. Adding a role means
//! adding a row, not another branch in the AI.

use serde::{Deserialize, Serialize};

use crate::consts::{BOSS_SIZE, TANK_SIZE};

/// Tank archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Standard,
    Sniper,
    MachineGunner,
    Shotgunner,
    Dasher,
    Armored,
    Heavy,
    Boss,
}

/// Static per-role data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleProfile {
    /// Distance the AI tries to keep from its target
    pub preferred_range: f32,
    pub speed: f32,
    pub rotation_speed: f32,
    pub max_hp: f32,
    pub size: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    /// Seconds between shots for an AI carrying this role
    pub fire_rate: f32,
    /// Seconds between shots for a player who picked up this weapon
    pub player_fire_rate: f32,
    /// 0 = one bullet, n = 2n + 1 bullets
    pub shot_spread: u32,
    pub score: u64,
    /// Experience dropped in survival
    pub xp_value: u32,
}

const STANDARD: RoleProfile = RoleProfile {
    preferred_range: 250.0,
    speed: 100.0,
    rotation_speed: 4.0,
    max_hp: 10.0,
    size: TANK_SIZE,
    bullet_speed: 200.0,
    bullet_damage: 10.0,
    fire_rate: 3.0,
    player_fire_rate: 0.5,
    shot_spread: 0,
    score: 100,
    xp_value: 1,
};

const SNIPER: RoleProfile = RoleProfile {
    preferred_range: 450.0,
    bullet_speed: 500.0,
    fire_rate: 2.0,
    player_fire_rate: 0.9,
    score: 150,
    ..STANDARD
};

const MACHINE_GUNNER: RoleProfile = RoleProfile {
    bullet_speed: 250.0,
    bullet_damage: 4.0,
    fire_rate: 0.2,
    player_fire_rate: 0.15,
    score: 150,
    ..STANDARD
};

const SHOTGUNNER: RoleProfile = RoleProfile {
    preferred_range: 150.0,
    fire_rate: 1.5,
    player_fire_rate: 0.7,
    shot_spread: 1,
    score: 150,
    ..STANDARD
};

const DASHER: RoleProfile = RoleProfile {
    preferred_range: 0.0,
    speed: 150.0,
    rotation_speed: 6.0,
    bullet_speed: 400.0,
    fire_rate: 0.5,
    player_fire_rate: 0.35,
    score: 150,
    ..STANDARD
};

const ARMORED: RoleProfile = RoleProfile {
    speed: 60.0,
    max_hp: 30.0,
    fire_rate: 1.0,
    score: 250,
    xp_value: 3,
    ..STANDARD
};

const HEAVY: RoleProfile = RoleProfile {
    bullet_damage: 20.0,
    fire_rate: 1.0,
    player_fire_rate: 0.6,
    score: 200,
    xp_value: 2,
    ..STANDARD
};

const BOSS: RoleProfile = RoleProfile {
    preferred_range: 300.0,
    speed: 70.0,
    rotation_speed: 2.5,
    max_hp: 200.0,
    size: BOSS_SIZE,
    bullet_speed: 300.0,
    bullet_damage: 20.0,
    fire_rate: 0.8,
    player_fire_rate: 0.8,
    shot_spread: 2,
    score: 2000,
    xp_value: 10,
};

impl Role {
    /// Every role, in table order
    pub const ALL: [Role; 8] = [
        Role::Standard,
        Role::Sniper,
        Role::MachineGunner,
        Role::Shotgunner,
        Role::Dasher,
        Role::Armored,
        Role::Heavy,
        Role::Boss,
    ];

    /// Static profile for this role
    pub fn profile(self) -> &'static RoleProfile {
        match self {
            Role::Standard => &STANDARD,
            Role::Sniper => &SNIPER,
            Role::MachineGunner => &MACHINE_GUNNER,
            Role::Shotgunner => &SHOTGUNNER,
            Role::Dasher => &DASHER,
            Role::Armored => &ARMORED,
            Role::Heavy => &HEAVY,
            Role::Boss => &BOSS,
        }
    }

    pub fn is_boss(self) -> bool {
        self == Role::Boss
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::Sniper => "sniper",
            Role::MachineGunner => "machine-gunner",
            Role::Shotgunner => "shotgunner",
            Role::Dasher => "dasher",
            Role::Armored => "armored",
            Role::Heavy => "heavy",
            Role::Boss => "boss",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_bands() {
        assert_eq!(Role::Sniper.profile().preferred_range, 450.0);
        assert_eq!(Role::Shotgunner.profile().preferred_range, 150.0);
        assert_eq!(Role::Dasher.profile().preferred_range, 0.0);
        assert_eq!(Role::Heavy.profile().preferred_range, 250.0);
    }

    #[test]
    fn test_only_boss_is_boss_sized() {
        for role in Role::ALL {
            let big = role.profile().size > TANK_SIZE;
            assert_eq!(big, role.is_boss(), "{}", role.as_str());
        }
    }
}
