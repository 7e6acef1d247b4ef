//! Between-round upgrades and the roulette reveal

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::state::Combatant;

/// Options offered per selection screen
pub const OFFER_SIZE: usize = 3;

/// A stat modifier applied to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    MaxHp,
    Heal,
    Damage,
    FireRate,
    BulletSpeed,
    MoveSpeed,
    Spread,
    Ricochet,
    Homing,
    Drain,
    Penetration,
}

impl Upgrade {
    pub const ALL: [Upgrade; 11] = [
        Upgrade::MaxHp,
        Upgrade::Heal,
        Upgrade::Damage,
        Upgrade::FireRate,
        Upgrade::BulletSpeed,
        Upgrade::MoveSpeed,
        Upgrade::Spread,
        Upgrade::Ricochet,
        Upgrade::Homing,
        Upgrade::Drain,
        Upgrade::Penetration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Upgrade::MaxHp => "Max HP +20",
            Upgrade::Heal => "Full Repair",
            Upgrade::Damage => "Damage +25%",
            Upgrade::FireRate => "Fire Rate +15%",
            Upgrade::BulletSpeed => "Bullet Speed +20%",
            Upgrade::MoveSpeed => "Move Speed +10%",
            Upgrade::Spread => "Spread Shot",
            Upgrade::Ricochet => "Ricochet +1",
            Upgrade::Homing => "Homing",
            Upgrade::Drain => "Drain +10%",
            Upgrade::Penetration => "Penetration +1",
        }
    }

    /// Apply to the player tank
    pub fn apply(self, tank: &mut Combatant) {
        let w = &mut tank.weapon;
        match self {
            Upgrade::MaxHp => {
                tank.max_hp += 20.0;
                tank.hp = (tank.hp + 20.0).min(tank.max_hp);
            }
            Upgrade::Heal => tank.hp = tank.max_hp,
            Upgrade::Damage => w.bullet_damage *= 1.25,
            Upgrade::FireRate => w.fire_rate = (w.fire_rate * 0.85).max(0.05),
            Upgrade::BulletSpeed => w.bullet_speed *= 1.2,
            Upgrade::MoveSpeed => tank.speed *= 1.1,
            Upgrade::Spread => w.shot_spread += 1,
            Upgrade::Ricochet => w.ricochet += 1,
            Upgrade::Homing => w.homing += 1.0,
            Upgrade::Drain => w.drain = (w.drain + 0.1).min(1.0),
            Upgrade::Penetration => w.penetration += 1,
        }
    }
}

/// Draw `OFFER_SIZE` distinct upgrades
pub fn roll_offer<R: Rng + ?Sized>(rng: &mut R) -> Vec<Upgrade> {
    let mut pool = Upgrade::ALL.to_vec();
    pool.shuffle(rng);
    pool.truncate(OFFER_SIZE);
    pool
}

/// Animated random pick: the cursor hops between options until the reveal
/// time runs out, then lands on `chosen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roulette {
    /// Seconds left in the reveal
    pub remaining: f32,
    /// Seconds until the cursor hops again
    pub step_timer: f32,
    /// Highlighted option (for the host to draw)
    pub cursor: usize,
    /// Option the reveal will land on
    pub chosen: usize,
}

impl Roulette {
    pub fn start<R: Rng + ?Sized>(rng: &mut R, options: usize, duration: f32) -> Self {
        Self {
            remaining: duration,
            step_timer: 0.0,
            cursor: 0,
            chosen: rng.random_range(0..options.max(1)),
        }
    }

    /// Advance the reveal. Returns the chosen index once it finishes.
    pub fn advance(&mut self, dt: f32, options: usize, step: f32) -> Option<usize> {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.cursor = self.chosen;
            return Some(self.chosen);
        }
        if step <= 0.0 {
            self.cursor = (self.cursor + 1) % options.max(1);
            return None;
        }
        self.step_timer -= dt;
        while self.step_timer <= 0.0 {
            self.cursor = (self.cursor + 1) % options.max(1);
            self.step_timer += step;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CombatantId;
    use crate::tuning::PlayerTuning;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_offer_is_distinct() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            let offer = roll_offer(&mut rng);
            assert_eq!(offer.len(), OFFER_SIZE);
            for (i, a) in offer.iter().enumerate() {
                assert!(!offer[i + 1..].contains(a));
            }
        }
    }

    #[test]
    fn test_upgrades_keep_hp_within_max() {
        let tuning = PlayerTuning::default();
        for upgrade in Upgrade::ALL {
            let mut tank = Combatant::player(CombatantId(1), Vec2::ZERO, &tuning);
            upgrade.apply(&mut tank);
            assert!(tank.hp <= tank.max_hp, "{}", upgrade.label());
        }
    }

    #[test]
    fn test_roulette_lands_on_chosen_after_reveal() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut roulette = Roulette::start(&mut rng, 3, 1.0);
        let mut result = None;
        for _ in 0..200 {
            result = roulette.advance(0.016, 3, 0.1);
            if result.is_some() {
                break;
            }
        }
        assert_eq!(result, Some(roulette.chosen));
        assert!(roulette.chosen < 3);
    }

    #[test]
    fn test_roulette_with_zero_step_still_finishes() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut roulette = Roulette::start(&mut rng, 3, 0.05);
        assert_eq!(roulette.advance(0.016, 3, 0.0), None);
        assert_eq!(roulette.cursor, 1);
        assert_eq!(roulette.advance(1.0, 3, 0.0), Some(roulette.chosen));
    }
}
