//! Tank Arena - simulation core for a top-down tank shooter
//!
//! Core modules:
//! - `sim`: Simulation (state machine, movement, ballistics, AI, spawning)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Stage ranking records
//! - `persistence`: Storage seam for the ranking
//! - `audio`: Sound event seam
//!
//! Rendering, input polling and audio synthesis live in the host. The host
//! calls [`sim::advance`] once per frame and reads [`sim::GameState::snapshot`].

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::Vec2;

/// Arena and entity constants
pub mod consts {
    /// Arena dimensions (including the border walls)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    /// Thickness of the border walls
    pub const BORDER_THICKNESS: f32 = 20.0;

    /// Where the player (re)spawns in stage mode
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = 300.0;

    /// Default tank footprint
    pub const TANK_SIZE: f32 = 22.0;
    /// Boss footprint
    pub const BOSS_SIZE: f32 = 44.0;

    /// Bullet defaults
    pub const BULLET_RADIUS: f32 = 3.0;
    pub const BOSS_BULLET_RADIUS: f32 = 6.0;
    /// Seconds before a bullet times out
    pub const BULLET_LIFETIME: f32 = 6.0;
    /// Distance from tank center where bullets appear
    pub const MUZZLE_OFFSET: f32 = 20.0;
    /// Angle between adjacent bullets of a spread shot (radians)
    pub const SPREAD_STEP: f32 = 0.15;

    /// Pickup footprint (square)
    pub const PICKUP_SIZE: f32 = 20.0;
    /// Pickup lifespans (seconds)
    pub const GEM_LIFESPAN: f32 = 30.0;
    pub const WEAPON_DROP_LIFESPAN: f32 = 15.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for a facing angle
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Bearing from `from` to `to`
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Turn `current` toward `target` by at most `max_step` along the shortest path
pub fn rotate_towards(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = normalize_angle(target - current);
    if diff.abs() <= max_step {
        normalize_angle(target)
    } else {
        normalize_angle(current + diff.signum() * max_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        // Both ends of the seam are the same heading
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((normalize_angle(5.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        let wrapped = normalize_angle(7.0);
        assert!((wrapped - (7.0 - 2.0 * PI)).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_towards_takes_short_way() {
        // From just below +π to just above -π is a tiny step across the seam
        let next = rotate_towards(PI - 0.05, -PI + 0.05, 0.02);
        assert!(normalize_angle(next - (PI - 0.05)) > 0.0);
    }

    #[test]
    fn test_rotate_towards_never_overshoots() {
        let next = rotate_towards(0.0, 0.1, 1.0);
        assert!((next - 0.1).abs() < 1e-6);
    }
}
