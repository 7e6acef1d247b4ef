//! Bullet flight: homing, integration and wall reflection

use glam::Vec2;

use super::collision::reflect_velocity;
use super::geometry::{Wall, circle_rect_overlap};
use super::state::{Bullet, Combatant};

/// Gap left between a reflected bullet and the wall surface
const REFLECT_CLEARANCE: f32 = 0.01;

/// Outcome of a single bullet step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    /// Nothing hit
    Clear,
    /// Reflected off a wall
    Bounced,
    /// Ran out of bounces or lifetime
    Spent,
}

/// Nearest homing candidate for `bullet`
fn homing_target(bullet: &Bullet, targets: &[Combatant], friendly_fire: bool) -> Option<Vec2> {
    let mut best: Option<Vec2> = None;
    let mut best_dist = f32::INFINITY;
    for t in targets {
        if t.id == bullet.owner || !t.is_alive() {
            continue;
        }
        if !friendly_fire && t.faction == bullet.faction {
            continue;
        }
        let d = t.pos.distance_squared(bullet.pos);
        if d < best_dist {
            best_dist = d;
            best = Some(t.pos);
        }
    }
    best
}

/// Steer the velocity toward the nearest candidate, keeping speed fixed
pub fn steer(bullet: &mut Bullet, dt: f32, targets: &[Combatant], friendly_fire: bool) {
    if bullet.homing <= 0.0 {
        return;
    }
    let Some(target) = homing_target(bullet, targets, friendly_fire) else {
        return;
    };
    let desired = (target - bullet.pos).normalize_or_zero();
    let current = bullet.vel.normalize_or_zero();
    let dir = (current + desired * bullet.homing * dt).normalize_or_zero();
    if dir != Vec2::ZERO {
        bullet.vel = dir * bullet.speed;
    }
}

/// Reflect off `wall`, or deactivate when the bounce allowance is spent
pub fn reflect_off(bullet: &mut Bullet, wall: &Wall) -> Flight {
    if bullet.bounces >= bullet.max_bounces {
        bullet.active = false;
        return Flight::Spent;
    }
    bullet.bounces += 1;

    let closest = wall.closest_point(bullet.pos);
    let offset = bullet.pos - closest;
    if offset.length_squared() == 0.0 {
        // Center is inside the wall, no usable normal
        bullet.vel = -bullet.vel;
    } else {
        let normal = offset.normalize();
        bullet.vel = reflect_velocity(bullet.vel, normal);
        bullet.pos = closest + normal * (bullet.radius + REFLECT_CLEARANCE);
    }
    Flight::Bounced
}

/// Advance one bullet by `dt`
pub fn advance_bullet(
    bullet: &mut Bullet,
    dt: f32,
    walls: &[Wall],
    targets: &[Combatant],
    friendly_fire: bool,
) -> Flight {
    if !bullet.active {
        return Flight::Spent;
    }

    bullet.ttl -= dt;
    if bullet.ttl <= 0.0 {
        bullet.active = false;
        return Flight::Spent;
    }

    steer(bullet, dt, targets, friendly_fire);
    bullet.pos += bullet.vel * dt;

    // One reflection per step; a corner resolves over the next ticks
    match walls
        .iter()
        .find(|w| circle_rect_overlap(bullet.pos, bullet.radius, w))
    {
        Some(wall) => reflect_off(bullet, wall),
        None => Flight::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Rect;
    use crate::sim::role::Role;
    use crate::sim::state::{CombatantId, Faction};
    use crate::tuning::PlayerTuning;

    fn player_bullet(pos: Vec2, angle: f32, speed: f32) -> Bullet {
        let mut tank = Combatant::player(CombatantId(1), pos, &PlayerTuning::default());
        tank.facing = angle;
        tank.weapon.bullet_speed = speed;
        let mut b = tank.fire(0.0).remove(0);
        b.pos = pos;
        b
    }

    #[test]
    fn test_head_on_wall_reflects_back() {
        let mut b = player_bullet(Vec2::new(100.0, 100.0), 0.0, 200.0);
        let wall = Rect::new(105.0, 50.0, 20.0, 100.0);
        let flight = advance_bullet(&mut b, 1.0 / 60.0, &[wall], &[], false);
        assert_eq!(flight, Flight::Bounced);
        assert!((b.vel.x - (-200.0)).abs() < 1e-3);
        assert!(b.vel.y.abs() < 1e-3);
        assert!(!circle_rect_overlap(b.pos, b.radius, &wall));
        assert!(b.pos.x < wall.x);
        assert_eq!(b.bounces, 1);
    }

    #[test]
    fn test_bounce_after_limit_deactivates() {
        let mut b = player_bullet(Vec2::new(100.0, 100.0), 0.0, 200.0);
        b.max_bounces = 2;
        let wall = Rect::new(101.0, 50.0, 20.0, 100.0);
        assert_eq!(reflect_off(&mut b, &wall), Flight::Bounced);
        assert_eq!(reflect_off(&mut b, &wall), Flight::Bounced);
        assert_eq!(b.bounces, 2);
        assert_eq!(reflect_off(&mut b, &wall), Flight::Spent);
        assert!(!b.active);
        assert_eq!(b.bounces, 2);
    }

    #[test]
    fn test_buried_bullet_inverts_velocity() {
        let mut b = player_bullet(Vec2::new(110.0, 100.0), 0.0, 200.0);
        let wall = Rect::new(100.0, 50.0, 20.0, 100.0);
        reflect_off(&mut b, &wall);
        assert_eq!(b.vel, Vec2::new(-200.0, 0.0));
    }

    #[test]
    fn test_homing_bends_toward_target_keeping_speed() {
        let mut b = player_bullet(Vec2::new(100.0, 100.0), 0.0, 200.0);
        b.homing = 2.0;
        let enemy = Combatant::ai(CombatantId(2), Role::Standard, Vec2::new(200.0, 300.0));
        advance_bullet(&mut b, 0.1, &[], &[enemy], false);
        assert!(b.vel.y > 0.0);
        assert!((b.vel.length() - 200.0).abs() < 1e-2);
    }

    #[test]
    fn test_homing_ignores_owner_and_friends() {
        let mut b = player_bullet(Vec2::new(100.0, 100.0), 0.0, 200.0);
        b.homing = 5.0;
        let mut owner = Combatant::player(CombatantId(1), Vec2::new(100.0, 200.0), &PlayerTuning::default());
        owner.faction = Faction::Player;
        advance_bullet(&mut b, 0.1, &[], &[owner], false);
        assert!(b.vel.y.abs() < 1e-4);
    }

    #[test]
    fn test_bullet_times_out() {
        let mut b = player_bullet(Vec2::new(100.0, 100.0), 0.0, 200.0);
        b.ttl = 0.05;
        assert_eq!(advance_bullet(&mut b, 0.1, &[], &[], false), Flight::Spent);
        assert!(!b.active);
    }
}
