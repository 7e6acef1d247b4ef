//! Collision judgment: bullets vs tanks, bullets vs bullets, pickups
//!
//! Nothing is removed here. Hits flag bullets inactive and drop hp to zero;
//! [`GameState::compact`] sweeps them once all checks for the tick are done.

use glam::Vec2;
use rand::Rng;

use super::geometry::circles_overlap;
use super::role::Role;
use super::state::{
    Bullet, Combatant, CombatantId, Faction, GameEvent, GameMode, GameState, PickupKind,
};

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Damage dealt to a tank
#[derive(Debug, Clone, PartialEq)]
pub struct DamageEvent {
    pub target: CombatantId,
    pub source: CombatantId,
    pub amount: f32,
}

/// A tank destroyed this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Death {
    pub victim: CombatantId,
    pub faction: Faction,
    pub role: Role,
    pub pos: Vec2,
    pub gem_count: u32,
    pub killer: Option<CombatantId>,
}

/// Everything the judge decided this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JudgeReport {
    pub damage_events: Vec<DamageEvent>,
    pub deaths: Vec<Death>,
    pub pickup_spawns: Vec<(PickupKind, Vec2)>,
}

/// Bullet center inside the tank's footprint
#[inline]
pub fn bullet_hits_tank(bullet: &Bullet, tank: &Combatant) -> bool {
    tank.footprint().contains(bullet.pos)
}

/// Index of the first tank `bullet` connects with
fn find_victim(state: &GameState, bullet: &Bullet) -> Option<usize> {
    state.combatants.iter().position(|c| {
        c.is_alive()
            && c.id != bullet.owner
            && Some(c.id) != bullet.last_hit
            && state.can_damage(bullet.faction, c)
            && bullet_hits_tank(bullet, c)
    })
}

/// Resolve bullet-vs-tank hits: damage, drain, deaths
pub fn resolve_bullet_hits(state: &mut GameState, report: &mut JudgeReport) {
    let hit_invincibility = state.tuning.player.hit_invincibility;

    for bi in 0..state.bullets.len() {
        if !state.bullets[bi].active {
            continue;
        }
        let Some(ci) = find_victim(state, &state.bullets[bi]) else {
            continue;
        };

        let bullet = &mut state.bullets[bi];
        let victim_id = state.combatants[ci].id;
        if bullet.penetration > 0 {
            bullet.penetration -= 1;
            bullet.last_hit = Some(victim_id);
        } else {
            bullet.active = false;
        }
        let (damage, shooter) = (bullet.damage, bullet.owner);
        let bullet_pos = bullet.pos;

        let victim = &mut state.combatants[ci];
        let taken = victim.take_damage(damage);
        if taken <= 0.0 {
            continue;
        }
        if victim.is_player() && victim.is_alive() {
            victim.invincible = hit_invincibility;
        }
        let died = !victim.is_alive();
        report.damage_events.push(DamageEvent {
            target: victim_id,
            source: shooter,
            amount: taken,
        });
        state.push_event(GameEvent::Damaged {
            target: victim_id,
            amount: taken,
        });

        // Drain credit only if the shooter is still around
        if let Some(owner) = state.combatant_mut(shooter) {
            if owner.weapon.drain > 0.0 {
                owner.heal(taken * owner.weapon.drain);
            }
        }

        if died {
            let victim = &state.combatants[ci];
            report.deaths.push(Death {
                victim: victim.id,
                faction: victim.faction,
                role: victim.role,
                pos: victim.pos,
                gem_count: victim.gem_count,
                killer: Some(shooter),
            });
        } else {
            state.push_event(GameEvent::Explosion {
                pos: bullet_pos,
                big: false,
            });
        }
    }
}

/// Opposite-side bullets that touch cancel out; boss bullets survive
/// clashes with ordinary ones.
pub fn resolve_bullet_clashes(bullets: &mut [Bullet]) {
    for i in 0..bullets.len() {
        for j in (i + 1)..bullets.len() {
            let (a, b) = (&bullets[i], &bullets[j]);
            if !a.active || !b.active || a.faction == b.faction {
                continue;
            }
            if !circles_overlap(a.pos, a.radius, b.pos, b.radius) {
                continue;
            }
            match (a.boss_tier, b.boss_tier) {
                (true, false) => bullets[j].active = false,
                (false, true) => bullets[i].active = false,
                _ => {
                    bullets[i].active = false;
                    bullets[j].active = false;
                }
            }
            if !bullets[i].active {
                break;
            }
        }
    }
}

/// What a destroyed tank leaves behind, by mode
fn drop_for(state: &mut GameState, death: &Death) -> Option<PickupKind> {
    if death.faction == Faction::Player && state.mode != GameMode::BattleRoyale {
        return None;
    }
    match state.mode {
        GameMode::Stage => {
            let chance = state.tuning.spawn.weapon_drop_chance;
            (!death.role.is_boss() && state.rng.random::<f32>() < chance)
                .then_some(PickupKind::WeaponDrop { role: death.role })
        }
        GameMode::BattleRoyale => Some(PickupKind::PowerGem {
            value: 1 + death.gem_count,
        }),
        GameMode::Survival => Some(PickupKind::XpGem {
            value: death.role.profile().xp_value,
        }),
    }
}

/// Score, explosions and drops for this tick's deaths
pub fn handle_deaths(state: &mut GameState, report: &mut JudgeReport) {
    let deaths = report.deaths.clone();
    for death in &deaths {
        state.push_event(GameEvent::Explosion {
            pos: death.pos,
            big: true,
        });
        state.push_event(GameEvent::Killed {
            victim: death.victim,
            role: death.role,
            killer: death.killer,
        });
        if death.killer == Some(state.player_id) {
            state.score += death.role.profile().score;
        }
        if let Some(kind) = drop_for(state, death) {
            report.pickup_spawns.push((kind, death.pos));
            state.spawn_pickup(kind, death.pos);
        }
        log::debug!("{} tank {:?} destroyed", death.role.as_str(), death.victim);
    }
}

/// Tanks pick up whatever their footprint touches
pub fn collect_pickups(state: &mut GameState) {
    for ci in 0..state.combatants.len() {
        if !state.combatants[ci].is_alive() {
            continue;
        }
        for pi in 0..state.pickups.len() {
            let pickup = &state.pickups[pi];
            let tank = &state.combatants[ci];
            if !pickup.active || !tank.footprint().overlaps(&pickup.footprint()) {
                continue;
            }
            if !tank.is_player() && !pickup.is_ai_collectible() {
                continue;
            }
            let kind = pickup.kind;

            state.pickups[pi].active = false;
            let tank = &mut state.combatants[ci];
            match kind {
                PickupKind::PowerGem { value } => tank.collect_gem(value),
                PickupKind::WeaponDrop { role } => tank.equip_role_weapon(role),
                PickupKind::XpGem { value } => state.progress.xp += value,
            }
            let by = state.combatants[ci].id;
            state.push_event(GameEvent::PickupCollected { by, kind });
        }
    }
}

/// Full judgment pass for one tick
pub fn resolve(state: &mut GameState) -> JudgeReport {
    let mut report = JudgeReport::default();
    resolve_bullet_hits(state, &mut report);
    resolve_bullet_clashes(&mut state.bullets);
    handle_deaths(state, &mut report);
    collect_pickups(state);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Combatant;
    use crate::tuning::PlayerTuning;
    use proptest::prelude::*;

    fn arena(mode: GameMode) -> GameState {
        let mut state = GameState::new(42);
        state.mode = mode;
        let id = CombatantId(state.next_entity_id());
        state.player_id = id;
        let mut player = Combatant::player(id, Vec2::new(100.0, 300.0), &PlayerTuning::default());
        player.invincible = 0.0;
        state.combatants.push(player);
        state
    }

    fn add_enemy(state: &mut GameState, role: Role, pos: Vec2) -> CombatantId {
        let id = CombatantId(state.next_entity_id());
        state.combatants.push(Combatant::ai(id, role, pos));
        id
    }

    fn shot_from(state: &mut GameState, shooter: CombatantId, at: Vec2) {
        let tank = state.combatant_mut(shooter).unwrap();
        tank.weapon.cooldown = 0.0;
        let mut shots = tank.fire(0.0);
        for b in &mut shots {
            b.pos = at;
        }
        state.add_bullets(shots);
    }

    #[test]
    fn test_reflect_velocity() {
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_player_bullet_kills_weak_enemy() {
        let mut state = arena(GameMode::Survival);
        let enemy = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        state.combatant_mut(enemy).unwrap().hp = 8.0;
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(400.0, 300.0));

        let report = resolve(&mut state);
        assert_eq!(report.deaths.len(), 1);
        assert!(state.combatant(enemy).unwrap().hp <= 0.0);
        assert!(!state.bullets[0].active);
        assert_eq!(report.pickup_spawns.len(), 1);
        assert!(matches!(report.pickup_spawns[0].0, PickupKind::XpGem { .. }));

        state.compact();
        assert!(state.combatant(enemy).is_none());
        assert_eq!(state.hostiles_alive(), 0);
    }

    #[test]
    fn test_stage_kill_drops_role_weapon() {
        let mut state = arena(GameMode::Stage);
        state.tuning.spawn.weapon_drop_chance = 1.0;
        let enemy = add_enemy(&mut state, Role::Sniper, Vec2::new(400.0, 300.0));
        state.combatant_mut(enemy).unwrap().hp = 1.0;
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(400.0, 300.0));

        let report = resolve(&mut state);
        assert_eq!(report.deaths.len(), 1);
        assert_eq!(
            report.pickup_spawns,
            vec![(PickupKind::WeaponDrop { role: Role::Sniper }, Vec2::new(400.0, 300.0))]
        );
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_stage_boss_never_drops_weapon() {
        let mut state = arena(GameMode::Stage);
        state.tuning.spawn.weapon_drop_chance = 1.0;
        let boss = add_enemy(&mut state, Role::Boss, Vec2::new(400.0, 300.0));
        state.combatant_mut(boss).unwrap().hp = 1.0;
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(400.0, 300.0));

        let report = resolve(&mut state);
        assert_eq!(report.deaths.len(), 1);
        assert!(report.pickup_spawns.is_empty());
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_stage_drop_respects_chance() {
        let mut state = arena(GameMode::Stage);
        state.tuning.spawn.weapon_drop_chance = 0.0;
        let enemy = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        state.combatant_mut(enemy).unwrap().hp = 1.0;
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(400.0, 300.0));

        let report = resolve(&mut state);
        assert_eq!(report.deaths.len(), 1);
        assert!(report.pickup_spawns.is_empty());
    }

    #[test]
    fn test_enemies_do_not_hurt_each_other_outside_royale() {
        let mut state = arena(GameMode::Stage);
        let a = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        let b = add_enemy(&mut state, Role::Standard, Vec2::new(500.0, 300.0));
        shot_from(&mut state, a, Vec2::new(500.0, 300.0));
        let report = resolve(&mut state);
        assert!(report.damage_events.is_empty());
        assert!(state.bullets[0].active);
        assert!(state.combatant(b).unwrap().is_alive());
    }

    #[test]
    fn test_friendly_fire_in_royale() {
        let mut state = arena(GameMode::BattleRoyale);
        let a = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        let b = add_enemy(&mut state, Role::Standard, Vec2::new(500.0, 300.0));
        shot_from(&mut state, a, Vec2::new(500.0, 300.0));
        let report = resolve(&mut state);
        assert_eq!(report.deaths.len(), 1);
        assert_eq!(report.deaths[0].victim, b);
        assert!(matches!(
            report.pickup_spawns[0].0,
            PickupKind::PowerGem { value: 1 }
        ));
    }

    #[test]
    fn test_no_self_damage() {
        let mut state = arena(GameMode::BattleRoyale);
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(100.0, 300.0));
        let report = resolve(&mut state);
        assert!(report.damage_events.is_empty());
    }

    #[test]
    fn test_invincible_target_takes_nothing() {
        let mut state = arena(GameMode::Stage);
        let enemy = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        state.player_mut().unwrap().invincible = 2.0;
        shot_from(&mut state, enemy, Vec2::new(100.0, 300.0));
        resolve(&mut state);
        let player = state.player().unwrap();
        assert_eq!(player.hp, player.max_hp);
        assert!(!state.bullets[0].active);
    }

    #[test]
    fn test_drain_heals_shooter() {
        let mut state = arena(GameMode::Stage);
        let enemy = add_enemy(&mut state, Role::Armored, Vec2::new(400.0, 300.0));
        {
            let p = state.player_mut().unwrap();
            p.hp = 50.0;
            p.weapon.drain = 0.5;
        }
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(400.0, 300.0));
        resolve(&mut state);
        assert_eq!(state.player().unwrap().hp, 55.0);
        assert!(state.combatant(enemy).unwrap().is_alive());
    }

    #[test]
    fn test_missing_shooter_means_no_drain() {
        let mut state = arena(GameMode::Stage);
        let enemy = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        shot_from(&mut state, enemy, Vec2::new(100.0, 300.0));
        // Shooter dies before its bullet lands
        state.combatants.retain(|c| c.id != enemy);
        let report = resolve(&mut state);
        assert_eq!(report.damage_events.len(), 1);
    }

    #[test]
    fn test_penetrating_bullet_passes_through() {
        let mut state = arena(GameMode::Stage);
        let enemy = add_enemy(&mut state, Role::Armored, Vec2::new(400.0, 300.0));
        state.player_mut().unwrap().weapon.penetration = 1;
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(400.0, 300.0));
        resolve(&mut state);
        assert!(state.bullets[0].active);
        assert_eq!(state.bullets[0].last_hit, Some(enemy));
        // Same tank is not hit twice in a row
        let report = resolve(&mut state);
        assert!(report.damage_events.is_empty());
    }

    #[test]
    fn test_opposite_bullets_cancel() {
        let mut state = arena(GameMode::Stage);
        let enemy = add_enemy(&mut state, Role::Standard, Vec2::new(600.0, 300.0));
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(300.0, 300.0));
        shot_from(&mut state, enemy, Vec2::new(303.0, 300.0));
        resolve_bullet_clashes(&mut state.bullets);
        assert!(state.bullets.iter().all(|b| !b.active));
    }

    #[test]
    fn test_same_side_bullets_pass() {
        let mut state = arena(GameMode::Stage);
        let a = add_enemy(&mut state, Role::Standard, Vec2::new(600.0, 300.0));
        let b = add_enemy(&mut state, Role::Standard, Vec2::new(600.0, 400.0));
        shot_from(&mut state, a, Vec2::new(300.0, 300.0));
        shot_from(&mut state, b, Vec2::new(302.0, 300.0));
        resolve_bullet_clashes(&mut state.bullets);
        assert!(state.bullets.iter().all(|b| b.active));
    }

    #[test]
    fn test_boss_bullet_dominates() {
        let mut state = arena(GameMode::Stage);
        let boss = add_enemy(&mut state, Role::Boss, Vec2::new(600.0, 300.0));
        let player = state.player_id;
        shot_from(&mut state, player, Vec2::new(300.0, 300.0));
        state.bullets.truncate(1);
        shot_from(&mut state, boss, Vec2::new(304.0, 300.0));
        state.bullets.truncate(2);
        resolve_bullet_clashes(&mut state.bullets);
        assert!(!state.bullets[0].active);
        assert!(state.bullets[1].active);
        assert!(state.bullets[1].boss_tier);
    }

    #[test]
    fn test_ai_only_collects_power_gems() {
        let mut state = arena(GameMode::Survival);
        let enemy = add_enemy(&mut state, Role::Standard, Vec2::new(400.0, 300.0));
        state.spawn_pickup(PickupKind::XpGem { value: 1 }, Vec2::new(400.0, 300.0));
        state.spawn_pickup(PickupKind::PowerGem { value: 2 }, Vec2::new(405.0, 300.0));
        collect_pickups(&mut state);
        assert!(state.pickups[0].active);
        assert!(!state.pickups[1].active);
        assert_eq!(state.combatant(enemy).unwrap().gem_count, 2);
    }

    #[test]
    fn test_player_collects_xp_and_weapons() {
        let mut state = arena(GameMode::Survival);
        state.spawn_pickup(PickupKind::XpGem { value: 3 }, Vec2::new(100.0, 300.0));
        state.spawn_pickup(PickupKind::WeaponDrop { role: Role::Shotgunner }, Vec2::new(105.0, 300.0));
        collect_pickups(&mut state);
        assert_eq!(state.progress.xp, 3);
        let player = state.player().unwrap();
        assert_eq!(player.role, Role::Shotgunner);
        assert_eq!(player.weapon.shot_spread, 1);
    }

    proptest! {
        #[test]
        fn prop_drain_never_overheals(
            hp in 1.0f32..100.0,
            drain in 0.0f32..1.0,
            damage in 1.0f32..200.0,
        ) {
            let mut state = arena(GameMode::Stage);
            add_enemy(&mut state, Role::Boss, Vec2::new(400.0, 300.0));
            {
                let p = state.player_mut().unwrap();
                p.hp = hp;
                p.weapon.drain = drain;
                p.weapon.bullet_damage = damage;
            }
            let player = state.player_id;
            shot_from(&mut state, player, Vec2::new(400.0, 300.0));
            resolve(&mut state);
            let p = state.player().unwrap();
            prop_assert!(p.hp <= p.max_hp);
        }
    }
}
