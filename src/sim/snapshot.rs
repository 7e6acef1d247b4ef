//! Read-only view of the world for the host to draw

use serde::Serialize;

use super::geometry::Wall;
use super::state::{Bullet, Combatant, GameEvent, GameMode, GamePhase, GameState, Pickup};
use super::upgrade::Upgrade;

/// HUD numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub mode: GameMode,
    /// 1-based stage number
    pub stage: u32,
    pub score: u64,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    /// Whole seconds left in the countdown
    pub countdown: u32,
    pub hostiles: usize,
    /// Seconds of play in this run
    pub elapsed: f32,
}

/// Post-tick state, borrowed from [`GameState`]
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub hud: Hud,
    pub combatants: &'a [Combatant],
    pub bullets: &'a [Bullet],
    pub pickups: &'a [Pickup],
    pub walls: &'a [Wall],
    /// Upgrades on offer (empty outside Win / LevelUp)
    pub offer: &'a [Upgrade],
    /// Highlighted option while a roulette reveal is running
    pub roulette_cursor: Option<usize>,
    pub events: &'a [GameEvent],
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let (hp, max_hp) = self.player().map_or((0.0, 0.0), |p| (p.hp.max(0.0), p.max_hp));
        Snapshot {
            hud: Hud {
                phase: self.phase,
                mode: self.mode,
                stage: self.stage_index + 1,
                score: self.score,
                hp,
                max_hp,
                level: self.progress.level,
                xp: self.progress.xp,
                xp_to_next: self.progress.xp_to_next,
                countdown: self.countdown.max(0.0).ceil() as u32,
                hostiles: self.hostiles_alive(),
                elapsed: self.elapsed,
            },
            combatants: &self.combatants,
            bullets: &self.bullets,
            pickups: &self.pickups,
            walls: &self.walls,
            offer: &self.offer,
            roulette_cursor: self.roulette.as_ref().map(|r| r.cursor),
            events: &self.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_snapshot_is_empty() {
        let state = GameState::new(1);
        let snap = state.snapshot();
        assert_eq!(snap.hud.phase, GamePhase::Menu);
        assert_eq!(snap.hud.stage, 1);
        assert_eq!(snap.hud.hp, 0.0);
        assert!(snap.combatants.is_empty());
        assert_eq!(snap.roulette_cursor, None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(1);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Menu\""));
    }
}
