//! Simulation module
//!
//! All gameplay logic lives here. This module is pure:
//! - Host-supplied timestep
//! - Seeded RNG only (owned by `GameState`)
//! - Stable iteration order (insertion order of each collection)
//! - No rendering or platform dependencies

pub mod ai;
pub mod arena;
pub mod ballistics;
pub mod collision;
pub mod geometry;
pub mod movement;
pub mod role;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use collision::{DamageEvent, Death, JudgeReport, reflect_velocity, resolve};
pub use geometry::{Rect, Wall};
pub use movement::{MoveResult, move_combatant};
pub use role::{Role, RoleProfile};
pub use snapshot::{Hud, Snapshot};
pub use spawn::{Difficulty, try_spawn};
pub use state::{
    AiAction, Bullet, Combatant, CombatantId, Faction, GameEvent, GameMode, GamePhase, GameState,
    Pickup, PickupKind, Progress,
};
pub use tick::{Aim, PhaseTransition, Selection, TickInput, advance};
pub use upgrade::Upgrade;
