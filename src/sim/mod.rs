//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (collection insertion order)
//! - No rendering or platform dependencies

pub mod actor;
pub mod boss;
pub mod clock;
pub mod collision;
pub mod factory;
pub mod level;
pub mod tick;
pub mod user_plane;

/// Every random draw in the simulation comes from one of these
pub type SimRng = rand_pcg::Pcg32;

pub use actor::{Aabb, Actor, ActorKind, Payload};
pub use boss::{BossState, ShieldState};
pub use clock::{ClockState, GameClock};
pub use factory::{
    PlaneTag, ProjectileTag, create_plane, create_projectile, create_user_plane, spawn_plane,
    spawn_projectile,
};
pub use level::{
    Completion, EndOption, Field, Goal, Hud, Level, LevelPhase, LevelSpec, SpawnPolicy,
    SpawnWeight, ViewEvent,
};
pub use tick::Command;
pub use user_plane::UserPlaneState;
