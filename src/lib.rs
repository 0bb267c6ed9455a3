//! Sky Battle - simulation core of a side-scrolling plane shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actors, collisions, boss, level tick pipeline)
//! - `transition`: Level identifiers, transition channel and level registry
//! - `levels`: The stock stages
//! - `controller`: Owns the active level and resolves transition requests
//! - `settings`: JSON-backed runtime configuration
//! - `error`: Error taxonomy shared by the above

pub mod controller;
pub mod error;
pub mod levels;
pub mod settings;
pub mod sim;
pub mod transition;

pub use controller::Controller;
pub use error::{ConfigError, FactoryError, TransitionError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation period in milliseconds (20 ticks/second)
    pub const TICK_MILLIS: u64 = 50;

    /// Default play field dimensions
    pub const SCREEN_WIDTH: f32 = 1300.0;
    pub const SCREEN_HEIGHT: f32 = 750.0;
    /// Enemies spawn no lower than this far above the bottom edge
    pub const SCREEN_HEIGHT_ADJUSTMENT: f32 = 150.0;

    /// Player starting health on every stock level
    pub const PLAYER_INITIAL_HEALTH: u32 = 5;

    /// Invulnerability window after a hit, in player ticks (~150 ms)
    pub const INVULNERABLE_TICKS: u64 = 3;
    /// Minimum ticks between player shots (~200 ms)
    pub const FIRE_COOLDOWN_TICKS: u64 = 4;

    /// Boss tuning
    pub const BOSS_HEALTH: u32 = 25;
    pub const BOSS_FIRE_RATE: f64 = 0.04;
    pub const BOSS_SHIELD_PROBABILITY: f64 = 0.004;
    pub const BOSS_MAX_TICKS_WITH_SHIELD: u32 = 100;
    pub const BOSS_MAX_TICKS_WITH_SAME_MOVE: u32 = 10;
    pub const BOSS_VERTICAL_VELOCITY: f32 = 8.0;
    pub const BOSS_MOVE_FREQUENCY_PER_CYCLE: usize = 5;

    /// Enemy fire chance per tick (both regular variants)
    pub const ENEMY_FIRE_RATE: f64 = 0.01;
}
