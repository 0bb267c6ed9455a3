//! Spawn factory: type tag -> actor
//!
//! String tags are parsed into typed tags up front; an unrecognized tag is a
//! caller bug and surfaces as [`FactoryError::UnknownVariant`]. Once a tag is
//! typed, spawning cannot fail.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::actor::{Actor, ActorKind, Payload};
use super::boss::{BOSS_INITIAL_POSITION, BossState};
use super::user_plane::{USER_INITIAL_POSITION, UserPlaneState};
use crate::consts::BOSS_HEALTH;
use crate::error::{FactoryError, VariantFamily};

/// Column every boss shot starts from
pub const BOSS_PROJECTILE_ORIGIN_X: f32 = 950.0;
const ENEMY_HEALTH: u32 = 1;
const ENEMY2_HEALTH: u32 = 2;
const ENEMY2_VERTICAL_SPEED: f32 = 5.0;

/// Enemy plane variants the factory can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneTag {
    Enemy,
    Enemy2,
    Boss,
}

impl PlaneTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaneTag::Enemy => "enemy",
            PlaneTag::Enemy2 => "enemy2",
            PlaneTag::Boss => "boss",
        }
    }
}

impl FromStr for PlaneTag {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enemy" => Ok(PlaneTag::Enemy),
            "enemy2" => Ok(PlaneTag::Enemy2),
            "boss" => Ok(PlaneTag::Boss),
            _ => Err(FactoryError::UnknownVariant {
                family: VariantFamily::Plane,
                tag: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlaneTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projectile variants the factory can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectileTag {
    User,
    Enemy,
    Boss,
}

impl FromStr for ProjectileTag {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ProjectileTag::User),
            "enemy" => Ok(ProjectileTag::Enemy),
            "boss" => Ok(ProjectileTag::Boss),
            _ => Err(FactoryError::UnknownVariant {
                family: VariantFamily::Projectile,
                tag: s.to_string(),
            }),
        }
    }
}

/// Build the player's plane at its fixed starting point
pub fn create_user_plane(health: u32) -> Actor {
    Actor::new(
        ActorKind::UserPlane,
        USER_INITIAL_POSITION,
        health,
        Payload::User(UserPlaneState::default()),
    )
}

/// Build an enemy plane from a string tag
pub fn create_plane(tag: &str, x: f32, y: f32, rng: &mut SimRng) -> Result<Actor, FactoryError> {
    Ok(spawn_plane(tag.parse()?, x, y, rng))
}

/// Build a projectile from a string tag
pub fn create_projectile(tag: &str, x: f32, y: f32) -> Result<Actor, FactoryError> {
    Ok(spawn_projectile(tag.parse()?, x, y))
}

/// Build an enemy plane. The boss ignores `x`/`y` and enters at its own spot.
pub fn spawn_plane(tag: PlaneTag, x: f32, y: f32, rng: &mut SimRng) -> Actor {
    match tag {
        PlaneTag::Enemy => Actor::new(ActorKind::Enemy, Vec2::new(x, y), ENEMY_HEALTH, Payload::Drift),
        PlaneTag::Enemy2 => {
            let vertical_velocity = if rng.random_bool(0.5) {
                -ENEMY2_VERTICAL_SPEED
            } else {
                ENEMY2_VERTICAL_SPEED
            };
            Actor::new(
                ActorKind::Enemy2,
                Vec2::new(x, y),
                ENEMY2_HEALTH,
                Payload::Oscillate { vertical_velocity },
            )
        }
        PlaneTag::Boss => Actor::new(
            ActorKind::Boss,
            BOSS_INITIAL_POSITION,
            BOSS_HEALTH,
            Payload::Boss(BossState::new(rng)),
        ),
    }
}

/// Build a projectile. Boss shots ignore `x` and start at [`BOSS_PROJECTILE_ORIGIN_X`].
pub fn spawn_projectile(tag: ProjectileTag, x: f32, y: f32) -> Actor {
    let (kind, origin) = match tag {
        ProjectileTag::User => (ActorKind::UserProjectile, Vec2::new(x, y)),
        ProjectileTag::Enemy => (ActorKind::EnemyProjectile, Vec2::new(x, y)),
        ProjectileTag::Boss => (
            ActorKind::BossProjectile,
            Vec2::new(BOSS_PROJECTILE_ORIGIN_X, y),
        ),
    };
    Actor::new(kind, origin, 1, Payload::Projectile)
}
