//! Actor model: planes and projectiles
//!
//! Every simulated entity is a single `Actor` value: a variant tag, a
//! variant-specific payload and the shared position/health/flag state.
//! Per-variant behavior is resolved through a static [`Behavior`] table keyed
//! by [`ActorKind`].
//!
//! Position is a base layout point plus an accumulated translation, so
//! "how far has this actor travelled" is always available directly.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::SimRng;
use super::boss::{self, BossState};
use super::factory::{self, ProjectileTag};
use super::user_plane::{self, UserPlaneState};
use crate::consts::ENEMY_FIRE_RATE;

const ENEMY_HORIZONTAL_VELOCITY: f32 = -6.0;
const ENEMY2_HORIZONTAL_VELOCITY: f32 = -3.0;
const ENEMY2_Y_UPPER_BOUND: f32 = 0.0;
const ENEMY2_Y_LOWER_BOUND: f32 = 630.0;
/// Enemy shots leave from ahead of the nose, roughly mid-fuselage
const ENEMY_PROJECTILE_OFFSET: Vec2 = Vec2::new(-100.0, 50.0);

const USER_PROJECTILE_VELOCITY: f32 = 15.0;
const ENEMY_PROJECTILE_VELOCITY: f32 = -10.0;
const BOSS_PROJECTILE_VELOCITY: f32 = -15.0;

/// Variant tag for every actor in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActorKind {
    UserPlane,
    /// Basic enemy: straight leftward drift
    Enemy,
    /// Advanced enemy: leftward drift with vertical oscillation
    Enemy2,
    Boss,
    UserProjectile,
    EnemyProjectile,
    BossProjectile,
}

impl ActorKind {
    pub fn is_plane(self) -> bool {
        matches!(
            self,
            ActorKind::UserPlane | ActorKind::Enemy | ActorKind::Enemy2 | ActorKind::Boss
        )
    }

    pub fn is_projectile(self) -> bool {
        !self.is_plane()
    }

    /// Hitbox size (width, height)
    pub fn size(self) -> Vec2 {
        match self {
            ActorKind::UserPlane => Vec2::new(150.0, 60.0),
            ActorKind::Enemy | ActorKind::Enemy2 => Vec2::new(150.0, 80.0),
            ActorKind::Boss => Vec2::new(180.0, 75.0),
            ActorKind::UserProjectile => Vec2::new(40.0, 10.0),
            ActorKind::EnemyProjectile => Vec2::new(30.0, 15.0),
            ActorKind::BossProjectile => Vec2::new(60.0, 40.0),
        }
    }

    /// Dispatch table for this variant
    pub fn behavior(self) -> &'static Behavior {
        match self {
            ActorKind::UserPlane => &user_plane::BEHAVIOR,
            ActorKind::Enemy => &DRIFTER,
            ActorKind::Enemy2 => &OSCILLATOR,
            ActorKind::Boss => &boss::BEHAVIOR,
            ActorKind::UserProjectile | ActorKind::EnemyProjectile | ActorKind::BossProjectile => {
                &PROJECTILE
            }
        }
    }
}

/// Per-variant operations, one function per contract method
pub struct Behavior {
    pub update_position: fn(&mut Actor, &mut SimRng),
    pub update_actor: fn(&mut Actor, &mut SimRng),
    pub take_damage: fn(&mut Actor),
    pub fire: fn(&mut Actor, &mut SimRng) -> Option<Actor>,
}

/// Variant-specific state
#[derive(Debug, Clone)]
pub enum Payload {
    User(UserPlaneState),
    Drift,
    Oscillate { vertical_velocity: f32 },
    Boss(BossState),
    Projectile,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    /// Overlap test; touching edges count as an intersection
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// A simulated plane or projectile
#[derive(Debug, Clone)]
pub struct Actor {
    /// Assigned by the owning level when the actor joins a collection
    pub id: u32,
    kind: ActorKind,
    layout: Vec2,
    translate: Vec2,
    health: u32,
    max_health: u32,
    destroyed: bool,
    penetrated: bool,
    payload: Payload,
}

impl Actor {
    pub(crate) fn new(kind: ActorKind, layout: Vec2, health: u32, payload: Payload) -> Self {
        Self {
            id: 0,
            kind,
            layout,
            translate: Vec2::ZERO,
            health,
            max_health: health,
            destroyed: false,
            penetrated: false,
            payload,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn layout(&self) -> Vec2 {
        self.layout
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    /// Current top-left corner
    pub fn position(&self) -> Vec2 {
        self.layout + self.translate
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position(), self.kind.size())
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Idempotent; the flag never resets
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_penetrated(&self) -> bool {
        self.penetrated
    }

    pub fn set_penetrated(&mut self) {
        self.penetrated = true;
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn as_user(&self) -> Option<&UserPlaneState> {
        match &self.payload {
            Payload::User(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_user_mut(&mut self) -> Option<&mut UserPlaneState> {
        match &mut self.payload {
            Payload::User(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_boss(&self) -> Option<&BossState> {
        match &self.payload {
            Payload::Boss(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_boss_mut(&mut self) -> Option<&mut BossState> {
        match &mut self.payload {
            Payload::Boss(state) => Some(state),
            _ => None,
        }
    }

    /// Move by this variant's own rule
    pub fn update_position(&mut self, rng: &mut SimRng) {
        if !self.destroyed {
            (self.kind.behavior().update_position)(self, rng);
        }
    }

    /// Move plus any per-tick internal state (shield, invulnerability clock)
    pub fn update_actor(&mut self, rng: &mut SimRng) {
        if !self.destroyed {
            (self.kind.behavior().update_actor)(self, rng);
        }
    }

    pub fn take_damage(&mut self) {
        (self.kind.behavior().take_damage)(self);
    }

    /// Damage that ignores the player's invulnerability window
    pub fn take_unshielded_damage(&mut self) {
        self.apply_damage();
    }

    pub fn fire_projectile(&mut self, rng: &mut SimRng) -> Option<Actor> {
        if self.destroyed {
            return None;
        }
        (self.kind.behavior().fire)(self, rng)
    }

    pub(crate) fn move_horizontally(&mut self, dx: f32) {
        self.translate.x += dx;
    }

    pub(crate) fn move_vertically(&mut self, dy: f32) {
        self.translate.y += dy;
    }

    pub(crate) fn set_translate_y(&mut self, y: f32) {
        self.translate.y = y;
    }

    /// Plain plane damage: one health point, destroyed at zero
    pub(crate) fn apply_damage(&mut self) {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.destroy();
        }
    }
}

static DRIFTER: Behavior = Behavior {
    update_position: drift_update_position,
    update_actor: drift_update_position,
    take_damage: Actor::apply_damage,
    fire: enemy_fire,
};

static OSCILLATOR: Behavior = Behavior {
    update_position: oscillate_update_position,
    update_actor: oscillate_update_position,
    take_damage: Actor::apply_damage,
    fire: enemy_fire,
};

static PROJECTILE: Behavior = Behavior {
    update_position: projectile_update_position,
    update_actor: projectile_update_position,
    take_damage: Actor::destroy,
    fire: never_fires,
};

fn drift_update_position(actor: &mut Actor, _rng: &mut SimRng) {
    actor.move_horizontally(ENEMY_HORIZONTAL_VELOCITY);
}

fn oscillate_update_position(actor: &mut Actor, _rng: &mut SimRng) {
    let Payload::Oscillate { vertical_velocity } = &actor.payload else {
        return;
    };
    let velocity = *vertical_velocity;
    actor.move_vertically(velocity);
    let y = actor.position().y;
    if y <= ENEMY2_Y_UPPER_BOUND || y >= ENEMY2_Y_LOWER_BOUND {
        actor.payload = Payload::Oscillate {
            vertical_velocity: -velocity,
        };
    }
    actor.move_horizontally(ENEMY2_HORIZONTAL_VELOCITY);
}

fn enemy_fire(actor: &mut Actor, rng: &mut SimRng) -> Option<Actor> {
    if !rng.random_bool(ENEMY_FIRE_RATE) {
        return None;
    }
    let origin = actor.position() + ENEMY_PROJECTILE_OFFSET;
    Some(factory::spawn_projectile(ProjectileTag::Enemy, origin.x, origin.y))
}

fn projectile_update_position(actor: &mut Actor, _rng: &mut SimRng) {
    let velocity = match actor.kind {
        ActorKind::UserProjectile => USER_PROJECTILE_VELOCITY,
        ActorKind::EnemyProjectile => ENEMY_PROJECTILE_VELOCITY,
        ActorKind::BossProjectile => BOSS_PROJECTILE_VELOCITY,
        _ => 0.0,
    };
    actor.move_horizontally(velocity);
}

fn never_fires(_actor: &mut Actor, _rng: &mut SimRng) -> Option<Actor> {
    None
}
