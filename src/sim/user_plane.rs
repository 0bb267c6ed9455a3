//! The player's plane
//!
//! Vertical movement is driven by discrete commands (up/down/stop). Time-based
//! state (invulnerability after a hit, fire cooldown) is measured in the
//! plane's own tick counter, which only advances while the level is ticking,
//! so a paused level never lets either window expire.

use glam::Vec2;

use super::SimRng;
use super::actor::{Actor, Behavior};
use super::factory::{self, ProjectileTag};
use crate::consts::{FIRE_COOLDOWN_TICKS, INVULNERABLE_TICKS};

pub const USER_INITIAL_POSITION: Vec2 = Vec2::new(5.0, 300.0);
const Y_UPPER_BOUND: f32 = 0.0;
const Y_LOWER_BOUND: f32 = 650.0;
const VERTICAL_VELOCITY: f32 = 8.0;
/// Shots always leave from a fixed column just past the nose
const PROJECTILE_X_POSITION: f32 = 220.0;
const PROJECTILE_Y_OFFSET: f32 = 40.0;

#[derive(Debug, Clone, Default)]
pub struct UserPlaneState {
    /// -1 = up, 0 = holding, +1 = down
    velocity_multiplier: i8,
    kills: u32,
    /// Ticks this plane has been updated for
    ticks: u64,
    last_hit: Option<u64>,
    last_fire: Option<u64>,
}

impl UserPlaneState {
    pub fn velocity_multiplier(&self) -> i8 {
        self.velocity_multiplier
    }

    pub fn move_up(&mut self) {
        self.velocity_multiplier = -1;
    }

    pub fn move_down(&mut self) {
        self.velocity_multiplier = 1;
    }

    pub fn stop(&mut self) {
        self.velocity_multiplier = 0;
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn add_kills(&mut self, count: u32) {
        self.kills += count;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Still inside the window opened by the last regular hit
    pub fn is_invulnerable(&self) -> bool {
        self.last_hit
            .is_some_and(|hit| self.ticks - hit <= INVULNERABLE_TICKS)
    }

    pub fn can_fire(&self) -> bool {
        self.last_fire
            .map_or(true, |fired| self.ticks - fired >= FIRE_COOLDOWN_TICKS)
    }
}

pub(super) static BEHAVIOR: Behavior = Behavior {
    update_position,
    update_actor,
    take_damage,
    fire,
};

fn update_position(actor: &mut Actor, _rng: &mut SimRng) {
    let multiplier = actor.as_user().map_or(0, |user| user.velocity_multiplier);
    if multiplier == 0 {
        return;
    }
    let initial = actor.translate().y;
    actor.move_vertically(VERTICAL_VELOCITY * f32::from(multiplier));
    let y = actor.position().y;
    if !(Y_UPPER_BOUND..=Y_LOWER_BOUND).contains(&y) {
        actor.set_translate_y(initial);
    }
}

fn update_actor(actor: &mut Actor, rng: &mut SimRng) {
    update_position(actor, rng);
    if let Some(user) = actor.as_user_mut() {
        user.ticks += 1;
    }
}

fn take_damage(actor: &mut Actor) {
    let Some(user) = actor.as_user_mut() else {
        return;
    };
    if user.is_invulnerable() {
        return;
    }
    user.last_hit = Some(user.ticks);
    actor.apply_damage();
}

fn fire(actor: &mut Actor, _rng: &mut SimRng) -> Option<Actor> {
    let y = actor.position().y + PROJECTILE_Y_OFFSET;
    let user = actor.as_user_mut()?;
    if !user.can_fire() {
        return None;
    }
    user.last_fire = Some(user.ticks);
    Some(factory::spawn_projectile(
        ProjectileTag::User,
        PROJECTILE_X_POSITION,
        y,
    ))
}
