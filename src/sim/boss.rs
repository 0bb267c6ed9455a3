//! Boss behavior: move-pattern cycling and the shield state machine
//!
//! The boss walks a cyclic buffer of vertical velocities, holding each entry
//! for a fixed run of ticks and reshuffling the buffer whenever a run ends.
//! Independently, each unshielded tick rolls for a shield; a raised shield
//! absorbs all damage and drops after a fixed number of ticks.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::SimRng;
use super::actor::{Actor, Behavior};
use super::factory::{self, ProjectileTag};
use crate::consts::{
    BOSS_FIRE_RATE, BOSS_MAX_TICKS_WITH_SAME_MOVE, BOSS_MAX_TICKS_WITH_SHIELD,
    BOSS_MOVE_FREQUENCY_PER_CYCLE, BOSS_SHIELD_PROBABILITY, BOSS_VERTICAL_VELOCITY,
};

pub const BOSS_INITIAL_POSITION: Vec2 = Vec2::new(900.0, 400.0);
const Y_UPPER_BOUND: f32 = 10.0;
const Y_LOWER_BOUND: f32 = 600.0;
const PROJECTILE_Y_OFFSET: f32 = 75.0;

/// Shield sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldState {
    Unshielded,
    /// Raised, with the number of ticks it has been up
    Shielded { ticks: u32 },
}

#[derive(Debug, Clone)]
pub struct BossState {
    move_pattern: Vec<f32>,
    index_of_current_move: usize,
    consecutive_moves_in_same_direction: u32,
    shield: ShieldState,
    reshuffles: u32,
}

impl BossState {
    pub fn new(rng: &mut SimRng) -> Self {
        let mut move_pattern = Vec::with_capacity(BOSS_MOVE_FREQUENCY_PER_CYCLE * 3);
        for _ in 0..BOSS_MOVE_FREQUENCY_PER_CYCLE {
            move_pattern.push(BOSS_VERTICAL_VELOCITY);
            move_pattern.push(-BOSS_VERTICAL_VELOCITY);
            move_pattern.push(0.0);
        }
        move_pattern.shuffle(rng);
        Self {
            move_pattern,
            index_of_current_move: 0,
            consecutive_moves_in_same_direction: 0,
            shield: ShieldState::Unshielded,
            reshuffles: 0,
        }
    }

    pub fn move_pattern(&self) -> &[f32] {
        &self.move_pattern
    }

    pub fn shield(&self) -> ShieldState {
        self.shield
    }

    pub fn is_shielded(&self) -> bool {
        matches!(self.shield, ShieldState::Shielded { .. })
    }

    /// How many times the pattern has been reshuffled since spawn
    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Next vertical velocity from the cyclic pattern
    pub fn next_move(&mut self, rng: &mut SimRng) -> f32 {
        let current = self.move_pattern[self.index_of_current_move];
        self.consecutive_moves_in_same_direction += 1;
        if self.consecutive_moves_in_same_direction == BOSS_MAX_TICKS_WITH_SAME_MOVE {
            self.move_pattern.shuffle(rng);
            self.reshuffles += 1;
            self.consecutive_moves_in_same_direction = 0;
            self.index_of_current_move += 1;
        }
        if self.index_of_current_move == self.move_pattern.len() {
            self.index_of_current_move = 0;
        }
        current
    }

    pub fn activate_shield(&mut self) {
        if !self.is_shielded() {
            self.shield = ShieldState::Shielded { ticks: 0 };
        }
    }

    pub fn deactivate_shield(&mut self) {
        self.shield = ShieldState::Unshielded;
    }

    /// Advance the shield by one tick. Returns true if the shield went up or down.
    pub fn update_shield(&mut self, rng: &mut SimRng) -> bool {
        match self.shield {
            ShieldState::Shielded { ticks } => {
                let ticks = ticks + 1;
                if ticks >= BOSS_MAX_TICKS_WITH_SHIELD {
                    self.deactivate_shield();
                    true
                } else {
                    self.shield = ShieldState::Shielded { ticks };
                    false
                }
            }
            ShieldState::Unshielded => {
                if rng.random_bool(BOSS_SHIELD_PROBABILITY) {
                    self.activate_shield();
                    true
                } else {
                    false
                }
            }
        }
    }
}

pub(super) static BEHAVIOR: Behavior = Behavior {
    update_position,
    update_actor,
    take_damage,
    fire,
};

fn update_position(actor: &mut Actor, rng: &mut SimRng) {
    let initial = actor.translate().y;
    let Some(boss) = actor.as_boss_mut() else {
        return;
    };
    let dy = boss.next_move(rng);
    actor.move_vertically(dy);
    let y = actor.position().y;
    if !(Y_UPPER_BOUND..=Y_LOWER_BOUND).contains(&y) {
        actor.set_translate_y(initial);
    }
}

fn update_actor(actor: &mut Actor, rng: &mut SimRng) {
    update_position(actor, rng);
    let id = actor.id;
    if let Some(boss) = actor.as_boss_mut() {
        if boss.update_shield(rng) {
            let state = if boss.is_shielded() { "up" } else { "down" };
            log::debug!("Boss {} shield {}", id, state);
        }
    }
}

fn take_damage(actor: &mut Actor) {
    if actor.as_boss().is_some_and(BossState::is_shielded) {
        return;
    }
    actor.apply_damage();
}

/// The boss hands the factory x = 0; boss shots anchor on their own column.
fn fire(actor: &mut Actor, rng: &mut SimRng) -> Option<Actor> {
    if !rng.random_bool(BOSS_FIRE_RATE) {
        return None;
    }
    let y = actor.position().y + PROJECTILE_Y_OFFSET;
    Some(factory::spawn_projectile(ProjectileTag::Boss, 0.0, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BOSS_HEALTH;
    use crate::sim::factory::{PlaneTag, spawn_plane};
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn boss(seed: u64) -> (Actor, SimRng) {
        let mut rng = SimRng::seed_from_u64(seed);
        let boss = spawn_plane(PlaneTag::Boss, 0.0, 0.0, &mut rng);
        (boss, rng)
    }

    #[test]
    fn test_pattern_contents() {
        let (boss, _) = boss(3);
        let pattern = boss.as_boss().unwrap().move_pattern();
        assert_eq!(pattern.len(), 15);
        for v in [BOSS_VERTICAL_VELOCITY, -BOSS_VERTICAL_VELOCITY, 0.0] {
            assert_eq!(pattern.iter().filter(|&&p| p == v).count(), 5);
        }
    }

    #[test]
    fn test_shield_absorbs_then_expires() {
        let (mut boss, mut rng) = boss(11);
        boss.as_boss_mut().unwrap().activate_shield();

        for _ in 0..5 {
            boss.take_damage();
        }
        assert_eq!(boss.health(), BOSS_HEALTH);

        for _ in 0..BOSS_MAX_TICKS_WITH_SHIELD {
            assert!(boss.as_boss().unwrap().is_shielded());
            boss.as_boss_mut().unwrap().update_shield(&mut rng);
        }
        assert!(!boss.as_boss().unwrap().is_shielded());

        boss.take_damage();
        assert_eq!(boss.health(), BOSS_HEALTH - 1);
    }

    #[test]
    fn test_shield_activates_eventually() {
        let (mut boss, mut rng) = boss(5);
        let state = boss.as_boss_mut().unwrap();
        let raised = (0..20_000).any(|_| state.update_shield(&mut rng) && state.is_shielded());
        assert!(raised);
    }

    #[test]
    fn test_vertical_band_clamp() {
        let (mut boss, mut rng) = boss(17);
        for _ in 0..2_000 {
            boss.update_actor(&mut rng);
            let y = boss.position().y;
            assert!((Y_UPPER_BOUND..=Y_LOWER_BOUND).contains(&y), "y={y}");
            assert_eq!(boss.position().x, BOSS_INITIAL_POSITION.x);
        }
    }

    #[test]
    fn test_boss_fires_along_fixed_column() {
        let (mut boss, mut rng) = boss(23);
        let shot = (0..2_000)
            .find_map(|_| boss.fire_projectile(&mut rng))
            .expect("4% fire chance should trigger");
        assert_eq!(shot.position().x, factory::BOSS_PROJECTILE_ORIGIN_X);
        assert_eq!(shot.position().y, boss.position().y + PROJECTILE_Y_OFFSET);
    }

    proptest! {
        #[test]
        fn prop_move_pattern_reshuffles_every_run(seed in any::<u64>(), ticks in 1u32..200) {
            let mut rng = SimRng::seed_from_u64(seed);
            let mut state = BossState::new(&mut rng);
            let mut run: Vec<f32> = Vec::new();
            for tick in 1..=ticks {
                let v = state.next_move(&mut rng);
                prop_assert!(
                    v == BOSS_VERTICAL_VELOCITY || v == -BOSS_VERTICAL_VELOCITY || v == 0.0
                );
                prop_assert_eq!(state.reshuffles(), tick / BOSS_MAX_TICKS_WITH_SAME_MOVE);

                // Each run of the same selected entry emits one constant value
                run.push(v);
                if run.len() as u32 == BOSS_MAX_TICKS_WITH_SAME_MOVE {
                    prop_assert!(run.iter().all(|&r| r == run[0]));
                    run.clear();
                }
            }
        }
    }
}
