//! Fixed timestep level tick
//!
//! One call to [`Level::tick`] runs the whole pipeline in a fixed order.
//! Later steps read what earlier steps wrote, so the order matters:
//! spawning, queued input, movement, enemy fire, penetration, collisions,
//! kill counting, removal, HUD refresh and finally the game-over check.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::SimRng;
use super::actor::{Actor, ActorKind};
use super::boss::BossState;
use super::collision;
use super::factory::{self, PlaneTag};
use super::level::{Completion, Goal, Level, LevelPhase, SpawnPolicy, SpawnWeight, ViewEvent};

/// Player input, abstracted from key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    StopVertical,
    Fire,
    TogglePause,
}

impl Level {
    /// Advance the level by one tick. Does nothing unless the level is running.
    pub fn tick(&mut self) {
        if self.phase != LevelPhase::Running {
            return;
        }
        self.ticks += 1;

        self.spawn_enemy_units();
        self.apply_commands();
        self.update_actors();
        self.generate_enemy_fire();
        self.handle_enemy_penetration();
        self.handle_collisions();
        self.update_kill_count();
        self.remove_all_destroyed_actors();
        self.update_level_view();
        self.check_if_game_over();
    }

    fn spawn_enemy_units(&mut self) {
        let present = self.enemy_units.len();
        let mut spawned = Vec::new();
        match &self.spec.spawn {
            SpawnPolicy::Waves {
                max_enemies,
                spawn_chance,
                variants,
            } => {
                let chance = spawn_chance.clamp(0.0, 1.0);
                for _ in present..*max_enemies {
                    if !self.rng.random_bool(chance) {
                        continue;
                    }
                    let Some(tag) = pick_variant(variants, &mut self.rng) else {
                        continue;
                    };
                    let y = self.rng.random::<f32>() * self.field.enemy_maximum_y();
                    spawned.push(factory::spawn_plane(tag, self.field.width, y, &mut self.rng));
                }
            }
            SpawnPolicy::Boss => {
                if present == 0 {
                    spawned.push(factory::spawn_plane(PlaneTag::Boss, 0.0, 0.0, &mut self.rng));
                }
            }
        }

        for enemy in spawned {
            let is_boss = enemy.kind() == ActorKind::Boss;
            let id = self.add_enemy_unit(enemy);
            if is_boss {
                log::info!("Level {}: boss {} entered", self.id, id);
                self.boss_id = Some(id);
            }
        }
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.pending);
        let mut shots = Vec::new();
        if let Some(user) = self
            .friendly_units
            .iter_mut()
            .find(|actor| actor.kind() == ActorKind::UserPlane && !actor.is_destroyed())
        {
            for command in commands {
                if command == Command::Fire {
                    shots.extend(user.fire_projectile(&mut self.rng));
                    continue;
                }
                let Some(state) = user.as_user_mut() else {
                    continue;
                };
                match command {
                    Command::MoveUp => state.move_up(),
                    Command::MoveDown => state.move_down(),
                    Command::StopVertical => state.stop(),
                    Command::Fire | Command::TogglePause => {}
                }
            }
        }
        for shot in shots {
            self.add_user_projectile(shot);
        }
    }

    fn update_actors(&mut self) {
        let width = self.field.width;
        update_group(&mut self.friendly_units, &mut self.rng, &mut self.events);
        update_group(&mut self.enemy_units, &mut self.rng, &mut self.events);
        update_group(&mut self.user_projectiles, &mut self.rng, &mut self.events);
        update_group(&mut self.enemy_projectiles, &mut self.rng, &mut self.events);

        for shot in self
            .user_projectiles
            .iter_mut()
            .chain(self.enemy_projectiles.iter_mut())
        {
            let bounds = shot.bounds();
            if bounds.max.x < 0.0 || bounds.min.x > width {
                shot.destroy();
            }
        }
    }

    fn generate_enemy_fire(&mut self) {
        let shots: Vec<Actor> = self
            .enemy_units
            .iter_mut()
            .filter_map(|enemy| enemy.fire_projectile(&mut self.rng))
            .collect();
        for shot in shots {
            self.add_enemy_projectile(shot);
        }
    }

    fn handle_enemy_penetration(&mut self) {
        let width = self.field.width;
        let mut breaches = 0;
        for enemy in self.enemy_units.iter_mut() {
            if !enemy.is_destroyed() && enemy.translate().x.abs() > width {
                log::debug!("Level {}: enemy {} broke through", self.id, enemy.id);
                enemy.set_penetrated();
                enemy.destroy();
                breaches += 1;
            }
        }
        if breaches == 0 {
            return;
        }
        if let Some(user) = self
            .friendly_units
            .iter_mut()
            .find(|actor| actor.kind() == ActorKind::UserPlane)
        {
            for _ in 0..breaches {
                user.take_unshielded_damage();
            }
        }
    }

    fn handle_collisions(&mut self) {
        collision::resolve(&mut self.friendly_units, &mut self.enemy_units);
        collision::resolve(&mut self.user_projectiles, &mut self.enemy_units);
        collision::resolve(&mut self.enemy_projectiles, &mut self.friendly_units);
    }

    /// Runs right before removal, so every destroyed enemy is seen exactly once
    fn update_kill_count(&mut self) {
        let kills = collision::count_kills(&self.enemy_units);
        if kills == 0 {
            return;
        }
        self.hud.kills += kills;
        if let Some(user) = self
            .friendly_units
            .iter_mut()
            .find_map(|actor| actor.as_user_mut())
        {
            user.add_kills(kills);
        }
        if let Goal::Kills(target) = self.spec.goal {
            if self.hud.kills >= target {
                log::info!("Level {}: kill target {} reached", self.id, target);
            }
        }
    }

    fn remove_all_destroyed_actors(&mut self) {
        let boss_id = self.boss_id;
        remove_destroyed(&mut self.friendly_units, &mut self.events);
        let removed = remove_destroyed(&mut self.enemy_units, &mut self.events);
        remove_destroyed(&mut self.user_projectiles, &mut self.events);
        remove_destroyed(&mut self.enemy_projectiles, &mut self.events);

        if boss_id.is_some_and(|id| removed.contains(&id)) {
            log::info!("Level {}: boss destroyed", self.id);
            self.boss_defeated = true;
        }
    }

    fn update_level_view(&mut self) {
        self.hud.hearts = self
            .friendly_units
            .iter()
            .find(|actor| actor.kind() == ActorKind::UserPlane)
            .map_or(0, Actor::health);

        if let Some(boss_id) = self.boss_id {
            self.hud.boss_health = Some(
                self.enemy_units
                    .iter()
                    .find(|actor| actor.id == boss_id)
                    .map_or(0.0, |boss| {
                        boss.health() as f32 / boss.max_health().max(1) as f32
                    }),
            );
        }
    }

    fn check_if_game_over(&mut self) {
        if self.user_is_destroyed() {
            self.lose_game();
            return;
        }
        let advance = match self.spec.goal {
            Goal::Kills(target) => self.hud.kills >= target,
            Goal::DefeatBoss => self.boss_defeated,
        };
        if !advance {
            return;
        }
        match self.spec.completion.clone() {
            Completion::NextLevel(next) => self.go_to_next_level(next),
            Completion::Victory => self.win_game(),
        }
    }
}

/// Weighted pick; `None` when no variant has positive weight
fn pick_variant(variants: &[SpawnWeight], rng: &mut SimRng) -> Option<PlaneTag> {
    variants
        .choose_weighted(rng, |variant| variant.weight.max(0.0))
        .ok()
        .map(|variant| variant.tag)
}

fn update_group(group: &mut [Actor], rng: &mut SimRng, events: &mut Vec<ViewEvent>) {
    for actor in group.iter_mut() {
        let shielded_before = actor.as_boss().map(BossState::is_shielded);
        actor.update_actor(rng);
        let shielded_after = actor.as_boss().map(BossState::is_shielded);
        if let (Some(before), Some(shielded)) = (shielded_before, shielded_after) {
            if before != shielded {
                events.push(ViewEvent::ShieldChanged {
                    id: actor.id,
                    shielded,
                });
            }
        }
    }
}

/// Drop destroyed actors, queueing a removal event for each. Returns their ids.
fn remove_destroyed(group: &mut Vec<Actor>, events: &mut Vec<ViewEvent>) -> Vec<u32> {
    let mut removed = Vec::new();
    group.retain(|actor| {
        if actor.is_destroyed() {
            removed.push(actor.id);
            false
        } else {
            true
        }
    });
    events.extend(removed.iter().map(|&id| ViewEvent::ActorRemoved { id }));
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels;
    use crate::sim::factory::{ProjectileTag, spawn_projectile};
    use crate::sim::level::LevelSpec;
    use crate::sim::level::test_support::{quiet_spec, started};
    use crate::transition::LevelId;
    use glam::Vec2;
    use rand::SeedableRng;

    fn enemy_at(x: f32, y: f32) -> Actor {
        let mut rng = SimRng::seed_from_u64(0);
        factory::spawn_plane(PlaneTag::Enemy, x, y, &mut rng)
    }

    /// An enemy one tick away from crossing the field, well clear of the player
    fn breaching_enemy() -> Actor {
        let mut enemy = enemy_at(1300.0, 0.0);
        enemy.move_horizontally(-1298.0);
        enemy
    }

    #[test]
    fn test_commands_apply_on_next_tick() {
        let (mut level, _rx) = started(quiet_spec(10, 5), 1);
        let start = level.user().unwrap().position();
        level.handle_command(Command::MoveDown);
        level.handle_command(Command::Fire);
        assert_eq!(level.user().unwrap().position(), start);
        assert!(level.user_projectiles().is_empty());

        level.tick();
        assert_eq!(level.user().unwrap().position(), start + Vec2::new(0.0, 8.0));
        assert_eq!(level.user_projectiles().len(), 1);
        // Spawned from the pre-move position, then moved once
        assert_eq!(level.user_projectiles()[0].position(), Vec2::new(235.0, 340.0));
    }

    #[test]
    fn test_projectile_kill_counts_and_removes() {
        let (mut level, _rx) = started(quiet_spec(10, 5), 1);
        let enemy_id = level.add_enemy_unit(enemy_at(600.0, 300.0));
        level.add_user_projectile(spawn_projectile(ProjectileTag::User, 600.0, 320.0));
        level.drain_events();

        level.tick();

        assert!(level.enemy_units().is_empty());
        assert!(level.user_projectiles().is_empty());
        assert_eq!(level.hud().kills, 1);
        assert_eq!(level.user().unwrap().as_user().unwrap().kills(), 1);
        assert_eq!(level.user().unwrap().health(), 5);
        assert!(level
            .drain_events()
            .contains(&ViewEvent::ActorRemoved { id: enemy_id }));
        assert_eq!(level.phase(), LevelPhase::Running);
    }

    #[test]
    fn test_ramming_and_enemy_fire_hit_player_once() {
        let (mut level, _rx) = started(quiet_spec(10, 5), 1);
        level.add_enemy_unit(enemy_at(60.0, 300.0));
        let shot = spawn_projectile(ProjectileTag::Enemy, 100.0, 320.0);
        let shot_id = level.add_enemy_projectile(shot);

        level.tick();

        // The ram lands first; the shot arrives inside the invulnerability window
        assert_eq!(level.user().unwrap().health(), 4);
        assert_eq!(level.hud().hearts, 4);
        assert_eq!(level.hud().kills, 1);
        assert!(level.enemy_units().is_empty());
        assert!(level.enemy_projectiles().iter().all(|shot| shot.id != shot_id));

        level.tick();
        level.tick();
        assert_eq!(level.hud().kills, 1);
        assert_eq!(level.user().unwrap().as_user().unwrap().kills(), 1);
        assert_eq!(level.user().unwrap().health(), 4);
    }

    #[test]
    fn test_penetration_bypasses_invulnerability() {
        let (mut level, _rx) = started(quiet_spec(10, 5), 1);
        level.friendly_units[0].take_damage();
        assert!(level.user().unwrap().as_user().unwrap().is_invulnerable());
        level.add_enemy_unit(breaching_enemy());

        level.tick();

        assert_eq!(level.user().unwrap().health(), 3);
        assert_eq!(level.hud().hearts, 3);
        assert_eq!(level.hud().kills, 0);
        assert!(level.enemy_units().is_empty());
    }

    #[test]
    fn test_penetration_flags_enemy() {
        let (mut level, _rx) = started(quiet_spec(10, 5), 1);
        level.add_enemy_unit(breaching_enemy());
        level.update_actors();
        level.handle_enemy_penetration();
        let enemy = &level.enemy_units()[0];
        assert!(enemy.is_destroyed());
        assert!(enemy.is_penetrated());
        assert_eq!(collision::count_kills(level.enemy_units()), 0);
    }

    #[test]
    fn test_zero_health_loses_and_halts() {
        let (mut level, _rx) = started(quiet_spec(10, 1), 1);
        level.add_enemy_unit(breaching_enemy());
        level.tick();

        assert_eq!(level.phase(), LevelPhase::Lost);
        assert!(level.user().is_none());
        assert_eq!(level.hud().hearts, 0);
        assert!(!level.clock().is_running());
        assert!(level.drain_events().contains(&ViewEvent::ShowLose));

        let ticks = level.ticks();
        level.add_enemy_unit(enemy_at(600.0, 300.0));
        level.tick();
        assert_eq!(level.advance(std::time::Duration::from_secs(1)), 0);
        assert_eq!(level.ticks(), ticks);
        assert_eq!(level.enemy_units()[0].translate(), Vec2::ZERO);
    }

    #[test]
    fn test_kill_target_requests_transition_once() {
        let (mut level, rx) = started(quiet_spec(1, 5), 1);
        level.add_enemy_unit(enemy_at(600.0, 300.0));
        level.add_user_projectile(spawn_projectile(ProjectileTag::User, 600.0, 320.0));

        level.tick();
        assert_eq!(level.phase(), LevelPhase::Advanced);
        assert!(!level.clock().is_running());
        let request = rx.try_recv().unwrap();
        assert_eq!(request.from, LevelId::from("test"));
        assert_eq!(request.to, LevelId::from("next"));

        level.tick();
        level.advance(std::time::Duration::from_secs(1));
        assert!(rx.try_recv().is_err());
    }

    fn boss_spec() -> LevelSpec {
        levels::level_boss()
    }

    #[test]
    fn test_boss_spawns_and_defeat_wins() {
        let (mut level, _rx) = started(boss_spec(), 3);
        level.tick();
        assert_eq!(level.enemy_units().len(), 1);
        assert_eq!(level.enemy_units()[0].kind(), ActorKind::Boss);
        assert_eq!(level.hud().boss_health, Some(1.0));
        assert_eq!(level.hud().kill_target, None);

        level.enemy_units[0].destroy();
        level.tick();

        assert_eq!(level.phase(), LevelPhase::Won);
        assert_eq!(level.hud().boss_health, Some(0.0));
        assert!(level.drain_events().contains(&ViewEvent::ShowWin));
        assert!(level.enemy_units().is_empty());
    }

    #[test]
    fn test_boss_health_ratio_tracks_damage() {
        let (mut level, _rx) = started(boss_spec(), 3);
        level.tick();
        if let Some(boss) = level.enemy_units[0].as_boss_mut() {
            boss.deactivate_shield();
        }
        for _ in 0..5 {
            level.enemy_units[0].take_damage();
        }
        level.update_level_view();
        assert_eq!(level.hud().boss_health, Some(20.0 / 25.0));
    }

    #[test]
    fn test_wave_spawns_respect_cap() {
        let (mut level, _rx) = started(levels::level_two(), 42);
        let mut seen = Vec::new();
        for _ in 0..400 {
            level.tick();
            assert!(level.enemy_units().len() <= 5);
            for enemy in level.enemy_units() {
                assert!(matches!(enemy.kind(), ActorKind::Enemy | ActorKind::Enemy2));
                seen.push(enemy.kind());
            }
            if level.phase() != LevelPhase::Running {
                break;
            }
        }
        assert!(seen.contains(&ActorKind::Enemy));
    }

    #[test]
    fn test_spawn_position_within_field() {
        let (mut level, _rx) = started(levels::level_one(), 9);
        for _ in 0..50 {
            level.spawn_enemy_units();
        }
        for enemy in level.enemy_units() {
            assert_eq!(enemy.layout().x, 1300.0);
            assert!((0.0..600.0).contains(&enemy.layout().y));
        }
    }

    #[test]
    fn test_stray_projectiles_are_cleaned_up() {
        let (mut level, _rx) = started(quiet_spec(10, 5), 1);
        level.add_user_projectile(spawn_projectile(ProjectileTag::User, 1295.0, 10.0));
        level.add_enemy_projectile(spawn_projectile(ProjectileTag::Enemy, -25.0, 10.0));
        level.tick();
        assert!(level.user_projectiles().is_empty());
        assert!(level.enemy_projectiles().is_empty());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let (mut level, _rx) = started(levels::level_two(), seed);
            for i in 0..200 {
                if i % 3 == 0 {
                    level.handle_command(Command::Fire);
                }
                level.tick();
            }
            (level.ticks(), *level.hud(), level.enemy_units().len())
        };
        assert_eq!(run(11), run(11));
    }
}
