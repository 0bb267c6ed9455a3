//! Level controller
//!
//! Owns the active level, the transition channel and the level registry.
//! Levels only ever ask to move on; the controller decides what that means.

use std::time::Duration;

use rand::{Rng, SeedableRng};

use crate::error::TransitionError;
use crate::settings::Settings;
use crate::sim::{Command, Level, SimRng};
use crate::transition::{
    LevelId, LevelRegistry, TransitionReceiver, TransitionSender, channel,
};

pub struct Controller {
    settings: Settings,
    registry: LevelRegistry,
    /// Master RNG; each level gets a seed drawn from it
    rng: SimRng,
    sender: TransitionSender,
    receiver: TransitionReceiver,
    level: Option<Level>,
    /// Shown to the player as an error dialog until dismissed
    last_error: Option<TransitionError>,
}

impl Controller {
    pub fn new(settings: Settings, registry: LevelRegistry) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Controller seeded with {}", seed);
        let (sender, receiver) = channel();
        Self {
            settings,
            registry,
            rng: SimRng::seed_from_u64(seed),
            sender,
            receiver,
            level: None,
            last_error: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start the configured first level
    pub fn launch(&mut self) -> Result<(), TransitionError> {
        let start = LevelId::new(self.settings.start_level.clone());
        self.go_to_level(start)
    }

    /// Build and start `id`, replacing the current level.
    /// On failure the current level is left exactly as it was.
    pub fn go_to_level(&mut self, id: LevelId) -> Result<(), TransitionError> {
        let spec = self.registry.resolve(&id)?;
        let seed = self.rng.random();
        let mut level = Level::new(id, spec, &self.settings, seed, self.sender.clone());
        level.start();
        self.level = Some(level);
        Ok(())
    }

    /// Feed wall time to the active level, then act on any transition it
    /// requested. Returns the number of ticks run.
    ///
    /// View events are left queued on the level; the host drains them with
    /// `level_mut()` and [`Level::drain_events`] after each call.
    pub fn update(&mut self, elapsed: Duration) -> u32 {
        let ticks = self.level.as_mut().map_or(0, |level| level.advance(elapsed));
        self.process_transitions();
        ticks
    }

    /// Resolve every queued transition request
    pub fn process_transitions(&mut self) {
        while let Ok(request) = self.receiver.try_recv() {
            log::info!("Transition {} -> {}", request.from, request.to);
            if let Err(err) = self.go_to_level(request.to) {
                log::error!("Level transition from {} failed: {}", request.from, err);
                self.last_error = Some(err);
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) {
        if let Some(level) = self.level.as_mut() {
            level.handle_command(command);
        }
    }

    /// Rebuild the current level from scratch
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        let Some(id) = self.level.as_ref().map(|level| level.id().clone()) else {
            return Ok(());
        };
        log::info!("Retrying level {}", id);
        self.go_to_level(id)
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }

    pub fn last_error(&self) -> Option<&TransitionError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) -> Option<TransitionError> {
        self.last_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels;
    use crate::sim::{ActorKind, Completion, Goal, LevelPhase, LevelSpec, SpawnPolicy, ViewEvent};

    const TICK: Duration = Duration::from_millis(50);

    fn seeded(seed: u64) -> Settings {
        Settings {
            seed: Some(seed),
            ..Settings::default()
        }
    }

    /// Advances on its first tick, since zero kills already meets the target
    fn instant(next: &str) -> LevelSpec {
        LevelSpec {
            background: "test.jpg".into(),
            player_health: 5,
            goal: Goal::Kills(0),
            completion: Completion::NextLevel(LevelId::from(next)),
            spawn: SpawnPolicy::Waves {
                max_enemies: 0,
                spawn_chance: 0.0,
                variants: Vec::new(),
            },
        }
    }

    #[test]
    fn test_launch_starts_configured_level() {
        let mut controller = Controller::new(seeded(1), LevelRegistry::standard());
        controller.launch().unwrap();
        let level = controller.level().unwrap();
        assert_eq!(level.id().as_str(), levels::LEVEL_ONE);
        assert_eq!(level.phase(), LevelPhase::Running);
    }

    #[test]
    fn test_launch_unknown_start_level() {
        let settings = Settings {
            start_level: "nowhere".into(),
            ..seeded(1)
        };
        let mut controller = Controller::new(settings, LevelRegistry::standard());
        let err = controller.launch().unwrap_err();
        assert_eq!(err, TransitionError::InvalidTarget(LevelId::from("nowhere")));
        assert!(controller.level().is_none());
    }

    #[test]
    fn test_transition_request_builds_next_level() {
        let mut registry = LevelRegistry::new();
        registry
            .register("a", || instant("b"))
            .register("b", levels::level_one);
        let settings = Settings {
            start_level: "a".into(),
            ..seeded(5)
        };
        let mut controller = Controller::new(settings, registry);
        controller.launch().unwrap();

        assert_eq!(controller.update(TICK), 1);
        let level = controller.level().unwrap();
        assert_eq!(level.id().as_str(), "b");
        assert_eq!(level.phase(), LevelPhase::Running);
        assert_eq!(level.ticks(), 0);
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_invalid_target_keeps_current_level() {
        let mut registry = LevelRegistry::new();
        registry.register("a", || instant("missing"));
        let settings = Settings {
            start_level: "a".into(),
            ..seeded(5)
        };
        let mut controller = Controller::new(settings, registry);
        controller.launch().unwrap();
        controller.update(TICK);

        let level = controller.level().unwrap();
        assert_eq!(level.id().as_str(), "a");
        assert_eq!(level.phase(), LevelPhase::Advanced);
        assert_eq!(
            controller.last_error(),
            Some(&TransitionError::InvalidTarget(LevelId::from("missing")))
        );

        // Gameplay stays halted
        assert_eq!(controller.update(Duration::from_secs(1)), 0);
        assert!(controller.dismiss_error().is_some());
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_view_events_queue_until_drained() {
        let mut controller = Controller::new(seeded(8), LevelRegistry::standard());
        controller.launch().unwrap();
        for _ in 0..20 {
            controller.handle_command(Command::Fire);
            controller.update(TICK);
        }

        let level = controller.level_mut().unwrap();
        let events = level.drain_events();
        assert!(events.len() >= 2);
        assert!(events.contains(&ViewEvent::ActorAdded { id: 1, kind: ActorKind::UserPlane }));
        assert!(level.drain_events().is_empty());

        controller.update(TICK);
        let queued = controller.level_mut().unwrap().drain_events();
        assert!(!queued.contains(&ViewEvent::ActorAdded { id: 1, kind: ActorKind::UserPlane }));
    }

    #[test]
    fn test_retry_rebuilds_current_level() {
        let mut controller = Controller::new(seeded(3), LevelRegistry::standard());
        controller.launch().unwrap();
        controller.update(Duration::from_millis(200));
        assert!(controller.level().unwrap().ticks() > 0);

        controller.retry().unwrap();
        let level = controller.level().unwrap();
        assert_eq!(level.id().as_str(), levels::LEVEL_ONE);
        assert_eq!(level.ticks(), 0);
        assert_eq!(level.hud().hearts, 5);
        assert_eq!(level.phase(), LevelPhase::Running);
    }

    #[test]
    fn test_seed_makes_runs_reproducible() {
        let run = || {
            let mut controller = Controller::new(seeded(77), LevelRegistry::standard());
            controller.launch().unwrap();
            for i in 0..300 {
                if i % 2 == 0 {
                    controller.handle_command(Command::Fire);
                }
                controller.update(TICK);
            }
            let level = controller.level().unwrap();
            (level.id().clone(), *level.hud(), level.enemy_units().len())
        };
        assert_eq!(run(), run());
    }
}
