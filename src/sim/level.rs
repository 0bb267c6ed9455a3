//! Level state machine
//!
//! A level owns its four actor collections, its clock and its RNG. It is
//! built once per transition and dropped when the controller moves on.
//! The per-tick pipeline lives in `tick.rs`.

use std::time::Duration;

use rand::SeedableRng;
use serde::Serialize;

use super::SimRng;
use super::actor::{Actor, ActorKind};
use super::clock::GameClock;
use super::factory::{self, PlaneTag};
use super::tick::Command;
use crate::consts::SCREEN_HEIGHT_ADJUSTMENT;
use crate::settings::Settings;
use crate::transition::{LevelId, TransitionRequest, TransitionSender};

/// Lifecycle phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    /// Collections built, player placed, clock not yet started
    Initializing,
    Running,
    Paused,
    Won,
    Lost,
    /// Advance predicate fired and the transition request was sent
    Advanced,
}

impl LevelPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelPhase::Won | LevelPhase::Lost | LevelPhase::Advanced)
    }
}

/// What the level needs to see before it is complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Kills(u32),
    DefeatBoss,
}

/// What happens once the goal is met
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    NextLevel(LevelId),
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnWeight {
    pub tag: PlaneTag,
    pub weight: f64,
}

impl SpawnWeight {
    pub fn new(tag: PlaneTag, weight: f64) -> Self {
        Self { tag, weight }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnPolicy {
    /// Each tick, every free slot below `max_enemies` rolls `spawn_chance`
    /// and, on success, picks a variant by weight
    Waves {
        max_enemies: usize,
        spawn_chance: f64,
        variants: Vec<SpawnWeight>,
    },
    /// A single boss whenever the enemy collection is empty
    Boss,
}

impl SpawnPolicy {
    pub fn max_enemies(&self) -> usize {
        match self {
            SpawnPolicy::Waves { max_enemies, .. } => *max_enemies,
            SpawnPolicy::Boss => 1,
        }
    }
}

/// Everything that distinguishes one stage from another
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSpec {
    /// Background identity, resolved by the view
    pub background: String,
    pub player_health: u32,
    pub goal: Goal,
    pub completion: Completion,
    pub spawn: SpawnPolicy,
}

/// Numbers the view shows every tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Hud {
    /// Remaining player health (one heart each)
    pub hearts: u32,
    pub kills: u32,
    /// Only for kill-target levels
    pub kill_target: Option<u32>,
    /// In [0, 1] once a boss has spawned
    pub boss_health: Option<f32>,
}

/// Scene changes for the external view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewEvent {
    ActorAdded { id: u32, kind: ActorKind },
    ActorRemoved { id: u32 },
    ShieldChanged { id: u32, shielded: bool },
    ShowWin,
    ShowLose,
}

/// Choices offered once a level is won or lost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOption {
    Exit,
    Retry,
}

/// Play field extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    /// Lowest y an enemy may spawn at
    pub fn enemy_maximum_y(&self) -> f32 {
        (self.height - SCREEN_HEIGHT_ADJUSTMENT).max(0.0)
    }
}

pub struct Level {
    pub(super) id: LevelId,
    pub(super) spec: LevelSpec,
    pub(super) field: Field,
    pub(super) phase: LevelPhase,
    pub(super) clock: GameClock,
    pub(super) rng: SimRng,
    pub(super) friendly_units: Vec<Actor>,
    pub(super) enemy_units: Vec<Actor>,
    pub(super) user_projectiles: Vec<Actor>,
    pub(super) enemy_projectiles: Vec<Actor>,
    pub(super) pending: Vec<Command>,
    pub(super) events: Vec<ViewEvent>,
    pub(super) hud: Hud,
    pub(super) boss_id: Option<u32>,
    pub(super) boss_defeated: bool,
    pub(super) ticks: u64,
    transitions: TransitionSender,
    next_id: u32,
}

impl Level {
    /// Build the collections and place the player. The level stays in
    /// `Initializing` until [`Level::start`].
    pub fn new(
        id: LevelId,
        spec: LevelSpec,
        settings: &Settings,
        seed: u64,
        transitions: TransitionSender,
    ) -> Self {
        let kill_target = match spec.goal {
            Goal::Kills(target) => Some(target),
            Goal::DefeatBoss => None,
        };
        let player_health = spec.player_health;
        let mut level = Self {
            id,
            spec,
            field: Field {
                width: settings.screen_width,
                height: settings.screen_height,
            },
            phase: LevelPhase::Initializing,
            clock: GameClock::from_millis(settings.tick_millis),
            rng: SimRng::seed_from_u64(seed),
            friendly_units: Vec::new(),
            enemy_units: Vec::new(),
            user_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            pending: Vec::new(),
            events: Vec::new(),
            hud: Hud {
                hearts: player_health,
                kills: 0,
                kill_target,
                boss_health: None,
            },
            boss_id: None,
            boss_defeated: false,
            ticks: 0,
            transitions,
            next_id: 1,
        };
        let user = factory::create_user_plane(player_health);
        level.add_friendly_unit(user);
        log::info!(
            "Level {} ready: health={}, goal={:?}, seed={}",
            level.id,
            player_health,
            level.spec.goal,
            seed
        );
        level
    }

    pub fn id(&self) -> &LevelId {
        &self.id
    }

    pub fn spec(&self) -> &LevelSpec {
        &self.spec
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn phase(&self) -> LevelPhase {
        self.phase
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Ticks executed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn friendly_units(&self) -> &[Actor] {
        &self.friendly_units
    }

    pub fn enemy_units(&self) -> &[Actor] {
        &self.enemy_units
    }

    pub fn user_projectiles(&self) -> &[Actor] {
        &self.user_projectiles
    }

    pub fn enemy_projectiles(&self) -> &[Actor] {
        &self.enemy_projectiles
    }

    /// The player's plane, while it is still in play
    pub fn user(&self) -> Option<&Actor> {
        self.friendly_units
            .iter()
            .find(|actor| actor.kind() == ActorKind::UserPlane)
    }

    pub fn user_is_destroyed(&self) -> bool {
        self.user().map_or(true, Actor::is_destroyed)
    }

    /// Take all view events queued since the last drain.
    ///
    /// The queue is unbounded: every spawn, shot and removal adds to it, so
    /// a host must drain once per frame even if it ignores the events.
    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn end_options(&self) -> &'static [EndOption] {
        match self.phase {
            LevelPhase::Won | LevelPhase::Lost => &[EndOption::Exit, EndOption::Retry],
            _ => &[],
        }
    }

    pub fn start(&mut self) {
        if self.phase == LevelPhase::Initializing {
            self.phase = LevelPhase::Running;
            self.clock.start();
        }
    }

    /// Capture a player command. Commands are applied at the start of the
    /// next tick; while paused, any command resumes play and is dropped.
    pub fn handle_command(&mut self, command: Command) {
        match self.phase {
            LevelPhase::Paused => self.resume(),
            LevelPhase::Running if command == Command::TogglePause => self.pause(),
            LevelPhase::Running => self.pending.push(command),
            _ => {}
        }
    }

    pub fn pause(&mut self) {
        if self.phase == LevelPhase::Running {
            self.clock.pause();
            self.phase = LevelPhase::Paused;
            log::debug!("Level {} paused at tick {}", self.id, self.ticks);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == LevelPhase::Paused {
            self.clock.resume();
            self.phase = LevelPhase::Running;
            log::debug!("Level {} resumed", self.id);
        }
    }

    /// Feed wall time to the clock and run every tick that falls due.
    /// Returns the number of ticks executed.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let due = self.clock.advance(elapsed);
        let mut ran = 0;
        for _ in 0..due {
            // A halt requested by the previous tick wins over the backlog
            if !self.clock.is_running() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    pub fn add_friendly_unit(&mut self, actor: Actor) -> u32 {
        let id = self.adopt(actor.kind());
        push_with_id(&mut self.friendly_units, actor, id);
        id
    }

    pub fn add_enemy_unit(&mut self, actor: Actor) -> u32 {
        let id = self.adopt(actor.kind());
        push_with_id(&mut self.enemy_units, actor, id);
        id
    }

    pub fn add_user_projectile(&mut self, actor: Actor) -> u32 {
        let id = self.adopt(actor.kind());
        push_with_id(&mut self.user_projectiles, actor, id);
        id
    }

    pub fn add_enemy_projectile(&mut self, actor: Actor) -> u32 {
        let id = self.adopt(actor.kind());
        push_with_id(&mut self.enemy_projectiles, actor, id);
        id
    }

    fn adopt(&mut self, kind: ActorKind) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(ViewEvent::ActorAdded { id, kind });
        id
    }

    pub(super) fn win_game(&mut self) {
        self.clock.stop();
        self.phase = LevelPhase::Won;
        self.events.push(ViewEvent::ShowWin);
        log::info!("Level {} won after {} ticks", self.id, self.ticks);
    }

    pub(super) fn lose_game(&mut self) {
        self.clock.stop();
        self.phase = LevelPhase::Lost;
        self.events.push(ViewEvent::ShowLose);
        log::info!("Level {} lost after {} ticks", self.id, self.ticks);
    }

    /// Stop this level and ask the controller for `next`
    pub(super) fn go_to_next_level(&mut self, next: LevelId) {
        self.clock.stop();
        self.phase = LevelPhase::Advanced;
        log::info!("Level {} complete, requesting {}", self.id, next);
        let request = TransitionRequest {
            from: self.id.clone(),
            to: next,
        };
        if self.transitions.send(request).is_err() {
            log::warn!("Level {}: transition listener is gone", self.id);
        }
    }
}

fn push_with_id(collection: &mut Vec<Actor>, mut actor: Actor, id: u32) {
    actor.id = id;
    collection.push(actor);
}
