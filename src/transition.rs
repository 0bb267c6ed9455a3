//! Level transition protocol
//!
//! A level never builds its successor. When its advance predicate fires it
//! sends a [`TransitionRequest`] naming the next level on a channel owned by
//! the controller, which resolves the name through a [`LevelRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc;

use crate::error::TransitionError;
use crate::levels;
use crate::sim::LevelSpec;

/// Opaque level identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LevelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// "Go to level X", sent by a finished level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub from: LevelId,
    pub to: LevelId,
}

pub type TransitionSender = mpsc::Sender<TransitionRequest>;
pub type TransitionReceiver = mpsc::Receiver<TransitionRequest>;

pub fn channel() -> (TransitionSender, TransitionReceiver) {
    mpsc::channel()
}

type LevelBuilder = Box<dyn Fn() -> LevelSpec>;

/// Maps level identifiers to constructors
#[derive(Default)]
pub struct LevelRegistry {
    builders: HashMap<LevelId, LevelBuilder>,
}

impl LevelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three stock stages: two kill-target levels and the boss fight
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(levels::LEVEL_ONE, levels::level_one)
            .register(levels::LEVEL_TWO, levels::level_two)
            .register(levels::LEVEL_BOSS, levels::level_boss);
        registry
    }

    pub fn register(
        &mut self,
        id: impl Into<LevelId>,
        builder: impl Fn() -> LevelSpec + 'static,
    ) -> &mut Self {
        self.builders.insert(id.into(), Box::new(builder));
        self
    }

    pub fn contains(&self, id: &LevelId) -> bool {
        self.builders.contains_key(id)
    }

    pub fn resolve(&self, id: &LevelId) -> Result<LevelSpec, TransitionError> {
        self.builders
            .get(id)
            .map(|build| build())
            .ok_or_else(|| TransitionError::InvalidTarget(id.clone()))
    }
}

impl fmt::Debug for LevelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.builders.keys().map(LevelId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("LevelRegistry").field("levels", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Completion, Goal};

    #[test]
    fn test_standard_registry_chain() {
        let registry = LevelRegistry::standard();
        let one = registry.resolve(&LevelId::from(levels::LEVEL_ONE)).unwrap();
        assert_eq!(one.goal, Goal::Kills(10));
        assert_eq!(one.completion, Completion::NextLevel(LevelId::from(levels::LEVEL_TWO)));

        let two = registry.resolve(&LevelId::from(levels::LEVEL_TWO)).unwrap();
        assert_eq!(two.completion, Completion::NextLevel(LevelId::from(levels::LEVEL_BOSS)));

        let boss = registry.resolve(&LevelId::from(levels::LEVEL_BOSS)).unwrap();
        assert_eq!(boss.goal, Goal::DefeatBoss);
        assert_eq!(boss.completion, Completion::Victory);
    }

    #[test]
    fn test_unknown_level_is_invalid_target() {
        let registry = LevelRegistry::standard();
        let err = registry.resolve(&LevelId::from("level_nine")).unwrap_err();
        assert_eq!(err, TransitionError::InvalidTarget(LevelId::from("level_nine")));
        assert_eq!(err.to_string(), "no level registered under 'level_nine'");
    }

    #[test]
    fn test_channel_delivers_requests() {
        let (tx, rx) = channel();
        tx.send(TransitionRequest {
            from: LevelId::from("a"),
            to: LevelId::from("b"),
        })
        .unwrap();
        assert_eq!(rx.try_recv().unwrap().to, LevelId::from("b"));
        assert!(rx.try_recv().is_err());
    }
}
