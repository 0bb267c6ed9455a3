//! Stock stage definitions

use crate::consts::PLAYER_INITIAL_HEALTH;
use crate::sim::{Completion, Goal, LevelSpec, PlaneTag, SpawnPolicy, SpawnWeight};
use crate::transition::LevelId;

pub const LEVEL_ONE: &str = "level_one";
pub const LEVEL_TWO: &str = "level_two";
pub const LEVEL_BOSS: &str = "level_boss";

const TOTAL_ENEMIES: usize = 5;
const KILLS_TO_ADVANCE: u32 = 10;
const ENEMY_SPAWN_PROBABILITY: f64 = 0.20;
const ENEMY2_SPAWN_PROBABILITY: f64 = 0.4;

pub fn level_one() -> LevelSpec {
    LevelSpec {
        background: "background1.jpg".to_string(),
        player_health: PLAYER_INITIAL_HEALTH,
        goal: Goal::Kills(KILLS_TO_ADVANCE),
        completion: Completion::NextLevel(LevelId::from(LEVEL_TWO)),
        spawn: SpawnPolicy::Waves {
            max_enemies: TOTAL_ENEMIES,
            spawn_chance: ENEMY_SPAWN_PROBABILITY,
            variants: vec![SpawnWeight::new(PlaneTag::Enemy, 1.0)],
        },
    }
}

pub fn level_two() -> LevelSpec {
    LevelSpec {
        background: "background2.jpg".to_string(),
        player_health: PLAYER_INITIAL_HEALTH,
        goal: Goal::Kills(KILLS_TO_ADVANCE),
        completion: Completion::NextLevel(LevelId::from(LEVEL_BOSS)),
        spawn: SpawnPolicy::Waves {
            max_enemies: TOTAL_ENEMIES,
            spawn_chance: ENEMY_SPAWN_PROBABILITY,
            variants: vec![
                SpawnWeight::new(PlaneTag::Enemy, 1.0 - ENEMY2_SPAWN_PROBABILITY),
                SpawnWeight::new(PlaneTag::Enemy2, ENEMY2_SPAWN_PROBABILITY),
            ],
        },
    }
}

pub fn level_boss() -> LevelSpec {
    LevelSpec {
        background: "background2.jpg".to_string(),
        player_health: PLAYER_INITIAL_HEALTH,
        goal: Goal::DefeatBoss,
        completion: Completion::Victory,
        spawn: SpawnPolicy::Boss,
    }
}
