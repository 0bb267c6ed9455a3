//! Collision detection and damage between actor groups
//!
//! Plain O(n·m) bounding-box sweeps. Level populations stay small (a handful
//! of enemies and a few dozen shots), so there is no spatial partitioning.

use super::actor::Actor;

/// Index pairs `(i, j)` where `a[i]` and `b[j]` overlap. Destroyed actors never pair.
pub fn overlapping_pairs(a: &[Actor], b: &[Actor]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, actor) in a.iter().enumerate() {
        if actor.is_destroyed() {
            continue;
        }
        let bounds = actor.bounds();
        for (j, other) in b.iter().enumerate() {
            if !other.is_destroyed() && bounds.intersects(&other.bounds()) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Damage both members of every overlapping pair exactly once.
///
/// Pairs are collected before any damage is applied, so the result does not
/// depend on which group is passed first or on iteration order.
/// Returns the number of pairs that collided.
pub fn resolve(a: &mut [Actor], b: &mut [Actor]) -> usize {
    let pairs = overlapping_pairs(a, b);
    for &(i, j) in &pairs {
        a[i].take_damage();
        b[j].take_damage();
    }
    pairs.len()
}

/// Enemies destroyed in combat: destroyed and not penetrated
pub fn count_kills(enemies: &[Actor]) -> u32 {
    enemies
        .iter()
        .filter(|enemy| enemy.is_destroyed() && !enemy.is_penetrated())
        .count() as u32
}
