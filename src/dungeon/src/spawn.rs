//! Level-dependent spawn tables and weighted random selection.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// `(value, minimum dungeon level)` breakpoints, sorted by level.
pub type Breakpoints = &'static [(u32, u32)];

/// Value of the highest breakpoint whose level requirement is met, or 0.
pub fn from_dungeon_level(table: &[(u32, u32)], dungeon_level: u32) -> u32 {
    table
        .iter()
        .rev()
        .find(|&&(_, level)| dungeon_level >= level)
        .map_or(0, |&(value, _)| value)
}

/// Draws an integer in `[1, sum]` and returns the first index whose running
/// weight total reaches it. `None` when every weight is zero.
pub fn random_choice_index(rng: &mut impl Rng, weights: &[u32]) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let draw = rng.random_range(1..=total);
    let mut running = 0;
    weights.iter().position(|&w| {
        running += w;
        running >= draw
    })
}

/// Weighted pick over `(choice, weight)` pairs.
pub fn random_choice<T: Copy>(rng: &mut impl Rng, chances: &[(T, u32)]) -> Option<T> {
    let weights: Vec<u32> = chances.iter().map(|&(_, w)| w).collect();
    random_choice_index(rng, &weights).map(|i| chances[i].0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Orc,
    Troll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    HealingPotion,
    Sword,
    Shield,
    LightningScroll,
    FireballScroll,
    ConfusionScroll,
}

pub const MAX_MONSTERS_PER_ROOM: Breakpoints = &[(2, 1), (3, 4), (5, 6)];
pub const MAX_ITEMS_PER_ROOM: Breakpoints = &[(1, 1), (2, 4)];

const MONSTER_CHANCES: &[(MonsterKind, Breakpoints)] = &[
    (MonsterKind::Orc, &[(80, 1)]),
    (MonsterKind::Troll, &[(15, 3), (30, 5), (60, 7)]),
];

const ITEM_CHANCES: &[(ItemKind, Breakpoints)] = &[
    (ItemKind::HealingPotion, &[(70, 1)]),
    (ItemKind::Sword, &[(5, 4)]),
    (ItemKind::Shield, &[(15, 8)]),
    (ItemKind::LightningScroll, &[(25, 4)]),
    (ItemKind::FireballScroll, &[(25, 6)]),
    (ItemKind::ConfusionScroll, &[(10, 2)]),
];

pub fn monster_chances(dungeon_level: u32) -> Vec<(MonsterKind, u32)> {
    MONSTER_CHANCES
        .iter()
        .map(|&(kind, table)| (kind, from_dungeon_level(table, dungeon_level)))
        .collect()
}

pub fn item_chances(dungeon_level: u32) -> Vec<(ItemKind, u32)> {
    ITEM_CHANCES
        .iter()
        .map(|&(kind, table)| (kind, from_dungeon_level(table, dungeon_level)))
        .collect()
}
