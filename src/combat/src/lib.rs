//! Combat rules: fighters, equipment bonuses, experience, monster AI and
//! item effects. Nothing here knows about the entity store; callers pass
//! in ids and positions.

pub mod ai;
pub mod effect;
pub mod equipment;
pub mod fighter;
pub mod level;

pub use crate::ai::{Ai, ConfusedTurn};
pub use crate::effect::{ItemEffect, distance};
pub use crate::equipment::{Bonuses, EquipChange, Equipment, EquipmentSlot, Equippable};
pub use crate::fighter::{Fighter, LevelUpChoice};
pub use crate::level::Level;

/// Anything that can trade blows.
pub trait Combatant {
    fn name(&self) -> &str;

    /// Effective power, equipment included.
    fn power(&self) -> i32;

    /// Effective defense, equipment included.
    fn defense(&self) -> i32;
}

/// A fighter together with its name and current equipment bonuses.
pub struct StatBlock<'a> {
    pub name: &'a str,
    pub fighter: &'a Fighter,
    pub bonuses: Bonuses,
}

impl Combatant for StatBlock<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn power(&self) -> i32 {
        self.fighter.power(self.bonuses)
    }

    fn defense(&self) -> i32 {
        self.fighter.defense(self.bonuses)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackReport {
    /// Zero or less means the blow had no effect.
    pub damage: i32,
    pub message: String,
}

/// Handles combat interactions between entities.
pub struct Combat;

impl Combat {
    pub fn damage<A: Combatant, D: Combatant>(attacker: &A, defender: &D) -> i32 {
        attacker.power() - defender.defense()
    }

    pub fn resolve_attack<A: Combatant, D: Combatant>(attacker: &A, defender: &D) -> AttackReport {
        let damage = Self::damage(attacker, defender);
        let message = if damage > 0 {
            format!(
                "{} attacks {} for {} hit points.",
                capitalize(attacker.name()),
                defender.name(),
                damage
            )
        } else {
            format!(
                "{} attacks {} but does no damage.",
                capitalize(attacker.name()),
                defender.name()
            )
        };
        AttackReport { damage, message }
    }
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
