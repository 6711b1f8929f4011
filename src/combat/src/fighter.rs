use crate::equipment::Bonuses;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Hit points and base combat stats. Effective stats add the bonuses of
/// whatever is equipped at the time of the call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    /// May drop below zero.
    pub hp: i32,
    pub base_max_hp: i32,
    pub base_defense: i32,
    pub base_power: i32,
    /// Experience granted to whoever kills this fighter.
    pub xp: u32,
}

impl Fighter {
    pub fn new(hp: i32, defense: i32, power: i32, xp: u32) -> Self {
        Self {
            hp,
            base_max_hp: hp,
            base_defense: defense,
            base_power: power,
            xp,
        }
    }

    pub fn max_hp(&self, bonuses: Bonuses) -> i32 {
        self.base_max_hp + bonuses.max_hp
    }

    pub fn power(&self, bonuses: Bonuses) -> i32 {
        self.base_power + bonuses.power
    }

    pub fn defense(&self, bonuses: Bonuses) -> i32 {
        self.base_defense + bonuses.defense
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Returns true only for the hit that takes hp from above zero to zero
    /// or below. Negative amounts are treated as zero.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.hp -= amount.max(0);
        was_alive && !self.is_alive()
    }

    pub fn heal(&mut self, amount: i32, max_hp: i32) {
        self.hp = (self.hp + amount.max(0)).min(max_hp);
    }
}

/// Stat picked from the level-up menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
pub enum LevelUpChoice {
    #[strum(to_string = "Constitution")]
    Hp,
    #[strum(to_string = "Strength")]
    Str,
    #[strum(to_string = "Agility")]
    Def,
}

impl LevelUpChoice {
    pub fn apply(self, fighter: &mut Fighter) {
        match self {
            LevelUpChoice::Hp => {
                fighter.base_max_hp += 20;
                fighter.hp += 20;
            }
            LevelUpChoice::Str => fighter.base_power += 1,
            LevelUpChoice::Def => fighter.base_defense += 1,
        }
    }
}
