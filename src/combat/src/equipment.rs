use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;
use strum::{Display, EnumIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum EquipmentSlot {
    #[strum(to_string = "main hand")]
    MainHand,
    #[strum(to_string = "off hand")]
    OffHand,
}

/// Stat modifiers granted while equipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonuses {
    pub power: i32,
    pub defense: i32,
    pub max_hp: i32,
}

impl Add for Bonuses {
    type Output = Bonuses;

    fn add(self, rhs: Bonuses) -> Bonuses {
        Bonuses {
            power: self.power + rhs.power,
            defense: self.defense + rhs.defense,
            max_hp: self.max_hp + rhs.max_hp,
        }
    }
}

impl Sum for Bonuses {
    fn sum<I: Iterator<Item = Bonuses>>(iter: I) -> Bonuses {
        iter.fold(Bonuses::default(), Add::add)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equippable {
    pub slot: EquipmentSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
    pub max_hp_bonus: i32,
}

impl Equippable {
    pub fn new(slot: EquipmentSlot) -> Self {
        Self {
            slot,
            power_bonus: 0,
            defense_bonus: 0,
            max_hp_bonus: 0,
        }
    }

    pub fn with_power(mut self, bonus: i32) -> Self {
        self.power_bonus = bonus;
        self
    }

    pub fn with_defense(mut self, bonus: i32) -> Self {
        self.defense_bonus = bonus;
        self
    }

    pub fn bonuses(&self) -> Bonuses {
        Bonuses {
            power: self.power_bonus,
            defense: self.defense_bonus,
            max_hp: self.max_hp_bonus,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquipChange<Id> {
    Equipped(Id),
    Unequipped(Id),
}

/// Two hand slots, each holding the id of an equippable item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment<Id> {
    pub main_hand: Option<Id>,
    pub off_hand: Option<Id>,
}

impl<Id> Default for Equipment<Id> {
    fn default() -> Self {
        Self {
            main_hand: None,
            off_hand: None,
        }
    }
}

impl<Id: Copy + PartialEq> Equipment<Id> {
    pub fn slot(&self, slot: EquipmentSlot) -> Option<Id> {
        match slot {
            EquipmentSlot::MainHand => self.main_hand,
            EquipmentSlot::OffHand => self.off_hand,
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Id> {
        match slot {
            EquipmentSlot::MainHand => &mut self.main_hand,
            EquipmentSlot::OffHand => &mut self.off_hand,
        }
    }

    pub fn is_equipped(&self, item: Id) -> bool {
        self.main_hand == Some(item) || self.off_hand == Some(item)
    }

    pub fn slot_of(&self, item: Id) -> Option<EquipmentSlot> {
        if self.main_hand == Some(item) {
            Some(EquipmentSlot::MainHand)
        } else if self.off_hand == Some(item) {
            Some(EquipmentSlot::OffHand)
        } else {
            None
        }
    }

    /// Equips `item` into `slot`, or takes it off if it is already there.
    /// An item already in the slot is unequipped first.
    pub fn toggle(&mut self, item: Id, slot: EquipmentSlot) -> Vec<EquipChange<Id>> {
        let current = self.slot_mut(slot);
        match *current {
            Some(worn) if worn == item => {
                *current = None;
                vec![EquipChange::Unequipped(item)]
            }
            Some(worn) => {
                *current = Some(item);
                vec![EquipChange::Unequipped(worn), EquipChange::Equipped(item)]
            }
            None => {
                *current = Some(item);
                vec![EquipChange::Equipped(item)]
            }
        }
    }

    /// Clears whichever slot holds `item`.
    pub fn remove(&mut self, item: Id) -> bool {
        match self.slot_of(item) {
            Some(slot) => {
                *self.slot_mut(slot) = None;
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = Id> {
        self.main_hand.into_iter().chain(self.off_hand)
    }
}
