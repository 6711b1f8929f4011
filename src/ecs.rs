//! Components and the entity store.
//!
//! Entities live in a `hecs::World`. `EcsWorld` also keeps the ids of the
//! entities that are on the map in spawn order; turn order, targeting ties
//! and pickup all follow that order. Carried items stay in the world but
//! have no `Position` and are not in the map order.

use combat::{Ai, Bonuses, Equippable, Fighter, ItemEffect, Level};
use hecs::{DynamicBundle, Entity, World};
use serde::{Deserialize, Serialize};

pub use combat::Equipment as EquipmentSlots;

/// Hand slots of an actor, referencing item entities.
pub type Equipment = EquipmentSlots<Entity>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn as_tuple(self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        combat::distance(self.as_tuple(), other.as_tuple())
    }
}

/// Draw layering; later variants are drawn on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RenderOrder {
    Stairs,
    Corpse,
    Item,
    Actor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
    Red,
    DarkRed,
    LightRed,
    Orange,
    DarkerOrange,
    Yellow,
    LightYellow,
    Green,
    LightGreen,
    DesaturatedGreen,
    DarkerGreen,
    Blue,
    LightBlue,
    Sky,
    LightCyan,
    Violet,
    LightViolet,
    LightPink,
    Gray,
    DarkGray,
    Rgb(u8, u8, u8),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderable {
    pub glyph: char,
    pub color: Color,
    pub order: RenderOrder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

/// Marker: the entity obstructs movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocks;

/// Marker for the player-controlled entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player;

/// Death is recorded in place; dead monsters stay on the map as corpses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Alive,
    Dead,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    pub capacity: usize,
    /// Pickup order.
    pub items: Vec<Entity>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn remove(&mut self, item: Entity) -> bool {
        match self.items.iter().position(|&i| i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub effect: Option<ItemEffect>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub to_level: u32,
}

/// The hecs world plus the ordered list of on-map entities.
#[derive(Default)]
pub struct EcsWorld {
    pub world: World,
    order: Vec<Entity>,
}

impl EcsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an entity and appends it to the map order. The bundle should
    /// include a `Position`.
    pub fn spawn_on_map(&mut self, components: impl DynamicBundle) -> Entity {
        let entity = self.world.spawn(components);
        self.order.push(entity);
        entity
    }

    /// Spawns an entity that is not on the map, such as a carried item.
    pub fn spawn_detached(&mut self, components: impl DynamicBundle) -> Entity {
        self.world.spawn(components)
    }

    /// Entities on the map, in spawn order.
    pub fn map_entities(&self) -> &[Entity] {
        &self.order
    }

    pub fn is_on_map(&self, entity: Entity) -> bool {
        self.order.contains(&entity)
    }

    /// Puts an entity at `(x, y)` and appends it to the map order.
    pub fn place_on_map(&mut self, entity: Entity, x: i32, y: i32) -> Result<(), hecs::NoSuchEntity> {
        self.world.insert_one(entity, Position::new(x, y))?;
        if !self.order.contains(&entity) {
            self.order.push(entity);
        }
        Ok(())
    }

    /// Takes an entity off the map without destroying it.
    pub fn remove_from_map(&mut self, entity: Entity) {
        let _ = self.world.remove_one::<Position>(entity);
        self.order.retain(|&e| e != entity);
    }

    pub fn despawn(&mut self, entity: Entity) {
        let _ = self.world.despawn(entity);
        self.order.retain(|&e| e != entity);
    }

    /// Destroys every on-map entity except `keep`. Carried items survive
    /// because they are not on the map.
    pub fn clear_map_except(&mut self, keep: Entity) {
        let doomed: Vec<Entity> = self.order.iter().copied().filter(|&e| e != keep).collect();
        for entity in doomed {
            let _ = self.world.despawn(entity);
        }
        self.order.retain(|&e| e == keep);
    }

    pub fn position(&self, entity: Entity) -> Option<Position> {
        self.world.get::<&Position>(entity).ok().map(|p| *p)
    }

    pub fn name(&self, entity: Entity) -> String {
        self.world
            .get::<&Name>(entity)
            .map(|n| n.0.clone())
            .unwrap_or_default()
    }

    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.world.get::<&T>(entity).is_ok()
    }

    /// Map entities standing on `(x, y)`, in map order.
    pub fn entities_at(&self, x: i32, y: i32) -> impl Iterator<Item = Entity> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |&e| self.position(e) == Some(Position::new(x, y)))
    }

    /// First blocking entity on `(x, y)`.
    pub fn blocking_entity_at(&self, x: i32, y: i32) -> Option<Entity> {
        self.entities_at(x, y).find(|&e| self.has::<Blocks>(e))
    }

    pub fn player(&self) -> Option<Entity> {
        self.world
            .query::<&Player>()
            .iter()
            .map(|(entity, _)| entity)
            .next()
    }

    /// Sum of the bonuses of everything `entity` has equipped.
    pub fn bonuses(&self, entity: Entity) -> Bonuses {
        let Ok(equipment) = self.world.get::<&Equipment>(entity) else {
            return Bonuses::default();
        };
        equipment
            .items()
            .filter_map(|item| self.world.get::<&Equippable>(item).ok().map(|e| e.bonuses()))
            .sum()
    }

    pub fn max_hp(&self, entity: Entity) -> Option<i32> {
        let fighter = self.world.get::<&Fighter>(entity).ok()?;
        Some(fighter.max_hp(self.bonuses(entity)))
    }

    pub fn power(&self, entity: Entity) -> Option<i32> {
        let fighter = self.world.get::<&Fighter>(entity).ok()?;
        Some(fighter.power(self.bonuses(entity)))
    }

    pub fn defense(&self, entity: Entity) -> Option<i32> {
        let fighter = self.world.get::<&Fighter>(entity).ok()?;
        Some(fighter.defense(self.bonuses(entity)))
    }

    /// Map entities with an AI, in map order.
    pub fn ai_entities(&self) -> Vec<Entity> {
        self.order
            .iter()
            .copied()
            .filter(|&e| self.has::<Ai>(e))
            .collect()
    }

    /// Map entities sorted by render order; ties keep map order.
    pub fn render_list(&self) -> Vec<Entity> {
        let mut list: Vec<(RenderOrder, Entity)> = self
            .order
            .iter()
            .filter_map(|&e| {
                self.world
                    .get::<&Renderable>(e)
                    .ok()
                    .map(|r| (r.order, e))
            })
            .collect();
        list.sort_by_key(|(order, _)| *order);
        list.into_iter().map(|(_, e)| e).collect()
    }

    pub fn level(&self, entity: Entity) -> Option<Level> {
        self.world.get::<&Level>(entity).ok().map(|l| (*l).clone())
    }
}
