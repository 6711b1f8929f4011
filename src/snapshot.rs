//! Flattening the engine into a serializable snapshot and back.
//!
//! Entity ids do not survive a round trip, so every cross-entity reference
//! (pack contents, worn gear, the pending scroll) is stored as an index
//! into `Snapshot::records`.

use crate::config::GameConfig;
use crate::core::Engine;
use crate::ecs::{
    Blocks, EcsWorld, Equipment, EquipmentSlots, Inventory, Item, Lifecycle, Name, Player,
    Position, Renderable, Stairs,
};
use crate::message_log::MessageLog;
use crate::turn_system::{GameState, TurnSystem};
use combat::{Ai, Equippable, Fighter, Level};
use dungeon::{FovMap, Grid, VisibleSet};
use error::{GameError, GameResult};
use hecs::{Entity, EntityBuilder};
use log::info;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub capacity: usize,
    pub items: Vec<usize>,
}

/// One entity with whichever components it had.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub position: Option<Position>,
    pub renderable: Option<Renderable>,
    pub name: Option<String>,
    pub blocks: bool,
    pub player: bool,
    pub lifecycle: Option<Lifecycle>,
    pub fighter: Option<Fighter>,
    pub ai: Option<Ai>,
    pub inventory: Option<InventoryRecord>,
    pub equipment: Option<EquipmentSlots<usize>>,
    pub item: Option<Item>,
    pub equippable: Option<Equippable>,
    pub stairs: Option<Stairs>,
    pub level: Option<Level>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Map entities first, in map order, then everything carried.
    pub records: Vec<EntityRecord>,
    /// How many leading records are on the map.
    pub on_map: usize,
    pub player: usize,
    pub grid: Grid,
    pub dungeon_level: u32,
    pub log: MessageLog,
    pub state: GameState,
    pub previous_state: GameState,
    pub targeting_item: Option<usize>,
    pub rng: Pcg64,
}

fn component<T: hecs::Component + Clone>(ecs: &EcsWorld, entity: Entity) -> Option<T> {
    ecs.world.get::<&T>(entity).ok().map(|c| (*c).clone())
}

fn record_of(ecs: &EcsWorld, entity: Entity, index_of: &HashMap<Entity, usize>) -> EntityRecord {
    let index = |e: Entity| index_of.get(&e).copied();
    EntityRecord {
        position: ecs.position(entity),
        renderable: component::<Renderable>(ecs, entity),
        name: component::<Name>(ecs, entity).map(|n| n.0),
        blocks: ecs.has::<Blocks>(entity),
        player: ecs.has::<Player>(entity),
        lifecycle: component::<Lifecycle>(ecs, entity),
        fighter: component::<Fighter>(ecs, entity),
        ai: component::<Ai>(ecs, entity),
        inventory: component::<Inventory>(ecs, entity).map(|inv| InventoryRecord {
            capacity: inv.capacity,
            items: inv.items.into_iter().filter_map(index).collect(),
        }),
        equipment: component::<Equipment>(ecs, entity).map(|eq| EquipmentSlots {
            main_hand: eq.main_hand.and_then(index),
            off_hand: eq.off_hand.and_then(index),
        }),
        item: component::<Item>(ecs, entity),
        equippable: component::<Equippable>(ecs, entity),
        stairs: component::<Stairs>(ecs, entity),
        level: component::<Level>(ecs, entity),
    }
}

fn builder_for(record: &EntityRecord) -> EntityBuilder {
    let mut builder = EntityBuilder::new();
    if let Some(position) = record.position {
        builder.add(position);
    }
    if let Some(renderable) = &record.renderable {
        builder.add(renderable.clone());
    }
    if let Some(name) = &record.name {
        builder.add(Name(name.clone()));
    }
    if record.blocks {
        builder.add(Blocks);
    }
    if record.player {
        builder.add(Player);
    }
    if let Some(lifecycle) = record.lifecycle {
        builder.add(lifecycle);
    }
    if let Some(fighter) = &record.fighter {
        builder.add(fighter.clone());
    }
    if let Some(ai) = &record.ai {
        builder.add(ai.clone());
    }
    if let Some(item) = &record.item {
        builder.add(item.clone());
    }
    if let Some(equippable) = &record.equippable {
        builder.add(equippable.clone());
    }
    if let Some(stairs) = record.stairs {
        builder.add(stairs);
    }
    if let Some(level) = &record.level {
        builder.add(level.clone());
    }
    builder
}

impl Engine {
    pub fn snapshot(&self) -> Snapshot {
        let mut entities: Vec<Entity> = self.ecs.map_entities().to_vec();
        let on_map = entities.len();
        // Carried items in pack order, so the layout does not depend on
        // hecs archetype order.
        for &holder in self.ecs.map_entities() {
            if let Ok(inventory) = self.ecs.world.get::<&Inventory>(holder) {
                entities.extend(inventory.items.iter().copied());
            }
        }
        let strays: Vec<Entity> = self
            .ecs
            .world
            .iter()
            .map(|e| e.entity())
            .filter(|e| !entities.contains(e))
            .collect();
        entities.extend(strays);

        let index_of: HashMap<Entity, usize> =
            entities.iter().enumerate().map(|(i, &e)| (e, i)).collect();
        let records = entities
            .iter()
            .map(|&e| record_of(&self.ecs, e, &index_of))
            .collect();

        Snapshot {
            records,
            on_map,
            player: index_of.get(&self.player).copied().unwrap_or_default(),
            grid: self.grid.clone(),
            dungeon_level: self.dungeon_level,
            log: self.log.clone(),
            state: self.turn.state,
            previous_state: self.turn.previous_state,
            targeting_item: self
                .turn
                .targeting_item
                .and_then(|e| index_of.get(&e).copied()),
            rng: self.rng.clone(),
        }
    }

    /// Rebuilds a running engine from `snapshot`.
    pub fn restore(config: GameConfig, snapshot: Snapshot) -> GameResult<Self> {
        let Snapshot {
            records,
            on_map,
            player,
            grid,
            dungeon_level,
            log,
            state,
            previous_state,
            targeting_item,
            rng,
        } = snapshot;

        let mut ecs = EcsWorld::new();
        let mut entities = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let mut builder = builder_for(record);
            let entity = if i < on_map {
                ecs.spawn_on_map(builder.build())
            } else {
                ecs.spawn_detached(builder.build())
            };
            entities.push(entity);
        }

        let lookup = |index: usize| {
            entities.get(index).copied().ok_or_else(|| {
                GameError::Deserialization(format!("entity index {index} out of range"))
            })
        };

        for (record, &entity) in records.iter().zip(&entities) {
            if let Some(inventory) = &record.inventory {
                let items = inventory
                    .items
                    .iter()
                    .map(|&i| lookup(i))
                    .collect::<GameResult<Vec<_>>>()?;
                let _ = ecs.world.insert_one(
                    entity,
                    Inventory {
                        capacity: inventory.capacity,
                        items,
                    },
                );
            }
            if let Some(equipment) = &record.equipment {
                let slots = Equipment {
                    main_hand: equipment.main_hand.map(lookup).transpose()?,
                    off_hand: equipment.off_hand.map(lookup).transpose()?,
                };
                let _ = ecs.world.insert_one(entity, slots);
            }
        }

        let player = lookup(player)?;
        if !ecs.has::<Player>(player) {
            return Err(GameError::NoPlayer);
        }
        let targeting_item = targeting_item.map(lookup).transpose()?;

        let fov_map = FovMap::from_grid(&grid);
        let visible = VisibleSet::empty(grid.width(), grid.height());
        let mut log_view = MessageLog::new(config.message_width, config.message_height);
        for message in log.lines() {
            log_view.add(message.clone());
        }

        let mut engine = Engine {
            config,
            ecs,
            grid,
            fov_map,
            visible,
            log: log_view,
            rng,
            dungeon_level,
            player,
            turn: TurnSystem {
                state,
                previous_state,
                targeting_item,
            },
            fov_dirty: true,
        };
        engine.refresh_fov();
        info!(
            "restored dungeon level {} with {} entities",
            engine.dungeon_level,
            records.len()
        );
        Ok(engine)
    }
}
