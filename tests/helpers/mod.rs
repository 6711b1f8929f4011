#![allow(dead_code)]

//! Test helpers for building engines on small hand-made floors.
//!
//! Every floor is one open room surrounded by wall, so tests control exactly
//! who stands where and what the player can see.

use dungeon::{Floor, Grid, ItemKind, MonsterKind, Rect, Spawn, SpawnKind, StairsSpawn};
use hecs::Entity;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use terminal_rogue::config::GameConfig;
use terminal_rogue::core::Engine;
use terminal_rogue::ecs::Inventory;
use terminal_rogue::spawner::spawn_item;

/// Builder for engines on a single open room.
pub struct TestEngineBuilder {
    width: i32,
    height: i32,
    seed: u64,
    player: (i32, i32),
    stairs: (i32, i32),
    walls: Vec<(i32, i32)>,
    spawns: Vec<Spawn>,
    config: GameConfig,
}

impl TestEngineBuilder {
    /// A 20x12 room with the player at (5, 5) and stairs at (15, 9). The log
    /// is wide and tall enough that messages are never wrapped or dropped.
    pub fn new(seed: u64) -> Self {
        let config = GameConfig {
            message_width: 200,
            message_height: 100,
            ..GameConfig::default()
        };
        Self {
            width: 20,
            height: 12,
            seed,
            player: (5, 5),
            stairs: (15, 9),
            walls: Vec::new(),
            spawns: Vec::new(),
            config,
        }
    }

    pub fn with_player(mut self, x: i32, y: i32) -> Self {
        self.player = (x, y);
        self
    }

    pub fn with_stairs(mut self, x: i32, y: i32) -> Self {
        self.stairs = (x, y);
        self
    }

    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.walls.push((x, y));
        self
    }

    pub fn with_monster(mut self, kind: MonsterKind, x: i32, y: i32) -> Self {
        self.spawns.push(Spawn {
            x,
            y,
            kind: SpawnKind::Monster(kind),
        });
        self
    }

    pub fn with_item(mut self, kind: ItemKind, x: i32, y: i32) -> Self {
        self.spawns.push(Spawn {
            x,
            y,
            kind: SpawnKind::Item(kind),
        });
        self
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Engine {
        let mut grid = Grid::new(self.width, self.height);
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if !self.walls.contains(&(x, y)) {
                    grid.carve(x, y);
                }
            }
        }
        let floor = Floor {
            grid,
            rooms: vec![Rect::new(0, 0, self.width - 1, self.height - 1)],
            player_start: self.player,
            stairs: StairsSpawn {
                x: self.stairs.0,
                y: self.stairs.1,
                to_level: 2,
            },
            spawns: self.spawns,
        };
        Engine::from_floor(self.config, floor, 1, Pcg64::seed_from_u64(self.seed))
    }
}

/// The first entity, on or off the map, with this name.
pub fn entity_named(engine: &Engine, name: &str) -> Option<Entity> {
    engine
        .ecs
        .world
        .iter()
        .map(|entity_ref| entity_ref.entity())
        .find(|&entity| engine.ecs.name(entity) == name)
}

/// Puts a fresh item straight into the player's pack.
pub fn give(engine: &mut Engine, kind: ItemKind) -> Entity {
    let item = spawn_item(&mut engine.ecs, kind, 0, 0);
    engine.ecs.remove_from_map(item);
    engine
        .ecs
        .world
        .get::<&mut Inventory>(engine.player)
        .expect("player has an inventory")
        .items
        .push(item);
    item
}

pub fn inventory_names(engine: &Engine) -> Vec<String> {
    engine
        .ecs
        .world
        .get::<&Inventory>(engine.player)
        .map(|inventory| inventory.items.iter().map(|&i| engine.ecs.name(i)).collect())
        .unwrap_or_default()
}

/// Index of `item` in the player's pack.
pub fn slot_of(engine: &Engine, item: Entity) -> usize {
    engine
        .ecs
        .world
        .get::<&Inventory>(engine.player)
        .ok()
        .and_then(|inventory| inventory.items.iter().position(|&i| i == item))
        .expect("item is in the pack")
}

pub fn last_message(engine: &Engine) -> String {
    engine
        .log
        .lines()
        .last()
        .map(|m| m.text.clone())
        .unwrap_or_default()
}

pub fn messages(engine: &Engine) -> Vec<String> {
    engine.log.lines().map(|m| m.text.clone()).collect()
}

pub fn hp(engine: &Engine, entity: Entity) -> i32 {
    engine
        .ecs
        .world
        .get::<&combat::Fighter>(entity)
        .map(|f| f.hp)
        .expect("entity has a fighter")
}
