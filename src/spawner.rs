//! Entity templates: the player and starting kit, monsters, items and
//! stairs.

use crate::config::PlayerTemplate;
use crate::ecs::*;
use combat::effect::DEFAULT_CONFUSE_TURNS;
use combat::{Ai, EquipmentSlot, Equippable, Fighter, ItemEffect, Level};
use dungeon::{Floor, ItemKind, MonsterKind, SpawnKind};
use hecs::Entity;

fn actor(glyph: char, color: Color) -> Renderable {
    Renderable {
        glyph,
        color,
        order: RenderOrder::Actor,
    }
}

fn item_glyph(glyph: char, color: Color) -> Renderable {
    Renderable {
        glyph,
        color,
        order: RenderOrder::Item,
    }
}

/// Spawns the player at `(x, y)` with an equipped dagger in the pack.
pub fn spawn_player(world: &mut EcsWorld, template: &PlayerTemplate, x: i32, y: i32) -> Entity {
    let dagger = world.spawn_detached((
        Name("Dagger".into()),
        item_glyph('-', Color::Sky),
        Item::default(),
        Equippable::new(EquipmentSlot::MainHand).with_power(template.dagger_power_bonus),
    ));

    let mut inventory = Inventory::new(template.inventory_capacity);
    inventory.items.push(dagger);
    let mut equipment = Equipment::default();
    equipment.toggle(dagger, EquipmentSlot::MainHand);

    world.spawn_on_map((
        Position::new(x, y),
        actor('@', Color::White),
        Name("Player".into()),
        Blocks,
        Player,
        Lifecycle::Alive,
        Fighter::new(template.hp, template.defense, template.power, 0),
        inventory,
        equipment,
        Level::new(template.level_up_base, template.level_up_factor),
    ))
}

pub fn spawn_monster(world: &mut EcsWorld, kind: MonsterKind, x: i32, y: i32) -> Entity {
    let (name, glyph, color, fighter) = match kind {
        MonsterKind::Orc => ("Orc", 'o', Color::DesaturatedGreen, Fighter::new(20, 0, 4, 35)),
        MonsterKind::Troll => ("Troll", 'T', Color::DarkerGreen, Fighter::new(30, 2, 8, 100)),
    };
    world.spawn_on_map((
        Position::new(x, y),
        actor(glyph, color),
        Name(name.into()),
        Blocks,
        Lifecycle::Alive,
        fighter,
        Ai::Basic,
    ))
}

pub fn spawn_item(world: &mut EcsWorld, kind: ItemKind, x: i32, y: i32) -> Entity {
    let position = Position::new(x, y);
    match kind {
        ItemKind::HealingPotion => world.spawn_on_map((
            position,
            item_glyph('!', Color::Violet),
            Name("Healing Potion".into()),
            Item {
                effect: Some(ItemEffect::Heal { amount: 40 }),
            },
        )),
        ItemKind::Sword => world.spawn_on_map((
            position,
            item_glyph('/', Color::Sky),
            Name("Sword".into()),
            Item::default(),
            Equippable::new(EquipmentSlot::MainHand).with_power(3),
        )),
        ItemKind::Shield => world.spawn_on_map((
            position,
            item_glyph('[', Color::DarkerOrange),
            Name("Shield".into()),
            Item::default(),
            Equippable::new(EquipmentSlot::OffHand).with_defense(1),
        )),
        ItemKind::LightningScroll => world.spawn_on_map((
            position,
            item_glyph('#', Color::Yellow),
            Name("Lightning Scroll".into()),
            Item {
                effect: Some(ItemEffect::Lightning {
                    damage: 40,
                    max_range: 5,
                }),
            },
        )),
        ItemKind::FireballScroll => world.spawn_on_map((
            position,
            item_glyph('#', Color::Red),
            Name("Fireball Scroll".into()),
            Item {
                effect: Some(ItemEffect::Fireball {
                    damage: 25,
                    radius: 3,
                }),
            },
        )),
        ItemKind::ConfusionScroll => world.spawn_on_map((
            position,
            item_glyph('#', Color::LightPink),
            Name("Confusion Scroll".into()),
            Item {
                effect: Some(ItemEffect::Confuse {
                    turns: DEFAULT_CONFUSE_TURNS,
                }),
            },
        )),
    }
}

pub fn spawn_stairs(world: &mut EcsWorld, x: i32, y: i32, to_level: u32) -> Entity {
    world.spawn_on_map((
        Position::new(x, y),
        Renderable {
            glyph: '>',
            color: Color::White,
            order: RenderOrder::Stairs,
        },
        Name("Stairs".into()),
        Stairs { to_level },
    ))
}

/// Creates the monsters, items and stairs a generated floor asks for, in
/// generation order with the stairs last.
pub fn populate(world: &mut EcsWorld, floor: &Floor) {
    for spawn in &floor.spawns {
        match spawn.kind {
            SpawnKind::Monster(kind) => {
                spawn_monster(world, kind, spawn.x, spawn.y);
            }
            SpawnKind::Item(kind) => {
                spawn_item(world, kind, spawn.x, spawn.y);
            }
        }
    }
    spawn_stairs(world, floor.stairs.x, floor.stairs.y, floor.stairs.to_level);
}
