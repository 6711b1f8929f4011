//! Picking up, using, dropping and equipping items.

use crate::ecs::{Color, EcsWorld, Equipment, Inventory, Item, Position};
use crate::event_bus::{Events, GameEvent};
use crate::item_effects;
use crate::message_log::Message;
use combat::{EquipChange, Equippable};
use dungeon::VisibleSet;
use error::{GameError, GameResult};
use hecs::Entity;
use log::debug;

/// Picks up the first item on `owner`'s cell, in map order.
pub fn pickup(ecs: &mut EcsWorld, owner: Entity) -> Events {
    let item = ecs.position(owner).and_then(|pos| {
        ecs.entities_at(pos.x, pos.y)
            .find(|&e| e != owner && ecs.has::<Item>(e))
    });
    match item {
        Some(item) => add_item(ecs, owner, item),
        None => vec![GameEvent::Message(Message::new(
            "There is nothing here to pick up.",
            Color::Yellow,
        ))],
    }
}

/// Puts `item` into `owner`'s pack. Taking it off the map is left to the
/// `ItemAdded` handler.
pub fn add_item(ecs: &mut EcsWorld, owner: Entity, item: Entity) -> Events {
    let Ok(mut inventory) = ecs.world.get::<&mut Inventory>(owner) else {
        return Vec::new();
    };
    if inventory.is_full() {
        return vec![GameEvent::Message(Message::new(
            "You cannot carry any more, your inventory is full.",
            Color::Yellow,
        ))];
    }
    inventory.items.push(item);
    drop(inventory);

    vec![
        GameEvent::Message(Message::new(
            format!("You pick up the {}!", ecs.name(item)),
            Color::LightBlue,
        )),
        GameEvent::ItemAdded(item),
    ]
}

/// Uses `item` from `user`'s pack.
///
/// Plain equipment asks to be equipped, effects that need a cell ask for
/// targeting when `target` is `None`, and anything else runs its effect.
/// A used-up item is taken out of the pack and reported as `Consumed`.
pub fn use_item(
    ecs: &mut EcsWorld,
    visible: &VisibleSet,
    user: Entity,
    item: Entity,
    target: Option<(i32, i32)>,
) -> GameResult<Events> {
    let effect = ecs
        .world
        .get::<&Item>(item)
        .map(|i| i.effect.clone())
        .map_err(|_| GameError::missing(item, "Item"))?;

    let Some(effect) = effect else {
        return Ok(if ecs.has::<Equippable>(item) {
            vec![GameEvent::Equip(item)]
        } else {
            vec![GameEvent::Message(Message::new(
                format!("The {} cannot be used.", ecs.name(item)),
                Color::Yellow,
            ))]
        });
    };

    if effect.needs_target() && target.is_none() {
        return Ok(vec![GameEvent::Targeting(item)]);
    }

    let outcome = item_effects::apply(ecs, visible, user, &effect, target);
    let mut events = outcome.events;
    if outcome.consumed {
        if let Ok(mut inventory) = ecs.world.get::<&mut Inventory>(user) {
            inventory.remove(item);
        }
        events.push(GameEvent::Consumed(item));
    }
    debug!("{user:?} used {item:?}: consumed={}", outcome.consumed);
    Ok(events)
}

/// Drops `item` at `owner`'s feet, taking it off first if it is worn.
pub fn drop_item(ecs: &mut EcsWorld, owner: Entity, item: Entity) -> Events {
    let mut events = Vec::new();

    let unequipped = ecs
        .world
        .get::<&mut Equipment>(owner)
        .is_ok_and(|mut equipment| equipment.remove(item));
    if unequipped {
        events.push(GameEvent::Unequipped(item));
    }

    if let Ok(mut inventory) = ecs.world.get::<&mut Inventory>(owner) {
        inventory.remove(item);
    }
    if let Some(pos) = ecs.position(owner) {
        let _ = ecs.world.insert_one(item, Position::new(pos.x, pos.y));
    }

    events.push(GameEvent::Message(Message::new(
        format!("You dropped the {}.", ecs.name(item)),
        Color::Yellow,
    )));
    events.push(GameEvent::ItemDropped(item));
    events
}

/// Toggles `item` in its slot on `owner`.
pub fn toggle_equip(ecs: &mut EcsWorld, owner: Entity, item: Entity) -> GameResult<Events> {
    let slot = ecs
        .world
        .get::<&Equippable>(item)
        .map(|e| e.slot)
        .map_err(|_| GameError::NotEquippable(ecs.name(item)))?;
    let mut equipment = ecs
        .world
        .get::<&mut Equipment>(owner)
        .map_err(|_| GameError::missing(owner, "Equipment"))?;

    Ok(equipment
        .toggle(item, slot)
        .into_iter()
        .map(|change| match change {
            EquipChange::Equipped(e) => GameEvent::Equipped(e),
            EquipChange::Unequipped(e) => GameEvent::Unequipped(e),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Name, RenderOrder, Renderable};
    use combat::{EquipmentSlot, Fighter, ItemEffect};
    use pretty_assertions::assert_eq;

    fn owner(ecs: &mut EcsWorld, capacity: usize) -> Entity {
        ecs.spawn_on_map((
            Position::new(3, 3),
            Name("Player".into()),
            Fighter::new(100, 1, 2, 0),
            Inventory::new(capacity),
            Equipment::default(),
        ))
    }

    fn loose_item(ecs: &mut EcsWorld, name: &str, x: i32, y: i32, item: Item) -> Entity {
        ecs.spawn_on_map((
            Position::new(x, y),
            Renderable {
                glyph: '!',
                color: Color::Violet,
                order: RenderOrder::Item,
            },
            Name(name.into()),
            item,
        ))
    }

    fn sword(ecs: &mut EcsWorld, x: i32, y: i32) -> Entity {
        let sword = loose_item(ecs, "Sword", x, y, Item::default());
        ecs.world
            .insert_one(sword, Equippable::new(EquipmentSlot::MainHand).with_power(3))
            .unwrap();
        sword
    }

    #[test]
    fn pickup_takes_first_item_in_map_order() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let first = loose_item(&mut ecs, "Healing Potion", 3, 3, Item::default());
        let _second = loose_item(&mut ecs, "Confusion Scroll", 3, 3, Item::default());

        let events = pickup(&mut ecs, player);
        assert_eq!(
            events,
            vec![
                GameEvent::Message(Message::new(
                    "You pick up the Healing Potion!",
                    Color::LightBlue
                )),
                GameEvent::ItemAdded(first),
            ]
        );
        assert_eq!(ecs.world.get::<&Inventory>(player).unwrap().items, vec![first]);
    }

    #[test]
    fn full_pack_refuses_pickup() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 0);
        loose_item(&mut ecs, "Healing Potion", 3, 3, Item::default());

        let events = pickup(&mut ecs, player);
        assert_eq!(
            events,
            vec![GameEvent::Message(Message::new(
                "You cannot carry any more, your inventory is full.",
                Color::Yellow
            ))]
        );
    }

    #[test]
    fn nothing_to_pick_up() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        loose_item(&mut ecs, "Healing Potion", 4, 3, Item::default());
        let events = pickup(&mut ecs, player);
        assert_eq!(
            events,
            vec![GameEvent::Message(Message::new(
                "There is nothing here to pick up.",
                Color::Yellow
            ))]
        );
    }

    #[test]
    fn using_equipment_asks_to_equip() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let sword = sword(&mut ecs, 3, 3);
        let visible = VisibleSet::empty(10, 10);
        assert_eq!(
            use_item(&mut ecs, &visible, player, sword, None).unwrap(),
            vec![GameEvent::Equip(sword)]
        );
    }

    #[test]
    fn inert_items_cannot_be_used() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let rock = loose_item(&mut ecs, "Rock", 3, 3, Item::default());
        let visible = VisibleSet::empty(10, 10);
        assert_eq!(
            use_item(&mut ecs, &visible, player, rock, None).unwrap(),
            vec![GameEvent::Message(Message::new(
                "The Rock cannot be used.",
                Color::Yellow
            ))]
        );
    }

    #[test]
    fn targeted_items_ask_for_a_target() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let scroll = loose_item(
            &mut ecs,
            "Fireball Scroll",
            3,
            3,
            Item {
                effect: Some(ItemEffect::Fireball {
                    damage: 25,
                    radius: 3,
                }),
            },
        );
        let visible = VisibleSet::empty(10, 10);
        assert_eq!(
            use_item(&mut ecs, &visible, player, scroll, None).unwrap(),
            vec![GameEvent::Targeting(scroll)]
        );
    }

    #[test]
    fn consumed_items_leave_the_pack() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let potion = loose_item(
            &mut ecs,
            "Healing Potion",
            3,
            3,
            Item {
                effect: Some(ItemEffect::Heal { amount: 40 }),
            },
        );
        add_item(&mut ecs, player, potion);
        ecs.world.get::<&mut Fighter>(player).unwrap().hp = 50;
        let visible = VisibleSet::empty(10, 10);

        let events = use_item(&mut ecs, &visible, player, potion, None).unwrap();
        assert_eq!(events.last(), Some(&GameEvent::Consumed(potion)));
        assert!(ecs.world.get::<&Inventory>(player).unwrap().items.is_empty());
        assert_eq!(ecs.world.get::<&Fighter>(player).unwrap().hp, 90);
    }

    #[test]
    fn toggle_swaps_the_incumbent() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let old = sword(&mut ecs, 3, 3);
        let new = sword(&mut ecs, 3, 3);

        toggle_equip(&mut ecs, player, old).unwrap();
        let events = toggle_equip(&mut ecs, player, new).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::Unequipped(old), GameEvent::Equipped(new)]
        );
        assert_eq!(ecs.power(player), Some(5));
    }

    #[test]
    fn toggling_a_non_equippable_is_an_error() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let rock = loose_item(&mut ecs, "Rock", 3, 3, Item::default());
        assert!(matches!(
            toggle_equip(&mut ecs, player, rock),
            Err(GameError::NotEquippable(name)) if name == "Rock"
        ));
    }

    #[test]
    fn dropping_worn_gear_unequips_first() {
        let mut ecs = EcsWorld::new();
        let player = owner(&mut ecs, 26);
        let blade = sword(&mut ecs, 3, 3);
        add_item(&mut ecs, player, blade);
        ecs.remove_from_map(blade);
        toggle_equip(&mut ecs, player, blade).unwrap();
        assert_eq!(ecs.power(player), Some(5));

        let events = drop_item(&mut ecs, player, blade);
        assert_eq!(
            events,
            vec![
                GameEvent::Unequipped(blade),
                GameEvent::Message(Message::new("You dropped the Sword.", Color::Yellow)),
                GameEvent::ItemDropped(blade),
            ]
        );
        assert_eq!(ecs.power(player), Some(2));
        assert_eq!(ecs.position(blade), Some(Position::new(3, 3)));
        assert!(ecs.world.get::<&Inventory>(player).unwrap().items.is_empty());
    }
}
