//! What each consumable does when used.

use crate::ecs::{Color, EcsWorld, Position};
use crate::event_bus::{Events, GameEvent};
use crate::message_log::Message;
use crate::systems::{heal, take_damage};
use combat::effect::{nearest_within, within_radius};
use combat::{Ai, Fighter, ItemEffect};
use dungeon::VisibleSet;
use hecs::Entity;

const OUT_OF_SIGHT: &str = "You cannot target a tile outside your field of view.";

/// Result of applying an effect. The item is used up only when `consumed`.
#[derive(Debug, Default, PartialEq)]
pub struct EffectOutcome {
    pub consumed: bool,
    pub events: Events,
}

impl EffectOutcome {
    fn kept(message: Message) -> Self {
        Self {
            consumed: false,
            events: vec![GameEvent::Message(message)],
        }
    }
}

/// Applies `effect` on behalf of `caster`. `target` is the chosen cell for
/// effects that need one.
pub fn apply(
    ecs: &mut EcsWorld,
    visible: &VisibleSet,
    caster: Entity,
    effect: &ItemEffect,
    target: Option<(i32, i32)>,
) -> EffectOutcome {
    match *effect {
        ItemEffect::Heal { amount } => cast_heal(ecs, caster, amount),
        ItemEffect::Lightning { damage, max_range } => {
            cast_lightning(ecs, visible, caster, damage, max_range)
        }
        ItemEffect::Fireball { damage, radius } => match target {
            Some(cell) => cast_fireball(ecs, visible, damage, radius, cell),
            None => EffectOutcome::kept(Message::new(OUT_OF_SIGHT, Color::Yellow)),
        },
        ItemEffect::Confuse { turns } => match target {
            Some(cell) => cast_confuse(ecs, visible, turns, cell),
            None => EffectOutcome::kept(Message::new(OUT_OF_SIGHT, Color::Yellow)),
        },
    }
}

pub fn cast_heal(ecs: &mut EcsWorld, caster: Entity, amount: i32) -> EffectOutcome {
    let at_full = match (ecs.world.get::<&Fighter>(caster), ecs.max_hp(caster)) {
        (Ok(fighter), Some(max_hp)) => fighter.hp >= max_hp,
        _ => true,
    };
    if at_full {
        return EffectOutcome::kept(Message::new(
            "You are already at full health.",
            Color::Yellow,
        ));
    }

    heal(ecs, caster, amount);
    EffectOutcome {
        consumed: true,
        events: vec![GameEvent::Message(Message::new(
            "Your wounds start to feel better!",
            Color::Green,
        ))],
    }
}

/// Fighters other than `exclude` standing on visible cells, in map order.
fn visible_fighters(
    ecs: &EcsWorld,
    visible: &VisibleSet,
    exclude: Option<Entity>,
) -> Vec<(Entity, (i32, i32))> {
    ecs.map_entities()
        .iter()
        .copied()
        .filter(|&e| Some(e) != exclude && ecs.has::<Fighter>(e))
        .filter_map(|e| ecs.position(e).map(|p| (e, p.as_tuple())))
        .filter(|&(_, (x, y))| visible.contains(x, y))
        .collect()
}

pub fn cast_lightning(
    ecs: &mut EcsWorld,
    visible: &VisibleSet,
    caster: Entity,
    damage: i32,
    max_range: i32,
) -> EffectOutcome {
    let Some(origin) = ecs.position(caster).map(Position::as_tuple) else {
        return EffectOutcome::default();
    };
    let candidates = visible_fighters(ecs, visible, Some(caster));
    let Some(target) = nearest_within(origin, candidates, max_range) else {
        return EffectOutcome::kept(Message::new(
            "No enemy is close enough to strike.",
            Color::Red,
        ));
    };

    let mut events = vec![GameEvent::Message(Message::plain(format!(
        "A lightning bolt strikes the {} with a loud CRACK! The damage is {}.",
        ecs.name(target),
        damage
    )))];
    events.extend(take_damage(ecs, target, damage));
    EffectOutcome {
        consumed: true,
        events,
    }
}

pub fn cast_fireball(
    ecs: &mut EcsWorld,
    visible: &VisibleSet,
    damage: i32,
    radius: i32,
    (x, y): (i32, i32),
) -> EffectOutcome {
    if !visible.contains(x, y) {
        return EffectOutcome::kept(Message::new(OUT_OF_SIGHT, Color::Yellow));
    }

    let mut events = vec![GameEvent::Message(Message::new(
        format!("The fireball explodes, burning everything within {radius} tiles!"),
        Color::Orange,
    ))];
    let fighters: Vec<(Entity, (i32, i32))> = ecs
        .map_entities()
        .iter()
        .copied()
        .filter(|&e| ecs.has::<Fighter>(e))
        .filter_map(|e| ecs.position(e).map(|p| (e, p.as_tuple())))
        .collect();
    for entity in within_radius((x, y), fighters, radius) {
        events.push(GameEvent::Message(Message::new(
            format!("The {} takes {} burn damage!", ecs.name(entity), damage),
            Color::Orange,
        )));
        events.extend(take_damage(ecs, entity, damage));
    }
    EffectOutcome {
        consumed: true,
        events,
    }
}

pub fn cast_confuse(
    ecs: &mut EcsWorld,
    visible: &VisibleSet,
    turns: u32,
    (x, y): (i32, i32),
) -> EffectOutcome {
    if !visible.contains(x, y) {
        return EffectOutcome::kept(Message::new(OUT_OF_SIGHT, Color::Yellow));
    }

    let Some(victim) = ecs.entities_at(x, y).find(|&e| ecs.has::<Ai>(e)) else {
        return EffectOutcome::kept(Message::new(
            "There is no targetable enemy at that location.",
            Color::Yellow,
        ));
    };

    let previous = match ecs.world.remove_one::<Ai>(victim) {
        Ok(ai) => ai,
        Err(_) => return EffectOutcome::default(),
    };
    let _ = ecs.world.insert_one(victim, Ai::confused(previous, turns));
    EffectOutcome {
        consumed: true,
        events: vec![GameEvent::Message(Message::new(
            format!(
                "The eyes of the {} look vacant and it starts to stumble around!",
                ecs.name(victim)
            ),
            Color::LightGreen,
        ))],
    }
}
