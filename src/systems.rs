//! Melee, death and monster AI.
//!
//! These systems run against the entity store and the walkable mask and report
//! what happened as `GameEvent`s. They never touch the game state; the turn
//! engine decides what a death or a message means.

use crate::ecs::{Blocks, Color, EcsWorld, Lifecycle, Name, Position, RenderOrder, Renderable};
use crate::event_bus::{Events, GameEvent};
use crate::message_log::Message;
use combat::{Ai, Combat, Fighter, StatBlock, capitalize};
use dungeon::{FovMap, VisibleSet};
use hecs::Entity;
use log::{debug, warn};
use pathfinding::prelude::astar;
use rand::Rng;
use std::collections::HashSet;

/// Longest path, in steps, a monster will follow before falling back to a
/// straight-line step.
pub const MAX_PATH_STEPS: usize = 25;

const STRAIGHT_COST: u32 = 100;
const DIAGONAL_COST: u32 = 141;

/// Resolves one melee blow from `attacker` against `defender`.
pub fn attack(ecs: &mut EcsWorld, attacker: Entity, defender: Entity) -> Events {
    let report = {
        let (Ok(a_fighter), Ok(d_fighter)) = (
            ecs.world.get::<&Fighter>(attacker),
            ecs.world.get::<&Fighter>(defender),
        ) else {
            warn!("attack between {attacker:?} and {defender:?} without fighters");
            return Vec::new();
        };
        let a_name = ecs.name(attacker);
        let d_name = ecs.name(defender);
        Combat::resolve_attack(
            &StatBlock {
                name: &a_name,
                fighter: &a_fighter,
                bonuses: ecs.bonuses(attacker),
            },
            &StatBlock {
                name: &d_name,
                fighter: &d_fighter,
                bonuses: ecs.bonuses(defender),
            },
        )
    };

    let mut events = vec![GameEvent::Message(Message::plain(report.message))];
    if report.damage > 0 {
        events.extend(take_damage(ecs, defender, report.damage));
    }
    events
}

/// Lowers hp and reports a death on the crossing to zero. The entity is
/// left as it is.
pub fn take_damage(ecs: &mut EcsWorld, entity: Entity, amount: i32) -> Events {
    let Ok(mut fighter) = ecs.world.get::<&mut Fighter>(entity) else {
        return Vec::new();
    };
    if fighter.take_damage(amount) {
        vec![GameEvent::Dead {
            entity,
            xp: fighter.xp,
        }]
    } else {
        Vec::new()
    }
}

/// Heals up to the effective maximum, equipment included.
pub fn heal(ecs: &mut EcsWorld, entity: Entity, amount: i32) {
    let Some(max_hp) = ecs.max_hp(entity) else {
        return;
    };
    if let Ok(mut fighter) = ecs.world.get::<&mut Fighter>(entity) {
        fighter.heal(amount, max_hp);
    }
}

/// Turns the player into a corpse glyph. The entity itself stays.
pub fn kill_player(ecs: &mut EcsWorld, player: Entity) -> Message {
    if let Ok(mut renderable) = ecs.world.get::<&mut Renderable>(player) {
        renderable.glyph = '%';
        renderable.color = Color::DarkRed;
    }
    let _ = ecs.world.insert_one(player, Lifecycle::Dead);
    Message::new("You died!", Color::Red)
}

/// Demotes a monster to its remains in place.
pub fn kill_monster(ecs: &mut EcsWorld, monster: Entity) -> Message {
    let name = ecs.name(monster);
    let message = Message::new(format!("{} is dead!", capitalize(&name)), Color::Orange);

    let _ = ecs.world.insert(
        monster,
        (
            Renderable {
                glyph: '%',
                color: Color::DarkRed,
                order: RenderOrder::Corpse,
            },
            Name(format!("remains of {name}")),
            Lifecycle::Dead,
        ),
    );
    let _ = ecs.world.remove_one::<Blocks>(monster);
    let _ = ecs.world.remove_one::<Fighter>(monster);
    let _ = ecs.world.remove_one::<Ai>(monster);
    message
}

/// Whether something could step onto `(x, y)` right now.
pub fn is_free(ecs: &EcsWorld, map: &FovMap, x: i32, y: i32) -> bool {
    map.is_walkable(x, y) && ecs.blocking_entity_at(x, y).is_none()
}

fn set_position(ecs: &mut EcsWorld, entity: Entity, x: i32, y: i32) {
    if let Ok(mut pos) = ecs.world.get::<&mut Position>(entity) {
        pos.x = x;
        pos.y = y;
    }
}

/// Takes one rounded straight-line step toward `(tx, ty)` if the cell is
/// free.
pub fn move_towards(ecs: &mut EcsWorld, map: &FovMap, entity: Entity, tx: i32, ty: i32) {
    let Some(pos) = ecs.position(entity) else {
        return;
    };
    let dx = f64::from(tx - pos.x);
    let dy = f64::from(ty - pos.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 {
        return;
    }
    let nx = pos.x + (dx / dist).round() as i32;
    let ny = pos.y + (dy / dist).round() as i32;
    if is_free(ecs, map, nx, ny) {
        set_position(ecs, entity, nx, ny);
    }
}

fn octile(a: (i32, i32), b: (i32, i32)) -> u32 {
    let dx = a.0.abs_diff(b.0);
    let dy = a.1.abs_diff(b.1);
    STRAIGHT_COST * dx.max(dy) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dy)
}

/// A* path from `start` to `goal`, both ends included. Walls and the cells
/// in `obstacles` are impassable.
pub fn find_path(
    map: &FovMap,
    obstacles: &HashSet<(i32, i32)>,
    start: (i32, i32),
    goal: (i32, i32),
) -> Option<Vec<(i32, i32)>> {
    astar(
        &start,
        |&(x, y)| {
            let mut next = Vec::with_capacity(8);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let cell = (x + dx, y + dy);
                    if !map.is_walkable(cell.0, cell.1) || obstacles.contains(&cell) {
                        continue;
                    }
                    let cost = if dx != 0 && dy != 0 {
                        DIAGONAL_COST
                    } else {
                        STRAIGHT_COST
                    };
                    next.push((cell, cost));
                }
            }
            next
        },
        |&cell| octile(cell, goal),
        |&cell| cell == goal,
    )
    .map(|(path, _)| path)
}

/// Moves `monster` one step along an A* path toward `target`, or straight
/// at it when no short path exists.
pub fn move_astar(ecs: &mut EcsWorld, map: &FovMap, monster: Entity, target: Entity) {
    let (Some(from), Some(to)) = (ecs.position(monster), ecs.position(target)) else {
        return;
    };
    let obstacles: HashSet<(i32, i32)> = ecs
        .map_entities()
        .iter()
        .copied()
        .filter(|&e| e != monster && e != target && ecs.has::<Blocks>(e))
        .filter_map(|e| ecs.position(e).map(Position::as_tuple))
        .collect();

    match find_path(map, &obstacles, from.as_tuple(), to.as_tuple()) {
        Some(path) if path.len() > 1 && path.len() - 1 < MAX_PATH_STEPS => {
            let (x, y) = path[1];
            debug!("{monster:?} paths to ({x}, {y})");
            set_position(ecs, monster, x, y);
        }
        _ => move_towards(ecs, map, monster, to.x, to.y),
    }
}

/// Runs one monster turn against `target`.
pub fn take_turn(
    ecs: &mut EcsWorld,
    map: &FovMap,
    visible: &VisibleSet,
    rng: &mut impl Rng,
    monster: Entity,
    target: Entity,
) -> Events {
    let Some(ai) = ecs.world.get::<&Ai>(monster).ok().map(|ai| (*ai).clone()) else {
        return Vec::new();
    };
    match ai {
        Ai::Basic => basic_turn(ecs, map, visible, monster, target),
        Ai::Confused { .. } => confused_turn(ecs, map, rng, monster, ai),
    }
}

fn basic_turn(
    ecs: &mut EcsWorld,
    map: &FovMap,
    visible: &VisibleSet,
    monster: Entity,
    target: Entity,
) -> Events {
    let (Some(pos), Some(target_pos)) = (ecs.position(monster), ecs.position(target)) else {
        return Vec::new();
    };
    if !visible.contains(pos.x, pos.y) {
        return Vec::new();
    }

    if pos.distance_to(&target_pos) >= 2.0 {
        move_astar(ecs, map, monster, target);
        Vec::new()
    } else if ecs
        .world
        .get::<&Fighter>(target)
        .is_ok_and(|fighter| fighter.hp > 0)
    {
        attack(ecs, monster, target)
    } else {
        Vec::new()
    }
}

fn confused_turn(
    ecs: &mut EcsWorld,
    map: &FovMap,
    rng: &mut impl Rng,
    monster: Entity,
    mut ai: Ai,
) -> Events {
    let Some(turn) = ai.confused_turn(rng) else {
        return Vec::new();
    };
    let _ = ecs.world.insert_one(monster, ai);

    if let (Some((ox, oy)), Some(pos)) = (turn.stumble, ecs.position(monster)) {
        move_towards(ecs, map, monster, pos.x + ox, pos.y + oy);
    }

    if turn.recovered {
        let name = ecs.name(monster);
        vec![GameEvent::Message(Message::new(
            format!("The {name} is no longer confused!"),
            Color::Red,
        ))]
    } else {
        Vec::new()
    }
}
