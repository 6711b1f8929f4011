//! Turn resolution.
//!
//! `Engine::process` takes one player intent through four phases: dispatch
//! it against the current `GameState`, drain the resulting events, refresh
//! the field of view if the player moved, and let the monsters act when the
//! player's turn is over.

use crate::core::Engine;
use crate::ecs::{Color, Inventory, Item, Stairs};
use crate::event_bus::{EventQueue, Events, GameEvent};
use crate::inventory::{drop_item, pickup, toggle_equip, use_item};
use crate::message_log::Message;
use crate::systems::{attack, heal, kill_monster, kill_player, take_turn};
use combat::{Fighter, Level, LevelUpChoice};
use error::{GameError, GameResult};
use hecs::Entity;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    PlayersTurn,
    EnemyTurn,
    PlayerDead,
    ShowInventory,
    DropInventory,
    Targeting,
    LevelUp,
    CharacterScreen,
}

impl GameState {
    /// States in which a turn-ending event hands control to the monsters.
    fn yields_to_enemies(self) -> bool {
        matches!(
            self,
            GameState::PlayersTurn
                | GameState::ShowInventory
                | GameState::DropInventory
                | GameState::Targeting
        )
    }
}

/// What the player asked for, already decoded from raw input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Move { dx: i32, dy: i32 },
    Wait,
    Pickup,
    ShowInventory,
    DropInventory,
    InventoryIndex(usize),
    TakeStairs,
    LevelUp(LevelUpChoice),
    ShowCharacterScreen,
    LeftClick { x: i32, y: i32 },
    RightClick { x: i32, y: i32 },
    Exit,
    ToggleFullscreen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    /// Save and leave.
    Quit,
}

/// Which side produced the events being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Player,
    Enemy,
}

/// The state machine half of the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnSystem {
    pub state: GameState,
    /// Where menus and targeting return to.
    pub previous_state: GameState,
    /// The scroll waiting for a target cell.
    pub targeting_item: Option<Entity>,
}

impl TurnSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&mut self, menu: GameState) {
        self.previous_state = self.state;
        self.state = menu;
    }

    fn close(&mut self) {
        self.state = self.previous_state;
    }
}

impl Engine {
    /// Runs one intent to completion.
    pub fn process(&mut self, intent: Intent) -> GameResult<TurnOutcome> {
        let Some(events) = self.dispatch(intent)? else {
            return Ok(TurnOutcome::Quit);
        };
        self.resolve(events, Phase::Player)?;

        if self.fov_dirty {
            self.refresh_fov();
        }
        if self.turn.state == GameState::EnemyTurn {
            self.enemy_phase()?;
        }
        Ok(TurnOutcome::Continue)
    }

    /// Applies the intent. `None` means the player asked to quit.
    fn dispatch(&mut self, intent: Intent) -> GameResult<Option<Events>> {
        let state = self.turn.state;
        let player = self.player;
        let mut events = Vec::new();

        match intent {
            Intent::Move { dx, dy } if state == GameState::PlayersTurn => {
                let pos = self.player_position()?;
                let (x, y) = (pos.x + dx, pos.y + dy);
                if !self.grid.is_blocked(x, y) {
                    match self.ecs.blocking_entity_at(x, y) {
                        Some(target) if self.ecs.has::<Fighter>(target) => {
                            events = attack(&mut self.ecs, player, target);
                        }
                        Some(_) => {}
                        None => {
                            self.ecs.place_on_map(player, x, y).map_err(|_| GameError::NoPlayer)?;
                            self.fov_dirty = true;
                        }
                    }
                    self.turn.state = GameState::EnemyTurn;
                }
            }
            Intent::Wait if state == GameState::PlayersTurn => {
                heal(&mut self.ecs, player, 1);
                self.turn.state = GameState::EnemyTurn;
            }
            Intent::Pickup if state == GameState::PlayersTurn => {
                events = pickup(&mut self.ecs, player);
            }
            Intent::ShowInventory
                if matches!(state, GameState::PlayersTurn | GameState::PlayerDead) =>
            {
                self.turn.open(GameState::ShowInventory);
            }
            Intent::DropInventory if state == GameState::PlayersTurn => {
                self.turn.open(GameState::DropInventory);
            }
            Intent::ShowCharacterScreen
                if matches!(state, GameState::PlayersTurn | GameState::PlayerDead) =>
            {
                self.turn.open(GameState::CharacterScreen);
            }
            Intent::InventoryIndex(index)
                if matches!(state, GameState::ShowInventory | GameState::DropInventory)
                    && self.turn.previous_state != GameState::PlayerDead =>
            {
                if let Some(item) = self.inventory_item(index) {
                    events = if state == GameState::ShowInventory {
                        use_item(&mut self.ecs, &self.visible, player, item, None)?
                    } else {
                        drop_item(&mut self.ecs, player, item)
                    };
                }
            }
            Intent::TakeStairs if state == GameState::PlayersTurn => {
                let pos = self.player_position()?;
                let on_stairs = self
                    .ecs
                    .entities_at(pos.x, pos.y)
                    .any(|e| self.ecs.has::<Stairs>(e));
                if on_stairs {
                    self.next_floor()?;
                } else {
                    events.push(GameEvent::Message(Message::new(
                        "There are no stairs here.",
                        Color::Yellow,
                    )));
                }
            }
            Intent::LevelUp(choice) if state == GameState::LevelUp => {
                if let Ok(mut fighter) = self.ecs.world.get::<&mut Fighter>(player) {
                    choice.apply(&mut fighter);
                }
                info!("player raised {choice}");
                self.turn.close();
            }
            Intent::LeftClick { x, y } if state == GameState::Targeting => {
                if let Some(item) = self.turn.targeting_item {
                    events = use_item(&mut self.ecs, &self.visible, player, item, Some((x, y)))?;
                }
            }
            Intent::RightClick { .. } if state == GameState::Targeting => {
                events.push(GameEvent::TargetingCancelled);
            }
            Intent::Exit => match state {
                GameState::ShowInventory | GameState::DropInventory | GameState::CharacterScreen => {
                    self.turn.close();
                }
                GameState::Targeting => events.push(GameEvent::TargetingCancelled),
                _ => return Ok(None),
            },
            Intent::ToggleFullscreen => {}
            other => debug!("ignoring {other:?} in {state:?}"),
        }
        Ok(Some(events))
    }

    fn inventory_item(&self, index: usize) -> Option<Entity> {
        self.ecs
            .world
            .get::<&Inventory>(self.player)
            .ok()
            .and_then(|inventory| inventory.items.get(index).copied())
    }

    /// Drains `events`, including anything the handlers enqueue.
    fn resolve(&mut self, events: Events, phase: Phase) -> GameResult<()> {
        let mut queue = EventQueue::new();
        queue.publish_all(events);

        while let Some(event) = queue.pop() {
            if phase == Phase::Player && event.ends_turn() && self.turn.state.yields_to_enemies() {
                self.turn.state = GameState::EnemyTurn;
            }

            match event {
                GameEvent::Message(message) => self.log.add(message),
                GameEvent::Dead { entity, xp } => {
                    if entity == self.player {
                        let message = kill_player(&mut self.ecs, entity);
                        self.log.add(message);
                        self.turn.state = GameState::PlayerDead;
                        info!("player died on dungeon level {}", self.dungeon_level);
                    } else {
                        let message = kill_monster(&mut self.ecs, entity);
                        self.log.add(message);
                        if phase == Phase::Player {
                            queue.publish(GameEvent::Xp(xp));
                        }
                    }
                }
                GameEvent::ItemAdded(item) => self.ecs.remove_from_map(item),
                GameEvent::ItemDropped(item) => match self.ecs.position(item) {
                    Some(pos) => {
                        let _ = self.ecs.place_on_map(item, pos.x, pos.y);
                    }
                    None => warn!("dropped {item:?} has no position"),
                },
                GameEvent::Consumed(item) => {
                    self.ecs.despawn(item);
                    if self.turn.targeting_item == Some(item) {
                        self.turn.targeting_item = None;
                    }
                }
                GameEvent::Equip(item) => {
                    queue.publish_all(toggle_equip(&mut self.ecs, self.player, item)?);
                }
                GameEvent::Equipped(item) => self.log.add(Message::plain(format!(
                    "You equip the {}",
                    self.ecs.name(item)
                ))),
                GameEvent::Unequipped(item) => self.log.add(Message::plain(format!(
                    "You unequip the {}",
                    self.ecs.name(item)
                ))),
                GameEvent::Targeting(item) => {
                    self.turn.previous_state = GameState::PlayersTurn;
                    self.turn.state = GameState::Targeting;
                    self.turn.targeting_item = Some(item);
                    let prompt = self
                        .ecs
                        .world
                        .get::<&Item>(item)
                        .ok()
                        .and_then(|i| i.effect.as_ref().and_then(|e| e.targeting_prompt()));
                    if let Some(prompt) = prompt {
                        self.log.add(Message::new(prompt, Color::LightCyan));
                    }
                }
                GameEvent::TargetingCancelled => {
                    self.turn.close();
                    self.turn.targeting_item = None;
                    self.log.add(Message::plain("Targeting cancelled."));
                }
                GameEvent::Xp(amount) if self.turn.state != GameState::PlayerDead => {
                    self.grant_xp(amount)
                }
                GameEvent::Xp(_) => {}
            }
        }
        Ok(())
    }

    fn grant_xp(&mut self, amount: u32) {
        let Ok(mut level) = self.ecs.world.get::<&mut Level>(self.player) else {
            return;
        };
        let leveled_up = level.add_xp(amount);
        let current = level.current_level;
        drop(level);

        self.log.add(Message::plain(format!("You gain {amount} XP.")));
        if leveled_up {
            self.log.add(Message::new(
                format!("Your fighting skills improve! You reached level {current}!"),
                Color::Yellow,
            ));
            // A second level in the same resolution shares the open menu.
            if self.turn.state != GameState::LevelUp {
                self.turn.open(GameState::LevelUp);
            }
            info!("player reached level {current}");
        }
    }

    /// Every monster acts once, in map order, unless the player dies first.
    fn enemy_phase(&mut self) -> GameResult<()> {
        for monster in self.ecs.ai_entities() {
            // Earlier turns may have killed it.
            if !self.ecs.has::<combat::Ai>(monster) {
                continue;
            }
            let events = take_turn(
                &mut self.ecs,
                &self.fov_map,
                &self.visible,
                &mut self.rng,
                monster,
                self.player,
            );
            self.resolve(events, Phase::Enemy)?;
            if self.turn.state == GameState::PlayerDead {
                return Ok(());
            }
        }
        self.turn.state = GameState::PlayersTurn;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menus_remember_where_they_came_from() {
        let mut turn = TurnSystem::new();
        turn.state = GameState::PlayerDead;
        turn.open(GameState::ShowInventory);
        assert_eq!(turn.previous_state, GameState::PlayerDead);
        turn.close();
        assert_eq!(turn.state, GameState::PlayerDead);
    }

    #[test]
    fn only_player_states_hand_over_the_turn() {
        assert!(GameState::PlayersTurn.yields_to_enemies());
        assert!(GameState::Targeting.yields_to_enemies());
        assert!(!GameState::PlayerDead.yields_to_enemies());
        assert!(!GameState::LevelUp.yields_to_enemies());
    }
}
