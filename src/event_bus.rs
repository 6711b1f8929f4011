//! 回合结果事件
//!
//! 玩家或怪物的每个行动都会产生一组有序的 `GameEvent`。
//! 回合引擎通过 `EventQueue` 依次处理，处理器可以追加后续事件（例如死亡后获得经验）。

use crate::message_log::Message;
use hecs::Entity;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Text for the message log.
    Message(Message),
    /// A fighter dropped to zero hp. Demotion is up to the handler.
    Dead { entity: Entity, xp: u32 },
    /// An item moved from the map into the player's pack.
    ItemAdded(Entity),
    /// An item moved from the pack back onto the map.
    ItemDropped(Entity),
    /// A one-use item was used up.
    Consumed(Entity),
    /// Toggle an equippable item in its slot.
    Equip(Entity),
    Equipped(Entity),
    Unequipped(Entity),
    /// The item needs a target cell before it can be used.
    Targeting(Entity),
    TargetingCancelled,
    Xp(u32),
}

impl GameEvent {
    /// Whether this event ends the player's action and hands the turn over.
    pub fn ends_turn(&self) -> bool {
        matches!(
            self,
            GameEvent::ItemAdded(_)
                | GameEvent::ItemDropped(_)
                | GameEvent::Consumed(_)
                | GameEvent::Equip(_)
        )
    }
}

pub type Events = Vec<GameEvent>;

/// 待处理事件的先进先出队列
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.queue.extend(events);
    }

    pub fn pop(&mut self) -> Option<GameEvent> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
