pub mod config;
pub mod core;
pub mod ecs;
pub mod event_bus;
pub mod input;
pub mod inventory;
pub mod item_effects;
pub mod menus;
pub mod message_log;
pub mod renderer;
pub mod snapshot;
pub mod spawner;
pub mod systems;
pub mod turn_system;

pub use crate::core::Engine;
pub use crate::turn_system::{GameState, Intent, TurnOutcome};
