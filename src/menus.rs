//! Menu contents. Layout and drawing are the renderer's job.

use crate::core::Engine;
use crate::ecs::{Equipment, Inventory};
use crate::turn_system::GameState;
use combat::LevelUpChoice;
use error::{GameError, GameResult};
use strum::IntoEnumIterator;

/// Options are picked with `a` to `z`.
pub const MAX_MENU_OPTIONS: usize = 26;

pub const INVENTORY_WIDTH: u16 = 50;
pub const LEVEL_UP_WIDTH: u16 = 40;
pub const CHARACTER_SCREEN_WIDTH: u16 = 30;
pub const MAIN_MENU_WIDTH: u16 = 24;

pub const GAME_TITLE: &str = "TOMBS OF THE ANCIENT KINGS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    pub header: String,
    pub options: Vec<String>,
    pub width: u16,
}

impl Menu {
    pub fn new(header: impl Into<String>, options: Vec<String>, width: u16) -> GameResult<Self> {
        if options.len() > MAX_MENU_OPTIONS {
            return Err(GameError::TooManyMenuOptions(options.len()));
        }
        Ok(Self {
            header: header.into(),
            options,
            width,
        })
    }

    /// Option lines prefixed with their selection letter.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.options
            .iter()
            .zip('a'..='z')
            .map(|(text, letter)| format!("({letter}) {text}"))
    }
}

/// Selection index for a menu letter.
pub fn option_index(key: char) -> Option<usize> {
    key.is_ascii_lowercase().then(|| key as usize - 'a' as usize)
}

pub fn inventory_menu(engine: &Engine, header: &str) -> GameResult<Menu> {
    let inventory = engine
        .ecs
        .world
        .get::<&Inventory>(engine.player)
        .map_err(|_| GameError::missing(engine.player, "Inventory"))?;
    let equipment = engine.ecs.world.get::<&Equipment>(engine.player).ok();

    let options = if inventory.items.is_empty() {
        vec!["Inventory is empty.".to_string()]
    } else {
        inventory
            .items
            .iter()
            .map(|&item| {
                let name = engine.ecs.name(item);
                match equipment.as_ref() {
                    Some(eq) if eq.main_hand == Some(item) => format!("{name} (in main hand)"),
                    Some(eq) if eq.off_hand == Some(item) => format!("{name} (in off hand)"),
                    _ => name,
                }
            })
            .collect()
    };
    Menu::new(header, options, INVENTORY_WIDTH)
}

pub fn level_up_menu(engine: &Engine) -> GameResult<Menu> {
    let player = engine.player;
    let max_hp = engine.ecs.max_hp(player).unwrap_or_default();
    let power = engine.ecs.power(player).unwrap_or_default();
    let defense = engine.ecs.defense(player).unwrap_or_default();

    let options = LevelUpChoice::iter()
        .map(|choice| match choice {
            LevelUpChoice::Hp => format!("{choice} (+20 HP, from {max_hp})"),
            LevelUpChoice::Str => format!("{choice} (+1 attack, from {power})"),
            LevelUpChoice::Def => format!("{choice} (+1 defense, from {defense})"),
        })
        .collect();
    Menu::new("Level up! Choose a stat to raise:", options, LEVEL_UP_WIDTH)
}

pub fn character_screen(engine: &Engine) -> Vec<String> {
    let player = engine.player;
    let level = engine.ecs.level(player).unwrap_or_default();
    vec![
        "Character Information".to_string(),
        String::new(),
        format!("Level: {}", level.current_level),
        format!("Experience: {}", level.current_xp),
        format!("Experience to Level: {}", level.experience_to_next_level()),
        String::new(),
        format!("Maximum HP: {}", engine.ecs.max_hp(player).unwrap_or_default()),
        format!("Attack: {}", engine.ecs.power(player).unwrap_or_default()),
        format!("Defense: {}", engine.ecs.defense(player).unwrap_or_default()),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainMenuChoice {
    NewGame,
    Continue,
    Quit,
}

pub fn main_menu() -> Menu {
    Menu {
        header: String::new(),
        options: vec![
            "Play a new game".to_string(),
            "Continue last game".to_string(),
            "Quit".to_string(),
        ],
        width: MAIN_MENU_WIDTH,
    }
}

pub fn main_menu_choice(key: char) -> Option<MainMenuChoice> {
    match key {
        'a' => Some(MainMenuChoice::NewGame),
        'b' => Some(MainMenuChoice::Continue),
        'c' => Some(MainMenuChoice::Quit),
        _ => None,
    }
}

/// The menu, if any, that the current state puts over the map.
pub fn overlay(engine: &Engine) -> GameResult<Option<Menu>> {
    Ok(match engine.state() {
        GameState::ShowInventory => Some(inventory_menu(
            engine,
            "Press the key next to an item to use it, or Esc to cancel.",
        )?),
        GameState::DropInventory => Some(inventory_menu(
            engine,
            "Press the key next to an item to drop it, or Esc to cancel.",
        )?),
        GameState::LevelUp => Some(level_up_menu(engine)?),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn more_than_26_options_is_an_error() {
        let options = (0..27).map(|i| i.to_string()).collect();
        assert!(matches!(
            Menu::new("too many", options, 30),
            Err(GameError::TooManyMenuOptions(27))
        ));
    }

    #[test]
    fn lines_are_lettered() {
        let menu = Menu::new("", vec!["one".into(), "two".into()], 10).unwrap();
        assert_eq!(menu.lines().collect::<Vec<_>>(), vec!["(a) one", "(b) two"]);
        assert_eq!(option_index('b'), Some(1));
        assert_eq!(option_index('B'), None);
    }

    #[test]
    fn inventory_labels_worn_gear() {
        let engine = Engine::new_game(GameConfig::default(), 2).unwrap();
        let menu = inventory_menu(&engine, "Inventory").unwrap();
        assert_eq!(menu.options, vec!["Dagger (in main hand)".to_string()]);
    }

    #[test]
    fn level_up_options_show_current_stats() {
        let engine = Engine::new_game(GameConfig::default(), 2).unwrap();
        let menu = level_up_menu(&engine).unwrap();
        assert_eq!(
            menu.options,
            vec![
                "Constitution (+20 HP, from 100)".to_string(),
                "Strength (+1 attack, from 4)".to_string(),
                "Agility (+1 defense, from 1)".to_string(),
            ]
        );
    }

    #[test]
    fn character_screen_lists_level_and_stats() {
        let engine = Engine::new_game(GameConfig::default(), 2).unwrap();
        let lines = character_screen(&engine);
        assert!(lines.contains(&"Level: 1".to_string()));
        assert!(lines.contains(&"Experience to Level: 350".to_string()));
        assert!(lines.contains(&"Attack: 4".to_string()));
    }
}
