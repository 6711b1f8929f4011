//! Translates crossterm events into engine intents.

use crate::menus::option_index;
use crate::turn_system::{GameState, Intent};
use combat::LevelUpChoice;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Decodes one terminal event for the given state. The map is drawn from the
/// top-left corner, so mouse cells are map cells.
pub fn decode(event: &Event, state: GameState) -> Option<Intent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => decode_key(key, state),
        Event::Mouse(mouse) => decode_mouse(mouse),
        _ => None,
    }
}

/// The map cell under the cursor, for any mouse event.
pub fn mouse_cell(event: &Event) -> Option<(i32, i32)> {
    match event {
        Event::Mouse(mouse) => Some((i32::from(mouse.column), i32::from(mouse.row))),
        _ => None,
    }
}

fn decode_mouse(mouse: &MouseEvent) -> Option<Intent> {
    let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Intent::LeftClick { x, y }),
        MouseEventKind::Down(MouseButton::Right) => Some(Intent::RightClick { x, y }),
        _ => None,
    }
}

fn is_fullscreen_toggle(key: &KeyEvent) -> bool {
    key.code == KeyCode::F(11)
        || (key.code == KeyCode::Enter && key.modifiers.contains(KeyModifiers::ALT))
}

fn decode_key(key: &KeyEvent, state: GameState) -> Option<Intent> {
    if is_fullscreen_toggle(key) {
        return Some(Intent::ToggleFullscreen);
    }
    match state {
        GameState::PlayersTurn => players_turn_key(key),
        GameState::PlayerDead => match key.code {
            KeyCode::Char('i') => Some(Intent::ShowInventory),
            KeyCode::Char('c') => Some(Intent::ShowCharacterScreen),
            KeyCode::Esc => Some(Intent::Exit),
            _ => None,
        },
        GameState::ShowInventory | GameState::DropInventory => match key.code {
            KeyCode::Esc => Some(Intent::Exit),
            KeyCode::Char(c) => option_index(c).map(Intent::InventoryIndex),
            _ => None,
        },
        GameState::LevelUp => match key.code {
            KeyCode::Char('a') => Some(Intent::LevelUp(LevelUpChoice::Hp)),
            KeyCode::Char('b') => Some(Intent::LevelUp(LevelUpChoice::Str)),
            KeyCode::Char('c') => Some(Intent::LevelUp(LevelUpChoice::Def)),
            _ => None,
        },
        GameState::Targeting | GameState::CharacterScreen => match key.code {
            KeyCode::Esc => Some(Intent::Exit),
            _ => None,
        },
        GameState::EnemyTurn => None,
    }
}

fn players_turn_key(key: &KeyEvent) -> Option<Intent> {
    let step = |dx, dy| Some(Intent::Move { dx, dy });
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => step(0, -1),
        KeyCode::Down | KeyCode::Char('j') => step(0, 1),
        KeyCode::Left | KeyCode::Char('h') => step(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => step(1, 0),
        KeyCode::Char('y') => step(-1, -1),
        KeyCode::Char('u') => step(1, -1),
        KeyCode::Char('b') => step(-1, 1),
        KeyCode::Char('n') => step(1, 1),
        KeyCode::Char('z') | KeyCode::Char('.') => Some(Intent::Wait),
        KeyCode::Char('g') | KeyCode::Char(',') => Some(Intent::Pickup),
        KeyCode::Char('i') => Some(Intent::ShowInventory),
        KeyCode::Char('d') => Some(Intent::DropInventory),
        KeyCode::Char('>') | KeyCode::Enter => Some(Intent::TakeStairs),
        KeyCode::Char('c') => Some(Intent::ShowCharacterScreen),
        KeyCode::Esc => Some(Intent::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn vi_keys_move_diagonally() {
        assert_eq!(
            decode(&key(KeyCode::Char('u')), GameState::PlayersTurn),
            Some(Intent::Move { dx: 1, dy: -1 })
        );
        assert_eq!(
            decode(&key(KeyCode::Left), GameState::PlayersTurn),
            Some(Intent::Move { dx: -1, dy: 0 })
        );
    }

    #[test]
    fn letters_pick_inventory_slots() {
        assert_eq!(
            decode(&key(KeyCode::Char('c')), GameState::DropInventory),
            Some(Intent::InventoryIndex(2))
        );
        assert_eq!(
            decode(&key(KeyCode::Char('c')), GameState::LevelUp),
            Some(Intent::LevelUp(LevelUpChoice::Def))
        );
    }

    #[test]
    fn dead_players_cannot_move() {
        assert_eq!(decode(&key(KeyCode::Up), GameState::PlayerDead), None);
        assert_eq!(
            decode(&key(KeyCode::Char('i')), GameState::PlayerDead),
            Some(Intent::ShowInventory)
        );
    }

    #[test]
    fn key_releases_are_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('g'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(decode(&release, GameState::PlayersTurn), None);
    }

    #[test]
    fn clicks_carry_map_cells() {
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(
            decode(&click, GameState::Targeting),
            Some(Intent::RightClick { x: 12, y: 7 })
        );
        assert_eq!(mouse_cell(&click), Some((12, 7)));
    }

    #[test]
    fn alt_enter_toggles_fullscreen() {
        let alt_enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert_eq!(
            decode(&alt_enter, GameState::PlayersTurn),
            Some(Intent::ToggleFullscreen)
        );
    }
}
