//! Ratatui renderer. Reads the engine and never changes it.

use crate::core::Engine;
use crate::ecs::{Color, Renderable, Stairs};
use crate::menus::{self, CHARACTER_SCREEN_WIDTH, GAME_TITLE, Menu};
use crate::turn_system::GameState;
use combat::{Fighter, capitalize};
use log::warn;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

const DARK_WALL: TuiColor = TuiColor::Rgb(0, 0, 100);
const DARK_GROUND: TuiColor = TuiColor::Rgb(50, 50, 150);
const LIGHT_WALL: TuiColor = TuiColor::Rgb(130, 110, 50);
const LIGHT_GROUND: TuiColor = TuiColor::Rgb(200, 180, 50);

pub fn tui_color(color: Color) -> TuiColor {
    let (r, g, b) = match color {
        Color::White => (255, 255, 255),
        Color::Black => (0, 0, 0),
        Color::Red => (255, 0, 0),
        Color::DarkRed => (191, 0, 0),
        Color::LightRed => (255, 63, 63),
        Color::Orange => (255, 127, 0),
        Color::DarkerOrange => (127, 63, 0),
        Color::Yellow => (255, 255, 0),
        Color::LightYellow => (255, 255, 114),
        Color::Green => (0, 255, 0),
        Color::LightGreen => (114, 255, 114),
        Color::DesaturatedGreen => (63, 127, 63),
        Color::DarkerGreen => (0, 127, 0),
        Color::Blue => (0, 0, 255),
        Color::LightBlue => (114, 114, 255),
        Color::Sky => (0, 191, 255),
        Color::LightCyan => (114, 255, 255),
        Color::Violet => (127, 0, 255),
        Color::LightViolet => (184, 114, 255),
        Color::LightPink => (255, 114, 184),
        Color::Gray => (127, 127, 127),
        Color::DarkGray => (63, 63, 63),
        Color::Rgb(r, g, b) => (r, g, b),
    };
    TuiColor::Rgb(r, g, b)
}

/// Screen cell for map cell `(x, y)` when it falls inside `area`.
fn screen_cell(area: Rect, x: i32, y: i32) -> Option<(u16, u16)> {
    let sx = u16::try_from(x).ok()?.checked_add(area.x)?;
    let sy = u16::try_from(y).ok()?.checked_add(area.y)?;
    (sx < area.right() && sy < area.bottom()).then_some((sx, sy))
}

/// Tiles lit or remembered, then entities in render order.
struct MapView<'a> {
    engine: &'a Engine,
}

impl Widget for MapView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = self.engine;
        for (x, y, tile) in engine.grid.iter() {
            let Some(cell) = screen_cell(area, x, y) else {
                continue;
            };
            let bg = match (engine.is_visible(x, y), tile.block_sight) {
                (true, true) => LIGHT_WALL,
                (true, false) => LIGHT_GROUND,
                (false, true) if tile.explored => DARK_WALL,
                (false, false) if tile.explored => DARK_GROUND,
                _ => continue,
            };
            buf[cell].set_char(' ').set_bg(bg);
        }

        for entity in engine.ecs.render_list() {
            let (Some(pos), Ok(renderable)) = (
                engine.ecs.position(entity),
                engine.ecs.world.get::<&Renderable>(entity),
            ) else {
                continue;
            };
            let remembered =
                engine.ecs.has::<Stairs>(entity) && engine.grid.is_explored(pos.x, pos.y);
            if !(engine.is_visible(pos.x, pos.y) || remembered) {
                continue;
            }
            if let Some(cell) = screen_cell(area, pos.x, pos.y) {
                buf[cell]
                    .set_char(renderable.glyph)
                    .set_fg(tui_color(renderable.color));
            }
        }
    }
}

/// A labelled bar such as the hp meter.
struct Bar<'a> {
    label: &'a str,
    value: i32,
    maximum: i32,
    fill: TuiColor,
    empty: TuiColor,
}

impl Widget for Bar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let filled = if self.maximum > 0 {
            (i64::from(self.value.max(0)) * i64::from(area.width) / i64::from(self.maximum)) as u16
        } else {
            0
        };
        for dx in 0..area.width {
            let bg = if dx < filled { self.fill } else { self.empty };
            buf[(area.x + dx, area.y)].set_char(' ').set_bg(bg);
        }
        let text = format!("{}: {}/{}", self.label, self.value, self.maximum);
        let start = area.x + area.width.saturating_sub(text.len() as u16) / 2;
        buf.set_string(start, area.y, text, Style::default().fg(TuiColor::White));
    }
}

/// Capitalized names of the visible entities under the cursor.
pub fn names_under_mouse(engine: &Engine, mouse: Option<(i32, i32)>) -> String {
    let Some((x, y)) = mouse else {
        return String::new();
    };
    if !engine.is_visible(x, y) {
        return String::new();
    }
    engine
        .ecs
        .entities_at(x, y)
        .map(|e| capitalize(&engine.ecs.name(e)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn draw_panel(frame: &mut Frame, engine: &Engine, mouse: Option<(i32, i32)>, area: Rect) {
    let config = &engine.config;
    let bar_width = config.bar_width.min(area.width.saturating_sub(1));

    let names = Paragraph::new(names_under_mouse(engine, mouse))
        .style(Style::default().fg(tui_color(Color::Gray)));
    frame.render_widget(names, Rect::new(area.x + 1, area.y, bar_width, 1));

    let (hp, max_hp) = engine
        .ecs
        .world
        .get::<&Fighter>(engine.player)
        .map(|f| (f.hp, engine.ecs.max_hp(engine.player).unwrap_or(f.base_max_hp)))
        .unwrap_or_default();
    if area.height > 1 {
        frame.render_widget(
            Bar {
                label: "HP",
                value: hp,
                maximum: max_hp,
                fill: tui_color(Color::LightRed),
                empty: tui_color(Color::DarkRed),
            },
            Rect::new(area.x + 1, area.y + 1, bar_width, 1),
        );
    }
    if area.height > 3 {
        frame.render_widget(
            Paragraph::new(format!("Dungeon level: {}", engine.dungeon_level)),
            Rect::new(area.x + 1, area.y + 3, bar_width, 1),
        );
    }

    let log_x = area.x + bar_width + 2;
    if log_x < area.right() {
        let lines: Vec<Line> = engine
            .log
            .lines()
            .map(|m| Line::from(Span::styled(m.text.clone(), Style::default().fg(tui_color(m.color)))))
            .collect();
        let log_area = Rect::new(
            log_x,
            area.y + 1,
            area.right() - log_x,
            area.height.saturating_sub(1),
        );
        frame.render_widget(Paragraph::new(lines), log_area);
    }
}

/// A `width`-wide box centred in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_menu(frame: &mut Frame, area: Rect, menu: &Menu) {
    let mut lines: Vec<Line> = Vec::new();
    if !menu.header.is_empty() {
        lines.push(Line::from(menu.header.clone()));
    }
    lines.extend(menu.lines().map(Line::from));
    let header_rows = if menu.header.is_empty() {
        0
    } else {
        menu.header.len() as u16 / menu.width.max(1) + 1
    };
    let height = menu.options.len() as u16 + header_rows + 2;
    let rect = centered(area, menu.width + 2, height);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL)),
        rect,
    );
}

fn draw_overlay(frame: &mut Frame, engine: &Engine, area: Rect) {
    if engine.state() == GameState::CharacterScreen {
        let lines: Vec<Line> = menus::character_screen(engine)
            .into_iter()
            .map(Line::from)
            .collect();
        let rect = centered(area, CHARACTER_SCREEN_WIDTH, lines.len() as u16 + 2);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
            rect,
        );
        return;
    }

    match menus::overlay(engine) {
        Ok(Some(menu)) => draw_menu(frame, area, &menu),
        Ok(None) => {}
        Err(err) => warn!("cannot build menu: {err}"),
    }
}

/// Draws one frame of the running game.
pub fn draw(frame: &mut Frame, engine: &Engine, mouse: Option<(i32, i32)>) {
    let area = frame.area();
    let config = &engine.config;
    let map_height = area.height.saturating_sub(config.panel_height);

    frame.render_widget(MapView { engine }, Rect::new(area.x, area.y, area.width, map_height));
    let panel = Rect::new(
        area.x,
        area.y + map_height,
        area.width,
        area.height - map_height,
    );
    draw_panel(frame, engine, mouse, panel);
    draw_overlay(frame, engine, area);
}

/// Title screen with the main menu, plus an optional notice such as a
/// failed load.
pub fn draw_main_menu(frame: &mut Frame, notice: Option<&str>) {
    let area = frame.area();
    let title_y = area.height / 2 - area.height.min(8) / 2;
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            GAME_TITLE,
            Style::default().fg(tui_color(Color::LightYellow)),
        )))
        .centered(),
        Rect::new(area.x, area.y + title_y.saturating_sub(4), area.width, 1),
    );
    draw_menu(frame, area, &menus::main_menu());
    if let Some(text) = notice {
        let width = (text.len() as u16 + 4).min(area.width);
        let y = (area.y + area.height / 2 + 4).min(area.bottom().saturating_sub(3));
        let rect = Rect::new(area.x + (area.width - width) / 2, y, width, 3.min(area.height));
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
            rect,
        );
    }
}
