use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use error::handle_error;
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use save::SaveSystem;
use scopeguard::defer;
use std::{
    fs::{self, File},
    io::{self, Stdout},
    path::{Path, PathBuf},
    process,
    time::SystemTime,
};
use terminal_rogue::{
    config::GameConfig,
    core::Engine,
    input,
    menus::{MainMenuChoice, main_menu_choice},
    renderer,
    snapshot::Snapshot,
    turn_system::{GameState, TurnOutcome},
};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// A terminal roguelike: rooms, corridors, orcs and scrolls.
#[derive(Parser, Debug)]
#[command(name = "terminal-rogue")]
#[command(version)]
struct Args {
    /// JSON file overriding the default settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for the save file and the log
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Skip the main menu and start a new game
    #[arg(long)]
    new: bool,
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let file = File::create(dir.join("game.log")).context("Failed to create the log file")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn fresh_seed() -> u64 {
    let time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    (time ^ u128::from(process::id())) as u64
}

/// Shows the title screen until the player starts or loads a game.
/// `None` means quit.
fn main_menu(
    terminal: &mut Term,
    saves: &SaveSystem,
    config: &GameConfig,
    seed: Option<u64>,
) -> Result<Option<Engine>> {
    let mut notice: Option<String> = None;
    loop {
        terminal.draw(|frame| renderer::draw_main_menu(frame, notice.as_deref()))?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        if notice.take().is_some() {
            continue;
        }

        let choice = match key.code {
            KeyCode::Esc => Some(MainMenuChoice::Quit),
            KeyCode::Char(c) => main_menu_choice(c),
            _ => None,
        };
        match choice {
            Some(MainMenuChoice::NewGame) => {
                let engine = Engine::new_game(config.clone(), seed.unwrap_or_else(fresh_seed))?;
                return Ok(Some(engine));
            }
            Some(MainMenuChoice::Continue) => match saves.load::<Snapshot>() {
                Ok(snapshot) => return Ok(Some(Engine::restore(config.clone(), snapshot)?)),
                Err(err) if !err.is_fatal() => {
                    info!("continue failed: {err}");
                    notice = Some(handle_error(&err));
                }
                Err(err) => return Err(err.into()),
            },
            Some(MainMenuChoice::Quit) => return Ok(None),
            None => {}
        }
    }
}

/// Runs the game until the player quits.
fn play(terminal: &mut Term, engine: &mut Engine) -> Result<()> {
    let mut mouse = None;
    loop {
        terminal.draw(|frame| renderer::draw(frame, engine, mouse))?;
        let event = event::read()?;
        if let Some(cell) = input::mouse_cell(&event) {
            mouse = Some(cell);
        }
        let Some(intent) = input::decode(&event, engine.state()) else {
            continue;
        };
        if engine.process(intent)? == TurnOutcome::Quit {
            return Ok(());
        }
    }
}

/// Saves a live game, or forgets the save of a dead one.
fn persist(saves: &SaveSystem, engine: &Engine) -> Result<()> {
    if engine.state() == GameState::PlayerDead {
        saves.delete_save().context("Failed to delete the save")?;
        info!("player is dead, save removed");
    } else {
        saves
            .save(&engine.snapshot())
            .context("Failed to save the game")?;
        info!("saved on dungeon level {}", engine.dungeon_level);
    }
    Ok(())
}

fn run(terminal: &mut Term, args: &Args, config: &GameConfig, saves: &SaveSystem) -> Result<()> {
    let mut skip_menu = args.new;
    loop {
        let engine = if skip_menu {
            skip_menu = false;
            Some(Engine::new_game(config.clone(), args.seed.unwrap_or_else(fresh_seed))?)
        } else {
            main_menu(terminal, saves, config, args.seed)?
        };
        let Some(mut engine) = engine else {
            return Ok(());
        };

        play(terminal, &mut engine)?;
        persist(saves, &engine)?;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)?,
        None => GameConfig::default(),
    };
    if let Some(dir) = &args.save_dir {
        config.save_directory = dir.clone();
    }

    init_logging(&config.save_directory)?;
    defer! {
        log::logger().flush();
    }
    let saves = SaveSystem::new(&config.save_directory).context("Failed to open the save directory")?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    let _guard = TerminalGuard;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("Failed to create terminal")?;

    let result = run(&mut terminal, &args, &config, &saves);
    if let Err(err) = &result {
        error!("game crashed: {err:#}");
    }
    result
}
