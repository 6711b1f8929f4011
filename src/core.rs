//! 核心游戏上下文，集中保存所有可变的游戏状态
//!
//! 各系统在调用期间只借用自己需要的部分，驱动它们的回合逻辑位于 `turn_system`。

use crate::config::GameConfig;
use crate::ecs::{Color, EcsWorld, Position};
use crate::message_log::{Message, MessageLog};
use crate::spawner::{populate, spawn_player};
use crate::systems::heal;
use crate::turn_system::{GameState, TurnSystem};
use dungeon::{Floor, FovMap, Grid, VisibleSet, generate};
use error::{GameError, GameResult};
use hecs::Entity;
use log::{debug, info};
use rand::SeedableRng;
use rand_pcg::Pcg64;

pub struct Engine {
    pub config: GameConfig,
    pub ecs: EcsWorld,
    pub grid: Grid,
    pub fov_map: FovMap,
    /// Cells the player can currently see.
    pub visible: VisibleSet,
    pub log: MessageLog,
    pub rng: Pcg64,
    pub dungeon_level: u32,
    pub player: Entity,
    pub turn: TurnSystem,
    pub(crate) fov_dirty: bool,
}

impl Engine {
    /// 在第 1 层开始新游戏
    pub fn new_game(config: GameConfig, seed: u64) -> GameResult<Self> {
        let mut rng = Pcg64::seed_from_u64(seed);
        let floor = generate(&config.map, 1, &mut rng)?;
        info!("new game with seed {seed}, {} rooms", floor.rooms.len());
        Ok(Self::from_floor(config, floor, 1, rng))
    }

    /// Builds an engine around an already generated floor with a new player
    /// on its start cell.
    pub fn from_floor(config: GameConfig, floor: Floor, dungeon_level: u32, rng: Pcg64) -> Self {
        let mut ecs = EcsWorld::new();
        let (x, y) = floor.player_start;
        let player = spawn_player(&mut ecs, &config.player, x, y);
        populate(&mut ecs, &floor);

        let fov_map = FovMap::from_grid(&floor.grid);
        let visible = VisibleSet::empty(floor.grid.width(), floor.grid.height());
        let log = MessageLog::new(config.message_width, config.message_height);

        let mut engine = Self {
            config,
            ecs,
            grid: floor.grid,
            fov_map,
            visible,
            log,
            rng,
            dungeon_level,
            player,
            turn: TurnSystem::new(),
            fov_dirty: true,
        };
        engine.refresh_fov();
        engine
    }

    pub fn state(&self) -> GameState {
        self.turn.state
    }

    pub fn player_position(&self) -> GameResult<Position> {
        self.ecs
            .position(self.player)
            .ok_or_else(|| GameError::missing(self.player, "Position"))
    }

    /// Recomputes what the player sees and marks it explored.
    pub fn refresh_fov(&mut self) {
        let Some(pos) = self.ecs.position(self.player) else {
            return;
        };
        self.visible = self.fov_map.compute(
            pos.x,
            pos.y,
            self.config.fov_radius,
            self.config.fov_light_walls,
            self.config.fov_algorithm,
        );
        for (x, y) in self.visible.iter() {
            self.grid.mark_explored(x, y);
        }
        self.fov_dirty = false;
        debug!("fov from ({}, {}): {} cells", pos.x, pos.y, self.visible.len());
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.visible.contains(x, y)
    }

    /// Descends one level: a new floor, the player on its start cell and
    /// half of the player's health restored.
    pub fn next_floor(&mut self) -> GameResult<()> {
        self.dungeon_level += 1;
        self.ecs.clear_map_except(self.player);

        let floor = generate(&self.config.map, self.dungeon_level, &mut self.rng)?;
        let (x, y) = floor.player_start;
        self.ecs
            .place_on_map(self.player, x, y)
            .map_err(|_| GameError::NoPlayer)?;
        populate(&mut self.ecs, &floor);
        self.fov_map = FovMap::from_grid(&floor.grid);
        self.grid = floor.grid;

        let max_hp = self.ecs.max_hp(self.player).unwrap_or(0);
        heal(&mut self.ecs, self.player, max_hp / 2);
        self.log.add(Message::new(
            "You take a moment to rest and recover your strength.",
            Color::LightViolet,
        ));

        self.fov_dirty = true;
        self.refresh_fov();
        info!(
            "descended to dungeon level {} ({} rooms)",
            self.dungeon_level,
            floor.rooms.len()
        );
        Ok(())
    }
}
