//! Room-and-corridor floor generation.
//!
//! Rooms are sampled at random and rejected if they touch an accepted room.
//! Each new room is joined to the previous one by an L-shaped corridor,
//! then populated from the level-dependent spawn tables.

use crate::grid::Grid;
use crate::rect::Rect;
use crate::spawn::{self, ItemKind, MonsterKind};
use error::{GameError, GameResult};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub max_rooms: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 43,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> GameResult<()> {
        if self.max_rooms == 0 {
            return Err(GameError::Generation("max_rooms must be at least 1".into()));
        }
        if self.room_min_size < 3 || self.room_min_size > self.room_max_size {
            return Err(GameError::Generation(format!(
                "invalid room size range {}..={}",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.room_max_size + 1 >= self.width || self.room_max_size + 1 >= self.height {
            return Err(GameError::Generation(format!(
                "rooms up to {} do not fit a {}x{} map",
                self.room_max_size, self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    Monster(MonsterKind),
    Item(ItemKind),
}

/// Something the generator wants placed on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub x: i32,
    pub y: i32,
    pub kind: SpawnKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StairsSpawn {
    pub x: i32,
    pub y: i32,
    pub to_level: u32,
}

/// Everything produced for one dungeon level.
#[derive(Clone, Debug)]
pub struct Floor {
    pub grid: Grid,
    pub rooms: Vec<Rect>,
    pub player_start: (i32, i32),
    pub stairs: StairsSpawn,
    pub spawns: Vec<Spawn>,
}

pub fn generate(config: &GeneratorConfig, dungeon_level: u32, rng: &mut impl Rng) -> GameResult<Floor> {
    config.validate()?;

    let mut grid = Grid::new(config.width, config.height);
    let mut rooms: Vec<Rect> = Vec::new();
    let mut spawns = Vec::new();
    let mut player_start = (0, 0);

    for _ in 0..config.max_rooms {
        let w = rng.random_range(config.room_min_size..=config.room_max_size);
        let h = rng.random_range(config.room_min_size..=config.room_max_size);
        let x = rng.random_range(0..=(config.width - w - 1));
        let y = rng.random_range(0..=(config.height - h - 1));
        let room = Rect::new(x, y, w, h);

        if rooms.iter().any(|other| room.intersects(other)) {
            debug!("rejected room at ({}, {}) {}x{}", x, y, w, h);
            continue;
        }

        carve_room(&mut grid, &room);
        let (new_x, new_y) = room.center();

        match rooms.last() {
            None => player_start = (new_x, new_y),
            Some(prev) => {
                let (prev_x, prev_y) = prev.center();
                if rng.random_range(0..=1) == 1 {
                    carve_h_tunnel(&mut grid, prev_x, new_x, prev_y);
                    carve_v_tunnel(&mut grid, prev_y, new_y, new_x);
                } else {
                    carve_v_tunnel(&mut grid, prev_y, new_y, prev_x);
                    carve_h_tunnel(&mut grid, prev_x, new_x, new_y);
                }
            }
        }

        populate_room(&room, dungeon_level, player_start, &mut spawns, rng);
        rooms.push(room);
    }

    // validate() guarantees the first candidate fits, so rooms is non-empty.
    let (stairs_x, stairs_y) = rooms.last().map_or(player_start, Rect::center);
    debug!(
        "generated floor {} with {} rooms and {} spawns",
        dungeon_level,
        rooms.len(),
        spawns.len()
    );

    Ok(Floor {
        grid,
        rooms,
        player_start,
        stairs: StairsSpawn {
            x: stairs_x,
            y: stairs_y,
            to_level: dungeon_level + 1,
        },
        spawns,
    })
}

fn carve_room(grid: &mut Grid, room: &Rect) {
    for (x, y) in room.interior() {
        grid.carve(x, y);
    }
}

fn carve_h_tunnel(grid: &mut Grid, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        grid.carve(x, y);
    }
}

fn carve_v_tunnel(grid: &mut Grid, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        grid.carve(x, y);
    }
}

fn populate_room(
    room: &Rect,
    dungeon_level: u32,
    player_start: (i32, i32),
    spawns: &mut Vec<Spawn>,
    rng: &mut impl Rng,
) {
    let max_monsters = spawn::from_dungeon_level(spawn::MAX_MONSTERS_PER_ROOM, dungeon_level);
    let max_items = spawn::from_dungeon_level(spawn::MAX_ITEMS_PER_ROOM, dungeon_level);
    let monster_count = rng.random_range(0..=max_monsters);
    let item_count = rng.random_range(0..=max_items);

    let occupied = |spawns: &[Spawn], x: i32, y: i32| {
        player_start == (x, y) || spawns.iter().any(|s| s.x == x && s.y == y)
    };

    let monster_chances = spawn::monster_chances(dungeon_level);
    for _ in 0..monster_count {
        let (x, y) = room.random_interior_point(rng);
        if occupied(spawns.as_slice(), x, y) {
            continue;
        }
        if let Some(kind) = spawn::random_choice(rng, &monster_chances) {
            spawns.push(Spawn {
                x,
                y,
                kind: SpawnKind::Monster(kind),
            });
        }
    }

    let item_chances = spawn::item_chances(dungeon_level);
    for _ in 0..item_count {
        let (x, y) = room.random_interior_point(rng);
        if occupied(spawns.as_slice(), x, y) {
            continue;
        }
        if let Some(kind) = spawn::random_choice(rng, &item_chances) {
            spawns.push(Spawn {
                x,
                y,
                kind: SpawnKind::Item(kind),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::collections::{HashSet, VecDeque};

    fn reachable(grid: &Grid, from: (i32, i32), to: (i32, i32)) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some((x, y)) = queue.pop_front() {
            if (x, y) == to {
                return true;
            }
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = (x + dx, y + dy);
                if !grid.is_blocked(next.0, next.1) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    #[test]
    fn single_room_puts_player_and_stairs_at_center() {
        let config = GeneratorConfig {
            max_rooms: 1,
            ..GeneratorConfig::default()
        };
        let mut rng = Pcg64::seed_from_u64(42);
        let floor = generate(&config, 1, &mut rng).expect("generate");
        assert_eq!(floor.rooms.len(), 1);
        let center = floor.rooms[0].center();
        assert_eq!(floor.player_start, center);
        assert_eq!((floor.stairs.x, floor.stairs.y), center);
        assert_eq!(floor.stairs.to_level, 2);
    }

    #[test]
    fn rejects_rooms_that_cannot_fit() {
        let mut rng = Pcg64::seed_from_u64(1);
        let too_small = GeneratorConfig {
            width: 10,
            height: 10,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            generate(&too_small, 1, &mut rng),
            Err(GameError::Generation(_))
        ));
        let no_rooms = GeneratorConfig {
            max_rooms: 0,
            ..GeneratorConfig::default()
        };
        assert!(generate(&no_rooms, 1, &mut rng).is_err());
    }

    #[test]
    fn spawns_never_share_a_cell_or_the_player_start() {
        let mut rng = Pcg64::seed_from_u64(7);
        let floor = generate(&GeneratorConfig::default(), 6, &mut rng).expect("generate");
        let mut cells = HashSet::new();
        for s in &floor.spawns {
            assert_ne!((s.x, s.y), floor.player_start);
            assert!(cells.insert((s.x, s.y)), "duplicate spawn at {:?}", (s.x, s.y));
            assert!(!floor.grid.is_blocked(s.x, s.y));
        }
    }

    #[test]
    fn first_floor_has_no_trolls() {
        for seed in 0..20 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let floor = generate(&GeneratorConfig::default(), 1, &mut rng).expect("generate");
            assert!(
                floor
                    .spawns
                    .iter()
                    .all(|s| s.kind != SpawnKind::Monster(MonsterKind::Troll))
            );
        }
    }

    #[test]
    fn same_seed_same_floor() {
        let config = GeneratorConfig::default();
        let a = generate(&config, 3, &mut Pcg64::seed_from_u64(99)).expect("generate");
        let b = generate(&config, 3, &mut Pcg64::seed_from_u64(99)).expect("generate");
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.rooms, b.rooms);
        assert_eq!(a.spawns, b.spawns);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn generated_floors_are_consistent(seed in any::<u64>(), level in 1u32..10) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let floor = generate(&GeneratorConfig::default(), level, &mut rng).unwrap();
            prop_assert!(!floor.rooms.is_empty());

            for room in &floor.rooms {
                prop_assert!(room.x1 < room.x2 && room.y1 < room.y2);
                for (x, y) in room.interior() {
                    let tile = floor.grid.tile(x, y).unwrap();
                    prop_assert!(!tile.blocked && !tile.block_sight);
                }
            }

            for (i, a) in floor.rooms.iter().enumerate() {
                for b in &floor.rooms[i + 1..] {
                    prop_assert!(!a.intersects(b));
                }
            }

            for pair in floor.rooms.windows(2) {
                prop_assert!(reachable(&floor.grid, pair[1].center(), pair[0].center()));
            }

            prop_assert_eq!(floor.player_start, floor.rooms[0].center());
            let last = floor.rooms[floor.rooms.len() - 1].center();
            prop_assert_eq!((floor.stairs.x, floor.stairs.y), last);
        }
    }
}
