//src/dungeon/src/lib.rs
//! 地牢楼层：地块、房间、程序化生成与视野

pub mod fov;
pub mod generator;
pub mod grid;
pub mod rect;
pub mod spawn;

pub use fov::{FovAlgorithm, FovMap, VisibleSet};
pub use generator::{Floor, GeneratorConfig, Spawn, SpawnKind, StairsSpawn, generate};
pub use grid::{Grid, Tile};
pub use rect::Rect;
pub use spawn::{ItemKind, MonsterKind};
