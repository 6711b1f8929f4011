//! 游戏错误处理模块
//!
//! 游戏内的失败（脚下没有物品、背包已满、目标无效）不是错误，只会写入消息日志。
//! `GameError` 只覆盖存档相关的问题以及应当终止程序的不变量破坏。

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

pub type GameResult<T> = Result<T, GameError>;

/// 游戏运行过程中可能出现的错误类型
#[derive(Debug, Error)]
pub enum GameError {
    /// 没有存档，调用方退回到新游戏
    #[error("No save data found")]
    NoSaveData,

    /// IO操作错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 反序列化错误，通常意味着存档损坏
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// 存档版本不兼容
    #[error("Incompatible save version {found} (expected {expected})")]
    IncompatibleSave { found: u32, expected: u32 },

    #[error("{0} cannot be equipped")]
    NotEquippable(String),

    #[error("Cannot have a menu with more than 26 options (got {0})")]
    TooManyMenuOptions(usize),

    #[error("Entity {entity} is missing its {component} component")]
    MissingComponent {
        entity: String,
        component: &'static str,
    },

    #[error("No player entity in the world")]
    NoPlayer,

    #[error("Dungeon generation failed: {0}")]
    Generation(String),
}

impl GameError {
    /// 不变量破坏属于程序错误，其余错误可以提示玩家后继续
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GameError::NotEquippable(_)
                | GameError::TooManyMenuOptions(_)
                | GameError::MissingComponent { .. }
                | GameError::NoPlayer
        )
    }

    pub fn missing(entity: impl std::fmt::Debug, component: &'static str) -> Self {
        GameError::MissingComponent {
            entity: format!("{:?}", entity),
            component,
        }
    }
}

impl From<DecodeError> for GameError {
    fn from(err: DecodeError) -> Self {
        GameError::Deserialization(err.to_string())
    }
}

impl From<EncodeError> for GameError {
    fn from(err: EncodeError) -> Self {
        GameError::Serialization(err.to_string())
    }
}

/// 处理游戏错误并转换为主菜单上显示的一行提示
pub fn handle_error(error: &GameError) -> String {
    match error {
        GameError::NoSaveData => "No save game to load.".to_string(),
        GameError::IncompatibleSave { .. } | GameError::Deserialization(_) => {
            "The save file is damaged or from another version.".to_string()
        }
        GameError::Io(e) => match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                "Permission denied while accessing the save file.".to_string()
            }
            _ => format!("IO error: {}", e),
        },
        _ => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violations_are_fatal() {
        assert!(GameError::NotEquippable("Healing Potion".into()).is_fatal());
        assert!(GameError::TooManyMenuOptions(27).is_fatal());
        assert!(!GameError::NoSaveData.is_fatal());
    }

    #[test]
    fn missing_save_has_player_facing_text() {
        assert_eq!(handle_error(&GameError::NoSaveData), "No save game to load.");
    }

    #[test]
    fn io_errors_convert() {
        let err: GameError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(matches!(err, GameError::Io(_)));
    }
}
