//! 存档系统：单一存档槽，bincode 编码，原子写入

use bincode::config;
use error::{GameError, GameResult};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

/// 当前存档格式版本
pub const SAVE_VERSION: u32 = 1;

const SAVE_FILE: &str = "savegame.sav";

/// 存档数据外层（带版本号）
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveEnvelope<T> {
    pub version: u32,
    pub saved_at: SystemTime,
    pub payload: T,
}

pub struct SaveSystem {
    save_dir: PathBuf,
}

impl SaveSystem {
    /// 存档目录不存在时自动创建
    pub fn new(save_dir: impl AsRef<Path>) -> GameResult<Self> {
        let save_dir = save_dir.as_ref();
        if !save_dir.exists() {
            fs::create_dir_all(save_dir)?;
        }
        Ok(Self {
            save_dir: save_dir.to_path_buf(),
        })
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn save_path(&self) -> PathBuf {
        self.save_dir.join(SAVE_FILE)
    }

    pub fn has_save(&self) -> bool {
        self.save_path().is_file()
    }

    /// 先写入临时文件，再重命名覆盖旧存档
    pub fn save<T: Serialize>(&self, payload: &T) -> GameResult<()> {
        let path = self.save_path();
        let temp_path = path.with_extension("tmp");
        let envelope = SaveEnvelope {
            version: SAVE_VERSION,
            saved_at: SystemTime::now(),
            payload,
        };

        let mut writer = BufWriter::new(fs::File::create(&temp_path)?);
        bincode::serde::encode_into_std_write(&envelope, &mut writer, config::standard())?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &path)?;
        info!("saved game to {}", path.display());
        Ok(())
    }

    /// Fails with [`GameError::NoSaveData`] when no save exists.
    pub fn load<T: DeserializeOwned>(&self) -> GameResult<T> {
        let path = self.save_path();
        if !path.is_file() {
            return Err(GameError::NoSaveData);
        }

        let mut reader = BufReader::new(fs::File::open(&path)?);
        let envelope: SaveEnvelope<T> =
            bincode::serde::decode_from_std_read(&mut reader, config::standard())?;
        if envelope.version != SAVE_VERSION {
            return Err(GameError::IncompatibleSave {
                found: envelope.version,
                expected: SAVE_VERSION,
            });
        }

        info!("loaded game from {}", path.display());
        Ok(envelope.payload)
    }

    pub fn delete_save(&self) -> GameResult<()> {
        let path = self.save_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
