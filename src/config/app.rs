use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DB_FILE_NAME: &str = "sqltester.db";
pub const CONFIG_FILE_NAME: &str = "sqltester.toml";
const DEFAULT_TARGET_DB: &str = "target.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Database the "test" actions run queries against.
    /// Relative paths are resolved against `data_dir`.
    pub target_db: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    target_db: Option<PathBuf>,
}

impl AppConfig {
    /// Builds the configuration for `data_dir`, applying `sqltester.toml` from
    /// that directory when present.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let mut config = Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        };

        let path = config.data_dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let file: ConfigFile = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
            if let Some(target_db) = file.target_db {
                config.target_db = target_db;
            }
        }

        Ok(config)
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    #[must_use]
    pub fn target_db_path(&self) -> PathBuf {
        if self.target_db.is_absolute() {
            self.target_db.clone()
        } else {
            self.data_dir.join(&self.target_db)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            target_db: PathBuf::from(DEFAULT_TARGET_DB),
        }
    }
}
