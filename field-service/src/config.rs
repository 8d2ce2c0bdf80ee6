use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FIELD_DESK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "field-desk.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(format!("{}.sqlite", meter_client::db::DB_NAME)),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Where exports land when no target file is given.
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    /// Reads the file named by `FIELD_DESK_CONFIG`, or `field-desk.toml`.
    ///
    /// Only a missing default file falls back to built-in settings.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) if !Path::new(DEFAULT_CONFIG_PATH).exists() => {
                tracing::debug!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(_) => Self::from_file(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}
