// Configuration loading and parsing (board.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::board::player::Position;
use crate::board::query::{PositionFilter, SortKey, ViewQuery};
use crate::source::DataSource;

/// Upper bound for the removal settle delay.
pub const MAX_REMOVAL_DELAY_MS: u64 = 5000;

const CONFIG_FILE: &str = "board.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// File path or http(s) URL of the player feed.
    pub players: String,
    /// Optional model metrics document.
    #[serde(default)]
    pub metrics: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default = "default_primary_sort")]
    pub primary_sort: String,
    #[serde(default)]
    pub secondary_sort: Option<String>,
    #[serde(default)]
    pub ascending: bool,
    #[serde(default = "default_removal_delay_ms")]
    pub removal_delay_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            position: default_position(),
            primary_sort: default_primary_sort(),
            secondary_sort: None,
            ascending: false,
            removal_delay_ms: default_removal_delay_ms(),
        }
    }
}

fn default_position() -> String {
    "ALL".to_string()
}

fn default_primary_sort() -> String {
    "score".to_string()
}

fn default_removal_delay_ms() -> u64 {
    300
}

impl Config {
    pub fn players_source(&self) -> DataSource {
        DataSource::parse(&self.data.players)
    }

    pub fn metrics_source(&self) -> Option<DataSource> {
        self.data
            .metrics
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(DataSource::parse)
    }

    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.view.removal_delay_ms)
    }

    /// The board's starting query. Assumes the config has been validated;
    /// anything unrecognised falls back to the default.
    pub fn initial_query(&self) -> ViewQuery {
        let position = match PositionFilter::parse(&self.view.position) {
            PositionFilter::All => PositionFilter::All,
            PositionFilter::Only(code) => match Position::from_str_pos(&code) {
                Some(pos) => PositionFilter::Only(pos.display_str().to_string()),
                None => PositionFilter::All,
            },
        };
        let primary = SortKey::from_field(&self.view.primary_sort).unwrap_or(SortKey::Score);
        let secondary = self
            .view
            .secondary_sort
            .as_deref()
            .and_then(SortKey::from_field);

        ViewQuery::default()
            .with_position(position)
            .with_sort(primary, secondary, self.view.ascending)
    }

    /// Database location: `storage.path` when set, otherwise
    /// `draftboard.db` in the platform data directory (created on demand),
    /// otherwise the working directory.
    pub fn db_path(&self) -> String {
        if let Some(path) = self.storage.path.as_deref().filter(|p| !p.trim().is_empty()) {
            return path.to_string();
        }
        directories::ProjectDirs::from("", "", "draftboard")
            .and_then(|dirs| {
                let dir = dirs.data_dir();
                std::fs::create_dir_all(dir).ok()?;
                Some(dir.join("draftboard.db").to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "draftboard.db".to_string())
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/board.toml` relative to `base_dir`.
///
/// Does not copy defaults; see [`load_config`].
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.players.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.players".into(),
            message: "must name a file or URL".into(),
        });
    }

    if let PositionFilter::Only(code) = PositionFilter::parse(&config.view.position) {
        if Position::from_str_pos(&code).is_none() {
            return Err(ConfigError::ValidationError {
                field: "view.position".into(),
                message: format!("unknown position `{code}`"),
            });
        }
    }

    let sort_fields = [
        ("view.primary_sort", Some(config.view.primary_sort.as_str())),
        ("view.secondary_sort", config.view.secondary_sort.as_deref()),
    ];
    for (field, value) in sort_fields {
        if let Some(value) = value {
            if SortKey::from_field(value).is_none() {
                return Err(ConfigError::ValidationError {
                    field: field.into(),
                    message: format!("unknown sort key `{value}`"),
                });
            }
        }
    }

    if config.view.removal_delay_ms > MAX_REMOVAL_DELAY_MS {
        return Err(ConfigError::ValidationError {
            field: "view.removal_delay_ms".into(),
            message: format!(
                "must be at most {MAX_REMOVAL_DELAY_MS}, got {}",
                config.view.removal_delay_ms
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
