use pageflow_engine::{DEFAULT_CAPACITY, DEFAULT_NAMESPACE, HistoryConfig, PageCapacity, RedoPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// `[history]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub capacity: usize,
    pub namespace: String,
    pub redo_policy: RedoPolicy,
    /// Directory holding one JSON file per history key
    pub store_path: PathBuf,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            namespace: DEFAULT_NAMESPACE.to_string(),
            redo_policy: RedoPolicy::default(),
            store_path: PathBuf::from("~/.local/share/pageflow/history"),
        }
    }
}

impl HistorySettings {
    pub fn to_history_config(&self) -> HistoryConfig {
        HistoryConfig {
            capacity: self.capacity,
            namespace: self.namespace.clone(),
            redo_policy: self.redo_policy,
        }
    }
}

/// `[editor]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Quiet period after the last keystroke before pages are rebuilt
    pub debounce_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self { debounce_ms: 1500 }
    }
}

impl EditorSettings {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page: PageCapacity,
    pub history: HistorySettings,
    pub editor: EditorSettings,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.expand_paths();

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The config file if present, otherwise defaults with paths expanded
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_else(|| {
            let mut config = Self::default();
            config.expand_paths();
            config
        }))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/pageflow");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_paths(&mut self) {
        if let Some(expanded) = Self::expand_path(&self.history.store_path) {
            self.history.store_path = expanded;
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
