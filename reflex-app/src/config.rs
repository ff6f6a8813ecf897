use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{LevelFilter, debug, info, warn};
use reflex_core::PlayerSession;
use reflex_leaderboard::{
    DEFAULT_TOP_N, JsonFileLeaderboard, LeaderboardStore, MemoryLeaderboard, RestLeaderboard,
};
use reflex_timing::DelayPolicy;
use reflex_trial::TrialConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_FILE: &str = "reflex.json";
const DEFAULT_PLAYER: &str = "Player";

pub type SharedStore = Arc<dyn LeaderboardStore + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Where finished scores go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Backend {
    Memory,
    /// `None` means `scores.json` in the platform data dir.
    File {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Rest {
        url: String,
        api_key: String,
        #[serde(default = "default_table")]
        table: String,
    },
}

impl Default for Backend {
    fn default() -> Self {
        Backend::File { path: None }
    }
}

fn default_table() -> String {
    "scores".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub delay: DelayPolicy,
    pub leaderboard_limit: usize,
    pub backend: Backend,
    pub player: PlayerConfig,
    /// Play the arm, cue and result tones.
    pub audio: bool,
    /// TTF/OTF for the on-screen prompts; `None` searches system fonts.
    pub font: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            delay: DelayPolicy::default(),
            leaderboard_limit: DEFAULT_TOP_N,
            backend: Backend::default(),
            player: PlayerConfig::default(),
            audio: true,
            font: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "reflex")
}

/// `scores.json` under the platform data dir, or the working directory.
pub fn default_scores_path() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().join("scores.json"))
        .unwrap_or_else(|| PathBuf::from("scores.json"))
}

impl AppConfig {
    /// Reads `reflex.json` from the working directory, then from the
    /// platform config dir; falls back to defaults. Env overrides apply last.
    pub fn load() -> Self {
        let candidates = std::iter::once(PathBuf::from(CONFIG_FILE))
            .chain(project_dirs().map(|d| d.config_dir().join(CONFIG_FILE)));

        let mut config = Self::default();
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(c) => {
                    info!("Loaded config from {:?}", path);
                    config = c;
                }
                Err(e) => warn!("Failed to load {:?}: {e:#}. Using default values.", path),
            }
            break;
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(name) = var("REFLEX_PLAYER_NAME") {
            self.player.name = Some(name);
        }
        if let Some(email) = var("REFLEX_PLAYER_EMAIL") {
            self.player.email = Some(email);
        }
        if let Some(path) = var("REFLEX_LEADERBOARD") {
            debug!("Leaderboard file overridden by environment: {path}");
            self.backend = Backend::File {
                path: Some(PathBuf::from(path)),
            };
        }
    }

    pub fn trial_config(&self) -> TrialConfig {
        TrialConfig::with_delay(self.delay)
    }

    /// Registers the configured player, or `Player` when no name is set.
    pub fn player_session(&self) -> Result<PlayerSession> {
        let name = self
            .player
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_PLAYER);
        Ok(PlayerSession::register(name, self.player.email.as_deref())?)
    }

    pub fn open_store(&self) -> SharedStore {
        match &self.backend {
            Backend::Memory => Arc::new(MemoryLeaderboard::new()),
            Backend::File { path: Some(path) } => Arc::new(JsonFileLeaderboard::open(path)),
            Backend::File { path: None } => {
                Arc::new(JsonFileLeaderboard::open(default_scores_path()))
            }
            Backend::Rest {
                url,
                api_key,
                table,
            } => Arc::new(RestLeaderboard::new(url, api_key, table)),
        }
    }
}
