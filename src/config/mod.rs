use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::journey::effects::Timings;
use crate::journey::{IconSet, LAST_STAGE};

pub const DEFAULT_MARKETING_URL: &str = "https://www.guesttouch.com";

/// Optional hex colour overrides, e.g. `accent = "#3B82F6"`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_soft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Pause before the chat bubble re-enters after a stage change
    pub reveal_delay_ms: u64,

    /// How long confetti stays up after a stage change
    pub confetti_window_ms: u64,

    /// Particles per confetti burst
    pub confetti_count: usize,

    /// Event poll / redraw interval
    pub tick_rate_ms: u64,

    /// Stage shown on launch (0-5)
    pub start_stage: usize,

    pub icons: IconSet,

    /// Sender shown in the chat window header
    pub hotel_name: String,

    pub marketing_url: String,

    #[serde(skip_serializing_if = "is_default_theme")]
    pub theme: ThemeOverrides,
}

fn is_default_theme(t: &ThemeOverrides) -> bool {
    *t == ThemeOverrides::default()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 300,
            confetti_window_ms: 3000,
            confetti_count: crate::confetti::DEFAULT_PIECES,
            tick_rate_ms: 33,
            start_stage: 0,
            icons: IconSet::Nerd,
            hotel_name: "Lex Hotel".to_string(),
            marketing_url: DEFAULT_MARKETING_URL.to_string(),
            theme: ThemeOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("guest-journey");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it
    pub fn load() -> Self {
        match Self::default_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::warn!("{}", e);
                AppConfig::default()
            }
        }
    }

    /// Load config from `path`. Unreadable or malformed files fall back to
    /// defaults; a missing file is created with defaults.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match Self::read(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{}", e),
            }
            return AppConfig::default();
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        config
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_stage > LAST_STAGE {
            return Err(ConfigError::Invalid {
                key: "start_stage",
                reason: format!("must be between 0 and {}", LAST_STAGE),
            });
        }
        if self.confetti_count == 0 {
            return Err(ConfigError::Invalid {
                key: "confetti_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "tick_rate_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.reveal_delay_ms >= self.confetti_window_ms {
            return Err(ConfigError::Invalid {
                key: "reveal_delay_ms",
                reason: "must be shorter than confetti_window_ms".to_string(),
            });
        }
        Ok(())
    }

    pub fn timings(&self) -> Timings {
        Timings {
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
            confetti_window: Duration::from_millis(self.confetti_window_ms),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}
