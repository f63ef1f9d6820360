//! Configuration management for alertchart.
//!
//! Loads configuration from TOML files. Every section and key is optional;
//! anything missing takes its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "alertchart.toml";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub analysis: AnalysisConfig,
    pub overlay: OverlayConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations.
    ///
    /// Searches in order:
    /// 1. `./alertchart.toml`
    /// 2. `<config_dir>/alertchart/config.toml`
    ///
    /// Returns default config if no file is found. A file that exists but
    /// fails to parse is logged and skipped.
    pub fn load_default() -> Self {
        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("Ignoring config {}: {}", path.display(), e),
            }
        }

        Self::default()
    }

    /// Candidate config paths, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("alertchart").join("config.toml"));
        }
        paths
    }

    /// Save configuration to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from(LOCAL_CONFIG_FILE)
    }

    /// Reject values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("general.default_symbol is empty".into()));
        }
        if self.api.history_limit == 0 || self.api.history_limit > 1000 {
            return Err(ConfigError::Invalid(format!(
                "api.history_limit must be in 1..=1000, got {}",
                self.api.history_limit
            )));
        }
        if self.analysis.window == 0 {
            return Err(ConfigError::Invalid("analysis.window must be positive".into()));
        }
        Ok(())
    }
}

/// General application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default trading symbol to load on startup.
    pub default_symbol: String,
    /// Default candle interval label (e.g. "1d").
    pub default_interval: String,
    /// User id stamped on persisted notifications.
    pub user_id: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_symbol: "BTCUSDT".to_string(),
            default_interval: "1d".to_string(),
            user_id: "local".to_string(),
        }
    }
}

/// Exchange API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Binance REST base URL.
    pub rest_url: String,
    /// Binance WebSocket base URL.
    pub ws_url: String,
    /// Number of candles fetched when a session opens.
    pub history_limit: u32,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://api.binance.com".to_string(),
            ws_url: "wss://stream.binance.com:9443/ws".to_string(),
            history_limit: 150,
            timeout_secs: 30,
        }
    }
}

/// Which remote analysis function to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Normal,
    Ultra,
}

/// AI analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Base URL of the hosted functions; the function name is appended.
    /// When unset, the local heuristic analyzer is used.
    pub endpoint: Option<String>,
    /// Bearer token sent with analysis requests.
    pub api_key: Option<String>,
    pub mode: AnalysisMode,
    /// Number of most recent candles sent with a request.
    pub window: usize,
    /// Arm the alert engine as soon as an analysis arrives.
    pub auto_arm: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            mode: AnalysisMode::Normal,
            window: 90,
            auto_arm: true,
        }
    }
}

/// Chart overlay configuration. Colours are CSS-style hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// How many candle intervals the level lines extend past the last tick.
    pub lookahead_candles: u32,
    pub entry_color: String,
    pub take_profit_color: String,
    pub stop_loss_color: String,
    pub profit_band_color: String,
    pub loss_band_color: String,
    pub trendline_color: String,
    /// Chart background, used to erase the area under a band.
    pub background: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            lookahead_candles: 10,
            entry_color: "#2962ff".to_string(),
            take_profit_color: "#26a69a".to_string(),
            stop_loss_color: "#ef5350".to_string(),
            profit_band_color: "rgba(38, 166, 154, 0.15)".to_string(),
            loss_band_color: "rgba(239, 83, 80, 0.15)".to_string(),
            trendline_color: "#ff9800".to_string(),
            background: "#131722".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.default_symbol, "BTCUSDT");
        assert_eq!(config.general.default_interval, "1d");
        assert_eq!(config.api.history_limit, 150);
        assert_eq!(config.analysis.window, 90);
        assert_eq!(config.overlay.lookahead_candles, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[general]
default_symbol = "ETHUSDT"

[analysis]
endpoint = "https://example.test/functions/v1"
mode = "ultra"
auto_arm = false

[overlay]
lookahead_candles = 4

[unknown_section]
whatever = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.general.default_symbol, "ETHUSDT");
        assert_eq!(config.general.user_id, "local");
        assert_eq!(config.analysis.mode, AnalysisMode::Ultra);
        assert!(!config.analysis.auto_arm);
        assert_eq!(config.analysis.window, 90);
        assert_eq!(config.overlay.lookahead_candles, 4);
        assert_eq!(config.overlay.background, "#131722");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.general.default_interval = "4h".to_string();
        config.analysis.api_key = Some("secret".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.general.default_interval, "4h");
        assert_eq!(loaded.analysis.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[api]\nhistory_limit = 0\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[general\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::ParseError(_))));
    }
}
