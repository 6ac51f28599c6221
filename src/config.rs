//! Runtime configuration for the score keeper.
//!
//! Everything has a sensible default so the module works with no host setup.
//! A host page may override any subset by passing JSON to the `configure`
//! export; missing fields keep their defaults.

use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("default target must be positive, got {0}")]
    NonPositiveTarget(i64),
    #[error("avatar max side must be at least 1 pixel")]
    ZeroAvatarSide,
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// localStorage keys for the three independently persisted entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub players: String,
    pub target: String,
    pub playing: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            players: "dutch_blitz_players_v5".to_string(),
            target: "dutch_blitz_target_v5".to_string(),
            playing: "dutch_blitz_is_playing_v5".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageKeys,
    /// Used on first load and whenever the stored target is unusable.
    pub default_target: i64,
    /// Quick-pick buttons on the setup screen.
    pub target_presets: Vec<i64>,
    /// Longest side of a normalized avatar, in pixels.
    pub avatar_max_side: u32,
    /// JPEG quality (1-100) for normalized avatars.
    pub avatar_quality: u8,
    /// Prefix for the generated fallback avatar; the name is appended as the seed.
    pub fallback_avatar_url: String,
    pub ember_count: usize,
    /// Browser console verbosity: off, error, warn, info, debug or trace.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageKeys::default(),
            default_target: 75,
            target_presets: vec![75, 100, 150],
            avatar_max_side: 200,
            avatar_quality: 70,
            fallback_avatar_url: "https://api.dicebear.com/7.x/avataaars/svg?seed=".to_string(),
            ember_count: 150,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_target <= 0 {
            return Err(ConfigError::NonPositiveTarget(self.default_target));
        }
        if self.avatar_max_side == 0 {
            return Err(ConfigError::ZeroAvatarSide);
        }
        self.log_filter()?;
        Ok(())
    }

    pub fn log_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_keys() {
        let config = Config::default();
        assert_eq!(config.default_target, 75);
        assert_eq!(config.target_presets, vec![75, 100, 150]);
        assert_eq!(config.storage.players, "dutch_blitz_players_v5");
        assert_eq!(config.storage.target, "dutch_blitz_target_v5");
        assert_eq!(config.storage.playing, "dutch_blitz_is_playing_v5");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{"default_target": 100, "storage": {"players": "p"}}"#).unwrap();
        assert_eq!(config.default_target, 100);
        assert_eq!(config.storage.players, "p");
        assert_eq!(config.storage.target, "dutch_blitz_target_v5");
        assert_eq!(config.avatar_max_side, 200);
    }

    #[test]
    fn rejects_non_positive_target() {
        assert!(matches!(
            Config::from_json(r#"{"default_target": 0}"#),
            Err(ConfigError::NonPositiveTarget(0))
        ));
    }

    #[test]
    fn log_level_is_parsed_and_validated() {
        assert_eq!(Config::default().log_filter().unwrap(), LevelFilter::Info);
        let config = Config::from_json(r#"{"log_level": "DEBUG"}"#).unwrap();
        assert_eq!(config.log_filter().unwrap(), LevelFilter::Debug);
        assert!(matches!(
            Config::from_json(r#"{"log_level": "loud"}"#),
            Err(ConfigError::LogLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(Config::from_json("{{"), Err(ConfigError::Json(_))));
    }
}
