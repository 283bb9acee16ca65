//! Timing constants and their serde-loadable configuration.

use serde::{Deserialize, Serialize};

/// Narration speaking rate.
pub const WORDS_PER_MINUTE: f64 = 150.0;
/// Upper bound on a single scene's share of the target duration.
pub const MAX_SCENE_SECONDS: f64 = 30.0;
/// Floor applied to every scene duration.
pub const MIN_SCENE_SECONDS: f64 = 5.0;
/// Every plan has at least this many scenes.
pub const MIN_SCENE_COUNT: usize = 2;
/// Per-character reveal time bounds, in seconds.
pub const CHAR_REVEAL_MIN_SECONDS: f64 = 0.03;
pub const CHAR_REVEAL_MAX_SECONDS: f64 = 0.08;
/// Share of the scene duration available to character-by-character reveals.
pub const CHAR_REVEAL_UTILIZATION: f64 = 0.85;
/// Share of the scene duration available to word-by-word reveals.
pub const WORD_REVEAL_UTILIZATION: f64 = 0.90;

const ENV_WORDS_PER_MINUTE: &str = "OPTIMA_WORDS_PER_MINUTE";
const ENV_MAX_SCENE_SECONDS: &str = "OPTIMA_MAX_SCENE_SECONDS";
const ENV_MIN_SCENE_SECONDS: &str = "OPTIMA_MIN_SCENE_SECONDS";

/// Errors from loading or validating a [`TimingConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimingError {
    #[error("invalid timing config: {0}")]
    InvalidConfig(String),
    #[error("failed to parse timing config: {0}")]
    Parse(String),
}

/// Constants used by the scene planner and reveal helpers.
///
/// Every field defaults to the documented constant, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub words_per_minute: f64,
    pub max_scene_seconds: f64,
    pub min_scene_seconds: f64,
    pub min_scene_count: usize,
    pub char_reveal_min_seconds: f64,
    pub char_reveal_max_seconds: f64,
    pub char_reveal_utilization: f64,
    pub word_reveal_utilization: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: WORDS_PER_MINUTE,
            max_scene_seconds: MAX_SCENE_SECONDS,
            min_scene_seconds: MIN_SCENE_SECONDS,
            min_scene_count: MIN_SCENE_COUNT,
            char_reveal_min_seconds: CHAR_REVEAL_MIN_SECONDS,
            char_reveal_max_seconds: CHAR_REVEAL_MAX_SECONDS,
            char_reveal_utilization: CHAR_REVEAL_UTILIZATION,
            word_reveal_utilization: WORD_REVEAL_UTILIZATION,
        }
    }
}

impl TimingConfig {
    pub fn words_per_second(&self) -> f64 {
        self.words_per_minute / 60.0
    }

    /// Estimated narration time for `words` words, without any floor.
    pub fn speaking_seconds(&self, words: usize) -> f64 {
        words as f64 / self.words_per_second()
    }

    /// Parses a JSON config and validates it.
    pub fn from_json_str(raw: &str) -> Result<Self, TimingError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| TimingError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `OPTIMA_WORDS_PER_MINUTE`, `OPTIMA_MAX_SCENE_SECONDS` and
    /// `OPTIMA_MIN_SCENE_SECONDS` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, TimingError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup, then validates.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, TimingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, field) in [
            (ENV_WORDS_PER_MINUTE, &mut self.words_per_minute),
            (ENV_MAX_SCENE_SECONDS, &mut self.max_scene_seconds),
            (ENV_MIN_SCENE_SECONDS, &mut self.min_scene_seconds),
        ] {
            let Some(raw) = lookup(key) else { continue };
            if raw.trim().is_empty() {
                continue;
            }
            *field = raw
                .trim()
                .parse()
                .map_err(|_| TimingError::InvalidConfig(format!("{key} must be a number, got {raw:?}")))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), TimingError> {
        let positive = [
            ("words_per_minute", self.words_per_minute),
            ("max_scene_seconds", self.max_scene_seconds),
            ("char_reveal_min_seconds", self.char_reveal_min_seconds),
            ("char_reveal_max_seconds", self.char_reveal_max_seconds),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TimingError::InvalidConfig(format!(
                    "{name} must be a positive number"
                )));
            }
        }
        if !(self.min_scene_seconds.is_finite() && self.min_scene_seconds >= 0.0) {
            return Err(TimingError::InvalidConfig(
                "min_scene_seconds must not be negative".into(),
            ));
        }
        if self.min_scene_count == 0 {
            return Err(TimingError::InvalidConfig(
                "min_scene_count must be at least 1".into(),
            ));
        }
        if self.char_reveal_min_seconds > self.char_reveal_max_seconds {
            return Err(TimingError::InvalidConfig(
                "char_reveal_min_seconds must not exceed char_reveal_max_seconds".into(),
            ));
        }
        for (name, value) in [
            ("char_reveal_utilization", self.char_reveal_utilization),
            ("word_reveal_utilization", self.word_reveal_utilization),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(TimingError::InvalidConfig(format!(
                    "{name} must be within (0, 1]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_matches_documented_constants() {
        let config = TimingConfig::default();
        assert_eq!(config.words_per_second(), 2.5);
        assert_eq!(config.speaking_seconds(300), 120.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TimingConfig::from_json_str(r#"{"words_per_minute": 180}"#).expect("parse");
        assert_eq!(config.words_per_minute, 180.0);
        assert_eq!(config.min_scene_seconds, MIN_SCENE_SECONDS);
        assert_eq!(config.min_scene_count, MIN_SCENE_COUNT);
    }

    #[test]
    fn invalid_json_values_are_rejected() {
        assert!(matches!(
            TimingConfig::from_json_str(r#"{"words_per_minute": 0}"#),
            Err(TimingError::InvalidConfig(msg)) if msg.contains("words_per_minute")
        ));
        assert!(matches!(
            TimingConfig::from_json_str("{"),
            Err(TimingError::Parse(_))
        ));
        assert!(matches!(
            TimingConfig::from_json_str(r#"{"char_reveal_min_seconds": 0.5}"#),
            Err(TimingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn overrides_apply_and_validate() {
        let vars = HashMap::from([
            (ENV_WORDS_PER_MINUTE, "120".to_string()),
            (ENV_MIN_SCENE_SECONDS, " ".to_string()),
        ]);
        let config = TimingConfig::default()
            .with_overrides_from(|key| vars.get(key).cloned())
            .expect("overrides");
        assert_eq!(config.words_per_minute, 120.0);
        assert_eq!(config.min_scene_seconds, MIN_SCENE_SECONDS);

        let bad = HashMap::from([(ENV_MAX_SCENE_SECONDS, "soon".to_string())]);
        let err = TimingConfig::default()
            .with_overrides_from(|key| bad.get(key).cloned())
            .expect_err("not a number");
        assert!(matches!(err, TimingError::InvalidConfig(msg) if msg.contains(ENV_MAX_SCENE_SECONDS)));
    }
}
