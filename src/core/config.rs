//! Engine configuration.
//!
//! Sessions configure the engine at startup with an [`EngineConfig`]. All
//! fields have defaults, so a JSON document only needs the keys it overrides:
//!
//! ```
//! use court_engine::core::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "rng_seed": 7 }"#).unwrap();
//! assert_eq!(config.rng_seed, 7);
//! assert_eq!(config.max_event_depth, 100);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default bound on nested event dispatch.
pub const MAX_EVENT_DEPTH: u32 = 100;

/// Priority given to catch-all rules so card abilities get first refusal.
pub const DEFAULT_RULE_PRIORITY: i32 = 1000;

/// Runtime configuration for an [`Engine`](crate::engine::Engine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest allowed nesting of request events.
    pub max_event_depth: u32,

    /// Priority of the built-in catch-all rules.
    pub default_rule_priority: i32,

    /// Seed for the fate RNG of new games.
    pub rng_seed: u64,

    /// Points awarded by the default scoring rule.
    pub score_value: i64,

    /// Extra points when a skill test succeeds with a bonus margin.
    pub bonus_score: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_event_depth: MAX_EVENT_DEPTH,
            default_rule_priority: DEFAULT_RULE_PRIORITY,
            rng_seed: 0,
            score_value: 2,
            bonus_score: 1,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] on malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when `max_event_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_event_depth == 0 {
            return Err(EngineError::Config(
                "max_event_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the depth bound (builder pattern).
    #[must_use]
    pub fn with_max_event_depth(mut self, depth: u32) -> Self {
        self.max_event_depth = depth;
        self
    }

    /// Set the catch-all rule priority (builder pattern).
    #[must_use]
    pub fn with_default_rule_priority(mut self, priority: i32) -> Self {
        self.default_rule_priority = priority;
        self
    }

    /// Set the RNG seed (builder pattern).
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Set the scoring values (builder pattern).
    #[must_use]
    pub fn with_scoring(mut self, score_value: i64, bonus_score: i64) -> Self {
        self.score_value = score_value;
        self.bonus_score = bonus_score;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.max_event_depth, 100);
        assert_eq!(config.default_rule_priority, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_max_event_depth(10)
            .with_default_rule_priority(500)
            .with_rng_seed(99)
            .with_scoring(3, 2);

        assert_eq!(config.max_event_depth, 10);
        assert_eq!(config.default_rule_priority, 500);
        assert_eq!(config.rng_seed, 99);
        assert_eq!(config.score_value, 3);
        assert_eq!(config.bonus_score, 2);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"max_event_depth": 12}"#).unwrap();
        assert_eq!(config.max_event_depth, 12);
        assert_eq!(config.default_rule_priority, DEFAULT_RULE_PRIORITY);
    }

    #[test]
    fn test_from_json_rejects_zero_depth() {
        let err = EngineConfig::from_json(r#"{"max_event_depth": 0}"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(EngineConfig::from_json("not json").is_err());
    }
}
