//! Engine configuration.
//!
//! Only the anti-cheat tunables are configurable. Growth times, prices, and
//! recipes are catalogue data compiled into `homestead-world`. The engine
//! never reads files; the host reads the YAML and hands the text to
//! [`EngineConfig::parse`].

use rust_decimal::Decimal;
use serde::Deserialize;

use homestead_types::Timestamp;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but makes no sense.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Temporal and post-transition integrity limits.
    #[serde(default)]
    pub integrity: IntegrityConfig,
}

impl EngineConfig {
    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a limit is zero or negative.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check limits on a configuration deserialized elsewhere, such as a
    /// section of a larger host file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.integrity.validate()
    }
}

/// Limits enforced by the integrity guard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IntegrityConfig {
    /// Largest tolerated distance between an action's `createdAt` and the
    /// engine's `now`.
    #[serde(default = "default_max_clock_skew_ms")]
    pub max_clock_skew_ms: u64,

    /// Length of the rate-limit window.
    #[serde(default = "default_rate_window_ms")]
    pub rate_window_ms: Timestamp,

    /// Actions accepted inside one rate-limit window.
    #[serde(default = "default_max_actions_per_window")]
    pub max_actions_per_window: usize,

    /// Largest growth of a single inventory item in one transition.
    #[serde(default = "default_max_item_gain")]
    pub max_item_gain: Decimal,

    /// Largest growth of the coin balance in one transition.
    #[serde(default = "default_max_coin_gain")]
    pub max_coin_gain: Decimal,
}

impl IntegrityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_window_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "integrity.rate_window_ms",
                reason: "must be positive",
            });
        }
        if self.max_actions_per_window == 0 {
            return Err(ConfigError::Invalid {
                field: "integrity.max_actions_per_window",
                reason: "must be positive",
            });
        }
        if self.max_item_gain <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "integrity.max_item_gain",
                reason: "must be positive",
            });
        }
        if self.max_coin_gain <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "integrity.max_coin_gain",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            max_clock_skew_ms: default_max_clock_skew_ms(),
            rate_window_ms: default_rate_window_ms(),
            max_actions_per_window: default_max_actions_per_window(),
            max_item_gain: default_max_item_gain(),
            max_coin_gain: default_max_coin_gain(),
        }
    }
}

const fn default_max_clock_skew_ms() -> u64 {
    300_000
}

const fn default_rate_window_ms() -> Timestamp {
    1_000
}

const fn default_max_actions_per_window() -> usize {
    25
}

const fn default_max_item_gain() -> Decimal {
    Decimal::from_parts(10_000, 0, 0, false, 0)
}

const fn default_max_coin_gain() -> Decimal {
    Decimal::from_parts(1_000_000, 0, 0, false, 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.integrity.max_clock_skew_ms, 300_000);
        assert_eq!(config.integrity.rate_window_ms, 1_000);
        assert_eq!(config.integrity.max_actions_per_window, 25);
        assert_eq!(config.integrity.max_item_gain, dec!(10000));
        assert_eq!(config.integrity.max_coin_gain, dec!(1000000));
        assert!(config.integrity.validate().is_ok());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
integrity:
  max_clock_skew_ms: 60000
  max_item_gain: "250.5"
"#;
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.integrity.max_clock_skew_ms, 60_000);
        assert_eq!(config.integrity.max_item_gain, dec!(250.5));
        assert_eq!(config.integrity.rate_window_ms, 1_000);
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = EngineConfig::parse("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn zero_rate_window_is_rejected() {
        let err = EngineConfig::parse("integrity:\n  rate_window_ms: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "integrity.rate_window_ms",
                ..
            }
        ));
    }

    #[test]
    fn garbage_is_a_yaml_error() {
        assert!(matches!(
            EngineConfig::parse("integrity: [1, 2"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
