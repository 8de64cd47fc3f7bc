//! Application settings: xp award amounts, quiz pass mark and whether a
//! fresh store is seeded with the sample catalog.
//!
//! ```
//! use bioprint_logic::config::AppConfig;
//!
//! let config = AppConfig::from_json(r#"{ "quizPassPercent": 90 }"#).unwrap();
//! assert_eq!(config.quiz_pass_percent, 90);
//! assert_eq!(config.awards.badge, 250);
//! assert!(config.validate().is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::progression::XpAwards;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub awards: XpAwards,
    pub seed_sample_data: bool,
    /// Minimum quiz score (percent) that earns the quiz badge.
    pub quiz_pass_percent: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            awards: XpAwards::default(),
            seed_sample_data: true,
            quiz_pass_percent: 80,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("item completion award must be positive")]
    ZeroItemAward,
    #[error("badge award must be positive")]
    ZeroBadgeAward,
    #[error("quiz pass percent {0} exceeds 100")]
    PassPercentTooHigh(u8),
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<AppConfig, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All problems found, empty when the config is usable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.awards.item_completion == 0 {
            errors.push(ConfigError::ZeroItemAward);
        }
        if self.awards.badge == 0 {
            errors.push(ConfigError::ZeroBadgeAward);
        }
        if self.quiz_pass_percent > 100 {
            errors.push(ConfigError::PassPercentTooHigh(self.quiz_pass_percent));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.awards.item_completion, 100);
        assert!(config.seed_sample_data);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "awards": { "badge": 500 } }"#).unwrap();
        assert_eq!(config.awards.badge, 500);
        assert_eq!(config.awards.item_completion, 100);
        assert_eq!(config.quiz_pass_percent, 80);
    }

    #[test]
    fn reports_every_problem() {
        let config = AppConfig {
            awards: XpAwards {
                item_completion: 0,
                badge: 0,
            },
            seed_sample_data: false,
            quiz_pass_percent: 150,
        };
        assert_eq!(
            config.validate(),
            vec![
                ConfigError::ZeroItemAward,
                ConfigError::ZeroBadgeAward,
                ConfigError::PassPercentTooHigh(150),
            ]
        );
    }
}
