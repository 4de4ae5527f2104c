//! Rules configuration.
//!
//! The defaults are the standard rules. A table running house rules can
//! load overrides from JSON; missing fields keep their defaults.

use crate::attribute::{MAX_PURCHASE, MIN_PURCHASE, POINT_POOL};
use crate::error::BuildError;
use serde::{Deserialize, Serialize};

/// Highest level a rules configuration may allow.
pub const LEVEL_CAP: i32 = 100;

/// Tunable limits used by the step gates.
///
/// # Examples
///
/// ```rust
/// use sheetsmith::RulesConfig;
///
/// let config = RulesConfig::from_json(r#"{"point_pool": 32}"#).unwrap();
/// assert_eq!(config.point_pool, 32);
/// assert_eq!(config.max_purchase, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Points available to the attribute point-buy.
    pub point_pool: i32,
    /// Lowest purchasable attribute value.
    pub min_purchase: i32,
    /// Highest purchasable attribute value.
    pub max_purchase: i32,
    pub min_level: i32,
    pub max_level: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            point_pool: POINT_POOL,
            min_purchase: MIN_PURCHASE,
            max_purchase: MAX_PURCHASE,
            min_level: 1,
            max_level: 20,
        }
    }
}

impl RulesConfig {
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let config: RulesConfig =
            serde_json::from_str(json).map_err(|e| BuildError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject ranges that no input could satisfy.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.point_pool < 0 {
            return Err(BuildError::Config(format!(
                "point_pool must not be negative, got {}",
                self.point_pool
            )));
        }
        if self.min_purchase > self.max_purchase {
            return Err(BuildError::Config(format!(
                "min_purchase {} is above max_purchase {}",
                self.min_purchase, self.max_purchase
            )));
        }
        if self.min_level < 1 || self.min_level > self.max_level || self.max_level > LEVEL_CAP {
            return Err(BuildError::Config(format!(
                "level range {}..={} is invalid",
                self.min_level, self.max_level
            )));
        }
        Ok(())
    }
}
