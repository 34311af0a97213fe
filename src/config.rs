//! Capsule configuration.
//!
//! # Example
//!
//! ```rust
//! use capsule::config::CapsuleConfig;
//! use capsule::effects::FanOutPolicy;
//!
//! let config = CapsuleConfig::from_json(r#"{ "fan_out": "best_effort" }"#).unwrap();
//! assert_eq!(config.fan_out, FanOutPolicy::BestEffort);
//! ```

use crate::effects::FanOutPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse capsule configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Runtime behavior of a capsule. Missing fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapsuleConfig {
    /// Failure policy applied to the side effects of each impure transition.
    pub fan_out: FanOutPolicy,
}

impl CapsuleConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_fan_out(mut self, policy: FanOutPolicy) -> Self {
        self.fan_out = policy;
        self
    }
}
