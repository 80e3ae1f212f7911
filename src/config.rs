//! Configuration for the optimizer and the HTTP host.
//!
//! Every section is optional; missing values fall back to the constants the
//! engine has always used.
//!
//! ```
//! use seating_solver::config::AppConfig;
//!
//! let config = AppConfig::from_toml_str(r#"
//!     [server]
//!     bind_address = "0.0.0.0:9000"
//!
//!     [optimizer.apart]
//!     partner = -8
//!
//!     [optimizer.heuristics]
//!     group_cohesion = true
//! "#).unwrap();
//!
//! assert_eq!(config.optimizer.apart.partner, -8);
//! assert_eq!(config.optimizer.apart.avoid, 5);
//! assert!(config.optimizer.heuristics.group_cohesion);
//! ```

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::RelationshipType;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for the seating binary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "server.bind_address '{}' is not a socket address",
                self.bind_address
            ))
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Tuning knobs for scoring and assignment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OptimizerConfig {
    /// Weights applied when both ends of an edge share a table.
    #[serde(default)]
    pub together: RelationshipWeights,

    /// Adjustments applied when both ends are seated at different tables.
    #[serde(default)]
    pub apart: ApartAdjustments,

    #[serde(default)]
    pub heuristics: HeuristicConfig,

    #[serde(default)]
    pub penalties: BreakdownPenalties,
}

/// Signed weight per relationship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RelationshipWeights {
    pub partner: i32,
    pub family: i32,
    pub friend: i32,
    pub colleague: i32,
    pub avoid: i32,
}

impl RelationshipWeights {
    pub fn weight(&self, kind: RelationshipType) -> i32 {
        match kind {
            RelationshipType::Partner => self.partner,
            RelationshipType::Family => self.family,
            RelationshipType::Friend => self.friend,
            RelationshipType::Colleague => self.colleague,
            RelationshipType::Avoid => self.avoid,
            RelationshipType::Unknown => 0,
        }
    }
}

impl Default for RelationshipWeights {
    fn default() -> Self {
        Self {
            partner: 10,
            family: 5,
            friend: 3,
            colleague: 1,
            avoid: -20,
        }
    }
}

/// Score change for an edge whose two guests sit at different tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApartAdjustments {
    pub partner: i32,
    pub family: i32,
    pub friend: i32,
    pub colleague: i32,
    pub avoid: i32,
}

impl ApartAdjustments {
    pub fn weight(&self, kind: RelationshipType) -> i32 {
        match kind {
            RelationshipType::Partner => self.partner,
            RelationshipType::Family => self.family,
            RelationshipType::Friend => self.friend,
            RelationshipType::Colleague => self.colleague,
            RelationshipType::Avoid => self.avoid,
            RelationshipType::Unknown => 0,
        }
    }
}

impl Default for ApartAdjustments {
    // separated partners cost, separated avoid pairs earn
    fn default() -> Self {
        Self {
            partner: -5,
            family: 0,
            friend: 0,
            colleague: 0,
            avoid: 5,
        }
    }
}

/// Optional placement-score terms layered on top of relationship weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub group_cohesion: bool,
    pub group_weight: i32,
    pub interest_matching: bool,
    pub interest_weight: i32,
    pub industry_weight: i32,
    pub constraint_enforcement: bool,
    pub constraint_weight: i32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            group_cohesion: false,
            group_weight: 2,
            interest_matching: false,
            interest_weight: 1,
            industry_weight: 1,
            constraint_enforcement: false,
            constraint_weight: 15,
        }
    }
}

/// Percentage points deducted in the score breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakdownPenalties {
    pub required_violation: u32,
    pub avoid_together: u32,
    pub separated_pair: u32,
}

impl Default for BreakdownPenalties {
    fn default() -> Self {
        Self {
            required_violation: 20,
            avoid_together: 15,
            separated_pair: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.optimizer.apart.partner, -5);
        assert_eq!(config.optimizer.apart.avoid, 5);
        assert_eq!(config.optimizer.apart.friend, 0);
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn partial_weight_table_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [optimizer.together]
            friend = 4

            [optimizer.penalties]
            required_violation = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.optimizer.together.friend, 4);
        assert_eq!(config.optimizer.together.partner, 10);
        assert_eq!(config.optimizer.together.avoid, -20);
        assert_eq!(config.optimizer.penalties.required_violation, 25);
        assert_eq!(config.optimizer.penalties.separated_pair, 10);
    }

    #[test]
    fn unknown_relationship_type_weighs_zero() {
        let weights = RelationshipWeights::default();
        assert_eq!(weights.weight(RelationshipType::Unknown), 0);
        assert_eq!(weights.weight(RelationshipType::Avoid), -20);
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let err = AppConfig::from_toml_str(
            r#"
            [server]
            bind_address = "not an address"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_or_default("does/not/exist/seating.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = AppConfig::from_toml_str("[optimizer.together\npartner = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
