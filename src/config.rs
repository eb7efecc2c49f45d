//! Server configuration, read from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host (HOST), default 0.0.0.0 so the app is reachable on a VPS.
    pub host: String,
    /// Bind port (PORT), default 8080.
    pub port: u16,
    /// Tournaments idle for this long are dropped (INACTIVITY_HOURS, default 12).
    pub inactivity_timeout: Duration,
    /// Default preferred poule size for new tournaments (TEAMS_PER_POULE, 3 or 4).
    pub teams_per_poule: usize,
    /// Default number of teams per poule promoted to the knockout (QUALIFIERS_PER_POULE).
    pub qualifiers_per_poule: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            inactivity_timeout: Duration::from_secs(12 * 3600),
            teams_per_poule: 4,
            qualifiers_per_poule: 2,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let hours: u64 = parse_or(&lookup, "INACTIVITY_HOURS", 12)?;
        let inactivity_secs = hours
            .checked_mul(3600)
            .filter(|secs| *secs > 0)
            .ok_or_else(|| ConfigError::Invalid {
                var: "INACTIVITY_HOURS".to_string(),
                reason: format!("must be between 1 and {}", u64::MAX / 3600),
            })?;
        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            inactivity_timeout: Duration::from_secs(inactivity_secs),
            teams_per_poule: parse_or(&lookup, "TEAMS_PER_POULE", defaults.teams_per_poule)?,
            qualifiers_per_poule: parse_or(
                &lookup,
                "QUALIFIERS_PER_POULE",
                defaults.qualifiers_per_poule,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(3..=4).contains(&self.teams_per_poule) {
            return Err(ConfigError::Invalid {
                var: "TEAMS_PER_POULE".to_string(),
                reason: "must be 3 or 4".to_string(),
            });
        }
        if self.qualifiers_per_poule == 0 {
            return Err(ConfigError::Invalid {
                var: "QUALIFIERS_PER_POULE".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("cannot parse '{raw}'"),
        }),
    }
}
