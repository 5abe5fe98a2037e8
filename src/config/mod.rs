//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::game::Rules;
use crate::util::rate_limit::SUBMIT_RATE_LIMIT;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated
    pub client_origin: String,

    /// Per-attempt deadline for an agent decision
    pub agent_timeout: Duration,
    /// Extra attempts after a failed agent decision
    pub agent_max_retries: u32,
    /// Action submissions per session per second
    pub submit_rate_limit: u32,

    /// Rules applied to new matches
    pub rules: Rules,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let mut rules = Rules::default();
        rules.zone.start_turn = parse_or("ZONE_START_TURN", rules.zone.start_turn)?;
        rules.zone.shrink_interval = parse_or("ZONE_SHRINK_INTERVAL", rules.zone.shrink_interval)?;
        rules.zone.damage = parse_or("ZONE_DAMAGE", rules.zone.damage)?;
        if rules.zone.shrink_interval == 0 {
            return Err(ConfigError::Invalid("ZONE_SHRINK_INTERVAL"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origin: env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            agent_timeout: Duration::from_millis(parse_or("AGENT_TIMEOUT_MS", 30_000)?),
            agent_max_retries: parse_or("AGENT_MAX_RETRIES", 1)?,
            submit_rate_limit: parse_or("SUBMIT_RATE_LIMIT", SUBMIT_RATE_LIMIT)?,

            rules,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            client_origin: "http://localhost:3000".to_string(),
            agent_timeout: Duration::from_secs(30),
            agent_max_retries: 1,
            submit_rate_limit: SUBMIT_RATE_LIMIT,
            rules: Rules::default(),
        }
    }
}

/// Parse an optional variable, using `default` when unset
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_use_defaults() {
        assert_eq!(parse_or("KILL_ZONE_TEST_UNSET_VAR", 7u32).unwrap(), 7);
    }

    #[test]
    fn malformed_values_are_rejected() {
        env::set_var("KILL_ZONE_TEST_BAD_VAR", "soon");
        assert!(matches!(
            parse_or("KILL_ZONE_TEST_BAD_VAR", 1u32),
            Err(ConfigError::Invalid("KILL_ZONE_TEST_BAD_VAR"))
        ));
    }
}
