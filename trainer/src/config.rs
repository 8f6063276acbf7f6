//! Configuration for the puzzle trainer
//!
//! Every value has a built-in default and can be overridden through the
//! environment:
//! 1. CHESSTRAINER_DATA_DIR, else ~/.config/chesstrainer/data, else ./data
//! 2. CHESSTRAINER_API_URL (remote API base)
//! 3. CHESSTRAINER_ACCESS_TOKEN (bearer token; absent means local guest)
//! 4. CHESSTRAINER_OPPONENT_DELAY_MS / CHESSTRAINER_WRONG_MOVE_MS (session timing)

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_DIR: &str = ".config/chesstrainer/data";
const DEV_DATA_DIR: &str = "./data";

pub const DEFAULT_API_URL: &str = "http://localhost:3009/api";
pub const DEFAULT_OPPONENT_DELAY_MS: u64 = 500;
pub const DEFAULT_WRONG_MOVE_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("No access token configured (set CHESSTRAINER_ACCESS_TOKEN)")]
    MissingAccessToken,
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Delays driving the scripted parts of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Pause before the scripted opponent reply is played.
    pub opponent_delay: Duration,
    /// How long the wrong-move signal stays raised.
    pub wrong_move_flash: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            opponent_delay: Duration::from_millis(DEFAULT_OPPONENT_DELAY_MS),
            wrong_move_flash: Duration::from_millis(DEFAULT_WRONG_MOVE_MS),
        }
    }
}

impl SessionTiming {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            opponent_delay: Duration::from_millis(env_millis(
                "CHESSTRAINER_OPPONENT_DELAY_MS",
                DEFAULT_OPPONENT_DELAY_MS,
            )?),
            wrong_move_flash: Duration::from_millis(env_millis(
                "CHESSTRAINER_WRONG_MOVE_MS",
                DEFAULT_WRONG_MOVE_MS,
            )?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub data_dir: PathBuf,
    pub api_url: String,
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    pub timing: SessionTiming,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEV_DATA_DIR),
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            timing: SessionTiming::default(),
        }
    }
}

impl TrainerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("CHESSTRAINER_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let access_token = std::env::var("CHESSTRAINER_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            data_dir: get_data_dir(),
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            timing: SessionTiming::from_env()?,
        })
    }

    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .ok_or(ConfigError::MissingAccessToken)
    }
}

/// Get the data directory for local persistence.
///
/// Priority:
/// 1. CHESSTRAINER_DATA_DIR env variable if set
/// 2. $HOME/.config/chesstrainer/data if HOME is set
/// 3. ./data as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHESSTRAINER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

fn env_millis(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_millis(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_millis(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir_fallback() {
        // Returns the env override when set, which is also correct
        let dir = get_data_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn test_default_timing() {
        let timing = SessionTiming::default();
        assert_eq!(timing.opponent_delay, Duration::from_millis(500));
        assert_eq!(timing.wrong_move_flash, Duration::from_secs(2));
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("X", " 250 ").unwrap(), 250);
        assert!(matches!(
            parse_millis("X", "soon"),
            Err(ConfigError::InvalidValue { name: "X", .. })
        ));
    }

    #[test]
    fn test_require_access_token() {
        let mut config = TrainerConfig::default();
        assert_eq!(
            config.require_access_token(),
            Err(ConfigError::MissingAccessToken)
        );
        config.access_token = Some("abc".into());
        assert_eq!(config.require_access_token(), Ok("abc"));
    }
}
