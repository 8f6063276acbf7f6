mod json_store;
mod local_store;
mod remote;
mod router;
mod traits;

pub use local_store::{AttemptPage, LocalAttemptRecord, LocalAttemptStore};
pub use remote::RemoteAttemptSink;
pub use router::AttemptRouter;
pub use traits::AttemptSink;

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Record already exists: {0}")]
    Duplicate(String),
}

/// Generate a local attempt ID: `attempt-<unix millis>-<9 char suffix>`.
pub fn generate_attempt_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("attempt-{}-{}", now_millis(), suffix)
}

/// Get the current unix timestamp in milliseconds.
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
