//! Async sink trait for completed attempts.
//!
//! The remote API and the local device store both implement it, and the
//! caller picks one per attempt. Methods return `impl Future + Send` rather
//! than using `async fn` so the futures are guaranteed `Send` for
//! `tokio::spawn`.

use std::future::Future;

use super::PersistenceError;
use crate::attempt::{Attempt, StoredAttempt};

/// Destination for finished attempts.
pub trait AttemptSink: Send + Sync {
    /// Persist one attempt and return it with its assigned id.
    fn submit(
        &self,
        attempt: &Attempt,
    ) -> impl Future<Output = Result<StoredAttempt, PersistenceError>> + Send;
}
