use super::traits::AttemptSink;
use super::PersistenceError;
use crate::api::ApiClient;
use crate::attempt::{Attempt, StoredAttempt};

/// Sends attempts to the remote API on behalf of a signed-in account.
pub struct RemoteAttemptSink {
    api: ApiClient,
}

impl RemoteAttemptSink {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

impl AttemptSink for RemoteAttemptSink {
    async fn submit(&self, attempt: &Attempt) -> Result<StoredAttempt, PersistenceError> {
        Ok(self.api.submit_attempt(attempt).await?)
    }
}
