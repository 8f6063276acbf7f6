use super::local_store::{AttemptPage, LocalAttemptStore};
use super::remote::RemoteAttemptSink;
use super::traits::AttemptSink;
use super::PersistenceError;
use crate::api::ApiClient;
use crate::attempt::{Attempt, StoredAttempt};
use crate::config::TrainerConfig;
use crate::identity::{Identity, Provenance};
use crate::stats::Statistics;

/// The one sink an identity's attempts go to, chosen by provenance.
/// There is no fallback from one to the other.
pub enum AttemptRouter {
    Remote(RemoteAttemptSink),
    Local(LocalAttemptStore),
}

impl AttemptRouter {
    pub fn for_identity(identity: &Identity, config: &TrainerConfig) -> Result<Self, PersistenceError> {
        match identity.provenance() {
            Provenance::LocalGuest => Ok(Self::Local(LocalAttemptStore::new(
                &config.data_dir,
                &identity.id,
            ))),
            Provenance::Account => {
                config.require_access_token()?;
                Ok(Self::Remote(RemoteAttemptSink::new(ApiClient::new(config)?)))
            }
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Remote(_) => Provenance::Account,
            Self::Local(_) => Provenance::LocalGuest,
        }
    }

    pub async fn statistics(&self) -> Result<Statistics, PersistenceError> {
        match self {
            Self::Remote(remote) => Ok(remote.api().stats_overview().await?),
            Self::Local(local) => local.statistics(),
        }
    }

    pub async fn history(&self, page: usize, limit: usize) -> Result<AttemptPage, PersistenceError> {
        match self {
            Self::Remote(remote) => Ok(remote.api().history(page, limit).await?),
            Self::Local(local) => local.history(page, limit),
        }
    }
}

impl AttemptSink for AttemptRouter {
    async fn submit(&self, attempt: &Attempt) -> Result<StoredAttempt, PersistenceError> {
        match self {
            Self::Remote(remote) => remote.submit(attempt).await,
            Self::Local(local) => local.submit(attempt).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn config(dir: &std::path::Path, token: Option<&str>) -> TrainerConfig {
        TrainerConfig {
            data_dir: dir.to_path_buf(),
            access_token: token.map(str::to_string),
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_local_guest_routes_locally() {
        let dir = tempfile::tempdir().unwrap();
        let guest = Identity::create_local_guest();
        let router = AttemptRouter::for_identity(&guest, &config(dir.path(), Some("t"))).unwrap();
        assert_eq!(router.provenance(), Provenance::LocalGuest);
    }

    #[test]
    fn test_account_needs_token() {
        let dir = tempfile::tempdir().unwrap();
        let account = Identity {
            id: "u1".into(),
            display_name: "Alice".into(),
            is_guest: false,
        };
        let result = AttemptRouter::for_identity(&account, &config(dir.path(), None));
        assert!(matches!(
            result,
            Err(PersistenceError::Config(ConfigError::MissingAccessToken))
        ));

        let router = AttemptRouter::for_identity(&account, &config(dir.path(), Some("t"))).unwrap();
        assert_eq!(router.provenance(), Provenance::Account);
    }
}
