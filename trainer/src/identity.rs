//! Who is solving: a signed-in account or a guest that lives only on this device.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::{now_millis, PersistenceError};

const GUEST_PREFIX: &str = "guest-";
const GUEST_FILE: &str = "guest_user.json";

/// Where an identity's attempts are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Guest created on this device; attempts stay in the local store.
    LocalGuest,
    /// Account known to the API (server-side guests included).
    Account,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub is_guest: bool,
}

impl Identity {
    /// A fresh device-local guest: `guest-<millis>` / `Guest_<n>`.
    pub fn create_local_guest() -> Self {
        let number = Uuid::new_v4().as_u128() % 100_000;
        Self {
            id: format!("{}{}", GUEST_PREFIX, now_millis()),
            display_name: format!("Guest_{}", number),
            is_guest: true,
        }
    }

    pub fn is_local_guest(&self) -> bool {
        self.is_guest && self.id.starts_with(GUEST_PREFIX)
    }

    pub fn provenance(&self) -> Provenance {
        if self.is_local_guest() {
            Provenance::LocalGuest
        } else {
            Provenance::Account
        }
    }
}

/// The local guest identity, persisted as one JSON file in the data dir.
pub struct GuestIdentityStore {
    path: PathBuf,
}

impl GuestIdentityStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(GUEST_FILE),
        }
    }

    /// The stored guest, if there is one and it is a local guest.
    pub fn load(&self) -> Result<Option<Identity>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<Identity>(&contents) {
            Ok(identity) if identity.is_local_guest() => Ok(Some(identity)),
            Ok(identity) => {
                tracing::warn!(id = %identity.id, "Stored identity is not a local guest, ignoring");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Failed to parse guest identity {:?}: {}", self.path, e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, identity: &Identity) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(identity)?)?;
        Ok(())
    }

    pub fn load_or_create(&self) -> Result<Identity, PersistenceError> {
        if let Some(identity) = self.load()? {
            return Ok(identity);
        }
        let identity = Identity::create_local_guest();
        self.save(&identity)?;
        tracing::info!(id = %identity.id, name = %identity.display_name, "Created local guest");
        Ok(identity)
    }

    /// Forget the local guest. Returns whether one was stored.
    pub fn clear(&self) -> Result<bool, PersistenceError> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        Ok(true)
    }
}
