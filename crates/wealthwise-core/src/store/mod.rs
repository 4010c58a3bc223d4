//! User data persistence with a hosted backend and a local fallback
//!
//! # Architecture
//!
//! - `UserDataStore` trait defines the interface for storage backends
//! - `RemoteStore` talks to the hosted backend's `user_data` table
//! - `LocalStore` keeps JSON values in the local SQLite key-value table
//! - `Storage` picks a backend at startup and handles failover
//!
//! # Failover
//!
//! The remote backend is used when it is configured and answers a health
//! check at startup. If a remote call later fails, `Storage` serves that call
//! from the local store and enters degraded mode. While degraded, every read
//! and write goes to the local store and each written user is remembered.
//! A user's local record is only pushed back by an explicit `reconcile`,
//! which also leaves degraded mode once the push succeeds.
//!
//! Successful remote reads and writes are mirrored into the local store so
//! a later fallback starts from the last known record instead of nothing.
//! A user whose record was never mirrored in this process has no local copy
//! to fall back to, so their reads and writes fail with `Error::Storage`
//! until the hosted backend answers again. An empty stand-in record would
//! otherwise be pushed over the hosted one by `reconcile`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::UserData;

mod local;
pub(crate) mod remote;

pub use local::LocalStore;
pub use remote::{RemoteConfig, RemoteStore};

/// Whose record to read or write, and the credential to present for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub user_id: String,
    /// Hosted backend access token; the project key is used when absent
    pub access_token: Option<String>,
}

impl Owner {
    /// An owner with no backend credential (local mode, CLI)
    pub fn local(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            access_token: None,
        }
    }
}

/// Trait for user data backends
#[async_trait]
pub trait UserDataStore: Send + Sync {
    /// Human-readable name for this backend
    fn name(&self) -> &str;

    /// Load a user's record. `None` when the user has no record yet.
    async fn load(&self, owner: &Owner) -> Result<Option<UserData>>;

    /// Replace a user's record (last write wins)
    async fn save(&self, owner: &Owner, data: &UserData) -> Result<()>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Remote,
    Local,
}

/// Where a save landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub backend: Backend,
    /// True when the write only reached the local store
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    /// Backend selected at startup
    pub backend: Backend,
    pub degraded: bool,
    /// Users with local writes not yet reconciled
    pub pending_users: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Whether a local record was pushed to the remote backend
    pub pushed: bool,
    pub degraded: bool,
}

/// Backend selection and failover in front of the two stores
pub struct Storage {
    remote: Option<Arc<dyn UserDataStore>>,
    local: Arc<dyn UserDataStore>,
    degraded: AtomicBool,
    /// Users written locally while degraded
    unsynced: Mutex<HashSet<String>>,
    /// Users whose local copy matches the hosted record
    mirrored: Mutex<HashSet<String>>,
}

impl Storage {
    /// Use the remote store if it answers its health check, else local only
    pub async fn connect(remote: Option<Arc<dyn UserDataStore>>, local: Arc<dyn UserDataStore>) -> Self {
        let remote = match remote {
            Some(store) if store.health_check().await => {
                info!(backend = store.name(), "Using hosted backend for user data");
                Some(store)
            }
            Some(store) => {
                warn!(
                    backend = store.name(),
                    "Hosted backend unreachable at startup, using local storage"
                );
                None
            }
            None => {
                info!("Hosted backend not configured, using local storage");
                None
            }
        };
        Self::with_backends(remote, local)
    }

    /// Local storage only
    pub fn local_only(local: Arc<dyn UserDataStore>) -> Self {
        Self::with_backends(None, local)
    }

    fn with_backends(remote: Option<Arc<dyn UserDataStore>>, local: Arc<dyn UserDataStore>) -> Self {
        Self {
            remote,
            local,
            degraded: AtomicBool::new(false),
            unsynced: Mutex::new(HashSet::new()),
            mirrored: Mutex::new(HashSet::new()),
        }
    }

    pub fn backend(&self) -> Backend {
        if self.remote.is_some() {
            Backend::Remote
        } else {
            Backend::Local
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> StorageStatus {
        StorageStatus {
            backend: self.backend(),
            degraded: self.is_degraded(),
            pending_users: self.unsynced_guard().len(),
        }
    }

    /// Load a user's record, empty if none exists
    pub async fn load(&self, owner: &Owner) -> Result<UserData> {
        let Some(remote) = self.remote_for(owner) else {
            return self.load_local(owner).await;
        };

        match remote.load(owner).await {
            Ok(found) => {
                let data = found.unwrap_or_default();
                self.mirror(owner, &data).await;
                Ok(data)
            }
            Err(e) => {
                self.enter_degraded(remote.name(), &e);
                self.load_local(owner).await
            }
        }
    }

    /// Persist a user's record, falling back to local storage on failure
    pub async fn save(&self, owner: &Owner, data: &UserData) -> Result<SaveOutcome> {
        let Some(remote) = self.remote_for(owner) else {
            self.ensure_local_copy(owner)?;
            self.local.save(owner, data).await?;
            let degraded = self.is_degraded();
            if degraded {
                self.unsynced_guard().insert(owner.user_id.clone());
            }
            return Ok(SaveOutcome {
                backend: Backend::Local,
                degraded,
            });
        };

        match remote.save(owner, data).await {
            Ok(()) => {
                self.mirror(owner, data).await;
                Ok(SaveOutcome {
                    backend: Backend::Remote,
                    degraded: false,
                })
            }
            Err(e) => {
                self.enter_degraded(remote.name(), &e);
                self.ensure_local_copy(owner)?;
                self.local.save(owner, data).await?;
                self.unsynced_guard().insert(owner.user_id.clone());
                Ok(SaveOutcome {
                    backend: Backend::Local,
                    degraded: true,
                })
            }
        }
    }

    /// Push the user's local record to the remote backend (local wins).
    ///
    /// Degraded mode ends once a push succeeds. Failures leave everything
    /// as it was.
    pub async fn reconcile(&self, owner: &Owner) -> Result<ReconcileOutcome> {
        let Some(remote) = self.remote.as_ref() else {
            return Ok(ReconcileOutcome {
                pushed: false,
                degraded: false,
            });
        };

        let pending = self.unsynced_guard().contains(&owner.user_id);
        if !pending && !self.is_degraded() {
            debug!(user_id = %owner.user_id, "Nothing to reconcile");
            return Ok(ReconcileOutcome {
                pushed: false,
                degraded: false,
            });
        }

        if pending {
            let data = self.local.load(owner).await?.unwrap_or_default();
            remote.save(owner, &data).await?;
            self.unsynced_guard().remove(&owner.user_id);
            self.mirrored_guard().insert(owner.user_id.clone());
        } else if !remote.health_check().await {
            return Ok(ReconcileOutcome {
                pushed: false,
                degraded: true,
            });
        }

        self.degraded.store(false, Ordering::SeqCst);
        info!(user_id = %owner.user_id, pushed = pending, "Reconciled with hosted backend");
        Ok(ReconcileOutcome {
            pushed: pending,
            degraded: false,
        })
    }

    /// The remote store, unless degraded or this user has unsynced local writes
    fn remote_for(&self, owner: &Owner) -> Option<&Arc<dyn UserDataStore>> {
        let remote = self.remote.as_ref()?;
        if self.is_degraded() || self.unsynced_guard().contains(&owner.user_id) {
            return None;
        }
        Some(remote)
    }

    async fn load_local(&self, owner: &Owner) -> Result<UserData> {
        self.ensure_local_copy(owner)?;
        Ok(self.local.load(owner).await?.unwrap_or_default())
    }

    /// With a hosted backend in use, the local store may only stand in for
    /// records it has a copy of: mirrored ones or ones written while degraded.
    fn ensure_local_copy(&self, owner: &Owner) -> Result<()> {
        if self.remote.is_none()
            || self.unsynced_guard().contains(&owner.user_id)
            || self.mirrored_guard().contains(&owner.user_id)
        {
            return Ok(());
        }
        warn!(user_id = %owner.user_id, "Hosted backend unavailable and no local copy of this record");
        Err(Error::Storage(
            "hosted backend unavailable and no local copy of this record".to_string(),
        ))
    }

    fn enter_degraded(&self, backend: &str, error: &crate::Error) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(backend, error = %error, "Hosted backend failed, switching to local storage");
        }
    }

    async fn mirror(&self, owner: &Owner, data: &UserData) {
        match self.local.save(owner, data).await {
            Ok(()) => {
                self.mirrored_guard().insert(owner.user_id.clone());
            }
            Err(e) => {
                self.mirrored_guard().remove(&owner.user_id);
                warn!(user_id = %owner.user_id, error = %e, "Failed to mirror user data locally");
            }
        }
    }

    fn unsynced_guard(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.unsynced.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mirrored_guard(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.mirrored.lock().unwrap_or_else(|e| e.into_inner())
    }
}
