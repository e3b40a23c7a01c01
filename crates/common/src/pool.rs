use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::account::{AccountIdentity, AuthError};
use crate::bundle::{BundleError, CredentialBundle};
use crate::remote::{Connector, RemoteError, Session};

/**
 * Account pool
 * ============
 * Owns the one index identity (visible directory tree) and the
 *  storage identities (raw bytes), and decides which storage account
 *  receives a new object based on remaining quota.
 */

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("no storage account can satisfy a write of {0} bytes")]
    CapacityExhausted(u64),
    #[error("quota query failed for account {account}: {source}")]
    Quota {
        account: String,
        source: RemoteError,
    },
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub struct AccountPool {
    index: Arc<AccountIdentity>,
    storage: Vec<Arc<AccountIdentity>>,
    connector: Arc<dyn Connector>,
    /// Lazy, append-only name lookup over `storage`.
    by_name: RwLock<HashMap<String, Arc<AccountIdentity>>>,
    /// Memoized selection. Once set it is reused for every later write
    /// until `reset_selection`, even if that account has since filled
    /// up. The quota scan that sets it runs under this lock, so at
    /// most one scan is in flight at a time.
    selected: Mutex<Option<Arc<AccountIdentity>>>,
}

impl AccountPool {
    pub fn new(
        index: Arc<AccountIdentity>,
        storage: Vec<Arc<AccountIdentity>>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            index,
            storage,
            connector,
            by_name: RwLock::new(HashMap::new()),
            selected: Mutex::new(None),
        }
    }

    /// Build a pool from a credential bundle file.
    pub fn load(path: &str, connector: Arc<dyn Connector>) -> Result<Self, BundleError> {
        let (index, storage) = CredentialBundle::load(path)?.partition()?;
        info!(
            index = %index.name(),
            storage_accounts = storage.len(),
            "loaded account pool"
        );
        Ok(Self::new(index, storage, connector))
    }

    pub fn index(&self) -> &Arc<AccountIdentity> {
        &self.index
    }

    pub fn storage(&self) -> &[Arc<AccountIdentity>] {
        &self.storage
    }

    /// Authenticated session for the index account.
    pub async fn index_session(&self) -> Result<Session, AuthError> {
        Ok(self.index.session(self.connector.as_ref()).await?.clone())
    }

    /// Authenticated session for any identity in the pool.
    pub async fn session_for(&self, identity: &AccountIdentity) -> Result<Session, AuthError> {
        Ok(identity.session(self.connector.as_ref()).await?.clone())
    }

    /// Resolve a storage identity by name. Absence is not an error;
    /// callers decide what a dangling reference means for them.
    pub fn identity_by_name(&self, name: &str) -> Option<Arc<AccountIdentity>> {
        if let Some(hit) = self.by_name.read().get(name) {
            return Some(hit.clone());
        }
        let found = self.storage.iter().find(|a| a.name() == name)?.clone();
        self.by_name
            .write()
            .insert(name.to_string(), found.clone());
        Some(found)
    }

    /// Pick a storage identity with room for a write of `size` bytes.
    ///
    /// First-fit over the configured order, memoized: once an account
    /// is picked, every later call returns it without looking at
    /// quota again. A session or quota failure on any account aborts
    /// the whole scan and nothing is pinned.
    pub async fn select_for(&self, size: u64) -> Result<Arc<AccountIdentity>, PoolError> {
        let mut selected = self.selected.lock().await;
        if let Some(identity) = selected.as_ref() {
            return Ok(identity.clone());
        }

        for identity in &self.storage {
            let session = identity.session(self.connector.as_ref()).await?;
            let quota = session.quota().await.map_err(|source| PoolError::Quota {
                account: identity.name().to_string(),
                source,
            })?;
            debug!(
                account = %identity.name(),
                free = quota.free(),
                size,
                "scanned storage quota"
            );
            if size < quota.free() {
                info!(account = %identity.name(), "pinned storage account for writes");
                *selected = Some(identity.clone());
                return Ok(identity.clone());
            }
        }

        Err(PoolError::CapacityExhausted(size))
    }

    /// Drop the memoized selection so the next write re-scans quota.
    pub async fn reset_selection(&self) {
        if self.selected.lock().await.take().is_some() {
            debug!("cleared pinned storage account");
        }
    }
}
