use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::AuthError;
use crate::bundle::AccountCredentials;

/**
 * Remote-storage boundary
 * =======================
 * Everything here is consumed from outside this crate: a transport
 *  implements `RemoteStore` for one authenticated account, and a
 *  `Connector` turns raw credentials into such a store. The crate
 *  itself never talks to the network.
 */

/// Reserved mime type marking an index-tree entry as a directory.
pub const DIR_MIME_TYPE: &str = "application/vnd.spandrive.folder";

/// An authenticated handle onto a single account.
pub type Session = Arc<dyn RemoteStore>;

impl std::fmt::Debug for dyn RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RemoteStore")
    }
}

/// Metadata for one index-tree entry or raw object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Descriptive metadata field carrying the placeholder annotation.
    /// Empty or absent means the bytes live in the account owning this
    /// entry.
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl RemoteFile {
    pub fn is_dir(&self) -> bool {
        self.mime_type == DIR_MIME_TYPE
    }

    /// The annotation, if present and non-empty.
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref().filter(|a| !a.is_empty())
    }
}

/// Live storage quota for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quota {
    pub limit: u64,
    pub usage: u64,
}

impl Quota {
    pub fn free(&self) -> u64 {
        self.limit.saturating_sub(self.usage)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("remote api error: {0}")]
    Api(String),
    #[error("remote unreachable: {0}")]
    Unreachable(String),
}

/// Operations this crate consumes from a single account's storage API.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch an entry's current metadata.
    async fn metadata(&self, id: &str) -> Result<RemoteFile, RemoteError>;

    /// List the direct children of a directory entry.
    async fn list_children(&self, parent_id: &str) -> Result<Vec<RemoteFile>, RemoteError>;

    /// Delete one object by id.
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// Query the account's storage quota.
    async fn quota(&self) -> Result<Quota, RemoteError>;
}

/// Turns raw account credentials into an authenticated session.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, credentials: &AccountCredentials) -> Result<Session, AuthError>;
}
