use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::account::AuthError;
use crate::bundle::AccountCredentials;
use crate::remote::{
    Connector, Quota, RemoteError, RemoteFile, RemoteStore, Session, DIR_MIME_TYPE,
};

#[derive(Default)]
struct MemoryRemoteInner {
    files: HashMap<String, RemoteFile>,
    /// child id -> parent id
    parents: HashMap<String, String>,
    quota: Quota,
    /// ids passed to delete, in call order
    deleted: Vec<String>,
    /// ids whose delete fails with an api error
    protected: HashSet<String>,
    fail_quota: bool,
}

/// In-memory stand-in for one account's remote storage.
#[derive(Clone, Default)]
pub struct MemoryRemote(Arc<Mutex<MemoryRemoteInner>>);

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(limit: u64, usage: u64) -> Self {
        let remote = Self::new();
        remote.set_quota(limit, usage);
        remote
    }

    pub fn set_quota(&self, limit: u64, usage: u64) {
        self.0.lock().quota = Quota { limit, usage };
    }

    /// Toggle quota-query failures, simulating an unreachable account.
    pub fn fail_quota(&self, fail: bool) {
        self.0.lock().fail_quota = fail;
    }

    /// Make deleting `id` fail with an api error.
    pub fn protect(&self, id: &str) {
        self.0.lock().protected.insert(id.to_string());
    }

    pub fn insert(&self, file: RemoteFile) {
        self.0.lock().files.insert(file.id.clone(), file);
    }

    pub fn insert_child(&self, parent_id: &str, file: RemoteFile) {
        let mut inner = self.0.lock();
        inner.parents.insert(file.id.clone(), parent_id.to_string());
        inner.files.insert(file.id.clone(), file);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.lock().files.contains_key(id)
    }

    /// Ids deleted so far, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.0.lock().deleted.clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().files.is_empty()
    }
}

/// Build a plain file entry.
pub(crate) fn raw_file(id: &str, name: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "application/octet-stream".to_string(),
        annotation: None,
        size: None,
    }
}

impl MemoryRemote {
    /// Seed a plain file and return its metadata.
    pub fn seed_file(&self, id: &str, name: &str) -> RemoteFile {
        let file = raw_file(id, name);
        self.insert(file.clone());
        file
    }

    /// Seed a directory entry and return its metadata.
    pub fn seed_dir(&self, id: &str, name: &str) -> RemoteFile {
        let dir = RemoteFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: DIR_MIME_TYPE.to_string(),
            annotation: None,
            size: None,
        };
        self.insert(dir.clone());
        dir
    }

    /// Seed a file under `parent_id` carrying `annotation`.
    pub fn seed_annotated(
        &self,
        parent_id: &str,
        id: &str,
        name: &str,
        annotation: &str,
    ) -> RemoteFile {
        let mut file = raw_file(id, name);
        file.annotation = Some(annotation.to_string());
        self.insert_child(parent_id, file.clone());
        file
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn metadata(&self, id: &str) -> Result<RemoteFile, RemoteError> {
        self.0
            .lock()
            .files
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }

    async fn list_children(&self, parent_id: &str) -> Result<Vec<RemoteFile>, RemoteError> {
        let inner = self.0.lock();
        let mut children: Vec<RemoteFile> = inner
            .parents
            .iter()
            .filter(|(_, parent)| parent.as_str() == parent_id)
            .filter_map(|(child, _)| inner.files.get(child).cloned())
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(children)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.0.lock();
        if inner.protected.contains(id) {
            return Err(RemoteError::Api(format!("delete forbidden: {id}")));
        }
        if inner.files.remove(id).is_none() {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        inner.parents.remove(id);
        inner.deleted.push(id.to_string());
        Ok(())
    }

    async fn quota(&self) -> Result<Quota, RemoteError> {
        let inner = self.0.lock();
        if inner.fail_quota {
            return Err(RemoteError::Unreachable("quota query failed".to_string()));
        }
        Ok(inner.quota)
    }
}

#[derive(Default)]
struct MemoryConnectorInner {
    /// client_email -> per-account store
    stores: HashMap<String, MemoryRemote>,
    /// client_emails whose authentication fails
    denied: HashSet<String>,
}

/// Hands out sessions onto registered in-memory stores, keyed by the
/// credentials' client email.
#[derive(Clone, Default)]
pub struct MemoryConnector(Arc<Mutex<MemoryConnectorInner>>);

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, client_email: &str, store: MemoryRemote) {
        self.0
            .lock()
            .stores
            .insert(client_email.to_string(), store);
    }

    /// Make authentication fail for the given account.
    pub fn deny(&self, client_email: &str) {
        self.0.lock().denied.insert(client_email.to_string());
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, credentials: &AccountCredentials) -> Result<Session, AuthError> {
        let inner = self.0.lock();
        if inner.denied.contains(&credentials.client_email) {
            return Err(AuthError::new(
                &credentials.client_email,
                "credentials revoked",
            ));
        }
        inner
            .stores
            .get(&credentials.client_email)
            .map(|store| Arc::new(store.clone()) as Session)
            .ok_or_else(|| AuthError::new(&credentials.client_email, "no such account"))
    }
}
