//! Shared test utilities for pool and cascade integration tests
#![allow(dead_code)]

use std::sync::Arc;

use common::account::AccountIdentity;
use common::placeholder::Placeholder;
use common::pool::AccountPool;
use common::remote::{RemoteFile, DIR_MIME_TYPE};
use common::testkit::{credentials, MemoryConnector, MemoryRemote};

pub const INDEX_EMAIL: &str = "index@accounts.test";

/// Set up a pool with one index account and one storage account per
/// `(name, limit, usage)` entry. Returns the pool, the connector, the
/// index store, and the storage stores in pool order.
pub fn setup_pool(
    quotas: &[(&str, u64, u64)],
) -> (
    Arc<AccountPool>,
    MemoryConnector,
    MemoryRemote,
    Vec<MemoryRemote>,
) {
    let connector = MemoryConnector::new();

    let index_store = MemoryRemote::new();
    connector.register(INDEX_EMAIL, index_store.clone());
    let index = Arc::new(AccountIdentity::new("index", credentials(INDEX_EMAIL)));

    let mut stores = Vec::new();
    let mut storage = Vec::new();
    for (name, limit, usage) in quotas {
        let email = format!("{name}@accounts.test");
        let store = MemoryRemote::with_quota(*limit, *usage);
        connector.register(&email, store.clone());
        storage.push(Arc::new(AccountIdentity::new(*name, credentials(&email))));
        stores.push(store);
    }

    let pool = Arc::new(AccountPool::new(
        index,
        storage,
        Arc::new(connector.clone()),
    ));
    (pool, connector, index_store, stores)
}

pub fn file(id: &str, name: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "application/octet-stream".to_string(),
        annotation: None,
        size: None,
    }
}

pub fn dir(id: &str, name: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: DIR_MIME_TYPE.to_string(),
        annotation: None,
        size: None,
    }
}

/// Seed a placeholder leaf: the real object in `owner_store` and the
/// annotated index entry under `parent_id`.
pub fn seed_leaf(
    index_store: &MemoryRemote,
    owner_store: &MemoryRemote,
    parent_id: &str,
    entry_id: &str,
    object_id: &str,
    name: &str,
    owner_name: &str,
) {
    let object = owner_store.seed_file(object_id, name);
    let annotation = Placeholder::for_object(&object, owner_name)
        .encode()
        .unwrap();
    index_store.seed_annotated(parent_id, entry_id, name, &annotation);
}
