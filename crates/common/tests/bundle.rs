//! Integration tests for loading credential bundles from disk

use std::sync::Arc;

use ::common::bundle::{BundleError, CredentialBundle};
use ::common::pool::AccountPool;
use ::common::testkit::MemoryConnector;

const BUNDLE: &str = r#"{
    "indexStoreKey": "index",
    "serviceAccounts": {
        "index": { "client_email": "index@accounts.test" },
        "sa-01": { "client_email": "sa01@accounts.test", "private_key": "---" },
        "sa-02": { "client_email": "sa02@accounts.test", "private_key": "---" }
    }
}"#;

fn write_bundle(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("bundle.json");
    std::fs::write(&path, BUNDLE).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_bundle(&dir);

    let bundle = CredentialBundle::load(&path).unwrap();
    assert_eq!(bundle.index_store_key(), "index");

    let (index, storage) = bundle.partition().unwrap();
    assert_eq!(index.client_email(), "index@accounts.test");
    assert_eq!(storage.len(), 2);
}

#[test]
fn test_load_unreadable_path() {
    let err = CredentialBundle::load("/nonexistent/bundle.json").unwrap_err();
    assert!(matches!(err, BundleError::Io { .. }));
}

#[test]
fn test_load_with_env_expansion() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(&dir);

    std::env::set_var("SPANDRIVE_BUNDLE_DIR", dir.path());
    let bundle = CredentialBundle::load("$SPANDRIVE_BUNDLE_DIR/bundle.json").unwrap();
    assert_eq!(bundle.index_store_key(), "index");
}

#[tokio::test]
async fn test_pool_load() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_bundle(&dir);

    let pool = AccountPool::load(&path, Arc::new(MemoryConnector::new()))?;
    assert_eq!(pool.index().name(), "index");
    assert_eq!(pool.storage().len(), 2);
    assert!(pool.identity_by_name("sa-01").is_some());
    Ok(())
}
