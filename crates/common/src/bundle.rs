use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::AccountIdentity;

/**
 * Credential bundle
 * =================
 * A bundle is one JSON secrets file holding the credentials for every
 *  account in the pool, with one key designated as the index account:
 *
 *  {
 *    "indexStoreKey": "index",
 *    "serviceAccounts": { "index": { ... }, "sa-01": { ... }, ... }
 *  }
 *
 * The bundle is read once at construction and is immutable afterwards.
 *  Loading performs no network calls.
 */

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("empty credential bundle path")]
    EmptyPath,
    #[error("failed to read credential bundle {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed credential bundle: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("index key {0:?} not present in the bundle")]
    MissingIndexKey(String),
    #[error("invalid credentials for account {key:?}: {reason}")]
    InvalidCredentials { key: String, reason: String },
}

/// Credentials for one account, with the identity fields this crate
/// needs pulled out of the otherwise opaque blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCredentials {
    /// Account-holder identity, an email-like string.
    pub client_email: String,
    /// Optional display name carried inside the blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Everything else the transport needs to authenticate. Kept
    /// verbatim so the blob survives a round trip.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBundle {
    index_store_key: String,
    service_accounts: BTreeMap<String, serde_json::Value>,
}

impl CredentialBundle {
    /// Read and parse a bundle file. The path may use shell-style
    /// expansion (`~`, `$VAR`, `${VAR}`).
    pub fn load(path: &str) -> Result<Self, BundleError> {
        if path.is_empty() {
            return Err(BundleError::EmptyPath);
        }
        let path = expand_path(path);
        let raw = std::fs::read(&path).map_err(|source| BundleError::Io { path, source })?;
        Self::from_slice(&raw)
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, BundleError> {
        Ok(serde_json::from_slice(raw)?)
    }

    pub fn index_store_key(&self) -> &str {
        &self.index_store_key
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.service_accounts.keys().map(|k| k.as_str())
    }

    /// Split the bundle into the index identity and the storage
    /// identities. The index key is excluded from the storage set by
    /// key equality, so the two never overlap.
    pub fn partition(
        self,
    ) -> Result<(Arc<AccountIdentity>, Vec<Arc<AccountIdentity>>), BundleError> {
        let index_blob = self
            .service_accounts
            .get(&self.index_store_key)
            .ok_or_else(|| BundleError::MissingIndexKey(self.index_store_key.clone()))?;
        let index_creds = parse_credentials(&self.index_store_key, index_blob)?;
        // the index identity may carry its own display name; storage
        // identities are always named after their bundle key
        let index_name = index_creds
            .key
            .clone()
            .unwrap_or_else(|| self.index_store_key.clone());
        let index = Arc::new(AccountIdentity::new(index_name, index_creds));

        let mut storage = Vec::with_capacity(self.service_accounts.len().saturating_sub(1));
        for (key, blob) in &self.service_accounts {
            if *key == self.index_store_key {
                continue;
            }
            let credentials = parse_credentials(key, blob)?;
            storage.push(Arc::new(AccountIdentity::new(key.clone(), credentials)));
        }

        debug!(
            index = %index.name(),
            storage_accounts = storage.len(),
            "partitioned credential bundle"
        );
        Ok((index, storage))
    }
}

fn parse_credentials(key: &str, blob: &serde_json::Value) -> Result<AccountCredentials, BundleError> {
    serde_json::from_value(blob.clone()).map_err(|e| BundleError::InvalidCredentials {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path. Unset variables are left
/// verbatim.
pub fn expand_path(input: &str) -> PathBuf {
    let mut expanded = expand_env(input);
    if expanded == "~" || expanded.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            expanded = format!("{}{}", home.display(), &expanded[1..]);
        }
    }
    PathBuf::from(expanded)
}

fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if let Some(tail) = rest.strip_prefix('$') {
            if let Some(braced) = tail.strip_prefix('{') {
                if let Some(end) = braced.find('}') {
                    let name = &braced[..end];
                    match std::env::var(name) {
                        Ok(value) => out.push_str(&value),
                        Err(_) => out.push_str(&rest[..name.len() + 3]),
                    }
                    i += name.len() + 3;
                    continue;
                }
            } else {
                let len = tail
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(tail.len());
                if len > 0 {
                    match std::env::var(&tail[..len]) {
                        Ok(value) => out.push_str(&value),
                        Err(_) => out.push_str(&rest[..len + 1]),
                    }
                    i += len + 1;
                    continue;
                }
            }
        }
        if let Some(ch) = rest.chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        } else {
            break;
        }
    }
    out
}
