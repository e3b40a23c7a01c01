/// Lightweight test harness for pool and cascade tests.
///
/// Provides an in-memory `RemoteStore`/`Connector` pair so multi-account
/// scenarios can run in-process without a transport.
///
/// # Example
///
/// ```rust,ignore
/// use common::testkit::{credentials, MemoryConnector, MemoryRemote};
///
/// let connector = MemoryConnector::new();
/// let store = MemoryRemote::with_quota(1 << 30, 0);
/// connector.register("sa01@accounts.test", store.clone());
/// ```
mod memory;

pub use memory::{MemoryConnector, MemoryRemote};

use crate::bundle::AccountCredentials;

/// Minimal credentials for one test account.
pub fn credentials(client_email: &str) -> AccountCredentials {
    AccountCredentials {
        client_email: client_email.to_string(),
        key: None,
        rest: serde_json::Map::new(),
    }
}
