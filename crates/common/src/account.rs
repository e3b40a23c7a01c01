use std::fmt;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::bundle::AccountCredentials;
use crate::remote::{Connector, Session};

/// The account's credentials could not be turned into a usable
/// session. Non-fatal to the pool: the identity is unusable for the
/// operation at hand and the caller skips or aborts as it sees fit.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to authenticate account {account}: {reason}")]
pub struct AuthError {
    pub account: String,
    pub reason: String,
}

impl AuthError {
    pub fn new(account: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            reason: reason.into(),
        }
    }
}

/// One account in the pool: a human-readable name, the raw credential
/// blob, and a session handle built on first use and cached for the
/// lifetime of the identity.
pub struct AccountIdentity {
    name: String,
    credentials: AccountCredentials,
    session: OnceCell<Session>,
}

impl fmt::Debug for AccountIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountIdentity")
            .field("name", &self.name)
            .field("client_email", &self.credentials.client_email)
            .field("session", &self.session.initialized())
            .finish()
    }
}

impl AccountIdentity {
    pub fn new(name: impl Into<String>, credentials: AccountCredentials) -> Self {
        Self {
            name: name.into(),
            credentials,
            session: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Account-holder identity string.
    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    pub fn credentials(&self) -> &AccountCredentials {
        &self.credentials
    }

    /// Resolve the session handle, constructing it through `connector`
    /// on first use. Construction happens at most once for the
    /// lifetime of the identity; concurrent first callers share one
    /// handshake.
    pub async fn session(&self, connector: &dyn Connector) -> Result<&Session, AuthError> {
        self.session
            .get_or_try_init(|| async {
                debug!(account = %self.name, "constructing session");
                connector.connect(&self.credentials).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::remote::{Quota, RemoteError, RemoteFile, RemoteStore};

    struct NullStore;

    #[async_trait]
    impl RemoteStore for NullStore {
        async fn metadata(&self, id: &str) -> Result<RemoteFile, RemoteError> {
            Err(RemoteError::NotFound(id.to_string()))
        }
        async fn list_children(&self, _: &str) -> Result<Vec<RemoteFile>, RemoteError> {
            Ok(Vec::new())
        }
        async fn delete(&self, id: &str) -> Result<(), RemoteError> {
            Err(RemoteError::NotFound(id.to_string()))
        }
        async fn quota(&self) -> Result<Quota, RemoteError> {
            Ok(Quota::default())
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        connects: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn connect(&self, credentials: &AccountCredentials) -> Result<Session, AuthError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            // give concurrent callers a chance to pile up mid-handshake
            tokio::task::yield_now().await;
            if self.fail {
                return Err(AuthError::new(&credentials.client_email, "revoked key"));
            }
            Ok(Arc::new(NullStore))
        }
    }

    fn identity() -> AccountIdentity {
        AccountIdentity::new(
            "sa-01",
            AccountCredentials {
                client_email: "sa01@accounts.test".to_string(),
                key: None,
                rest: serde_json::Map::new(),
            },
        )
    }

    #[tokio::test]
    async fn test_session_constructed_once() {
        let identity = identity();
        let connector = CountingConnector::default();

        identity.session(&connector).await.unwrap();
        identity.session(&connector).await.unwrap();
        identity.session(&connector).await.unwrap();

        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_handshake() {
        let identity = identity();
        let connector = CountingConnector::default();

        // both callers hit an uninitialized cell; the handshake yields
        // mid-connect, so the second caller must wait on the first
        // rather than start its own
        let (a, b) = tokio::join!(identity.session(&connector), identity.session(&connector));
        a.unwrap();
        b.unwrap();

        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_auth_is_not_cached() {
        let identity = identity();
        let failing = CountingConnector {
            fail: true,
            ..Default::default()
        };

        let err = identity.session(&failing).await.unwrap_err();
        assert_eq!(err.account, "sa01@accounts.test");

        // a later attempt with working credentials still succeeds
        let working = CountingConnector::default();
        identity.session(&working).await.unwrap();
    }
}
