/**
 * A single account identity: raw credentials plus a lazily
 *  constructed, cached session handle.
 */
pub mod account;
/**
 * Credential bundle loading. Parses the multi-account secrets
 *  file and partitions it into one index identity and N storage
 *  identities.
 */
pub mod bundle;
/**
 * The cascading delete engine. Removes an index-tree entry
 *  together with the real object its placeholder points at,
 *  recursing into directory children first.
 */
pub mod cascade;
/**
 * Placeholder annotation codec. Encodes which storage account
 *  and which remote object hold a file's real bytes into an
 *  opaque string carried on the index-tree entry.
 */
pub mod placeholder;
/**
 * The account pool: owns the index identity and the storage
 *  identities, resolves identities by name, and picks a storage
 *  account with enough free quota for a pending write.
 */
pub mod pool;
/**
 * Boundary types for the remote-storage API this crate consumes
 *  but does not implement: per-account sessions, entry metadata,
 *  quota queries.
 */
pub mod remote;
/**
 * In-memory remote store and connector for exercising the pool
 *  and the delete engine without a transport.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::account::{AccountIdentity, AuthError};
    pub use crate::bundle::{AccountCredentials, BundleError, CredentialBundle};
    pub use crate::cascade::{CascadeDelete, CascadeError, DeleteOutcome, EntryKind};
    pub use crate::placeholder::{Placeholder, PlaceholderError};
    pub use crate::pool::{AccountPool, PoolError};
    pub use crate::remote::{Connector, Quota, RemoteFile, RemoteStore, Session};
}
