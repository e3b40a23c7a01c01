use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::placeholder::{Placeholder, PlaceholderError};
use crate::pool::AccountPool;
use crate::remote::{RemoteError, RemoteFile};

/**
 * Cascading delete
 * ================
 * Deleting an index-tree entry must also delete the real object its
 *  placeholder points at. Children are attempted before the parent's
 *  own entry is removed, so deeper placeholders stay reachable for
 *  cleanup even when siblings fail.
 */

#[derive(Debug, thiserror::Error)]
pub enum CascadeError {
    #[error("failed to list children of {id}: {source}")]
    List { id: String, source: RemoteError },
    #[error("malformed placeholder on entry {id}: {source}")]
    MalformedPlaceholder {
        id: String,
        source: PlaceholderError,
    },
    #[error("entry {id} names unknown storage account {account:?}")]
    UnknownAccount { id: String, account: String },
    #[error(transparent)]
    Auth(#[from] crate::account::AuthError),
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// What one index-tree entry is, decided once per entry and carried
/// down the recursion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A container; children are deleted first.
    Directory,
    /// A non-directory entry with no annotation: the bytes live in the
    /// index account itself.
    BareObject,
    /// The annotation points at a real object in a storage account.
    Placeholder(Placeholder),
}

impl EntryKind {
    pub fn classify(entry: &RemoteFile) -> Result<Self, PlaceholderError> {
        if entry.is_dir() {
            return Ok(EntryKind::Directory);
        }
        match entry.annotation() {
            None => Ok(EntryKind::BareObject),
            Some(annotation) => match Placeholder::decode(annotation)? {
                Some(placeholder) => Ok(EntryKind::Placeholder(placeholder)),
                None => Ok(EntryKind::BareObject),
            },
        }
    }
}

/// Terminal state of one delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The entry and, if it was a placeholder, its real object are
    /// both gone.
    Deleted,
    /// The entry was already absent.
    Skipped,
    /// Some children, or the removal of the entry itself, failed.
    Partial { succeeded: usize, failed: usize },
}

impl DeleteOutcome {
    pub fn is_complete(&self) -> bool {
        !matches!(self, DeleteOutcome::Partial { .. })
    }

    pub fn failed(&self) -> usize {
        match self {
            DeleteOutcome::Partial { failed, .. } => *failed,
            _ => 0,
        }
    }
}

pub struct CascadeDelete {
    pool: Arc<AccountPool>,
}

impl CascadeDelete {
    pub fn new(pool: Arc<AccountPool>) -> Self {
        Self { pool }
    }

    /// Recursively delete the index-tree entry with the given id.
    ///
    /// An entry that vanished before we got to it is a `Skipped`
    /// success, which makes deletes idempotent. Placeholder entries
    /// whose annotation cannot be decoded, or whose owner account is
    /// not in the pool, fail without touching the index entry: a
    /// dangling shortcut is recoverable, an unreachable real object is
    /// not.
    pub fn delete<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<DeleteOutcome, CascadeError>> {
        async move {
            let index = self.pool.index_session().await?;

            debug!(id, "fetching entry for deletion");
            let entry = match index.metadata(id).await {
                Ok(entry) => entry,
                Err(RemoteError::NotFound(_)) => {
                    debug!(id, "entry already absent, nothing to delete");
                    return Ok(DeleteOutcome::Skipped);
                }
                Err(e) => return Err(e.into()),
            };

            let kind = EntryKind::classify(&entry).map_err(|source| {
                CascadeError::MalformedPlaceholder {
                    id: entry.id.clone(),
                    source,
                }
            })?;

            let mut succeeded = 0usize;
            let mut failed = 0usize;
            match kind {
                EntryKind::Directory | EntryKind::BareObject => {
                    // a bare object simply has no children to recurse into
                    let children = index.list_children(&entry.id).await.map_err(|source| {
                        CascadeError::List {
                            id: entry.id.clone(),
                            source,
                        }
                    })?;
                    for child in children {
                        match self.delete(&child.id).await {
                            Ok(DeleteOutcome::Partial {
                                succeeded: s,
                                failed: f,
                            }) => {
                                succeeded += s;
                                failed += f;
                            }
                            Ok(_) => succeeded += 1,
                            Err(e) => {
                                warn!(
                                    child = %child.id,
                                    error = %e,
                                    "failed to delete child entry"
                                );
                                failed += 1;
                            }
                        }
                    }
                }
                EntryKind::Placeholder(placeholder) => {
                    debug!(
                        id = %entry.id,
                        object = %placeholder.id,
                        owner = %placeholder.owner_account_name,
                        "deleting real object"
                    );
                    let owner = self
                        .pool
                        .identity_by_name(&placeholder.owner_account_name)
                        .ok_or_else(|| CascadeError::UnknownAccount {
                            id: entry.id.clone(),
                            account: placeholder.owner_account_name.clone(),
                        })?;
                    let session = self.pool.session_for(&owner).await?;
                    match session.delete(&placeholder.id).await {
                        Ok(()) => {}
                        Err(RemoteError::NotFound(_)) => {
                            debug!(object = %placeholder.id, "real object already absent");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }

            // The entry itself goes last. Real objects already deleted
            // stay deleted; a failure here leaves a dangling shortcut,
            // reported as a partial failure.
            match index.delete(&entry.id).await {
                Ok(()) | Err(RemoteError::NotFound(_)) => {}
                Err(e) => {
                    warn!(id = %entry.id, error = %e, "failed to remove index entry");
                    failed += 1;
                }
            }

            if failed > 0 {
                Ok(DeleteOutcome::Partial { succeeded, failed })
            } else {
                Ok(DeleteOutcome::Deleted)
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::DIR_MIME_TYPE;

    fn file(annotation: Option<&str>) -> RemoteFile {
        RemoteFile {
            id: "e1".to_string(),
            name: "entry".to_string(),
            mime_type: "application/octet-stream".to_string(),
            annotation: annotation.map(str::to_string),
            size: None,
        }
    }

    #[test]
    fn test_classify_directory() {
        let mut dir = file(None);
        dir.mime_type = DIR_MIME_TYPE.to_string();
        assert_eq!(EntryKind::classify(&dir).unwrap(), EntryKind::Directory);

        // directory wins even if an annotation is somehow present
        dir.annotation = Some("garbage".to_string());
        assert_eq!(EntryKind::classify(&dir).unwrap(), EntryKind::Directory);
    }

    #[test]
    fn test_classify_bare_object() {
        assert_eq!(
            EntryKind::classify(&file(None)).unwrap(),
            EntryKind::BareObject
        );
        assert_eq!(
            EntryKind::classify(&file(Some(""))).unwrap(),
            EntryKind::BareObject
        );
    }

    #[test]
    fn test_classify_placeholder() {
        let placeholder = Placeholder {
            name: "entry".to_string(),
            id: "obj-1".to_string(),
            mime_type: "application/octet-stream".to_string(),
            owner_account_name: "sa-01".to_string(),
        };
        let annotation = placeholder.encode().unwrap();
        let kind = EntryKind::classify(&file(Some(&annotation))).unwrap();
        assert_eq!(kind, EntryKind::Placeholder(placeholder));
    }

    #[test]
    fn test_classify_malformed() {
        assert!(EntryKind::classify(&file(Some("garbage"))).is_err());
    }
}
