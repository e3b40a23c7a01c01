use serde::{Deserialize, Serialize};

use crate::remote::RemoteFile;

/**
 * Placeholder annotations
 * =======================
 * An index-tree entry that stands in for bytes held by a storage
 *  account carries a serialized descriptor of the real object in its
 *  annotation field. An empty annotation is a distinct, valid state:
 *  the bytes live directly in the index account, no indirection.
 */

#[derive(Debug, thiserror::Error)]
pub enum PlaceholderError {
    #[error("malformed placeholder annotation: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode placeholder: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Minimal identifying fields of a real object held by a storage
/// account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub name: String,
    /// Remote object id within the owning account.
    pub id: String,
    pub mime_type: String,
    /// Name of the storage identity holding the real bytes.
    pub owner_account_name: String,
}

impl Placeholder {
    /// Describe a real object living under the storage identity named
    /// `owner`.
    pub fn for_object(object: &RemoteFile, owner: impl Into<String>) -> Self {
        Self {
            name: object.name.clone(),
            id: object.id.clone(),
            mime_type: object.mime_type.clone(),
            owner_account_name: owner.into(),
        }
    }

    /// Serialize into the opaque annotation string.
    pub fn encode(&self) -> Result<String, PlaceholderError> {
        serde_json::to_string(self).map_err(PlaceholderError::Encode)
    }

    /// Decode an annotation. `Ok(None)` means no indirection; a
    /// non-empty string that does not parse is malformed, which
    /// callers must treat differently from emptiness.
    pub fn decode(annotation: &str) -> Result<Option<Self>, PlaceholderError> {
        if annotation.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(annotation)
            .map(Some)
            .map_err(PlaceholderError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Placeholder {
        Placeholder {
            name: "photo.jpg".to_string(),
            id: "obj-9183".to_string(),
            mime_type: "image/jpeg".to_string(),
            owner_account_name: "sa-03".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let placeholder = sample();
        let annotation = placeholder.encode().unwrap();
        let decoded = Placeholder::decode(&annotation).unwrap().unwrap();
        assert_eq!(decoded, placeholder);
    }

    #[test]
    fn test_empty_annotation_is_no_indirection() {
        assert!(Placeholder::decode("").unwrap().is_none());
        assert!(Placeholder::decode("   ").unwrap().is_none());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = Placeholder::decode("not a placeholder").unwrap_err();
        assert!(matches!(err, PlaceholderError::Malformed(_)));

        // valid JSON with the wrong shape is malformed too
        let err = Placeholder::decode(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, PlaceholderError::Malformed(_)));
    }

    #[test]
    fn test_wire_field_names() {
        let annotation = sample().encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&annotation).unwrap();
        assert_eq!(value["mimeType"], "image/jpeg");
        assert_eq!(value["ownerAccountName"], "sa-03");
        assert_eq!(value["id"], "obj-9183");
        assert_eq!(value["name"], "photo.jpg");
    }

    #[test]
    fn test_for_object() {
        let object = RemoteFile {
            id: "obj-1".to_string(),
            name: "report.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            annotation: None,
            size: Some(1024),
        };
        let placeholder = Placeholder::for_object(&object, "sa-07");
        assert_eq!(placeholder.id, "obj-1");
        assert_eq!(placeholder.owner_account_name, "sa-07");
    }
}
