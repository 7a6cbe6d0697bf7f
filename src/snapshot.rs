use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::SnapshotError;

/// The payload the capture tool leaves at `data.snapshot`.
///
/// Some capture runs store the text as-is, others explode it into a map of
/// `"0" -> "a", "1" -> "b", ...` fragments.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotContainer {
    Text(String),
    Fragments(BTreeMap<u64, String>),
}

impl SnapshotContainer {
    pub fn from_value(value: &Value) -> Result<Self, SnapshotError> {
        match value {
            Value::String(s) => Ok(SnapshotContainer::Text(s.clone())),
            Value::Object(map) => {
                let mut fragments = BTreeMap::new();
                for (key, fragment) in map {
                    // Non-index keys are skipped.
                    let Ok(index) = key.parse::<u64>() else {
                        continue;
                    };
                    let text = fragment
                        .as_str()
                        .ok_or_else(|| SnapshotError::InvalidFragment { key: key.clone() })?;
                    fragments.insert(index, text.to_string());
                }
                Ok(SnapshotContainer::Fragments(fragments))
            }
            Value::Null => Err(SnapshotError::UnparseableContainer("null")),
            Value::Bool(_) => Err(SnapshotError::UnparseableContainer("a boolean")),
            Value::Number(_) => Err(SnapshotError::UnparseableContainer("a number")),
            Value::Array(_) => Err(SnapshotError::UnparseableContainer("an array")),
        }
    }

    /// Rebuild the flat snapshot text.
    pub fn reconstruct(&self) -> String {
        match self {
            SnapshotContainer::Text(s) => s.clone(),
            SnapshotContainer::Fragments(fragments) => fragments.values().map(String::as_str).collect(),
        }
    }
}

/// Pull the container out of a capture document (`{"data": {"snapshot": ...}}`).
pub fn container_from_document(doc: &Value) -> Result<SnapshotContainer, SnapshotError> {
    let snapshot = doc
        .get("data")
        .and_then(|d| d.get("snapshot"))
        .ok_or(SnapshotError::MissingSnapshot)?;
    SnapshotContainer::from_value(snapshot)
}

/// Read a capture document from disk and reconstruct its flat text.
pub fn load_snapshot_text(path: &Path) -> Result<String, SnapshotError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Value = serde_json::from_str(&raw)?;
    let container = container_from_document(&doc)?;
    Ok(container.reconstruct())
}
