use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures while loading a snapshot container. Anything past
/// reconstruction is recovered locally by the parser.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot document has no data.snapshot field")]
    MissingSnapshot,
    #[error("unparseable container: expected a string or an index->fragment map, got {0}")]
    UnparseableContainer(&'static str),
    #[error("fragment {key} is not text")]
    InvalidFragment { key: String },
}
