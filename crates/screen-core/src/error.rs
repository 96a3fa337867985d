//! Error types for index storage and query resolution.

use std::fmt;
use std::path::PathBuf;

/// Failures while reading or writing the persisted index.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("screen index not found at {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse screen index {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize screen index: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The narrowest stage at which an identification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Project,
    Version,
    Screen,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Project => "project",
            Self::Version => "version",
            Self::Screen => "screen",
        };
        f.write_str(label)
    }
}

/// Errors surfaced to the caller of a query.
///
/// Enrichment failures never appear here; they are logged and the best
/// known data is returned instead.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "no screen index at {}. Run `screen-spec collect` to build it first.",
        path.display()
    )]
    IndexMissing { path: PathBuf },
    #[error("{kind} not found: {name}")]
    NotFound { kind: NotFoundKind, name: String },
    #[error("remote document fetch failed: {0}")]
    RemoteFetchFailed(String),
    #[error("selection {index} is out of range (choose 1-{len})")]
    SelectionOutOfRange { index: usize, len: usize },
    #[error("no pending choices. Run a search first, then answer with a number.")]
    NoActiveSelection,
    #[error(transparent)]
    Storage(StoreError),
}

impl ResolveError {
    pub fn not_found(kind: NotFoundKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing { path } => Self::IndexMissing { path },
            other => Self::Storage(other),
        }
    }
}
