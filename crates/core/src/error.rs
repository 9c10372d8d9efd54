//! Error types for the SYNAPSE domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.
//!
//! The taxonomy is deliberately shallow: only [`ManifestError`] is fatal —
//! a pipeline cannot be constructed without a manifest. Everything else
//! degrades to "no contribution" at the layer/stage boundary and is
//! reported through per-layer status, never by unwinding.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal manifest failures. The single error class that prevents pipeline
/// construction; all other failures degrade in place.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest line {line_no} in {path}: {line:?}")]
    Malformed {
        path: PathBuf,
        line_no: usize,
        line: String,
    },
}

/// A layer's internal failure. Caught by the orchestrator's safe-invoke
/// wrapper and recorded as a degraded outcome; never crosses the engine
/// boundary.
#[derive(Debug, Clone, Error)]
pub enum LayerError {
    #[error("Layer failed: {0}")]
    Internal(String),
}

/// Memory retrieval failures inside the bridge. The bridge converts every
/// variant into an empty hint set before the engine sees it.
#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Retrieval failed: {0}")]
    RetrievalFailed(String),

    #[error("Retrieval timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_not_found_displays_path() {
        let err = ManifestError::NotFound {
            path: PathBuf::from("/tmp/.synapse/manifest"),
        };
        assert!(err.to_string().contains("/tmp/.synapse/manifest"));
    }

    #[test]
    fn malformed_line_displays_line_number() {
        let err = ManifestError::Malformed {
            path: PathBuf::from("manifest"),
            line_no: 7,
            line: "NO_EQUALS_SIGN".into(),
        };
        assert!(err.to_string().contains('7'));
        assert!(err.to_string().contains("NO_EQUALS_SIGN"));
    }

    #[test]
    fn memory_timeout_displays_budget() {
        let err = MemoryError::Timeout { timeout_ms: 15 };
        assert!(err.to_string().contains("15ms"));
    }
}
