//! The unified error type for the normalization engine (spec.md §7).

/// Errors raised by the engine and its `MultiStore` backends.
///
/// Per-CURIE failures (absent keys, malformed values) are *not* represented
/// here — they degrade to `None` for that input, as spec.md §7 requires.
/// Only failures that must surface to the caller of a whole request are
/// modeled as `NormalizerError`.
#[derive(Debug, thiserror::Error)]
pub enum NormalizerError {
    /// The backing store was unreachable, timed out, or otherwise failed at
    /// the transport layer. Partial-result semantics are never offered: a
    /// batch either fully succeeds or fails with this variant.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The request was structurally invalid: an empty CURIE list, or an
    /// unrecognized conflation flag name.
    #[error("{0}")]
    ValidationError(String),

    /// A store-config file referenced a store name the `MultiStore`
    /// implementation doesn't know about. This is fatal at startup.
    #[error("unknown store name in configuration: {0}")]
    ConfigurationError(String),

    /// A stored or in-flight value failed to (de)serialize as JSON.
    /// Treated as `MalformedStoreValue` for the input it concerns.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for NormalizerError {
    fn from(err: serde_json::Error) -> Self {
        NormalizerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NormalizerError>;
