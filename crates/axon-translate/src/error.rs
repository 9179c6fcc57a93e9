use thiserror::Error;

/// Errors that can surface from request translation
///
/// Most faults never reach here: malformed schemas echo back unchanged,
/// unverifiable thinking blocks are dropped, and a typed-path parse failure
/// reroutes to the generic fallback path. Only failure of the fallback path
/// itself is an error.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Source payload could not be parsed on either translation path
    #[error("unparseable source request: {0}")]
    Unparseable(#[from] serde_json::Error),

    /// Fully-built target request failed to serialize
    #[error("target serialization failed: {0}")]
    Serialize(serde_json::Error),
}
