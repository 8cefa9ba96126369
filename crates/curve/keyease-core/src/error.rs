//! Error type for codec and editing failures. Sampling never fails.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CurveError {
    /// Input JSON could not be parsed into the keyframe schema.
    #[error("keyframe json parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document could not be written out.
    #[error("serialize keyframe document: {0}")]
    Serialize(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A keyframe value does not have the length its track requires.
    #[error("{context}: value has {actual} components, expected {expected}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("track index {index} out of range (document has {len} tracks)")]
    TrackOutOfRange { index: usize, len: usize },

    #[error("key index {index} out of range (track has {len} keys)")]
    KeyOutOfRange { index: usize, len: usize },

    #[error("invalid edit config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CurveError>;
