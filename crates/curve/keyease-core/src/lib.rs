//! keyease core: keyframe curves with After Effects style temporal easing.
//!
//! A [`Document`] holds tracks of time-ordered keyframes. Each keyframe has
//! independent in/out interpolation (hold, linear, bezier) and an
//! `{influence, speed}` ease per side. [`sample_track`] evaluates a track at
//! any time; [`EditSession`] applies clamped, invariant-preserving edits; the
//! [`schema`] module reads and writes the JSON keyframe format shared with the
//! host tool's export script.

pub mod baking;
pub mod config;
pub mod data;
pub mod ease;
pub mod editing;
pub mod error;
pub mod ids;
pub mod interp;
pub mod sampling;
pub mod schema;
pub mod value;

// Re-exports for consumers (editor front-ends, runtimes)
pub use baking::{bake_document, BakedDocument, BakedTrack, BakingConfig};
pub use config::EditConfig;
pub use data::{Document, Interpolation, Keyframe, Track, TrackMeta};
pub use ease::{Ease, EaseSide};
pub use editing::EditSession;
pub use error::{CurveError, Result};
pub use ids::KeyId;
pub use sampling::{sample_array, sample_track, Channels};
pub use schema::{
    document_to_json, document_to_value, load_document, parse_document_json, save_document,
};
pub use value::ValueShape;
