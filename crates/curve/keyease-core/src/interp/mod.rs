//! Interpolation primitives.
//!
//! Hold and linear are trivial; the bezier path remaps a time fraction
//! through the inverse of the x cubic before evaluating the y cubic.

pub mod functions;

pub use functions::{
    bezier_segment, cubic_bezier, cubic_bezier_derivative, lerp, solve_bezier_parameter,
    NEWTON_ITERATIONS,
};
