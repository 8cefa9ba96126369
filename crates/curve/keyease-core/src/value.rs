//! Value shapes for keyframe values.
//!
//! Every keyframe value is stored as a `Vec<f64>`; the track's [`ValueShape`]
//! fixes its length and decides whether the codec writes a bare number or an
//! array.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "len", rename_all = "lowercase")]
pub enum ValueShape {
    /// A bare number (one component).
    #[default]
    Scalar,
    /// A fixed-length array of numbers.
    Vector(usize),
}

impl ValueShape {
    #[inline]
    pub fn len(self) -> usize {
        match self {
            ValueShape::Scalar => 1,
            ValueShape::Vector(n) => n,
        }
    }

    #[inline]
    pub fn is_scalar(self) -> bool {
        matches!(self, ValueShape::Scalar)
    }

    /// Shape after appending one component. Scalars are promoted to vectors.
    pub fn grown(self) -> ValueShape {
        ValueShape::Vector(self.len() + 1)
    }

    /// Shape after dropping one component; a single remaining component
    /// collapses back to a bare scalar.
    pub fn shrunk(self) -> ValueShape {
        match self.len() {
            0..=2 => ValueShape::Scalar,
            n => ValueShape::Vector(n - 1),
        }
    }

    /// Zero value of this shape.
    pub fn zeros(self) -> Vec<f64> {
        vec![0.0; self.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_and_shrink_round_trip_through_scalar() {
        let s = ValueShape::Scalar;
        assert!(s.is_scalar());
        assert!(!s.grown().is_scalar());
        assert_eq!(s.grown(), ValueShape::Vector(2));
        assert_eq!(s.grown().shrunk(), ValueShape::Scalar);
        assert_eq!(ValueShape::Vector(3).shrunk(), ValueShape::Vector(2));
        assert_eq!(ValueShape::Vector(1).grown(), ValueShape::Vector(2));
    }
}
