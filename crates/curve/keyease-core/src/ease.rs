//! Temporal ease of one side of a keyframe: `{influence, speed}`.
//!
//! `influence` is the percentage of the segment duration the tangent handle
//! reaches into; `speed` is the rate of change (value per second) assumed at
//! the keyframe. Together they place one bezier control point:
//!
//! - out side: `(t0 + dt * f, v0 + speed * dt * f)`
//! - in side:  `(t1 - dt * f, v1 - speed * dt * f)`
//!
//! where `f = influence / 100` clamped to `[0, 1]`.

use serde::{Deserialize, Serialize};

/// Influence used when a flattened handle is restored from a degenerate backup.
pub const DEFAULT_INFLUENCE: f64 = 33.0;

/// Which side of a keyframe an ease belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EaseSide {
    /// Arriving at the keyframe.
    In,
    /// Departing from the keyframe.
    Out,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Ease {
    pub influence: f64,
    pub speed: f64,
}

impl Default for Ease {
    fn default() -> Self {
        Ease::DEFAULT
    }
}

impl Ease {
    pub const ZERO: Ease = Ease {
        influence: 0.0,
        speed: 0.0,
    };

    /// Ease given to freshly inserted keyframes.
    pub const DEFAULT: Ease = Ease {
        influence: DEFAULT_INFLUENCE,
        speed: 0.0,
    };

    pub fn new(influence: f64, speed: f64) -> Self {
        Self { influence, speed }
    }

    /// Influence as a fraction of the segment, clamped to `[0, 1]`.
    /// Stored values are never clamped; untrusted input is tamed here.
    #[inline]
    pub fn fraction(&self) -> f64 {
        let f = self.influence / 100.0;
        if f.is_finite() {
            f.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Exactly `{0, 0}`: the handle sits on its anchor.
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.influence == 0.0 && self.speed == 0.0
    }

    /// Absolute `(time, value)` of the tangent handle for a segment of length
    /// `duration`, anchored at `(anchor_time, anchor_value)`.
    pub fn control_point(
        &self,
        side: EaseSide,
        anchor_time: f64,
        anchor_value: f64,
        duration: f64,
    ) -> (f64, f64) {
        let f = self.fraction();
        let dx = duration * f;
        let dy = self.speed * duration * f;
        match side {
            EaseSide::Out => (anchor_time + dx, anchor_value + dy),
            EaseSide::In => (anchor_time - dx, anchor_value - dy),
        }
    }

    /// Inverse of [`Ease::control_point`]: the ease that places the handle at
    /// `(handle_time, handle_value)`. The time offset is clamped into the
    /// segment; speed is zero when the handle collapses onto the anchor.
    pub fn from_handle(
        side: EaseSide,
        anchor_time: f64,
        anchor_value: f64,
        duration: f64,
        handle_time: f64,
        handle_value: f64,
    ) -> Ease {
        let (rel_t, rel_v) = match side {
            EaseSide::Out => (
                (handle_time - anchor_time) / duration,
                handle_value - anchor_value,
            ),
            EaseSide::In => (
                (anchor_time - handle_time) / duration,
                anchor_value - handle_value,
            ),
        };
        let rel_t = if rel_t.is_finite() {
            rel_t.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let speed = if duration > 0.0 && rel_t > 0.0 {
            rel_v / (duration * rel_t)
        } else {
            0.0
        };
        Ease {
            influence: rel_t * 100.0,
            speed,
        }
    }

    /// Ease to restore from a stashed backup. Near-zero influence or speed in
    /// the backup falls back to the defaults so the handle becomes visible again.
    pub fn restored_from(backup: Ease) -> Ease {
        Ease {
            influence: if backup.influence > 1.0 {
                backup.influence
            } else {
                DEFAULT_INFLUENCE
            },
            speed: if backup.speed.abs() > 0.01 {
                backup.speed
            } else {
                0.0
            },
        }
    }
}
