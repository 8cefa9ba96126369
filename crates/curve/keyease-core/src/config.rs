//! Editing bounds supplied by the host editor.

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};

/// Ranges every edit is clamped to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditConfig {
    /// Lower bound for edited values.
    pub value_min: f64,
    /// Upper bound for edited values.
    pub value_max: f64,
    /// Upper bound (seconds) for edited key times; the lower bound is 0.
    pub timeline_max: f64,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            value_min: 0.0,
            value_max: 500.0,
            timeline_max: 10.0,
        }
    }
}

impl EditConfig {
    /// Check the bounds are usable: finite, `value_min < value_max`,
    /// `timeline_max > 1`.
    pub fn validate(&self) -> Result<()> {
        if !self.value_min.is_finite() || !self.value_max.is_finite() {
            return Err(CurveError::InvalidConfig("value range must be finite".into()));
        }
        if self.value_min >= self.value_max {
            return Err(CurveError::InvalidConfig(format!(
                "value_min ({}) must be below value_max ({})",
                self.value_min, self.value_max
            )));
        }
        if !self.timeline_max.is_finite() || self.timeline_max <= 1.0 {
            return Err(CurveError::InvalidConfig(format!(
                "timeline_max must be a finite number > 1, got {}",
                self.timeline_max
            )));
        }
        Ok(())
    }

    // Must not panic on an unvalidated (inverted or NaN) range.
    #[inline]
    pub fn clamp_time(&self, t: f64) -> f64 {
        t.max(0.0).min(self.timeline_max)
    }

    #[inline]
    pub fn clamp_value(&self, v: f64) -> f64 {
        v.max(self.value_min).min(self.value_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EditConfig::default().validate().expect("default config");
    }

    #[test]
    fn rejects_inverted_range_and_short_timeline() {
        let cfg = EditConfig {
            value_min: 10.0,
            value_max: 10.0,
            ..EditConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = EditConfig {
            timeline_max: 0.5,
            ..EditConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EditConfig = serde_json::from_str(r#"{"value_max": 100}"#).unwrap();
        assert_eq!(cfg.value_max, 100.0);
        assert_eq!(cfg.value_min, 0.0);
        assert_eq!(cfg.timeline_max, 10.0);
    }
}
