//! Baking API: sample every track of a Document at a fixed rate.

use serde::{Deserialize, Serialize};

use crate::data::Document;
use crate::sampling::{sample_track, Channels};

const DEFAULT_FRAME_RATE: f64 = 100.0;
/// Ten minutes at the default rate.
const DEFAULT_MAX_FRAMES: usize = 60_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BakingConfig {
    /// Samples per second.
    pub frame_rate: f64,
    /// Start time (seconds).
    pub start_time: f64,
    /// End time (seconds); if None, uses the latest key time in the document.
    pub end_time: Option<f64>,
    /// Upper bound on frames per track; a longer window is cut short.
    pub max_frames: usize,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            start_time: 0.0,
            end_time: None,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BakedTrack {
    pub property_name: String,
    pub match_name: String,
    /// Sampled values at each frame.
    pub values: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BakedDocument {
    pub frame_rate: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub tracks: Vec<BakedTrack>,
}

impl BakedDocument {
    /// Number of frames per track (inclusive of both ends).
    pub fn frame_count(&self) -> usize {
        self.tracks.first().map_or(0, |t| t.values.len())
    }
}

/// Bake every track of `doc` over the configured window.
pub fn bake_document(doc: &Document, cfg: &BakingConfig, channels: Channels) -> BakedDocument {
    let sr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
        cfg.frame_rate
    } else {
        DEFAULT_FRAME_RATE
    };
    let start = if cfg.start_time.is_finite() {
        cfg.start_time.max(0.0)
    } else {
        0.0
    };
    let last_key = doc
        .tracks()
        .iter()
        .filter_map(|t| t.last_time())
        .fold(0.0_f64, f64::max);
    let mut end = cfg.end_time.unwrap_or(last_key);
    if !end.is_finite() {
        end = last_key;
    }
    let mut end = end.max(start);
    let max_frames = cfg.max_frames.max(1);
    // Round away float noise so e.g. 2.0 s at 100 Hz is exactly 201 frames.
    let frames_f = ((end - start) * sr - 1e-9).ceil().max(0.0);
    let frame_count = if frames_f < (max_frames - 1) as f64 {
        frames_f as usize + 1
    } else {
        max_frames
    };
    if (frame_count - 1) as f64 != frames_f {
        log::warn!(
            "bake window [{start}, {end}] needs more than {max_frames} frames at {sr} Hz; \
             truncating"
        );
        end = start + (frame_count - 1) as f64 / sr;
    }

    let tracks = doc
        .tracks()
        .iter()
        .map(|track| {
            let values = (0..frame_count)
                .map(|f| {
                    let t = (start + f as f64 / sr).min(end);
                    sample_track(track, t, channels)
                })
                .collect();
            BakedTrack {
                property_name: track.meta.property_name.clone(),
                match_name: track.meta.match_name.clone(),
                values,
            }
        })
        .collect();

    BakedDocument {
        frame_rate: sr,
        start_time: start,
        end_time: end,
        tracks,
    }
}

/// Export baked data as serde_json::Value.
pub fn export_baked_json(baked: &BakedDocument) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_document_json;

    #[test]
    fn frame_count_covers_both_ends() {
        let doc = parse_document_json(
            r#"[{"keys": [
                {"time": 0, "value": 0, "interpolationIn": "linear", "interpolationOut": "linear"},
                {"time": 2, "value": 20, "interpolationIn": "linear", "interpolationOut": "linear"}
            ]}]"#,
        )
        .unwrap();
        let baked = bake_document(
            &doc,
            &BakingConfig {
                frame_rate: 4.0,
                ..BakingConfig::default()
            },
            Channels::All,
        );
        assert_eq!(baked.end_time, 2.0);
        assert_eq!(baked.frame_count(), 9);
        assert_eq!(baked.tracks[0].values[4], vec![10.0]);
        assert_eq!(baked.tracks[0].values[8], vec![20.0]);
    }

    #[test]
    fn bad_frame_rate_falls_back_to_default() {
        let doc = crate::data::Document::new();
        let baked = bake_document(
            &doc,
            &BakingConfig {
                frame_rate: f64::NAN,
                end_time: Some(1.0),
                ..BakingConfig::default()
            },
            Channels::All,
        );
        assert_eq!(baked.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(baked.frame_count(), 101);
        assert_eq!(baked.tracks[0].values[50], vec![0.0]);
    }

    #[test]
    fn huge_key_time_is_capped() {
        let doc = parse_document_json(
            r#"[{"keys": [
                {"time": 0, "value": 1,
                 "interpolationIn": "linear", "interpolationOut": "linear"},
                {"time": 1e20, "value": 2,
                 "interpolationIn": "linear", "interpolationOut": "linear"}
            ]}]"#,
        )
        .unwrap();
        let baked = bake_document(&doc, &BakingConfig::default(), Channels::All);
        assert_eq!(baked.frame_count(), DEFAULT_MAX_FRAMES);
        assert_eq!(baked.tracks[0].values[0], vec![1.0]);

        let baked = bake_document(
            &doc,
            &BakingConfig {
                max_frames: 5,
                ..BakingConfig::default()
            },
            Channels::All,
        );
        assert_eq!(baked.frame_count(), 5);
        assert!((baked.end_time - 0.04).abs() < 1e-12);
    }

    #[test]
    fn exported_json_lists_tracks_and_rate() {
        let doc = parse_document_json(
            r#"[{"propertyName": "Opacity", "keys": [{"time": 0, "value": 3}]}]"#,
        )
        .unwrap();
        let baked = bake_document(&doc, &BakingConfig::default(), Channels::All);
        let v = export_baked_json(&baked);
        assert_eq!(v["frame_rate"], 100.0);
        assert_eq!(v["tracks"][0]["property_name"], "Opacity");
        assert_eq!(v["tracks"][0]["values"][0], serde_json::json!([3.0]));
    }
}
