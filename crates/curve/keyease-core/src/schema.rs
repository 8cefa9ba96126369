use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{Document, Interpolation, Keyframe, Track, TrackMeta};
use crate::ease::Ease;
use crate::error::{CurveError, Result};
use crate::ids::KeyId;
use crate::value::ValueShape;

/// Public API: parse a keyframe JSON document (array of track records, as
/// written by the editor or the After Effects export script) into a Document.
///
/// Notes:
/// - Missing or null `propertyName`/`parentName`/`layerName`/`matchName` become "".
/// - Missing `keys` is an empty track.
/// - Only the first element of `inEase`/`outEase` is used; empty or missing is {0, 0}.
/// - Interpolation strings other than hold/linear/bezier are read as linear.
/// - Keys are re-sorted by time; value shape comes from the first key.
pub fn parse_document_json(s: &str) -> Result<Document> {
    let records: Vec<RawTrack> = serde_json::from_str(s)?;

    let mut tracks: Vec<Track> = Vec::with_capacity(records.len());
    for (ti, rt) in records.into_iter().enumerate() {
        let shape = rt.keys.first().map_or(ValueShape::Scalar, |k| k.value.shape());

        let mut keys: Vec<Keyframe> = Vec::with_capacity(rt.keys.len());
        for (ki, k) in rt.keys.into_iter().enumerate() {
            let value = k.value.into_components();
            if value.len() != shape.len() {
                return Err(CurveError::ShapeMismatch {
                    context: format!("track {ti} key {ki}"),
                    expected: shape.len(),
                    actual: value.len(),
                });
            }
            keys.push(Keyframe {
                // reassigned by Document::from_tracks
                id: KeyId(0),
                time: k.time,
                value,
                interpolation_out: to_interpolation(k.interpolation_out.as_deref()),
                interpolation_in: to_interpolation(k.interpolation_in.as_deref()),
                out_ease: first_ease(&k.out_ease),
                in_ease: first_ease(&k.in_ease),
            });
        }

        let meta = TrackMeta {
            property_name: rt.property_name.unwrap_or_default(),
            parent_name: rt.parent_name.unwrap_or_default(),
            layer_name: rt.layer_name.unwrap_or_default(),
            match_name: rt.match_name.unwrap_or_default(),
        };
        tracks.push(Track::from_keys(meta, shape, keys)?);
    }

    Ok(Document::from_tracks(tracks))
}

/// Serialize a Document to pretty-printed schema JSON.
pub fn document_to_json(doc: &Document) -> Result<String> {
    serde_json::to_string_pretty(&to_raw(doc)).map_err(|e| CurveError::Serialize(e.to_string()))
}

/// Serialize a Document to a schema `serde_json::Value`.
pub fn document_to_value(doc: &Document) -> serde_json::Value {
    serde_json::to_value(to_raw(doc)).unwrap_or(serde_json::Value::Null)
}

/// Read and parse a keyframe document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CurveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let doc = parse_document_json(&text)?;
    log::debug!("loaded {} tracks from {}", doc.len(), path.display());
    Ok(doc)
}

/// Write a Document to disk as pretty-printed schema JSON.
pub fn save_document(doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = document_to_json(doc)?;
    fs::write(path, text).map_err(|source| CurveError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn to_interpolation(s: Option<&str>) -> Interpolation {
    match s {
        None => Interpolation::Bezier,
        Some(s) => Interpolation::parse(s).unwrap_or_else(|| {
            log::warn!("unknown interpolation {s:?}, reading as linear");
            Interpolation::Linear
        }),
    }
}

fn first_ease(eases: &[RawEase]) -> Ease {
    eases
        .first()
        .map(|e| Ease::new(e.influence, e.speed))
        .unwrap_or(Ease::ZERO)
}

fn to_raw(doc: &Document) -> Vec<RawTrack> {
    doc.tracks()
        .iter()
        .map(|t| RawTrack {
            property_name: Some(t.meta.property_name.clone()),
            parent_name: Some(t.meta.parent_name.clone()),
            layer_name: Some(t.meta.layer_name.clone()),
            match_name: Some(t.meta.match_name.clone()),
            keys: t
                .keys()
                .iter()
                .map(|k| RawKey {
                    time: k.time,
                    value: RawValue::from_components(t.shape(), &k.value),
                    in_ease: vec![RawEase::from(k.in_ease)],
                    out_ease: vec![RawEase::from(k.out_ease)],
                    interpolation_in: Some(k.interpolation_in.as_str().to_string()),
                    interpolation_out: Some(k.interpolation_out.as_str().to_string()),
                })
                .collect(),
        })
        .collect()
}

// ----- JSON schema (serde) -----

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    #[serde(default)]
    property_name: Option<String>,
    #[serde(default)]
    parent_name: Option<String>,
    #[serde(default)]
    layer_name: Option<String>,
    #[serde(default)]
    match_name: Option<String>,
    #[serde(default)]
    keys: Vec<RawKey>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawKey {
    time: f64,
    value: RawValue,
    // Arrays leave room for per-dimension eases from the host tool.
    #[serde(default)]
    in_ease: Vec<RawEase>,
    #[serde(default)]
    out_ease: Vec<RawEase>,
    #[serde(default)]
    interpolation_in: Option<String>,
    #[serde(default)]
    interpolation_out: Option<String>,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
struct RawEase {
    influence: f64,
    speed: f64,
}

impl From<Ease> for RawEase {
    fn from(e: Ease) -> Self {
        Self {
            influence: e.influence,
            speed: e.speed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Vector(Vec<f64>),
}

impl RawValue {
    fn shape(&self) -> ValueShape {
        match self {
            RawValue::Number(_) => ValueShape::Scalar,
            RawValue::Vector(v) => ValueShape::Vector(v.len()),
        }
    }

    fn into_components(self) -> Vec<f64> {
        match self {
            RawValue::Number(n) => vec![n],
            RawValue::Vector(v) => v,
        }
    }

    fn from_components(shape: ValueShape, value: &[f64]) -> Self {
        match (shape, value) {
            (ValueShape::Scalar, [n]) => RawValue::Number(*n),
            _ => RawValue::Vector(value.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let doc = parse_document_json(
            r#"[
                {"propertyName": "Opacity"},
                {"matchName": "ADBE Scale", "layerName": null, "keys": [
                    {"time": 1.0, "value": [100, 100, 100]}
                ]}
            ]"#,
        )
        .expect("tolerant parse");
        assert_eq!(doc.len(), 2);
        let t0 = doc.track(0).unwrap();
        assert!(t0.is_empty());
        assert_eq!(t0.meta.match_name, "");
        let t1 = doc.track(1).unwrap();
        assert_eq!(t1.meta.layer_name, "");
        assert_eq!(t1.shape(), ValueShape::Vector(3));
        let k = &t1.keys()[0];
        assert_eq!(k.out_ease, Ease::ZERO);
        assert_eq!(k.interpolation_in, Interpolation::Bezier);
    }

    #[test]
    fn only_first_ease_is_used() {
        let doc = parse_document_json(
            r#"[{"keys": [{"time": 0, "value": 1,
                "inEase": [{"influence": 20, "speed": 1}, {"influence": 90, "speed": 9}],
                "outEase": [{"influence": 40, "speed": 2}],
                "interpolationIn": "bezier", "interpolationOut": "unknown"}]}]"#,
        )
        .unwrap();
        let k = &doc.track(0).unwrap().keys()[0];
        assert_eq!(k.in_ease, Ease::new(20.0, 1.0));
        assert_eq!(k.out_ease, Ease::new(40.0, 2.0));
        assert_eq!(k.interpolation_out, Interpolation::Linear);
    }

    #[test]
    fn mixed_shapes_are_rejected() {
        let err = parse_document_json(
            r#"[{"keys": [{"time": 0, "value": 1}, {"time": 1, "value": [1, 2]}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CurveError::ShapeMismatch {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn empty_array_yields_single_track() {
        let doc = parse_document_json("[]").unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn scalars_are_written_as_numbers() {
        let doc = parse_document_json(
            r#"[{"keys": [{"time": 0, "value": 7}]},
                {"keys": [{"time": 0, "value": [7]}]}]"#,
        )
        .unwrap();
        let v = document_to_value(&doc);
        assert_eq!(v[0]["keys"][0]["value"], serde_json::json!(7.0));
        assert_eq!(v[1]["keys"][0]["value"], serde_json::json!([7.0]));
        assert_eq!(v[0]["keys"][0]["inEase"].as_array().unwrap().len(), 1);
    }
}
