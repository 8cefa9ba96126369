//! Keyframe data model: keyframes, tracks and the document that owns them.
//!
//! Invariants kept by every mutating method here:
//! - keys within a track are ordered by time (non-decreasing);
//! - every key value in a track has `track.shape().len()` components;
//! - a document always holds at least one track.

use serde::{Deserialize, Serialize};

use crate::ease::{Ease, EaseSide};
use crate::error::{CurveError, Result};
use crate::ids::{IdAllocator, KeyId};
use crate::value::ValueShape;

/// Interpolation mode on one side of a keyframe.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Hold,
    Linear,
    #[default]
    Bezier,
}

impl Interpolation {
    pub fn as_str(self) -> &'static str {
        match self {
            Interpolation::Hold => "hold",
            Interpolation::Linear => "linear",
            Interpolation::Bezier => "bezier",
        }
    }

    /// Parse the schema string. Returns None for anything other than the
    /// three known modes.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hold" => Some(Interpolation::Hold),
            "linear" => Some(Interpolation::Linear),
            "bezier" => Some(Interpolation::Bezier),
            _ => None,
        }
    }
}

/// A time/value anchor with independent in/out interpolation and ease.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    pub id: KeyId,
    /// Seconds.
    pub time: f64,
    pub value: Vec<f64>,
    pub interpolation_out: Interpolation,
    pub interpolation_in: Interpolation,
    pub out_ease: Ease,
    pub in_ease: Ease,
}

impl Keyframe {
    /// Bezier on both sides with the default `{33, 0}` eases.
    pub fn new(id: KeyId, time: f64, value: Vec<f64>) -> Self {
        Self {
            id,
            time,
            value,
            interpolation_out: Interpolation::Bezier,
            interpolation_in: Interpolation::Bezier,
            out_ease: Ease::DEFAULT,
            in_ease: Ease::DEFAULT,
        }
    }

    pub fn with_interpolation(mut self, out: Interpolation, r#in: Interpolation) -> Self {
        self.interpolation_out = out;
        self.interpolation_in = r#in;
        self
    }

    pub fn with_eases(mut self, out: Ease, r#in: Ease) -> Self {
        self.out_ease = out;
        self.in_ease = r#in;
        self
    }

    #[inline]
    pub fn ease(&self, side: EaseSide) -> Ease {
        match side {
            EaseSide::In => self.in_ease,
            EaseSide::Out => self.out_ease,
        }
    }

    #[inline]
    pub fn ease_mut(&mut self, side: EaseSide) -> &mut Ease {
        match side {
            EaseSide::In => &mut self.in_ease,
            EaseSide::Out => &mut self.out_ease,
        }
    }

    #[inline]
    pub fn interpolation(&self, side: EaseSide) -> Interpolation {
        match side {
            EaseSide::In => self.interpolation_in,
            EaseSide::Out => self.interpolation_out,
        }
    }

    pub fn set_interpolation(&mut self, side: EaseSide, mode: Interpolation) {
        match side {
            EaseSide::In => self.interpolation_in = mode,
            EaseSide::Out => self.interpolation_out = mode,
        }
    }

    /// Component `index` of the value, if present.
    #[inline]
    pub fn component(&self, index: usize) -> Option<f64> {
        self.value.get(index).copied()
    }
}

/// Opaque identification of the animated property. Passed through untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackMeta {
    pub property_name: String,
    pub parent_name: String,
    pub layer_name: String,
    pub match_name: String,
}

impl TrackMeta {
    pub fn new(property_name: impl Into<String>, match_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            match_name: match_name.into(),
            ..Self::default()
        }
    }

    /// Matches on property or match name, then on layer/parent when given.
    pub fn matches(&self, property: &str, layer: Option<&str>, parent: Option<&str>) -> bool {
        (self.property_name == property || self.match_name == property)
            && layer.map_or(true, |l| self.layer_name == l)
            && parent.map_or(true, |p| self.parent_name == p)
    }
}

/// One animated property: metadata plus time-ordered keyframes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub meta: TrackMeta,
    pub(crate) shape: ValueShape,
    pub(crate) keys: Vec<Keyframe>,
}

impl Track {
    pub fn new(meta: TrackMeta, shape: ValueShape) -> Self {
        Self {
            meta,
            shape,
            keys: Vec::new(),
        }
    }

    /// Build a track from keys in any order. Keys are shape-checked and sorted.
    pub fn from_keys(meta: TrackMeta, shape: ValueShape, keys: Vec<Keyframe>) -> Result<Self> {
        for (i, k) in keys.iter().enumerate() {
            check_len(shape, &k.value, || format!("key {i}"))?;
        }
        let mut track = Self { meta, shape, keys };
        track.sort_keys();
        Ok(track)
    }

    #[inline]
    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    /// Number of value components per key.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.shape.len()
    }

    #[inline]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    /// Mutable access to a key for in-crate edits. Callers that change
    /// `time` must call [`Track::sort_keys`] afterwards and must keep
    /// `value.len()` equal to the track's dimension.
    pub(crate) fn key_mut(&mut self, index: usize) -> Option<&mut Keyframe> {
        self.keys.get_mut(index)
    }

    pub fn position_of(&self, id: KeyId) -> Option<usize> {
        self.keys.iter().position(|k| k.id == id)
    }

    /// Replace the value of key `index`. The length must match the track.
    pub fn set_value(&mut self, index: usize, value: Vec<f64>) -> Result<()> {
        check_len(self.shape, &value, || format!("key {index}"))?;
        let len = self.keys.len();
        let key = self
            .keys
            .get_mut(index)
            .ok_or(CurveError::KeyOutOfRange { index, len })?;
        key.value = value;
        Ok(())
    }

    pub fn first_time(&self) -> Option<f64> {
        self.keys.first().map(|k| k.time)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.keys.last().map(|k| k.time)
    }

    /// Stable sort by time. Sorting an ordered track leaves it untouched.
    pub fn sort_keys(&mut self) {
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Append a key, re-sort, and return the key's resulting index.
    pub fn push_key(&mut self, key: Keyframe) -> Result<usize> {
        check_len(self.shape, &key.value, || "inserted key".to_string())?;
        let id = key.id;
        self.keys.push(key);
        self.sort_keys();
        Ok(self.position_of(id).unwrap_or(self.keys.len() - 1))
    }

    /// Remove the key at `index`; out of bounds is a no-op.
    pub fn remove_key(&mut self, index: usize) -> Option<Keyframe> {
        if index < self.keys.len() {
            Some(self.keys.remove(index))
        } else {
            None
        }
    }

    /// Append a zero component to every key.
    pub(crate) fn grow_component(&mut self) {
        for k in &mut self.keys {
            k.value.push(0.0);
        }
        self.shape = self.shape.grown();
    }

    /// Drop component `index` from every key. Tracks with a single component,
    /// or fewer than `index + 1`, are left alone. Returns whether anything
    /// changed.
    pub(crate) fn remove_component(&mut self, index: usize) -> bool {
        let len = self.shape.len();
        if len <= 1 || index >= len {
            return false;
        }
        for k in &mut self.keys {
            k.value.remove(index);
        }
        self.shape = self.shape.shrunk();
        true
    }
}

fn check_len(shape: ValueShape, value: &[f64], context: impl FnOnce() -> String) -> Result<()> {
    if value.len() != shape.len() {
        return Err(CurveError::ShapeMismatch {
            context: context(),
            expected: shape.len(),
            actual: value.len(),
        });
    }
    Ok(())
}

/// The full set of tracks being edited. Never empty.
#[derive(Clone, Debug)]
pub struct Document {
    tracks: Vec<Track>,
    ids: IdAllocator,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with one empty scalar track.
    pub fn new() -> Self {
        Self {
            tracks: vec![Track::default()],
            ids: IdAllocator::new(),
        }
    }

    /// Adopt `tracks`, reassigning key ids so they are unique within the
    /// document. An empty list yields a single empty track.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut doc = Self {
            tracks,
            ids: IdAllocator::new(),
        };
        if doc.tracks.is_empty() {
            doc.tracks.push(Track::default());
        }
        for track in &mut doc.tracks {
            for key in &mut track.keys {
                key.id = doc.ids.alloc_key();
            }
        }
        doc
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub fn alloc_key_id(&mut self) -> KeyId {
        self.ids.alloc_key()
    }

    /// Append a new empty track and return its index.
    pub fn add_track(&mut self, meta: TrackMeta, shape: ValueShape) -> usize {
        self.tracks.push(Track::new(meta, shape));
        self.tracks.len() - 1
    }

    /// Remove a track. Removing the last remaining track, or an index out of
    /// range, is rejected and returns false.
    pub fn remove_track(&mut self, index: usize) -> bool {
        if self.tracks.len() <= 1 || index >= self.tracks.len() {
            return false;
        }
        self.tracks.remove(index);
        true
    }

    /// Index of the first track whose property or match name is `property`,
    /// optionally narrowed by layer and parent name.
    pub fn find_track(
        &self,
        property: &str,
        layer: Option<&str>,
        parent: Option<&str>,
    ) -> Option<usize> {
        self.tracks
            .iter()
            .position(|t| t.meta.matches(property, layer, parent))
    }

    /// Log a summary of every track at info level.
    pub fn log_tracks(&self) {
        for (i, t) in self.tracks.iter().enumerate() {
            log::info!(
                "track {i}: property_name={:?} layer_name={:?} parent_name={:?} \
                 match_name={:?} keys={} components={}",
                t.meta.property_name,
                t.meta.layer_name,
                t.meta.parent_name,
                t.meta.match_name,
                t.len(),
                t.dimension(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: u32, time: f64, v: f64) -> Keyframe {
        Keyframe::new(KeyId(id), time, vec![v])
    }

    #[test]
    fn sort_is_idempotent_on_ordered_track() {
        let mut t = Track::from_keys(
            TrackMeta::default(),
            ValueShape::Scalar,
            vec![key(0, 0.0, 1.0), key(1, 1.0, 2.0), key(2, 2.0, 3.0)],
        )
        .expect("valid keys");
        let before: Vec<KeyId> = t.keys().iter().map(|k| k.id).collect();
        t.sort_keys();
        let after: Vec<KeyId> = t.keys().iter().map(|k| k.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn push_key_returns_sorted_index() {
        let mut t = Track::default();
        assert_eq!(t.push_key(key(0, 2.0, 0.0)).unwrap(), 0);
        assert_eq!(t.push_key(key(1, 0.5, 0.0)).unwrap(), 0);
        assert_eq!(t.push_key(key(2, 1.0, 0.0)).unwrap(), 1);
        assert_eq!(t.position_of(KeyId(0)), Some(2));
    }

    #[test]
    fn push_key_rejects_wrong_shape() {
        let mut t = Track::new(TrackMeta::default(), ValueShape::Vector(3));
        let err = t
            .push_key(Keyframe::new(KeyId(0), 0.0, vec![1.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            CurveError::ShapeMismatch {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn remove_key_out_of_bounds_is_noop() {
        let mut t = Track::default();
        t.push_key(key(0, 0.0, 0.0)).unwrap();
        assert!(t.remove_key(5).is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn last_track_cannot_be_removed() {
        let mut doc = Document::new();
        assert!(!doc.remove_track(0));
        let i = doc.add_track(TrackMeta::default(), ValueShape::Scalar);
        assert_eq!(i, 1);
        assert!(doc.remove_track(0));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn find_track_by_property_or_match_name() {
        let mut a = TrackMeta::new("Position", "ADBE Position");
        a.layer_name = "A".into();
        a.parent_name = "Transform".into();
        let mut b = TrackMeta::new("Rotation", "ADBE Rotate Z");
        b.layer_name = "B".into();
        let mut c = TrackMeta::new("Position", "ADBE Position");
        c.layer_name = "B".into();
        let doc = Document::from_tracks(vec![
            Track::new(a, ValueShape::Vector(2)),
            Track::new(b, ValueShape::Scalar),
            Track::new(c, ValueShape::Vector(2)),
        ]);
        assert_eq!(doc.find_track("Position", None, None), Some(0));
        assert_eq!(doc.find_track("ADBE Rotate Z", None, None), Some(1));
        assert_eq!(doc.find_track("Position", Some("B"), None), Some(2));
        assert_eq!(doc.find_track("Position", Some("A"), Some("Transform")), Some(0));
        assert_eq!(doc.find_track("Position", Some("B"), Some("Transform")), None);
        assert_eq!(doc.find_track("Scale", None, None), None);
    }

    #[test]
    fn from_tracks_assigns_unique_ids() {
        let t = Track::from_keys(
            TrackMeta::default(),
            ValueShape::Scalar,
            vec![key(7, 0.0, 0.0), key(7, 1.0, 0.0)],
        )
        .unwrap();
        let doc = Document::from_tracks(vec![t.clone(), t]);
        let mut ids: Vec<KeyId> = doc
            .tracks()
            .iter()
            .flat_map(|t| t.keys().iter().map(|k| k.id))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn set_value_keeps_track_shape() {
        let mut t = Track::new(TrackMeta::default(), ValueShape::Vector(2));
        t.push_key(Keyframe::new(KeyId(0), 1.0, vec![1.0, 2.0]))
            .unwrap();
        assert!(matches!(
            t.set_value(0, vec![1.0, 2.0, 3.0]),
            Err(CurveError::ShapeMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
        assert!(matches!(
            t.set_value(4, vec![0.0, 0.0]),
            Err(CurveError::KeyOutOfRange { index: 4, len: 1 })
        ));
        t.set_value(0, vec![5.0, 6.0]).unwrap();
        assert_eq!(t.keys()[0].value, vec![5.0, 6.0]);
    }

    #[test]
    fn time_range_and_side_accessors() {
        let mut t = Track::default();
        assert_eq!(t.first_time(), None);
        t.push_key(key(0, 3.0, 0.0)).unwrap();
        t.push_key(
            key(1, 1.0, 0.0).with_interpolation(Interpolation::Hold, Interpolation::Linear),
        )
        .unwrap();
        assert_eq!(t.first_time(), Some(1.0));
        assert_eq!(t.last_time(), Some(3.0));
        let k = t.key(0).unwrap();
        assert_eq!(k.interpolation(EaseSide::Out), Interpolation::Hold);
        assert_eq!(k.interpolation(EaseSide::In), Interpolation::Linear);
        assert_eq!(k.ease(EaseSide::In), Ease::DEFAULT);

        let doc = Document::from_tracks(vec![t]);
        doc.log_tracks();
    }
}
