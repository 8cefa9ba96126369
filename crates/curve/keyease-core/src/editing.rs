//! Editing session: the state an interactive editor keeps between edits
//! (bounds, selected track, selected value component, flattened-handle
//! backups) and the edit operations that use it.
//!
//! Every time written through the session is clamped to
//! `[0, timeline_max]` and every value to `[value_min, value_max]`; the
//! zero-filled components of a newly inserted key are left at 0.
//! Operations that address a missing track or key are no-ops.

use hashbrown::HashMap;

use crate::config::EditConfig;
use crate::data::{Document, Interpolation, Keyframe, Track, TrackMeta};
use crate::ease::{Ease, EaseSide};
use crate::error::{CurveError, Result};
use crate::ids::KeyId;
use crate::sampling::{sample_track, Channels};
use crate::value::ValueShape;

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    config: EditConfig,
    selected_track: usize,
    selected_component: usize,
    /// One level of undo for `toggle_handle_flat`, per key and side.
    backups: HashMap<(KeyId, EaseSide), Ease>,
}

impl EditSession {
    pub fn new(config: EditConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    #[inline]
    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn set_value_range(&mut self, min: f64, max: f64) -> Result<()> {
        let cfg = EditConfig {
            value_min: min,
            value_max: max,
            ..self.config.clone()
        };
        cfg.validate()?;
        self.config = cfg;
        Ok(())
    }

    pub fn set_timeline_max(&mut self, timeline_max: f64) -> Result<()> {
        let cfg = EditConfig {
            timeline_max,
            ..self.config.clone()
        };
        cfg.validate()?;
        self.config = cfg;
        Ok(())
    }

    #[inline]
    pub fn selected_track(&self) -> usize {
        self.selected_track
    }

    #[inline]
    pub fn selected_component(&self) -> usize {
        self.selected_component
    }

    /// Channels the editor displays: only the selected component moves.
    #[inline]
    pub fn channels(&self) -> Channels {
        Channels::Selected(self.selected_component)
    }

    pub fn select_track(&mut self, doc: &Document, index: usize) -> Result<()> {
        if index >= doc.len() {
            return Err(CurveError::TrackOutOfRange {
                index,
                len: doc.len(),
            });
        }
        self.selected_track = index;
        self.clamp_component(doc);
        Ok(())
    }

    /// Select a value component; clamped to the selected track's length.
    pub fn select_component(&mut self, doc: &Document, index: usize) {
        self.selected_component = index;
        self.clamp_component(doc);
    }

    fn clamp_component(&mut self, doc: &Document) {
        let dim = doc
            .track(self.selected_track)
            .map_or(1, Track::dimension)
            .max(1);
        self.selected_component = self.selected_component.min(dim - 1);
    }

    /// Start editing a freshly loaded document: selection back to the first
    /// track and component, backups dropped, and the timeline extended past
    /// the selected track's last key if needed.
    pub fn adopt_document(&mut self, doc: &Document) {
        self.selected_track = 0;
        self.selected_component = 0;
        self.backups.clear();
        if let Some(last) = doc.track(0).and_then(Track::last_time) {
            if last > self.config.timeline_max {
                self.config.timeline_max = last + 1.0;
                log::debug!("timeline_max extended to {}", self.config.timeline_max);
            }
        }
    }

    /// Sample the selected track the way the editor displays it.
    pub fn sample(&self, doc: &Document, t: f64) -> Vec<f64> {
        doc.track(self.selected_track)
            .map(|track| sample_track(track, t, self.channels()))
            .unwrap_or_else(|| vec![0.0])
    }

    // ---- keys ----

    /// Insert a key on the selected track. The new value is zero in every
    /// component except the selected one, which gets `value`. Returns the new
    /// key's id and its index after re-sorting.
    pub fn insert_key(
        &mut self,
        doc: &mut Document,
        time: f64,
        value: f64,
    ) -> Option<(KeyId, usize)> {
        let dim = doc.track(self.selected_track)?.dimension();
        let mut values = vec![0.0; dim];
        if let Some(slot) = values.get_mut(self.selected_component) {
            *slot = self.config.clamp_value(value);
        }
        self.push_key(doc, time, values).ok()
    }

    /// Insert a key with a full value vector on the selected track. Every
    /// component is clamped; the length must match the track.
    pub fn insert_key_vector(
        &mut self,
        doc: &mut Document,
        time: f64,
        values: Vec<f64>,
    ) -> Result<(KeyId, usize)> {
        let values = values
            .into_iter()
            .map(|v| self.config.clamp_value(v))
            .collect();
        self.push_key(doc, time, values)
    }

    // Values are stored as given; only the time is clamped here.
    fn push_key(
        &mut self,
        doc: &mut Document,
        time: f64,
        values: Vec<f64>,
    ) -> Result<(KeyId, usize)> {
        let len = doc.len();
        let index = self.selected_track;
        let id = doc.alloc_key_id();
        let track = doc
            .track_mut(index)
            .ok_or(CurveError::TrackOutOfRange { index, len })?;
        let key = Keyframe::new(id, self.config.clamp_time(time), values);
        let at = track.push_key(key)?;
        log::debug!("inserted key {id:?} at index {at} on track {index}");
        Ok((id, at))
    }

    /// Move key `index` of the selected track to `time`, setting its selected
    /// component to `value`. Returns the key's index after re-sorting.
    pub fn move_key(
        &mut self,
        doc: &mut Document,
        index: usize,
        time: f64,
        value: f64,
    ) -> Option<usize> {
        let time = self.config.clamp_time(time);
        let value = self.config.clamp_value(value);
        let component = self.selected_component;
        let track = doc.track_mut(self.selected_track)?;
        let key = track.key_mut(index)?;
        let id = key.id;
        key.time = time;
        if let Some(slot) = key.value.get_mut(component) {
            *slot = value;
        }
        track.sort_keys();
        track.position_of(id)
    }

    /// Remove key `index` from the selected track; out of bounds is a no-op.
    pub fn delete_key(&mut self, doc: &mut Document, index: usize) -> Option<Keyframe> {
        let removed = doc.track_mut(self.selected_track)?.remove_key(index)?;
        self.backups.retain(|(id, _), _| *id != removed.id);
        log::debug!("deleted key {:?}", removed.id);
        Some(removed)
    }

    pub fn set_interpolation(
        &mut self,
        doc: &mut Document,
        index: usize,
        side: EaseSide,
        mode: Interpolation,
    ) -> bool {
        match self.key_mut(doc, index) {
            Some(key) => {
                key.set_interpolation(side, mode);
                true
            }
            None => false,
        }
    }

    // ---- eases ----

    /// Assign an ease directly. Stored as given; sampling clamps the influence.
    pub fn set_ease(
        &mut self,
        doc: &mut Document,
        index: usize,
        side: EaseSide,
        ease: Ease,
    ) -> bool {
        match self.key_mut(doc, index) {
            Some(key) => {
                *key.ease_mut(side) = ease;
                true
            }
            None => false,
        }
    }

    /// Absolute `(time, value)` of a segment's handle on the selected
    /// component. The out handle belongs to key `segment`, the in handle to
    /// key `segment + 1`. None for a zero-length segment.
    pub fn handle_position(
        &self,
        doc: &Document,
        segment: usize,
        side: EaseSide,
    ) -> Option<(f64, f64)> {
        let track = doc.track(self.selected_track)?;
        let k0 = track.key(segment)?;
        let k1 = track.key(segment + 1)?;
        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return None;
        }
        let c = self.selected_component;
        Some(match side {
            EaseSide::Out => k0.out_ease.control_point(side, k0.time, k0.component(c)?, dt),
            EaseSide::In => k1.in_ease.control_point(side, k1.time, k1.component(c)?, dt),
        })
    }

    /// Set a segment's ease from a dragged handle position (inverse of
    /// [`EditSession::handle_position`]). Returns the ease written.
    pub fn drag_handle(
        &mut self,
        doc: &mut Document,
        segment: usize,
        side: EaseSide,
        handle_time: f64,
        handle_value: f64,
    ) -> Option<Ease> {
        let c = self.selected_component;
        let track = doc.track_mut(self.selected_track)?;
        let (t0, t1) = (track.key(segment)?.time, track.key(segment + 1)?.time);
        let dt = t1 - t0;
        let (anchor_index, anchor_time) = match side {
            EaseSide::Out => (segment, t0),
            EaseSide::In => (segment + 1, t1),
        };
        let key = track.key_mut(anchor_index)?;
        let anchor_value = key.component(c)?;
        let ease = Ease::from_handle(
            side,
            anchor_time,
            anchor_value,
            dt,
            handle_time,
            handle_value,
        );
        *key.ease_mut(side) = ease;
        Some(ease)
    }

    /// Flatten a handle to `{0, 0}`, or restore it if it is already flat and
    /// a backup exists. Returns the ease now in place.
    pub fn toggle_handle_flat(
        &mut self,
        doc: &mut Document,
        index: usize,
        side: EaseSide,
    ) -> Option<Ease> {
        let track = doc.track_mut(self.selected_track)?;
        let key = track.key_mut(index)?;
        let slot = (key.id, side);
        let ease = key.ease_mut(side);
        if ease.is_flat() {
            if let Some(backup) = self.backups.remove(&slot) {
                *ease = Ease::restored_from(backup);
                return Some(*ease);
            }
        }
        self.backups.insert(slot, *ease);
        *ease = Ease::ZERO;
        Some(*ease)
    }

    fn key_mut<'d>(&self, doc: &'d mut Document, index: usize) -> Option<&'d mut Keyframe> {
        doc.track_mut(self.selected_track)?.key_mut(index)
    }

    // ---- value components ----

    /// Change the number of value components, document-wide.
    ///
    /// The current length is the selected track's. Growing appends zero
    /// components to every key of every track and selects the first new
    /// component. Shrinking removes the selected component from every track
    /// that has it, one step at a time, resetting the selection to 0 after
    /// each step; when the selected component is the selected track's last
    /// one, each track drops its own last component instead. A track left
    /// with one component becomes scalar. A length of 1 cannot shrink further.
    pub fn set_value_dimensionality(&mut self, doc: &mut Document, new_len: usize) {
        let current = doc.track(self.selected_track).map_or(1, Track::dimension);
        let new_len = new_len.max(1);
        if new_len > current {
            for _ in current..new_len {
                for track in doc.tracks_mut() {
                    track.grow_component();
                }
            }
            self.selected_component = current;
            log::debug!("value components {current} -> {new_len}");
        } else if new_len < current {
            for step in 0..current - new_len {
                let index = self.selected_component;
                // Selected track's last component: each track drops its own last.
                let trailing = index + 1 == current - step;
                for track in doc.tracks_mut() {
                    let at = if trailing {
                        track.dimension().saturating_sub(1)
                    } else {
                        index
                    };
                    track.remove_component(at);
                }
                self.selected_component = 0;
            }
            log::debug!("value components {current} -> {new_len}");
        }
    }

    pub fn add_value_component(&mut self, doc: &mut Document) {
        let current = doc.track(self.selected_track).map_or(1, Track::dimension);
        self.set_value_dimensionality(doc, current + 1);
    }

    /// Remove the selected component everywhere; no-op at one component.
    pub fn remove_value_component(&mut self, doc: &mut Document) {
        let current = doc.track(self.selected_track).map_or(1, Track::dimension);
        self.set_value_dimensionality(doc, current.saturating_sub(1));
    }

    // ---- tracks ----

    /// Append an empty scalar track with blank metadata and select it.
    pub fn add_track(&mut self, doc: &mut Document) -> usize {
        let index = doc.add_track(TrackMeta::default(), ValueShape::Scalar);
        self.selected_track = index;
        self.clamp_component(doc);
        index
    }

    /// Delete the selected track unless it is the only one.
    pub fn delete_track(&mut self, doc: &mut Document) -> bool {
        if !doc.remove_track(self.selected_track) {
            return false;
        }
        if self.selected_track >= doc.len() {
            self.selected_track = doc.len() - 1;
        }
        self.clamp_component(doc);
        true
    }
}
