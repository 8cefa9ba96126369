//! Track sampling.
//!
//! Model:
//! - Each Track has time-ordered keyframes in seconds.
//! - Outside the keyed range the boundary value holds (no extrapolation).
//! - Segment [k0 -> k1] is chosen so that `k0.time <= t < k1.time` and
//!   dispatched on `k0.interpolation_out` / `k1.interpolation_in`:
//!   hold if k0 holds, linear if either side is linear, bezier if both are
//!   bezier, linear for anything else.
//! - Only the components selected by [`Channels`] advance; the rest are
//!   copied from k0.
//!
//! API:
//! - sample_track(&Track, t, Channels) -> Vec<f64>
//! - sample_array::<N>(&Track, t) for fixed-size access

use crate::data::{Document, Interpolation, Keyframe, Track};
use crate::interp::functions::{bezier_segment, lerp};

/// Which value components a sample advances.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channels {
    /// Only this component is interpolated; every other component keeps the
    /// left keyframe's value. This is what the editor displays.
    Selected(usize),
    /// Every component is interpolated independently.
    All,
}

impl Default for Channels {
    fn default() -> Self {
        Channels::Selected(0)
    }
}

impl Channels {
    #[inline]
    fn includes(self, index: usize) -> bool {
        match self {
            Channels::Selected(i) => i == index,
            Channels::All => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SegmentMode {
    Hold,
    Linear,
    Bezier,
}

fn segment_mode(k0: &Keyframe, k1: &Keyframe) -> SegmentMode {
    match (k0.interpolation_out, k1.interpolation_in) {
        (Interpolation::Hold, _) => SegmentMode::Hold,
        (Interpolation::Linear, _) | (_, Interpolation::Linear) => SegmentMode::Linear,
        (Interpolation::Bezier, Interpolation::Bezier) => SegmentMode::Bezier,
        // bezier -> hold arrival
        _ => SegmentMode::Linear,
    }
}

/// Where `t` falls relative to the keys.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Segment {
    Empty,
    /// At or outside the keyed range: the key at this index holds.
    Boundary(usize),
    /// Strictly inside: keys `(i, i + 1)`.
    Inner(usize),
}

fn find_segment(keys: &[Keyframe], t: f64) -> Segment {
    let n = keys.len();
    if n == 0 {
        return Segment::Empty;
    }
    if t <= keys[0].time {
        return Segment::Boundary(0);
    }
    if t >= keys[n - 1].time {
        return Segment::Boundary(n - 1);
    }
    // Linear scan; tracks are small. First key strictly after t is k1.
    match keys.iter().position(|k| k.time > t) {
        Some(i1) if i1 > 0 => Segment::Inner(i1 - 1),
        _ => Segment::Boundary(n - 1),
    }
}

/// Sample a single track at time `t` (seconds).
pub fn sample_track(track: &Track, t: f64, channels: Channels) -> Vec<f64> {
    let keys = track.keys();
    let i0 = match find_segment(keys, t) {
        Segment::Empty => return track.shape().zeros(),
        Segment::Boundary(i) => return keys[i].value.clone(),
        Segment::Inner(i) => i,
    };
    let k0 = &keys[i0];
    let k1 = &keys[i0 + 1];
    let mut out = k0.value.clone();

    let mode = segment_mode(k0, k1);
    if mode == SegmentMode::Hold {
        return out;
    }

    let dt = k1.time - k0.time;
    let local_t = if dt > 0.0 { (t - k0.time) / dt } else { 0.0 };

    for (i, slot) in out.iter_mut().enumerate() {
        if !channels.includes(i) {
            continue;
        }
        let (v0, v1) = match (k0.component(i), k1.component(i)) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        *slot = match mode {
            SegmentMode::Bezier => {
                bezier_segment(k0.time, v0, &k0.out_ease, k1.time, v1, &k1.in_ease, t)
            }
            _ => lerp(v0, v1, local_t),
        };
    }
    out
}

/// Sample every component into a fixed-size array. Returns None when the
/// track has fewer than `N` components; extra components are ignored.
pub fn sample_array<const N: usize>(track: &Track, t: f64) -> Option<[f64; N]> {
    if track.dimension() < N {
        return None;
    }
    let v = sample_track(track, t, Channels::All);
    let mut out = [0.0; N];
    out.copy_from_slice(&v[..N]);
    Some(out)
}

impl Document {
    /// Sample track `index`; None if there is no such track.
    pub fn sample(&self, index: usize, t: f64, channels: Channels) -> Option<Vec<f64>> {
        self.track(index).map(|track| sample_track(track, t, channels))
    }

    /// Sample the first track matching `property` (and layer/parent when
    /// given) with every component interpolated.
    pub fn sample_by_name(
        &self,
        property: &str,
        layer: Option<&str>,
        parent: Option<&str>,
        t: f64,
    ) -> Option<Vec<f64>> {
        let index = self.find_track(property, layer, parent);
        if index.is_none() {
            log::warn!(
                "no track matches property {property:?} (layer {layer:?}, parent {parent:?})"
            );
        }
        self.sample(index?, t, Channels::All)
    }

    /// Fixed-size sample of track `index` with every component interpolated.
    pub fn sample_array<const N: usize>(&self, index: usize, t: f64) -> Option<[f64; N]> {
        self.track(index).and_then(|track| sample_array::<N>(track, t))
    }
}
