//! Edit tracks: the director's output contract.
//!
//! A track is a sorted list of self-describing, time-bounded segments. A
//! renderer replays the camera track by locating the segment containing a
//! sample time and interpolating between its endpoint transforms with the
//! segment's easing.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::geometry::NormPoint;

/// A camera transform: zoom factor plus normalized view center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformValue {
    /// 1.0 = no zoom, 2.0 = 200%.
    pub zoom: f64,
    pub center: NormPoint,
}

impl TransformValue {
    pub const IDENTITY: Self = Self {
        zoom: 1.0,
        center: NormPoint::CENTER,
    };

    pub fn new(zoom: f64, center: NormPoint) -> Self {
        Self {
            zoom: zoom.max(1.0),
            center,
        }
    }

    /// Linear interpolation between two transforms.
    pub fn interpolated(&self, to: &Self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            zoom: self.zoom + (to.zoom - self.zoom) * amount,
            center: NormPoint::new(
                self.center.x + (to.center.x - self.center.x) * amount,
                self.center.y + (to.center.y - self.center.y) * amount,
            ),
        }
    }

    /// Whether two transforms are visually indistinguishable within the
    /// given tolerances.
    pub fn approx_eq(&self, other: &Self, zoom_tol: f64, center_tol: f64) -> bool {
        (self.zoom - other.zoom).abs() <= zoom_tol
            && (self.center.x - other.center.x).abs() <= center_tol
            && (self.center.y - other.center.y).abs() <= center_tol
    }
}

/// A transform pinned to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedTransform {
    pub time: f64,
    pub transform: TransformValue,
}

impl TimedTransform {
    pub fn new(time: f64, transform: TransformValue) -> Self {
        Self { time, transform }
    }
}

/// One atomic camera interpolation step exposed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub start_transform: TransformValue,
    pub end_transform: TransformValue,
    pub easing: Easing,
}

impl CameraSegment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether the segment holds a single transform.
    pub fn is_static(&self) -> bool {
        self.start_transform == self.end_transform
    }

    /// Evaluate the camera transform at time `t` inside this segment.
    pub fn transform_at(&self, t: f64) -> TransformValue {
        let duration = self.duration();
        if duration <= 0.0 {
            return self.end_transform;
        }
        let progress = ((t - self.start_time) / duration).clamp(0.0, 1.0);
        let eased = self.easing.apply(progress, duration);
        self.start_transform.interpolated(&self.end_transform, eased)
    }
}

/// The camera track: sorted segments with at most 1 ms between neighbors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraTrack {
    pub segments: Vec<CameraSegment>,
}

impl CameraTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Replay the track at an arbitrary time. Before the first segment the
    /// first start transform holds; after the last segment the final end
    /// transform holds.
    pub fn transform_at(&self, t: f64) -> TransformValue {
        let Some(first) = self.segments.first() else {
            return TransformValue::IDENTITY;
        };
        if t <= first.start_time {
            return first.start_transform;
        }
        let last = self.segments.last().expect("non-empty");
        if t >= last.end_time {
            return last.end_transform;
        }

        // Find the last segment starting at or before t.
        let idx = self
            .segments
            .partition_point(|seg| seg.start_time <= t)
            .saturating_sub(1);
        let segment = &self.segments[idx];
        if t <= segment.end_time {
            segment.transform_at(t)
        } else {
            // Inside a (sub-millisecond) gap between segments.
            segment.end_transform
        }
    }

    /// Largest gap between consecutive segments, in seconds.
    pub fn max_gap(&self) -> f64 {
        self.segments
            .windows(2)
            .map(|pair| pair[1].start_time - pair[0].end_time)
            .fold(0.0_f64, f64::max)
    }
}

/// Cursor rendering styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CursorStyle {
    Arrow,
    Pointer,
    IBeam,
}

/// A time-bounded cursor style descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorSegment {
    pub start_time: f64,
    pub end_time: f64,
    pub style: CursorStyle,
    pub visible: bool,
    /// Render scale multiplier relative to native cursor size.
    pub scale: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CursorTrack {
    pub segments: Vec<CursorSegment>,
}

impl CursorTrack {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A keystroke overlay descriptor with fade-in/out semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeSegment {
    pub start_time: f64,
    pub end_time: f64,
    /// Text to display, modifier glyphs included (e.g. "⌘C").
    pub display_text: String,
    pub fade_in_duration: f64,
    pub fade_out_duration: f64,
}

impl KeystrokeSegment {
    pub fn is_active(&self, t: f64) -> bool {
        t >= self.start_time && t <= self.end_time
    }

    /// Overlay opacity at time `t`, fades applied.
    pub fn opacity(&self, t: f64) -> f64 {
        if !self.is_active(t) {
            return 0.0;
        }
        let elapsed = t - self.start_time;
        let remaining = self.end_time - t;
        if self.fade_in_duration > 0.0 && elapsed < self.fade_in_duration {
            return elapsed / self.fade_in_duration;
        }
        if self.fade_out_duration > 0.0 && remaining < self.fade_out_duration {
            return remaining / self.fade_out_duration;
        }
        1.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeTrack {
    pub segments: Vec<KeystrokeSegment>,
}

impl KeystrokeTrack {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything the director produces for one recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTimeline {
    pub camera: CameraTrack,
    pub cursor: CursorTrack,
    pub keystrokes: KeystrokeTrack,
}

impl GeneratedTimeline {
    pub fn empty() -> Self {
        Self::default()
    }
}
