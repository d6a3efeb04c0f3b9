//! Track emission.
//!
//! Converts the post-processed simulated path into the renderer-facing
//! tracks. Camera emission is two-pass: transitions first charge trims
//! against their neighboring scenes, then scenes and transitions emit
//! segments into the carved-up timeline.

use reframe_project_model::easing::Easing;
use reframe_project_model::geometry::{clamp_center_to_screen, NormPoint};
use reframe_project_model::track::{
    CameraSegment, CameraTrack, CursorSegment, CursorStyle, CursorTrack, KeystrokeSegment,
    KeystrokeTrack, TimedTransform, TransformValue,
};

use crate::keys::{key_display_name, modifier_glyphs, STOP_HOTKEY_KEY_CODE};
use crate::settings::{CursorSettings, KeystrokeSettings, OptimizeSettings, TransitionSettings};
use crate::simulate::SimulatedPath;
use crate::timeline::{EventTimeline, UnifiedEvent, UnifiedEventKind};
use crate::transition::TransitionStyle;

/// Per-transition trim cap as a fraction of the neighbor's duration.
const TRIM_CAP_FRACTION: f64 = 0.3;

/// Combined trims may consume at most this fraction of a scene.
const MAX_TRIMMED_FRACTION: f64 = 0.8;

/// Length of the degenerate segment emitted for single-sample scenes.
const DEGENERATE_SEGMENT_SECS: f64 = 0.001;

/// Emits the camera track from a simulated path.
pub struct CameraTrackEmitter {
    settings: TransitionSettings,
}

impl CameraTrackEmitter {
    pub fn new(settings: TransitionSettings) -> Self {
        Self { settings }
    }

    /// Emit camera segments covering the path, trimmed to `duration`.
    pub fn emit(&self, path: &SimulatedPath, duration: f64) -> CameraTrack {
        let n = path.scenes.len();
        if n == 0 {
            return CameraTrack::new();
        }

        // Pass 1: charge transition time against neighboring scenes.
        let mut left_trim = vec![0.0_f64; n];
        let mut right_trim = vec![0.0_f64; n];
        for transition in &path.transitions {
            let Some(from_idx) = path
                .scenes
                .iter()
                .position(|s| s.scene.id == transition.from_scene.id)
            else {
                continue;
            };
            let Some(to_idx) = path
                .scenes
                .iter()
                .position(|s| s.scene.id == transition.to_scene.id)
            else {
                continue;
            };

            let half = transition.plan.style.total_duration() * 0.5;
            let from_cap = path.scenes[from_idx].scene.duration() * TRIM_CAP_FRACTION;
            let to_cap = path.scenes[to_idx].scene.duration() * TRIM_CAP_FRACTION;
            right_trim[from_idx] += half.min(from_cap);
            left_trim[to_idx] += half.min(to_cap);
        }
        for i in 0..n {
            let budget = path.scenes[i].scene.duration() * MAX_TRIMMED_FRACTION;
            let charged = left_trim[i] + right_trim[i];
            if charged > budget && charged > 0.0 {
                let scale = budget / charged;
                left_trim[i] *= scale;
                right_trim[i] *= scale;
            }
        }

        // Pass 2: emit scene segments into the trimmed windows.
        let mut segments = vec![];
        for (i, segment) in path.scenes.iter().enumerate() {
            let window_start = (segment.scene.start_time + left_trim[i]).min(duration);
            let window_end = (segment.scene.end_time - right_trim[i]).min(duration);
            emit_scene_segments(&segment.samples, window_start, window_end, &mut segments);
        }

        // Pass 3: transition segments between adjacent scenes.
        for transition in &path.transitions {
            let Some(from_idx) = path
                .scenes
                .iter()
                .position(|s| s.scene.id == transition.from_scene.id)
            else {
                continue;
            };
            let Some(to_idx) = path
                .scenes
                .iter()
                .position(|s| s.scene.id == transition.to_scene.id)
            else {
                continue;
            };

            let trans_start = path.scenes[from_idx].scene.end_time - right_trim[from_idx];
            let trans_end = path.scenes[to_idx].scene.start_time + left_trim[to_idx];
            let trans_start = trans_start.min(duration);
            let trans_end = trans_end.min(duration);
            if trans_end - trans_start <= 1e-9 {
                continue;
            }

            // Endpoints are sampled at the trimmed boundaries so the track
            // stays transform-continuous even when a trim lands mid-pan.
            // With zero trims these are exactly the refined endpoints.
            let start_transform =
                sample_transform_at(&path.scenes[from_idx].samples, trans_start);
            let end_transform = sample_transform_at(&path.scenes[to_idx].samples, trans_end);

            self.emit_transition(
                start_transform,
                end_transform,
                &transition.plan.style,
                &transition.plan.easing,
                trans_start,
                trans_end,
                &mut segments,
            );
        }

        // Containment and ordering guarantees on everything emitted.
        for segment in &mut segments {
            segment.start_transform = clamp_transform(segment.start_transform);
            segment.end_transform = clamp_transform(segment.end_transform);
        }
        segments.sort_by(|a, b| {
            a.start_time
                .partial_cmp(&b.start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        CameraTrack { segments }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_transition(
        &self,
        start_transform: TransformValue,
        end_transform: TransformValue,
        style: &TransitionStyle,
        easing: &Easing,
        trans_start: f64,
        trans_end: f64,
        segments: &mut Vec<CameraSegment>,
    ) {
        match style {
            TransitionStyle::DirectPan { .. } => {
                segments.push(CameraSegment {
                    start_time: trans_start,
                    end_time: trans_end,
                    start_transform,
                    end_transform,
                    easing: easing.clone(),
                });
            }
            TransitionStyle::ZoomOutAndIn {
                out_duration,
                in_duration,
            } => {
                let actual = trans_end - trans_start;
                let out_fraction = out_duration / (out_duration + in_duration).max(1e-9);
                let mid_time = trans_start + actual * out_fraction;
                let mid = TransformValue::new(
                    1.0,
                    NormPoint::midpoint(&start_transform.center, &end_transform.center),
                );
                segments.push(CameraSegment {
                    start_time: trans_start,
                    end_time: mid_time,
                    start_transform,
                    end_transform: mid,
                    easing: self.settings.zoom_out_easing.clone(),
                });
                segments.push(CameraSegment {
                    start_time: mid_time,
                    end_time: trans_end,
                    start_transform: mid,
                    end_transform,
                    easing: self.settings.zoom_in_easing.clone(),
                });
            }
            TransitionStyle::Cut => {
                // The charged window is already at most the cut length.
                segments.push(CameraSegment {
                    start_time: trans_start,
                    end_time: trans_end,
                    start_transform,
                    end_transform,
                    easing: Easing::Linear,
                });
            }
        }
    }
}

/// Emit segments for one scene's samples inside `[window_start, window_end]`.
fn emit_scene_segments(
    samples: &[TimedTransform],
    window_start: f64,
    window_end: f64,
    segments: &mut Vec<CameraSegment>,
) {
    if samples.is_empty() {
        return;
    }

    if samples.len() == 1 || window_end - window_start <= 1e-9 {
        // Degenerate scene: pin its transform for a millisecond.
        let transform = sample_transform_at(samples, window_start);
        segments.push(CameraSegment {
            start_time: window_start,
            end_time: window_start + DEGENERATE_SEGMENT_SECS,
            start_transform: transform,
            end_transform: transform,
            easing: Easing::Linear,
        });
        return;
    }

    // Boundary samples at the trim edges, interior samples in between.
    let mut clipped: Vec<TimedTransform> = vec![TimedTransform::new(
        window_start,
        sample_transform_at(samples, window_start),
    )];
    clipped.extend(
        samples
            .iter()
            .filter(|s| s.time > window_start + 1e-9 && s.time < window_end - 1e-9)
            .copied(),
    );
    clipped.push(TimedTransform::new(
        window_end,
        sample_transform_at(samples, window_end),
    ));

    let sub_count = clipped.len() - 1;
    for k in 0..sub_count {
        let a = clipped[k];
        let b = clipped[k + 1];
        if b.time - a.time <= 1e-9 {
            continue;
        }
        let easing = scene_sub_segment_easing(k, sub_count, a.transform == b.transform);
        segments.push(CameraSegment {
            start_time: a.time,
            end_time: b.time,
            start_transform: a.transform,
            end_transform: b.transform,
            easing,
        });
    }
}

/// Easing by position inside the scene: ease out of the hold, linear
/// through the middle, ease into the next hold.
fn scene_sub_segment_easing(index: usize, count: usize, is_static: bool) -> Easing {
    if is_static {
        return Easing::Linear;
    }
    if count == 1 {
        Easing::EaseInOut
    } else if index == 0 {
        Easing::EaseOut
    } else if index == count - 1 {
        Easing::EaseIn
    } else {
        Easing::Linear
    }
}

/// Linear interpolation into a scene's sample list.
fn sample_transform_at(samples: &[TimedTransform], t: f64) -> TransformValue {
    let first = samples.first().expect("samples non-empty");
    if t <= first.time {
        return first.transform;
    }
    let last = samples.last().expect("samples non-empty");
    if t >= last.time {
        return last.transform;
    }

    let idx = samples.partition_point(|s| s.time <= t).saturating_sub(1);
    let a = samples[idx];
    let b = samples[(idx + 1).min(samples.len() - 1)];
    let span = b.time - a.time;
    if span <= 1e-9 {
        return a.transform;
    }
    a.transform
        .interpolated(&b.transform, (t - a.time) / span)
}

fn clamp_transform(transform: TransformValue) -> TransformValue {
    TransformValue {
        zoom: transform.zoom,
        center: clamp_center_to_screen(transform.center, transform.zoom),
    }
}

/// Collapses chains of effectively static camera segments.
pub struct SegmentOptimizer {
    settings: OptimizeSettings,
}

impl SegmentOptimizer {
    pub fn new(settings: OptimizeSettings) -> Self {
        Self { settings }
    }

    /// Merge consecutive segments forming one hold. Idempotent.
    pub fn optimize(&self, track: CameraTrack) -> CameraTrack {
        if !self.settings.merge_consecutive_holds {
            return track;
        }
        let zoom_tol = self.settings.negligible_zoom_diff;
        let center_tol = self.settings.negligible_center_diff;

        let mut merged: Vec<CameraSegment> = vec![];
        for segment in track.segments {
            if let Some(current) = merged.last_mut() {
                let contiguous = (segment.start_time - current.end_time).abs() < 0.01;
                let seam_static = current
                    .end_transform
                    .approx_eq(&segment.start_transform, zoom_tol, center_tol);
                let overall_static = current
                    .start_transform
                    .approx_eq(&segment.end_transform, zoom_tol, center_tol);
                if contiguous && seam_static && overall_static {
                    current.end_time = segment.end_time;
                    current.end_transform = segment.end_transform;
                    continue;
                }
            }
            merged.push(segment);
        }

        CameraTrack { segments: merged }
    }
}

/// Post-hoc zoom emphasis applied to an emitted track.
pub fn apply_zoom_intensity(track: CameraTrack, intensity: f64) -> CameraTrack {
    if (intensity - 1.0).abs() < 1e-12 {
        return track;
    }
    let segments = track
        .segments
        .into_iter()
        .map(|mut segment| {
            segment.start_transform = rescale_transform(segment.start_transform, intensity);
            segment.end_transform = rescale_transform(segment.end_transform, intensity);
            segment
        })
        .collect();
    CameraTrack { segments }
}

fn rescale_transform(transform: TransformValue, intensity: f64) -> TransformValue {
    let zoom = (1.0 + (transform.zoom - 1.0) * intensity).max(1.0);
    TransformValue {
        zoom,
        center: clamp_center_to_screen(transform.center, zoom),
    }
}

/// Emits the cursor style track.
pub struct CursorTrackEmitter {
    settings: CursorSettings,
}

impl CursorTrackEmitter {
    pub fn new(settings: CursorSettings) -> Self {
        Self { settings }
    }

    /// One arrow segment spanning the whole recording.
    pub fn emit(&self, duration: f64) -> CursorTrack {
        if duration <= 0.0 {
            return CursorTrack::new();
        }
        CursorTrack {
            segments: vec![CursorSegment {
                start_time: 0.0,
                end_time: duration,
                style: CursorStyle::Arrow,
                visible: true,
                scale: self.settings.scale,
            }],
        }
    }
}

/// Emits keystroke overlay segments from timeline keydowns.
pub struct KeystrokeTrackEmitter {
    settings: KeystrokeSettings,
}

impl KeystrokeTrackEmitter {
    pub fn new(settings: KeystrokeSettings) -> Self {
        Self { settings }
    }

    pub fn emit(&self, timeline: &EventTimeline, duration: f64) -> KeystrokeTrack {
        if !self.settings.enabled || duration <= 0.0 {
            return KeystrokeTrack::new();
        }

        let key_downs: Vec<&UnifiedEvent> = timeline
            .events_in(0.0, duration)
            .iter()
            .filter(|e| e.kind == UnifiedEventKind::KeyDown)
            .collect();

        let stop_hotkey_index = key_downs
            .last()
            .filter(|e| is_stop_hotkey(e, duration))
            .map(|_| key_downs.len() - 1);

        let mut segments = vec![];
        let mut last_emitted = f64::NEG_INFINITY;
        for (i, event) in key_downs.iter().enumerate() {
            if Some(i) == stop_hotkey_index {
                continue;
            }

            let modifiers = event.metadata.modifiers.unwrap_or_default();
            let Some(name) = key_display_name(
                event.metadata.key_code.unwrap_or(0),
                event.metadata.character.as_deref(),
            ) else {
                continue;
            };
            if self.settings.shortcuts_only && !modifiers.has_any() {
                continue;
            }
            if event.time - last_emitted < self.settings.min_interval {
                continue;
            }

            segments.push(KeystrokeSegment {
                start_time: event.time,
                end_time: event.time + self.settings.display_duration,
                display_text: format!("{}{}", modifier_glyphs(&modifiers), name),
                fade_in_duration: self.settings.fade_in_duration,
                fade_out_duration: self.settings.fade_out_duration,
            });
            last_emitted = event.time;
        }

        KeystrokeTrack { segments }
    }
}

/// The trailing recording-stop hotkey (⌘⇧2), or a modifier chord right at
/// the end of the recording whose key code went unreported.
fn is_stop_hotkey(event: &UnifiedEvent, duration: f64) -> bool {
    let modifiers = event.metadata.modifiers.unwrap_or_default();
    if !(modifiers.command && modifiers.shift) {
        return false;
    }
    match event.metadata.key_code {
        Some(STOP_HOTKEY_KEY_CODE) => true,
        Some(_) => event.metadata.character.is_none() && event.time >= duration - 0.5,
        None => event.time >= duration - 0.5,
    }
}
