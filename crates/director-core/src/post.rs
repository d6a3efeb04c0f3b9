//! Post-processing over the simulated path.
//!
//! Applied in order: optional path smoothing, minimum-hold enforcement,
//! transition endpoint refinement, and scene segment merging. Every stage
//! consumes the previous path and returns a new one.

use reframe_project_model::track::TimedTransform;

use crate::settings::{HoldSettings, MergeSettings, SmoothingSettings};
use crate::simulate::{SimulatedPath, SimulatedSceneSegment};

/// Moving-average smoothing of interior scene samples.
///
/// First and last samples anchor the scene and are never touched. Interior
/// samples snap to their window average only when the deviation is small;
/// larger deviations are intentional motion and stay put.
pub struct PathSmoother {
    settings: SmoothingSettings,
}

impl PathSmoother {
    pub fn new(settings: SmoothingSettings) -> Self {
        Self { settings }
    }

    pub fn apply(&self, mut path: SimulatedPath) -> SimulatedPath {
        if !self.settings.enabled || self.settings.window_size <= 1 {
            return path;
        }
        for segment in &mut path.scenes {
            self.smooth_segment(segment);
        }
        path
    }

    fn smooth_segment(&self, segment: &mut SimulatedSceneSegment) {
        let n = segment.samples.len();
        if n <= 2 {
            return;
        }
        let window = self.settings.window_size;
        let original = segment.samples.clone();

        for i in 1..n - 1 {
            let start = i.saturating_sub(window / 2);
            let end = (i + window / 2 + 1).min(n);
            let count = (end - start) as f64;

            let avg_x: f64 = original[start..end]
                .iter()
                .map(|s| s.transform.center.x)
                .sum::<f64>()
                / count;
            let avg_y: f64 = original[start..end]
                .iter()
                .map(|s| s.transform.center.y)
                .sum::<f64>()
                / count;

            let center = original[i].transform.center;
            if (center.x - avg_x).abs() < self.settings.max_deviation
                && (center.y - avg_y).abs() < self.settings.max_deviation
            {
                segment.samples[i].transform.center =
                    reframe_project_model::geometry::NormPoint::new(avg_x, avg_y);
            }
        }
    }
}

/// Enforces a minimum on-screen hold per scene.
///
/// Zoomed-in scenes need more time than zoomed-out ones to read. Scenes
/// shorter than their requirement are extended in place and every later
/// scene shifts forward by the accumulated extension; samples rescale
/// linearly into the new interval. Overflow past the recording duration is
/// pulled back out of the final scene where its own minimum allows.
pub struct HoldEnforcer {
    settings: HoldSettings,
}

impl HoldEnforcer {
    pub fn new(settings: HoldSettings) -> Self {
        Self { settings }
    }

    fn required_hold(&self, zoom: f64) -> f64 {
        if zoom > self.settings.zoom_in_threshold {
            self.settings.min_zoom_in_hold
        } else {
            self.settings.min_zoom_out_hold
        }
    }

    pub fn apply(&self, mut path: SimulatedPath, duration: f64) -> SimulatedPath {
        let mut shift = 0.0;
        let mut last_required = 0.0;

        for segment in &mut path.scenes {
            let required = self.required_hold(segment.shot_plan.ideal_zoom);
            last_required = required;

            let old_start = segment.scene.start_time;
            let old_end = segment.scene.end_time;
            let old_duration = old_end - old_start;

            let new_start = old_start + shift;
            let new_duration = old_duration.max(required);
            let new_end = new_start + new_duration;
            shift += new_duration - old_duration;

            retime_segment(segment, new_start, new_end);
        }

        // Pull overflow back out of the final scene where possible; any
        // residue beyond the recording is trimmed at emission.
        if let Some(last) = path.scenes.last_mut() {
            if last.scene.end_time > duration {
                let min_end = last.scene.start_time + last_required;
                let target_end = duration.max(min_end);
                if target_end < last.scene.end_time {
                    retime_segment(last, last.scene.start_time, target_end);
                }
            }
        }

        if shift > 0.0 {
            tracing::debug!(shift, "hold enforcement shifted timeline");
        }

        refresh_transition_scenes(&mut path);
        path
    }
}

/// Rescale a segment (scene bounds, shot-plan copy, and samples) into a
/// new interval.
fn retime_segment(segment: &mut SimulatedSceneSegment, new_start: f64, new_end: f64) {
    let old_start = segment.scene.start_time;
    let old_end = segment.scene.end_time;
    let old_duration = old_end - old_start;
    let new_duration = new_end - new_start;

    let n = segment.samples.len();
    for (i, sample) in segment.samples.iter_mut().enumerate() {
        let fraction = if old_duration > 1e-9 {
            (sample.time - old_start) / old_duration
        } else if n > 1 {
            i as f64 / (n - 1) as f64
        } else {
            0.0
        };
        sample.time = new_start + fraction * new_duration;
    }

    segment.scene.start_time = new_start;
    segment.scene.end_time = new_end;
    segment.shot_plan.scene.start_time = new_start;
    segment.shot_plan.scene.end_time = new_end;
}

/// Update the scene value copies held by transitions after re-timing,
/// matching by scene identity.
fn refresh_transition_scenes(path: &mut SimulatedPath) {
    let scenes = path.scenes.clone();
    for transition in &mut path.transitions {
        if let Some(from) = scenes.iter().find(|s| s.scene.id == transition.from_scene.id) {
            transition.from_scene = from.scene.clone();
        }
        if let Some(to) = scenes.iter().find(|s| s.scene.id == transition.to_scene.id) {
            transition.to_scene = to.scene.clone();
        }
    }
}

/// Snaps every transition's endpoint transforms to the neighboring scene
/// samples, guaranteeing exact continuity. Idempotent.
pub struct TransitionRefiner;

impl TransitionRefiner {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, mut path: SimulatedPath) -> SimulatedPath {
        let scenes = path.scenes.clone();
        for transition in &mut path.transitions {
            if let Some(from) = scenes.iter().find(|s| s.scene.id == transition.from_scene.id) {
                transition.start_transform = from.end_transform();
                transition.from_scene = from.scene.clone();
            }
            if let Some(to) = scenes.iter().find(|s| s.scene.id == transition.to_scene.id) {
                transition.end_transform = to.start_transform();
                transition.to_scene = to.scene.clone();
            }
        }
        path
    }
}

impl Default for TransitionRefiner {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges scene segments in two passes: first absorbing too-short scenes
/// into their longer neighbor, then collapsing adjacent scenes whose
/// framings are close enough to read as one shot.
pub struct SegmentMerger {
    settings: MergeSettings,
}

impl SegmentMerger {
    pub fn new(settings: MergeSettings) -> Self {
        Self { settings }
    }

    pub fn apply(&self, mut path: SimulatedPath) -> SimulatedPath {
        self.absorb_short_scenes(&mut path);
        self.merge_similar_neighbors(&mut path);
        // Re-snap transition endpoints touched by retargeting.
        TransitionRefiner::new().apply(path)
    }

    fn absorb_short_scenes(&self, path: &mut SimulatedPath) {
        let mut i = 0;
        while i < path.scenes.len() {
            if path.scenes.len() <= 1
                || path.scenes[i].scene.duration() >= self.settings.min_segment_duration
            {
                i += 1;
                continue;
            }

            // Pick the longer neighbor as the absorber.
            let left = i.checked_sub(1).map(|j| path.scenes[j].scene.duration());
            let right = path
                .scenes
                .get(i + 1)
                .map(|segment| segment.scene.duration());
            let absorb_left = match (left, right) {
                (Some(l), Some(r)) => l >= r,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => {
                    i += 1;
                    continue;
                }
            };

            let absorbed = path.scenes.remove(i);
            // After the removal the absorber sits at i-1 (left) or i (right).
            let absorber_idx = if absorb_left { i - 1 } else { i };
            merge_into(&mut path.scenes[absorber_idx], absorbed, absorb_left);

            cleanup_transitions(path);
            // Re-check from the absorber's position.
            i = absorber_idx;
        }
    }

    fn merge_similar_neighbors(&self, path: &mut SimulatedPath) {
        let mut i = 0;
        while i + 1 < path.scenes.len() {
            let a = &path.scenes[i];
            let b = &path.scenes[i + 1];
            let zoom_close = (a.shot_plan.ideal_zoom - b.shot_plan.ideal_zoom).abs()
                <= self.settings.max_zoom_diff_for_merge;
            let center_close = (a.shot_plan.ideal_center.x - b.shot_plan.ideal_center.x).abs()
                <= self.settings.max_center_diff_for_merge
                && (a.shot_plan.ideal_center.y - b.shot_plan.ideal_center.y).abs()
                    <= self.settings.max_center_diff_for_merge;

            if !(zoom_close && center_close) {
                i += 1;
                continue;
            }

            let absorbed = path.scenes.remove(i + 1);
            merge_into(&mut path.scenes[i], absorbed, true);
            cleanup_transitions(path);
        }
    }
}

/// Merge `absorbed` into `absorber`. When `absorber_is_left` the absorbed
/// scene follows the absorber in time, otherwise it precedes it.
fn merge_into(
    absorber: &mut SimulatedSceneSegment,
    absorbed: SimulatedSceneSegment,
    absorber_is_left: bool,
) {
    if absorber_is_left {
        absorber.scene.end_time = absorber.scene.end_time.max(absorbed.scene.end_time);
        append_samples(&mut absorber.samples, absorbed.samples);
    } else {
        absorber.scene.start_time = absorber.scene.start_time.min(absorbed.scene.start_time);
        let mut samples = absorbed.samples;
        append_samples(&mut samples, std::mem::take(&mut absorber.samples));
        absorber.samples = samples;
    }
    absorber.scene.focus_regions.extend(absorbed.scene.focus_regions);
    absorber.shot_plan.scene.start_time = absorber.scene.start_time;
    absorber.shot_plan.scene.end_time = absorber.scene.end_time;
}

/// Append samples keeping time order and dropping exact duplicates at the
/// seam.
fn append_samples(into: &mut Vec<TimedTransform>, mut tail: Vec<TimedTransform>) {
    if let (Some(last), Some(first)) = (into.last(), tail.first()) {
        if (last.time - first.time).abs() < 1e-9
            && last
                .transform
                .approx_eq(&first.transform, 1e-9, 1e-9)
        {
            tail.remove(0);
        }
    }
    into.extend(tail);
    into.sort_by(|a, b| {
        a.time
            .partial_cmp(&b.time)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Drop transitions that now live inside one merged scene and retarget the
/// ones that referenced a scene no longer present.
fn cleanup_transitions(path: &mut SimulatedPath) {
    let live_ids: Vec<uuid::Uuid> = path.scenes.iter().map(|s| s.scene.id).collect();

    // Retarget references to absorbed scenes onto the scene now covering
    // that interval.
    let scenes = path.scenes.clone();
    for transition in &mut path.transitions {
        if !live_ids.contains(&transition.from_scene.id) {
            if let Some(cover) = scenes.iter().find(|s| {
                s.scene.start_time <= transition.from_scene.start_time + 1e-9
                    && s.scene.end_time >= transition.from_scene.end_time - 1e-9
            }) {
                transition.from_scene = cover.scene.clone();
            }
        }
        if !live_ids.contains(&transition.to_scene.id) {
            if let Some(cover) = scenes.iter().find(|s| {
                s.scene.start_time <= transition.to_scene.start_time + 1e-9
                    && s.scene.end_time >= transition.to_scene.end_time - 1e-9
            }) {
                transition.to_scene = cover.scene.clone();
            }
        }
    }

    // A transition whose endpoints collapsed into the same scene is gone.
    path.transitions
        .retain(|t| t.from_scene.id != t.to_scene.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::UserIntent;
    use crate::scene::CameraScene;
    use crate::settings::{HoldSettings, MergeSettings, SmoothingSettings};
    use crate::shot::{ShotPlan, ShotType, ZoomSource};
    use crate::simulate::SimulatedTransitionSegment;
    use crate::transition::{TransitionPlan, TransitionStyle};
    use reframe_project_model::easing::Easing;
    use reframe_project_model::geometry::NormPoint;
    use reframe_project_model::track::TransformValue;
    use uuid::Uuid;

    fn scene(start: f64, end: f64) -> CameraScene {
        CameraScene {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            primary_intent: UserIntent::Reading,
            focus_regions: vec![],
            app_context: None,
        }
    }

    fn segment(start: f64, end: f64, zoom: f64, center: NormPoint) -> SimulatedSceneSegment {
        let scene = scene(start, end);
        SimulatedSceneSegment {
            shot_plan: ShotPlan {
                scene: scene.clone(),
                shot_type: ShotType::for_zoom(zoom),
                ideal_zoom: zoom,
                ideal_center: center,
                zoom_source: ZoomSource::IntentMidpoint,
                inherited: false,
            },
            samples: vec![
                TimedTransform::new(start, TransformValue::new(zoom, center)),
                TimedTransform::new(end, TransformValue::new(zoom, center)),
            ],
            scene,
        }
    }

    fn transition_between(
        a: &SimulatedSceneSegment,
        b: &SimulatedSceneSegment,
    ) -> SimulatedTransitionSegment {
        SimulatedTransitionSegment {
            from_scene: a.scene.clone(),
            to_scene: b.scene.clone(),
            plan: TransitionPlan {
                from_scene: a.scene.clone(),
                to_scene: b.scene.clone(),
                style: TransitionStyle::DirectPan { duration: 0.3 },
                easing: Easing::spring_critical(),
            },
            start_transform: a.end_transform(),
            end_transform: b.start_transform(),
        }
    }

    fn path_of(scenes: Vec<SimulatedSceneSegment>) -> SimulatedPath {
        let transitions = scenes
            .windows(2)
            .map(|pair| transition_between(&pair[0], &pair[1]))
            .collect();
        SimulatedPath { scenes, transitions }
    }

    #[test]
    fn test_smoother_disabled_is_identity() {
        let path = path_of(vec![segment(0.0, 2.0, 2.0, NormPoint::CENTER)]);
        let smoothed = PathSmoother::new(SmoothingSettings::default()).apply(path.clone());
        assert_eq!(smoothed, path);
    }

    #[test]
    fn test_smoother_snaps_small_jitter_keeps_anchors() {
        let mut seg = segment(0.0, 4.0, 2.0, NormPoint::new(0.5, 0.5));
        seg.samples = vec![
            TimedTransform::new(0.0, TransformValue::new(2.0, NormPoint::new(0.5, 0.5))),
            TimedTransform::new(1.0, TransformValue::new(2.0, NormPoint::new(0.508, 0.5))),
            TimedTransform::new(2.0, TransformValue::new(2.0, NormPoint::new(0.492, 0.5))),
            TimedTransform::new(3.0, TransformValue::new(2.0, NormPoint::new(0.505, 0.5))),
            TimedTransform::new(4.0, TransformValue::new(2.0, NormPoint::new(0.5, 0.5))),
        ];
        let path = SimulatedPath {
            scenes: vec![seg],
            transitions: vec![],
        };
        let smoothed = PathSmoother::new(SmoothingSettings {
            enabled: true,
            window_size: 5,
            max_deviation: 0.02,
        })
        .apply(path);

        let samples = &smoothed.scenes[0].samples;
        // Anchors untouched.
        assert_eq!(samples[0].transform.center, NormPoint::new(0.5, 0.5));
        assert_eq!(samples[4].transform.center, NormPoint::new(0.5, 0.5));
        // Interior jitter pulled toward the average.
        assert!((samples[1].transform.center.x - 0.5).abs() < 0.008);
    }

    #[test]
    fn test_smoother_preserves_intentional_motion() {
        let mut seg = segment(0.0, 4.0, 2.0, NormPoint::new(0.3, 0.5));
        seg.samples = vec![
            TimedTransform::new(0.0, TransformValue::new(2.0, NormPoint::new(0.3, 0.5))),
            TimedTransform::new(2.0, TransformValue::new(2.0, NormPoint::new(0.6, 0.5))),
            TimedTransform::new(4.0, TransformValue::new(2.0, NormPoint::new(0.3, 0.5))),
        ];
        let path = SimulatedPath {
            scenes: vec![seg],
            transitions: vec![],
        };
        let smoothed = PathSmoother::new(SmoothingSettings {
            enabled: true,
            window_size: 3,
            max_deviation: 0.02,
        })
        .apply(path);
        // Deviation 0.2 >= 0.02: the deliberate pan survives.
        assert!((smoothed.scenes[0].samples[1].transform.center.x - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_hold_enforcer_extends_and_shifts() {
        // Zoomed-in scene of 0.4s needs 0.8s; the follower shifts by 0.4.
        let path = path_of(vec![
            segment(0.0, 0.4, 2.0, NormPoint::CENTER),
            segment(0.4, 5.0, 1.0, NormPoint::CENTER),
        ]);
        let held = HoldEnforcer::new(HoldSettings::default()).apply(path, 10.0);

        assert!((held.scenes[0].scene.end_time - 0.8).abs() < 1e-9);
        assert!((held.scenes[1].scene.start_time - 0.8).abs() < 1e-9);
        assert!((held.scenes[1].scene.end_time - 5.4).abs() < 1e-9);
        // Samples rescaled to the new bounds.
        assert!((held.scenes[0].samples.last().unwrap().time - 0.8).abs() < 1e-9);
        assert!((held.scenes[1].samples.first().unwrap().time - 0.8).abs() < 1e-9);
        // Transition scene copies re-timed.
        assert!((held.transitions[0].from_scene.end_time - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_hold_enforcer_keeps_long_scenes() {
        let path = path_of(vec![segment(0.0, 5.0, 2.0, NormPoint::CENTER)]);
        let held = HoldEnforcer::new(HoldSettings::default()).apply(path.clone(), 5.0);
        assert_eq!(held.scenes[0].scene.end_time, 5.0);
    }

    #[test]
    fn test_hold_overflow_absorbed_by_final_scene() {
        // Two short zoomed scenes at the very end of a 1.2s recording.
        let path = path_of(vec![
            segment(0.0, 0.4, 2.0, NormPoint::CENTER),
            segment(0.4, 1.2, 2.0, NormPoint::CENTER),
        ]);
        let held = HoldEnforcer::new(HoldSettings::default()).apply(path, 1.2);
        let last_end = held.scenes.last().unwrap().scene.end_time;
        // The final scene kept at least its own minimum but pulled back
        // toward the recording duration.
        assert!(last_end >= 1.2 - 1e-9);
        assert!(
            last_end <= 0.8 + 0.8 + 1e-9,
            "unexpected overflow: {last_end}"
        );
    }

    #[test]
    fn test_refiner_guarantees_continuity_and_is_idempotent() {
        let mut path = path_of(vec![
            segment(0.0, 2.0, 2.0, NormPoint::new(0.3, 0.5)),
            segment(2.0, 4.0, 2.0, NormPoint::new(0.7, 0.5)),
        ]);
        // Corrupt the endpoints.
        path.transitions[0].start_transform = TransformValue::IDENTITY;
        path.transitions[0].end_transform = TransformValue::IDENTITY;

        let refined = TransitionRefiner::new().apply(path);
        let t = &refined.transitions[0];
        assert_eq!(t.start_transform, refined.scenes[0].end_transform());
        assert_eq!(t.end_transform, refined.scenes[1].start_transform());

        let again = TransitionRefiner::new().apply(refined.clone());
        assert_eq!(again, refined);
    }

    #[test]
    fn test_merger_absorbs_short_scene_into_longer_neighbor() {
        let path = path_of(vec![
            segment(0.0, 3.0, 2.0, NormPoint::new(0.3, 0.5)),
            segment(3.0, 3.2, 1.5, NormPoint::new(0.9, 0.5)),
            segment(3.2, 4.0, 2.0, NormPoint::new(0.7, 0.5)),
        ]);
        let merged = SegmentMerger::new(MergeSettings::default()).apply(path);

        assert_eq!(merged.scenes.len(), 2);
        // Left neighbor was longer: it absorbed the short scene.
        assert!((merged.scenes[0].scene.end_time - 3.2).abs() < 1e-9);
        // The transition between the absorbed pair is gone; one remains.
        assert_eq!(merged.transitions.len(), 1);
        assert_eq!(
            merged.transitions[0].from_scene.id,
            merged.scenes[0].scene.id
        );
    }

    #[test]
    fn test_merger_collapses_near_identical_framings() {
        let path = path_of(vec![
            segment(0.0, 2.0, 2.0, NormPoint::new(0.5, 0.5)),
            segment(2.0, 4.0, 2.1, NormPoint::new(0.54, 0.5)),
        ]);
        let merged = SegmentMerger::new(MergeSettings::default()).apply(path);
        assert_eq!(merged.scenes.len(), 1);
        assert!(merged.transitions.is_empty());
        assert!((merged.scenes[0].scene.end_time - 4.0).abs() < 1e-9);
        // Samples cover the merged interval without going backwards.
        let samples = &merged.scenes[0].samples;
        for pair in samples.windows(2) {
            assert!(pair[0].time <= pair[1].time + 1e-12);
        }
    }

    #[test]
    fn test_merger_keeps_distinct_framings_apart() {
        let path = path_of(vec![
            segment(0.0, 2.0, 1.2, NormPoint::new(0.3, 0.3)),
            segment(2.0, 4.0, 2.6, NormPoint::new(0.8, 0.8)),
        ]);
        let merged = SegmentMerger::new(MergeSettings::default()).apply(path);
        assert_eq!(merged.scenes.len(), 2);
        assert_eq!(merged.transitions.len(), 1);
    }
}
