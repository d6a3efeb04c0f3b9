//! Reframe Director Core — the Auto-Director
//!
//! Turns a recorded input-event stream into a time-aligned set of edit
//! tracks: a camera track (zoom + pan segments), a cursor-style track, and
//! a keystroke-overlay track. The pipeline is a linear sequence of pure
//! transformations:
//!
//! 1. **Drag inference** reclassifies down/move/up click pairs as drags
//! 2. **Event timeline** unifies the typed streams into one sorted stream
//! 3. **Intent classification** labels every instant of the recording
//! 4. **Scene segmentation** collapses spans into camera scenes
//! 5. **Shot planning** picks ideal zoom + center per scene
//! 6. **Transition planning** picks the style between adjacent scenes
//! 7. **Camera simulation** samples the follow/hold controllers per scene
//! 8. **Post-processing** smooths, enforces holds, refines, and merges
//! 9. **Emission** produces the camera/cursor/keystroke tracks
//!
//! This crate is pure computation — no I/O, no platform dependencies, no
//! clocks. Given identical input it produces identical output.

pub mod drag_infer;
pub mod emit;
pub mod intent;
pub mod keys;
pub mod post;
pub mod scene;
pub mod settings;
pub mod shot;
pub mod simulate;
pub mod timeline;
pub mod transition;

use reframe_project_model::event::RecordingInput;
use reframe_project_model::track::GeneratedTimeline;

use crate::emit::{
    apply_zoom_intensity, CameraTrackEmitter, CursorTrackEmitter, KeystrokeTrackEmitter,
    SegmentOptimizer,
};
use crate::intent::{attach_anchors, IntentClassifier};
use crate::post::{HoldEnforcer, PathSmoother, SegmentMerger, TransitionRefiner};
use crate::scene::SceneSegmenter;
use crate::settings::DirectorSettings;
use crate::shot::ShotPlanner;
use crate::simulate::CameraSimulator;
use crate::timeline::EventTimeline;
use crate::transition::TransitionPlanner;

pub use crate::settings::DirectorSettings as Settings;

/// The auto-director. Owns the configuration; [`Director::generate`] runs
/// the whole pipeline.
pub struct Director {
    settings: DirectorSettings,
}

impl Director {
    pub fn new(settings: DirectorSettings) -> Self {
        Self { settings }
    }

    pub fn with_defaults() -> Self {
        Self::new(DirectorSettings::default())
    }

    pub fn settings(&self) -> &DirectorSettings {
        &self.settings
    }

    /// Run the full pipeline. Total over valid inputs: every well-formed
    /// recording produces a timeline, degenerate recordings produce empty
    /// tracks.
    pub fn generate(&self, recording: &RecordingInput) -> GeneratedTimeline {
        let settings = &self.settings;
        let duration = recording.duration;
        if duration <= 0.0 {
            return GeneratedTimeline::empty();
        }

        let recording = drag_infer::augment_recording(recording);
        let timeline = EventTimeline::build(&recording);
        self.diag(|| tracing::debug!(events = timeline.events().len(), "timeline built"));

        let mut spans = IntentClassifier::new().classify(&timeline);
        attach_anchors(&mut spans, &timeline);
        self.diag(|| tracing::debug!(spans = spans.len(), "intents classified"));

        let scenes = SceneSegmenter::new().segment(&spans, &timeline);
        self.diag(|| tracing::debug!(scenes = scenes.len(), "scenes segmented"));

        let shot_plans =
            ShotPlanner::new(settings.shot.clone()).plan(&scenes, &timeline, recording.screen_bounds);
        let transition_plans = TransitionPlanner::new(settings.transition.clone()).plan(&shot_plans);
        self.diag(|| {
            tracing::debug!(
                shots = shot_plans.len(),
                transitions = transition_plans.len(),
                "shots and transitions planned"
            )
        });

        let mut path = CameraSimulator::new(settings.simulation.clone()).simulate(
            &shot_plans,
            &transition_plans,
            &timeline,
        );

        path = PathSmoother::new(settings.post.smoothing.clone()).apply(path);
        path = HoldEnforcer::new(settings.post.hold.clone()).apply(path, duration);
        if settings.post.refine_transitions {
            path = TransitionRefiner::new().apply(path);
        }
        path = SegmentMerger::new(settings.post.merge.clone()).apply(path);
        self.diag(|| {
            tracing::debug!(
                scene_segments = path.scenes.len(),
                transition_segments = path.transitions.len(),
                "path post-processed"
            )
        });

        let camera = CameraTrackEmitter::new(settings.transition.clone()).emit(&path, duration);
        let camera = SegmentOptimizer::new(settings.post.optimize.clone()).optimize(camera);
        let camera = apply_zoom_intensity(camera, settings.zoom_intensity);
        self.diag(|| tracing::debug!(segments = camera.segments.len(), "camera track emitted"));

        GeneratedTimeline {
            camera,
            cursor: CursorTrackEmitter::new(settings.cursor.clone()).emit(duration),
            keystrokes: KeystrokeTrackEmitter::new(settings.keystrokes.clone())
                .emit(&timeline, duration),
        }
    }

    fn diag(&self, record: impl FnOnce()) {
        if self.settings.diagnostics {
            record();
        }
    }
}

/// Run the pipeline with the given settings.
pub fn generate(recording: &RecordingInput, settings: &DirectorSettings) -> GeneratedTimeline {
    Director::new(settings.clone()).generate(recording)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_project_model::geometry::ScreenBounds;

    #[test]
    fn test_zero_duration_recording_yields_empty_tracks() {
        let recording = RecordingInput::empty(0.0, ScreenBounds::new(1920.0, 1080.0, 1.0));
        let timeline = Director::with_defaults().generate(&recording);
        assert!(timeline.camera.is_empty());
        assert!(timeline.cursor.segments.is_empty());
        assert!(timeline.keystrokes.segments.is_empty());
    }

    #[test]
    fn test_empty_recording_still_produces_cursor_track() {
        let recording = RecordingInput::empty(10.0, ScreenBounds::new(1920.0, 1080.0, 1.0));
        let timeline = Director::with_defaults().generate(&recording);
        assert_eq!(timeline.cursor.segments.len(), 1);
        assert!(!timeline.camera.is_empty());
        assert!(timeline.keystrokes.segments.is_empty());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut recording = RecordingInput::empty(10.0, ScreenBounds::new(1920.0, 1080.0, 1.0));
        recording.mouse_moves = (0..40)
            .map(|i| reframe_project_model::event::MouseMoveSample {
                time: i as f64 * 0.25,
                position: reframe_project_model::geometry::NormPoint::new(
                    0.2 + 0.01 * (i % 7) as f64,
                    0.6 - 0.01 * (i % 5) as f64,
                ),
                app_bundle_id: None,
                element: None,
            })
            .collect();
        recording.clicks = vec![reframe_project_model::event::ClickEvent {
            time: 4.0,
            position: reframe_project_model::geometry::NormPoint::new(0.25, 0.55),
            click_type: reframe_project_model::event::ClickType::LeftDown,
            app_bundle_id: None,
            element: None,
        }];

        let director = Director::with_defaults();
        let a = director.generate(&recording);
        let b = director.generate(&recording);
        assert_eq!(a.camera.segments, b.camera.segments);
        assert_eq!(a.keystrokes, b.keystrokes);
    }
}
