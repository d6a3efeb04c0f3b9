//! Camera simulation.
//!
//! Produces the time-sampled camera path for every scene. A controller is
//! picked per scene from its intent: active input (typing, dragging) gets
//! the cursor-follow controller, everything else a static hold that only
//! re-frames when events escape the viewport. Zoom is held constant per
//! scene; only the center moves.

use reframe_project_model::geometry::{
    clamp_center_for_rect, clamp_center_to_screen, half_viewport, NormPoint, NormRect,
};
use reframe_project_model::track::{TimedTransform, TransformValue};

use crate::intent::UserIntent;
use crate::scene::CameraScene;
use crate::settings::SimulationSettings;
use crate::shot::ShotPlan;
use crate::timeline::{EventTimeline, UnifiedEvent, UnifiedEventKind};
use crate::transition::TransitionPlan;

/// The sampled camera path for one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSceneSegment {
    pub scene: CameraScene,
    pub shot_plan: ShotPlan,
    /// Sorted samples; first is pinned to the scene start, last to its end.
    pub samples: Vec<TimedTransform>,
}

impl SimulatedSceneSegment {
    pub fn start_transform(&self) -> TransformValue {
        self.samples.first().expect("samples non-empty").transform
    }

    pub fn end_transform(&self) -> TransformValue {
        self.samples.last().expect("samples non-empty").transform
    }
}

/// A transition's endpoint snapshot between two simulated scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTransitionSegment {
    pub from_scene: CameraScene,
    pub to_scene: CameraScene,
    pub plan: TransitionPlan,
    pub start_transform: TransformValue,
    pub end_transform: TransformValue,
}

/// The full simulated camera path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulatedPath {
    pub scenes: Vec<SimulatedSceneSegment>,
    pub transitions: Vec<SimulatedTransitionSegment>,
}

/// Per-controller pan tuning.
#[derive(Debug, Clone, Copy)]
struct ControllerTuning {
    /// How far outside the viewport an event must land to trigger a pan.
    viewport_margin: f64,
    /// Minimum wall time after the previous pan ends before the next starts.
    min_pan_interval: f64,
    /// Fraction of the corrective move actually applied per pan.
    correction_fraction: f64,
    /// Pan duration per unit of travel, with clamping bounds.
    pan_speed: f64,
    pan_duration_min: f64,
    pan_duration_max: f64,
    /// Velocity projection horizon for predictive panning.
    look_ahead: Option<f64>,
}

/// Camera controllers, dispatched by scene intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraController {
    /// Holds framing; re-centers only on clear viewport escapes.
    StaticHold,
    /// Tracks the cursor/caret aggressively with predictive look-ahead.
    CursorFollow,
}

impl CameraController {
    /// Pick the controller for a scene intent.
    pub fn for_intent(intent: UserIntent) -> Self {
        match intent {
            UserIntent::Typing(_) | UserIntent::Dragging => Self::CursorFollow,
            _ => Self::StaticHold,
        }
    }

    fn tuning(self) -> ControllerTuning {
        match self {
            Self::StaticHold => ControllerTuning {
                viewport_margin: 0.15,
                min_pan_interval: 0.3,
                correction_fraction: 0.4,
                pan_speed: 1.0,
                pan_duration_min: 0.2,
                pan_duration_max: 0.5,
                look_ahead: None,
            },
            Self::CursorFollow => ControllerTuning {
                viewport_margin: 0.05,
                min_pan_interval: 0.15,
                correction_fraction: 0.6,
                pan_speed: 1.2,
                pan_duration_min: 0.1,
                pan_duration_max: 0.4,
                look_ahead: Some(0.2),
            },
        }
    }

    /// Produce the sample list for one scene. The first sample sits at the
    /// scene start with the planned framing; the last at the scene end.
    pub fn simulate(
        self,
        scene: &CameraScene,
        plan: &ShotPlan,
        timeline: &EventTimeline,
        settings: &SimulationSettings,
    ) -> Vec<TimedTransform> {
        let zoom = plan.ideal_zoom;
        let mut center = plan.ideal_center;
        let mut samples = vec![TimedTransform::new(
            scene.start_time,
            TransformValue::new(zoom, center),
        )];

        if zoom > settings.min_zoom && !timeline.is_empty() {
            let tuning = self.tuning();
            let is_typing = matches!(scene.primary_intent, UserIntent::Typing(_));
            let mut last_pan_end = scene.start_time;
            let mut tracked: Option<(f64, NormPoint)> = None;

            for event in timeline.events_in(scene.start_time, scene.end_time) {
                // Typing scenes pan only on pointer evidence; caret and
                // keyboard events would ping-pong the camera between the
                // caret and the resting mouse.
                if is_typing
                    && !matches!(
                        event.kind,
                        UnifiedEventKind::MouseMove | UnifiedEventKind::Click(_)
                    )
                {
                    continue;
                }
                if !event.kind.is_pointer_positioned() {
                    continue;
                }

                let check_position = projected_position(event, tracked, tuning.look_ahead);
                let escape = viewport_escape(check_position, center, zoom);
                if escape >= tuning.viewport_margin
                    && event.time - last_pan_end >= tuning.min_pan_interval
                {
                    let included = minimal_including_center(event.position, center, zoom);
                    let target = clamp_center_to_screen(
                        NormPoint::lerp(&center, &included, tuning.correction_fraction),
                        zoom,
                    );

                    let travel = center.distance_to(&target);
                    let pan_duration = (travel * tuning.pan_speed)
                        .clamp(tuning.pan_duration_min, tuning.pan_duration_max);
                    let pan_start = event.time;
                    let pan_end = (pan_start + pan_duration).min(scene.end_time);

                    samples.push(TimedTransform::new(
                        pan_start,
                        TransformValue::new(zoom, center),
                    ));
                    samples.push(TimedTransform::new(
                        pan_end,
                        TransformValue::new(zoom, target),
                    ));
                    center = target;
                    last_pan_end = pan_end;
                }

                tracked = Some((event.time, event.position));
            }

            samples.sort_by(|a, b| {
                a.time
                    .partial_cmp(&b.time)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let needs_terminal = samples
            .last()
            .map(|s| s.time < scene.end_time - 1e-9)
            .unwrap_or(true);
        if needs_terminal {
            samples.push(TimedTransform::new(
                scene.end_time,
                TransformValue::new(zoom, center),
            ));
        } else if let Some(last) = samples.last_mut() {
            last.time = scene.end_time;
        }

        // Degenerate scenes still expose a start and an end sample.
        if samples.len() < 2 {
            let only = samples[0];
            samples.push(TimedTransform::new(scene.end_time, only.transform));
        }

        samples
    }
}

/// Project an event position ahead along its recent velocity.
fn projected_position(
    event: &UnifiedEvent,
    tracked: Option<(f64, NormPoint)>,
    look_ahead: Option<f64>,
) -> NormPoint {
    let (Some(horizon), Some((prev_time, prev_pos))) = (look_ahead, tracked) else {
        return event.position;
    };
    let dt = event.time - prev_time;
    if dt <= 1e-6 {
        return event.position;
    }
    let vx = (event.position.x - prev_pos.x) / dt;
    let vy = (event.position.y - prev_pos.y) / dt;
    NormPoint::new(
        event.position.x + vx * horizon,
        event.position.y + vy * horizon,
    )
    .clamped()
}

/// How far outside the viewport a point sits (0 when inside).
fn viewport_escape(position: NormPoint, center: NormPoint, zoom: f64) -> f64 {
    let h = half_viewport(zoom);
    let dx = (position.x - center.x).abs() - h;
    let dy = (position.y - center.y).abs() - h;
    dx.max(dy).max(0.0)
}

/// The closest center to `current` whose viewport contains `position`.
fn minimal_including_center(position: NormPoint, current: NormPoint, zoom: f64) -> NormPoint {
    let point_rect = NormRect::new(position.x, position.y, 0.0, 0.0);
    clamp_center_for_rect(current, &point_rect, zoom)
}

/// The camera simulator.
pub struct CameraSimulator {
    settings: SimulationSettings,
}

impl CameraSimulator {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings }
    }

    /// Simulate every scene and snapshot transition endpoints.
    pub fn simulate(
        &self,
        shot_plans: &[ShotPlan],
        transition_plans: &[TransitionPlan],
        timeline: &EventTimeline,
    ) -> SimulatedPath {
        let scenes: Vec<SimulatedSceneSegment> = shot_plans
            .iter()
            .map(|plan| {
                let controller = CameraController::for_intent(plan.scene.primary_intent);
                let samples =
                    controller.simulate(&plan.scene, plan, timeline, &self.settings);
                SimulatedSceneSegment {
                    scene: plan.scene.clone(),
                    shot_plan: plan.clone(),
                    samples,
                }
            })
            .collect();

        let transitions = transition_plans
            .iter()
            .filter_map(|plan| {
                let from = scenes.iter().find(|s| s.scene.id == plan.from_scene.id)?;
                let to = scenes.iter().find(|s| s.scene.id == plan.to_scene.id)?;
                Some(SimulatedTransitionSegment {
                    from_scene: plan.from_scene.clone(),
                    to_scene: plan.to_scene.clone(),
                    plan: plan.clone(),
                    start_transform: from.end_transform(),
                    end_transform: to.start_transform(),
                })
            })
            .collect();

        SimulatedPath {
            scenes,
            transitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shot::{ShotType, ZoomSource};
    use reframe_project_model::event::{MouseMoveSample, RecordingInput};
    use reframe_project_model::geometry::ScreenBounds;
    use uuid::Uuid;

    fn scene(start: f64, end: f64, intent: UserIntent) -> CameraScene {
        CameraScene {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            primary_intent: intent,
            focus_regions: vec![],
            app_context: None,
        }
    }

    fn plan_for(scene: &CameraScene, zoom: f64, center: NormPoint) -> ShotPlan {
        ShotPlan {
            scene: scene.clone(),
            shot_type: ShotType::for_zoom(zoom),
            ideal_zoom: zoom,
            ideal_center: center,
            zoom_source: ZoomSource::SingleEvent,
            inherited: false,
        }
    }

    fn timeline_with_moves(duration: f64, moves: &[(f64, f64, f64)]) -> EventTimeline {
        let mut rec = RecordingInput::empty(duration, ScreenBounds::new(1920.0, 1080.0, 1.0));
        rec.mouse_moves = moves
            .iter()
            .map(|&(t, x, y)| MouseMoveSample {
                time: t,
                position: NormPoint::new(x, y),
                app_bundle_id: None,
                element: None,
            })
            .collect();
        EventTimeline::build(&rec)
    }

    fn assert_sample_invariants(samples: &[TimedTransform], scene: &CameraScene) {
        assert!(samples.len() >= 2);
        assert!((samples.first().unwrap().time - scene.start_time).abs() < 1e-9);
        assert!((samples.last().unwrap().time - scene.end_time).abs() < 1e-9);
        for pair in samples.windows(2) {
            assert!(pair[0].time <= pair[1].time + 1e-12);
        }
        // Zoom never changes inside a scene.
        let zoom = samples[0].transform.zoom;
        for s in samples {
            assert!((s.transform.zoom - zoom).abs() < 1e-12);
        }
    }

    #[test]
    fn test_controller_dispatch() {
        assert_eq!(
            CameraController::for_intent(UserIntent::Typing(
                crate::intent::TypingContext::CodeEditor
            )),
            CameraController::CursorFollow
        );
        assert_eq!(
            CameraController::for_intent(UserIntent::Dragging),
            CameraController::CursorFollow
        );
        assert_eq!(
            CameraController::for_intent(UserIntent::Reading),
            CameraController::StaticHold
        );
        assert_eq!(
            CameraController::for_intent(UserIntent::Idle),
            CameraController::StaticHold
        );
    }

    #[test]
    fn test_unzoomed_scene_emits_only_endpoints() {
        let scene = scene(0.0, 5.0, UserIntent::Idle);
        let plan = plan_for(&scene, 1.0, NormPoint::CENTER);
        let timeline = timeline_with_moves(5.0, &[(1.0, 0.9, 0.9), (2.0, 0.1, 0.1)]);
        let samples =
            CameraController::StaticHold.simulate(&scene, &plan, &timeline, &SimulationSettings::default());
        assert_eq!(samples.len(), 2);
        assert_sample_invariants(&samples, &scene);
    }

    #[test]
    fn test_static_hold_ignores_in_viewport_motion() {
        let scene = scene(0.0, 5.0, UserIntent::Reading);
        let plan = plan_for(&scene, 2.0, NormPoint::CENTER);
        // All motion comfortably inside the 0.5-wide viewport.
        let timeline = timeline_with_moves(
            5.0,
            &[(1.0, 0.45, 0.5), (2.0, 0.55, 0.5), (3.0, 0.5, 0.45)],
        );
        let samples = CameraController::StaticHold.simulate(
            &scene,
            &plan,
            &timeline,
            &SimulationSettings::default(),
        );
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].transform.center, NormPoint::CENTER);
        assert_eq!(samples[1].transform.center, NormPoint::CENTER);
    }

    #[test]
    fn test_static_hold_pans_on_viewport_escape() {
        let scene = scene(0.0, 6.0, UserIntent::Reading);
        let plan = plan_for(&scene, 2.0, NormPoint::new(0.3, 0.5));
        // Event far outside the viewport (escape > 0.15 margin).
        let timeline = timeline_with_moves(6.0, &[(2.0, 0.95, 0.5)]);
        let samples = CameraController::StaticHold.simulate(
            &scene,
            &plan,
            &timeline,
            &SimulationSettings::default(),
        );
        assert_sample_invariants(&samples, &scene);
        assert!(samples.len() >= 4, "expected a pan, got {samples:?}");
        // The camera moved toward the event but only by the correction
        // fraction of the needed travel.
        let end_center = samples.last().unwrap().transform.center;
        assert!(end_center.x > 0.3);
        assert!(end_center.x < 0.95);
    }

    #[test]
    fn test_pan_rate_limited_by_min_interval() {
        let scene = scene(0.0, 10.0, UserIntent::Reading);
        let plan = plan_for(&scene, 2.5, NormPoint::new(0.25, 0.5));
        // A burst of escape events 0.05s apart: only some may pan.
        let moves: Vec<(f64, f64, f64)> = (0..10)
            .map(|i| (1.0 + i as f64 * 0.05, 0.9, 0.5))
            .collect();
        let timeline = timeline_with_moves(10.0, &moves);
        let samples = CameraController::StaticHold.simulate(
            &scene,
            &plan,
            &timeline,
            &SimulationSettings::default(),
        );
        // 10 escapes but pans gated at >= 0.3s apart: at most 2 pans in
        // the 0.45s burst (at 1.0 and none before 1.0+0.2+0.3=1.5).
        let pan_count = (samples.len() - 2) / 2;
        assert!(pan_count <= 2, "too many pans: {samples:?}");
        assert_sample_invariants(&samples, &scene);
    }

    #[test]
    fn test_cursor_follow_is_more_aggressive_than_static_hold() {
        let base_scene = scene(0.0, 8.0, UserIntent::Dragging);
        let plan = plan_for(&base_scene, 2.0, NormPoint::new(0.3, 0.5));
        let moves: Vec<(f64, f64, f64)> = (0..20)
            .map(|i| (0.5 + i as f64 * 0.2, 0.62 + i as f64 * 0.018, 0.5))
            .collect();
        let timeline = timeline_with_moves(8.0, &moves);

        let follow = CameraController::CursorFollow.simulate(
            &base_scene,
            &plan,
            &timeline,
            &SimulationSettings::default(),
        );
        let hold = CameraController::StaticHold.simulate(
            &base_scene,
            &plan,
            &timeline,
            &SimulationSettings::default(),
        );
        assert!(follow.len() >= hold.len());
        assert_sample_invariants(&follow, &base_scene);
        assert_sample_invariants(&hold, &base_scene);
    }

    #[test]
    fn test_typing_scene_ignores_ui_state_pan_triggers() {
        let mut rec = RecordingInput::empty(6.0, ScreenBounds::new(1920.0, 1080.0, 1.0));
        rec.ui_samples = vec![
            reframe_project_model::event::UiStateSample {
                time: 1.0,
                cursor_position: NormPoint::new(0.95, 0.95),
                element: None,
                caret_bounds: None,
            },
            reframe_project_model::event::UiStateSample {
                time: 2.0,
                cursor_position: NormPoint::new(0.05, 0.05),
                element: None,
                caret_bounds: None,
            },
        ];
        let timeline = EventTimeline::build(&rec);
        let scene = scene(0.0, 6.0, UserIntent::Typing(crate::intent::TypingContext::TextField));
        let plan = plan_for(&scene, 2.2, NormPoint::CENTER);
        let samples = CameraController::CursorFollow.simulate(
            &scene,
            &plan,
            &timeline,
            &SimulationSettings::default(),
        );
        // UI-state escapes must not move the camera in typing scenes.
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_transition_endpoints_snapshot_neighbor_samples() {
        let scene_a = scene(0.0, 3.0, UserIntent::Clicking);
        let scene_b = scene(3.0, 6.0, UserIntent::Clicking);
        let plan_a = plan_for(&scene_a, 2.0, NormPoint::new(0.3, 0.5));
        let plan_b = plan_for(&scene_b, 2.0, NormPoint::new(0.7, 0.5));
        let timeline = timeline_with_moves(6.0, &[]);

        let transition = TransitionPlan {
            from_scene: scene_a.clone(),
            to_scene: scene_b.clone(),
            style: crate::transition::TransitionStyle::DirectPan { duration: 0.4 },
            easing: reframe_project_model::easing::Easing::spring_critical(),
        };

        let path = CameraSimulator::new(SimulationSettings::default()).simulate(
            &[plan_a, plan_b],
            &[transition],
            &timeline,
        );
        assert_eq!(path.scenes.len(), 2);
        assert_eq!(path.transitions.len(), 1);
        let t = &path.transitions[0];
        assert_eq!(t.start_transform, path.scenes[0].end_transform());
        assert_eq!(t.end_transform, path.scenes[1].start_transform());
    }
}
