//! Transition planning.
//!
//! Picks how the camera travels between adjacent scenes: short spring pans
//! for nearby framings, a zoom-out-and-in for long hauls, and a hard cut
//! when the user switches applications.

use reframe_project_model::easing::Easing;
use reframe_project_model::geometry::half_viewport;

use crate::intent::UserIntent;
use crate::scene::CameraScene;
use crate::settings::TransitionSettings;
use crate::shot::ShotPlan;

/// Nominal extent of a cut segment on the emitted track.
pub const CUT_DURATION_SECS: f64 = 0.01;

/// How the camera moves between two scenes.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionStyle {
    DirectPan { duration: f64 },
    ZoomOutAndIn { out_duration: f64, in_duration: f64 },
    Cut,
}

impl TransitionStyle {
    /// Total wall time the transition wants on the track.
    pub fn total_duration(&self) -> f64 {
        match self {
            Self::DirectPan { duration } => *duration,
            Self::ZoomOutAndIn {
                out_duration,
                in_duration,
            } => out_duration + in_duration,
            Self::Cut => CUT_DURATION_SECS,
        }
    }
}

/// A planned transition between two adjacent scenes.
///
/// Scenes are stored by value so the plan graph stays a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub from_scene: CameraScene,
    pub to_scene: CameraScene,
    pub style: TransitionStyle,
    pub easing: Easing,
}

/// The transition planner.
pub struct TransitionPlanner {
    settings: TransitionSettings,
}

impl TransitionPlanner {
    pub fn new(settings: TransitionSettings) -> Self {
        Self { settings }
    }

    /// One transition per adjacent shot-plan pair, in order.
    pub fn plan(&self, shot_plans: &[ShotPlan]) -> Vec<TransitionPlan> {
        shot_plans
            .windows(2)
            .map(|pair| self.plan_pair(&pair[0], &pair[1]))
            .collect()
    }

    fn plan_pair(&self, from: &ShotPlan, to: &ShotPlan) -> TransitionPlan {
        let settings = &self.settings;

        // Crossing an app boundary reads better as a cut than a swoop.
        if to.scene.primary_intent == UserIntent::Switching
            || from.scene.app_context != to.scene.app_context
        {
            return TransitionPlan {
                from_scene: from.scene.clone(),
                to_scene: to.scene.clone(),
                style: TransitionStyle::Cut,
                easing: Easing::Linear,
            };
        }

        let distance = from.ideal_center.distance_to(&to.ideal_center);
        let reference = half_viewport(from.ideal_zoom.min(to.ideal_zoom));
        let vdist = distance / reference.max(1e-6);

        let (style, easing) = if vdist < settings.direct_pan_threshold {
            (
                TransitionStyle::DirectPan {
                    duration: settings
                        .short_pan_duration
                        .at(vdist / settings.direct_pan_threshold),
                },
                settings.short_pan_easing.clone(),
            )
        } else if vdist < settings.gentle_pan_threshold {
            let t = (vdist - settings.direct_pan_threshold)
                / (settings.gentle_pan_threshold - settings.direct_pan_threshold);
            (
                TransitionStyle::DirectPan {
                    duration: settings.medium_pan_duration.at(t),
                },
                settings.medium_pan_easing.clone(),
            )
        } else {
            // Deeper travel earns a longer out/in arc, saturating at the
            // full-zoom-out threshold.
            let depth = (vdist / settings.full_zoom_out_threshold).min(1.0);
            let scale = 0.6 + 0.4 * depth;
            (
                TransitionStyle::ZoomOutAndIn {
                    out_duration: settings.zoom_out_duration * scale,
                    in_duration: settings.zoom_in_duration * scale,
                },
                settings.zoom_in_easing.clone(),
            )
        };

        TransitionPlan {
            from_scene: from.scene.clone(),
            to_scene: to.scene.clone(),
            style,
            easing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shot::{ShotType, ZoomSource};
    use reframe_project_model::geometry::NormPoint;
    use uuid::Uuid;

    fn scene(start: f64, end: f64, intent: UserIntent, app: Option<&str>) -> CameraScene {
        CameraScene {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            primary_intent: intent,
            focus_regions: vec![],
            app_context: app.map(str::to_string),
        }
    }

    fn plan_at(zoom: f64, x: f64, y: f64, scene: CameraScene) -> ShotPlan {
        ShotPlan {
            scene,
            shot_type: ShotType::for_zoom(zoom),
            ideal_zoom: zoom,
            ideal_center: NormPoint::new(x, y),
            zoom_source: ZoomSource::SingleEvent,
            inherited: false,
        }
    }

    fn planner() -> TransitionPlanner {
        TransitionPlanner::new(TransitionSettings::default())
    }

    #[test]
    fn test_nearby_centers_get_short_direct_pan() {
        let a = plan_at(2.0, 0.45, 0.5, scene(0.0, 2.0, UserIntent::Clicking, None));
        let b = plan_at(2.0, 0.5, 0.5, scene(2.0, 4.0, UserIntent::Clicking, None));
        let plans = planner().plan(&[a, b]);
        assert_eq!(plans.len(), 1);
        // vdist = 0.05 / 0.25 = 0.2 < 0.6.
        match &plans[0].style {
            TransitionStyle::DirectPan { duration } => {
                assert!(*duration < 0.45);
            }
            other => panic!("expected direct pan, got {other:?}"),
        }
        assert!(plans[0].easing.is_spring());
    }

    #[test]
    fn test_medium_distance_gets_gentle_pan() {
        // vdist = 0.25 / 0.25 = 1.0, between the two pan thresholds.
        let a = plan_at(2.0, 0.3, 0.5, scene(0.0, 2.0, UserIntent::Clicking, None));
        let b = plan_at(2.0, 0.55, 0.5, scene(2.0, 4.0, UserIntent::Clicking, None));
        let plans = planner().plan(&[a, b]);
        match &plans[0].style {
            TransitionStyle::DirectPan { duration } => {
                assert!(*duration >= 0.45);
            }
            other => panic!("expected gentle pan, got {other:?}"),
        }
    }

    #[test]
    fn test_long_travel_zooms_out_and_in() {
        // vdist = 0.6 / 0.25 = 2.4 > 1.2.
        let a = plan_at(2.0, 0.2, 0.5, scene(0.0, 2.0, UserIntent::Clicking, None));
        let b = plan_at(2.0, 0.8, 0.5, scene(2.0, 4.0, UserIntent::Clicking, None));
        let plans = planner().plan(&[a, b]);
        match &plans[0].style {
            TransitionStyle::ZoomOutAndIn {
                out_duration,
                in_duration,
            } => {
                assert!(*out_duration > 0.0 && *in_duration > 0.0);
                // Deeper travel means longer arcs than the shallow case.
                assert!(*out_duration > TransitionSettings::default().zoom_out_duration * 0.6);
            }
            other => panic!("expected zoom out and in, got {other:?}"),
        }
    }

    #[test]
    fn test_app_change_cuts() {
        let a = plan_at(
            2.0,
            0.5,
            0.5,
            scene(0.0, 2.0, UserIntent::Clicking, Some("com.apple.Safari")),
        );
        let b = plan_at(
            2.0,
            0.5,
            0.5,
            scene(2.0, 4.0, UserIntent::Clicking, Some("com.apple.Terminal")),
        );
        let plans = planner().plan(&[a, b]);
        assert_eq!(plans[0].style, TransitionStyle::Cut);
        assert_eq!(plans[0].easing, Easing::Linear);
    }

    #[test]
    fn test_switching_scene_cuts() {
        let a = plan_at(2.0, 0.3, 0.5, scene(0.0, 2.0, UserIntent::Clicking, None));
        let b = plan_at(1.0, 0.5, 0.5, scene(2.0, 4.0, UserIntent::Switching, None));
        let plans = planner().plan(&[a, b]);
        assert_eq!(plans[0].style, TransitionStyle::Cut);
    }

    #[test]
    fn test_total_duration_accounting() {
        assert!((TransitionStyle::Cut.total_duration() - CUT_DURATION_SECS).abs() < 1e-12);
        assert!(
            (TransitionStyle::DirectPan { duration: 0.4 }.total_duration() - 0.4).abs() < 1e-12
        );
        assert!(
            (TransitionStyle::ZoomOutAndIn {
                out_duration: 0.5,
                in_duration: 0.6
            }
            .total_duration()
                - 1.1)
                .abs()
                < 1e-12
        );
    }
}
