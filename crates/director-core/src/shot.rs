//! Shot planning.
//!
//! Chooses the ideal zoom level and view center for every scene. Sources
//! are tried in priority order: a concrete UI element frame, the bounding
//! box of scene activity, a single event position, and finally the screen
//! midpoint at the intent's nominal zoom.

use reframe_project_model::geometry::{
    clamp_center_for_rect, clamp_center_to_screen, NormPoint, NormRect, ScreenBounds,
};

use crate::intent::{TypingContext, UserIntent};
use crate::scene::CameraScene;
use crate::settings::{ShotSettings, ZoomRange};
use crate::timeline::{EventTimeline, UnifiedEvent};

/// Idle scenes at most this long inherit framing from their neighbors.
const SHORT_IDLE_SECS: f64 = 3.0;

/// Zoom at or above which a shot counts as a close-up.
const CLOSE_UP_ZOOM: f64 = 2.0;

/// Zoom at or above which a shot counts as a medium shot.
const MEDIUM_ZOOM: f64 = 1.4;

/// Zoom above which a shot counts as wide rather than establishing.
const WIDE_ZOOM: f64 = 1.05;

/// Framing classification derived from the chosen zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotType {
    CloseUp(f64),
    Medium(f64),
    Wide(f64),
    Establishing,
}

impl ShotType {
    pub fn for_zoom(zoom: f64) -> Self {
        if zoom >= CLOSE_UP_ZOOM {
            Self::CloseUp(zoom)
        } else if zoom >= MEDIUM_ZOOM {
            Self::Medium(zoom)
        } else if zoom > WIDE_ZOOM {
            Self::Wide(zoom)
        } else {
            Self::Establishing
        }
    }
}

/// Where the ideal center/zoom came from (diagnostic provenance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomSource {
    Element,
    ActivityBBox,
    SingleEvent,
    IntentMidpoint,
}

/// The ideal framing for one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotPlan {
    pub scene: CameraScene,
    pub shot_type: ShotType,
    pub ideal_zoom: f64,
    pub ideal_center: NormPoint,
    pub zoom_source: ZoomSource,
    /// True when the framing was inherited from neighboring scenes.
    pub inherited: bool,
}

/// The shot planner.
pub struct ShotPlanner {
    settings: ShotSettings,
}

impl ShotPlanner {
    pub fn new(settings: ShotSettings) -> Self {
        Self { settings }
    }

    /// Produce one shot plan per scene, in scene order.
    pub fn plan(
        &self,
        scenes: &[CameraScene],
        timeline: &EventTimeline,
        screen: ScreenBounds,
    ) -> Vec<ShotPlan> {
        let mut plans: Vec<ShotPlan> = scenes
            .iter()
            .map(|scene| self.plan_scene(scene, timeline, screen))
            .collect();
        self.inherit_idle_framing(&mut plans);
        plans
    }

    fn plan_scene(
        &self,
        scene: &CameraScene,
        timeline: &EventTimeline,
        screen: ScreenBounds,
    ) -> ShotPlan {
        let events = timeline.events_in(scene.start_time, scene.end_time);
        let nominal = self.zoom_range_for(scene.primary_intent).nominal();

        // Idle and switching scenes have no activity worth framing; they
        // hold the establishing shot (or inherit from neighbors below).
        let frames_activity = !matches!(
            scene.primary_intent,
            UserIntent::Idle | UserIntent::Switching
        );

        if frames_activity {
            if let Some(plan) = self.plan_from_element(scene, events, screen) {
                return plan;
            }
            if let Some(plan) = self.plan_from_activity(scene, events, screen) {
                return plan;
            }
            if let Some(plan) = self.plan_from_single_event(scene, events, nominal) {
                return plan;
            }
        }

        let zoom = nominal.clamp(self.settings.min_zoom, self.settings.max_zoom);
        ShotPlan {
            scene: scene.clone(),
            shot_type: ShotType::for_zoom(zoom),
            ideal_zoom: zoom,
            ideal_center: clamp_center_to_screen(NormPoint::CENTER, zoom),
            zoom_source: ZoomSource::IntentMidpoint,
            inherited: false,
        }
    }

    /// Frame the dominant UI element of the scene, when one exists.
    fn plan_from_element(
        &self,
        scene: &CameraScene,
        events: &[UnifiedEvent],
        screen: ScreenBounds,
    ) -> Option<ShotPlan> {
        let rect = dominant_element_rect(events, screen)?;
        let padded = rect.padded(self.settings.work_area_padding);
        let zoom = self.coverage_zoom(&padded);
        let center = clamp_center_for_rect(padded.center(), &padded, zoom);
        Some(ShotPlan {
            scene: scene.clone(),
            shot_type: ShotType::for_zoom(zoom),
            ideal_zoom: zoom,
            ideal_center: center,
            zoom_source: ZoomSource::Element,
            inherited: false,
        })
    }

    /// Frame the bounding box of scene activity.
    fn plan_from_activity(
        &self,
        scene: &CameraScene,
        events: &[UnifiedEvent],
        screen: ScreenBounds,
    ) -> Option<ShotPlan> {
        let positions: Vec<NormPoint> = events
            .iter()
            .filter(|e| e.kind.is_pointer_positioned())
            .map(|e| e.position)
            .collect();
        if positions.len() < 2 {
            return None;
        }

        let bbox = NormRect::bounding(&positions)?;
        let padded = bbox.padded(self.settings.work_area_padding);
        let zoom = self.coverage_zoom(&padded);

        // Typing scenes center on the caret when the recording sampled one;
        // the activity bbox still has to stay inside the viewport.
        let desired = if matches!(scene.primary_intent, UserIntent::Typing(_)) {
            caret_center(events, screen).unwrap_or_else(|| padded.center())
        } else {
            padded.center()
        };
        let center = clamp_center_for_rect(desired, &padded, zoom);

        Some(ShotPlan {
            scene: scene.clone(),
            shot_type: ShotType::for_zoom(zoom),
            ideal_zoom: zoom,
            ideal_center: center,
            zoom_source: ZoomSource::ActivityBBox,
            inherited: false,
        })
    }

    /// Center on the lone event of a sparse scene at the nominal zoom.
    fn plan_from_single_event(
        &self,
        scene: &CameraScene,
        events: &[UnifiedEvent],
        nominal: f64,
    ) -> Option<ShotPlan> {
        let mut positioned = events.iter().filter(|e| e.kind.is_pointer_positioned());
        let only = positioned.next()?;
        if positioned.next().is_some() {
            return None;
        }

        let zoom = nominal.clamp(self.settings.min_zoom, self.settings.max_zoom);
        Some(ShotPlan {
            scene: scene.clone(),
            shot_type: ShotType::for_zoom(zoom),
            ideal_zoom: zoom,
            ideal_center: clamp_center_to_screen(only.position, zoom),
            zoom_source: ZoomSource::SingleEvent,
            inherited: false,
        })
    }

    /// `targetAreaCoverage / max(w, h)`, clamped into the configured range.
    fn coverage_zoom(&self, rect: &NormRect) -> f64 {
        let extent = rect.w.max(rect.h).max(1e-6);
        (self.settings.target_area_coverage / extent)
            .clamp(self.settings.min_zoom, self.settings.max_zoom)
    }

    /// Short idle scenes take softened framing from their neighbors so the
    /// camera doesn't slam back to the establishing shot between actions.
    fn inherit_idle_framing(&self, plans: &mut [ShotPlan]) {
        let decay = self.settings.idle_zoom_decay;
        for i in 0..plans.len() {
            if !plans[i].scene.primary_intent.is_idle()
                || plans[i].scene.duration() > SHORT_IDLE_SECS
                || i == 0
                || i + 1 >= plans.len()
            {
                continue;
            }
            let (prev, next) = (&plans[i - 1], &plans[i + 1]);
            if prev.scene.primary_intent.is_idle() || next.scene.primary_intent.is_idle() {
                continue;
            }

            let neighbor_zoom = (prev.ideal_zoom + next.ideal_zoom) * 0.5;
            let zoom = (neighbor_zoom * decay + 1.0 * (1.0 - decay))
                .clamp(self.settings.min_zoom, self.settings.max_zoom);
            let center = clamp_center_to_screen(
                NormPoint::midpoint(&prev.ideal_center, &next.ideal_center),
                zoom,
            );

            let plan = &mut plans[i];
            plan.ideal_zoom = zoom;
            plan.ideal_center = center;
            plan.shot_type = ShotType::for_zoom(zoom);
            plan.inherited = true;
        }
    }

    fn zoom_range_for(&self, intent: UserIntent) -> ZoomRange {
        let ranges = &self.settings.zoom_ranges;
        match intent {
            UserIntent::Typing(TypingContext::CodeEditor) => ranges.typing_code_editor,
            UserIntent::Typing(TypingContext::TextField) => ranges.typing_text_field,
            UserIntent::Typing(TypingContext::Terminal) => ranges.typing_terminal,
            UserIntent::Typing(TypingContext::RichTextEditor) => ranges.typing_rich_text,
            UserIntent::Clicking => ranges.clicking,
            UserIntent::Navigating => ranges.navigating,
            UserIntent::Dragging => ranges.dragging,
            UserIntent::Scrolling => ranges.scrolling,
            UserIntent::Reading => ranges.reading,
            UserIntent::Switching => ranges.switching,
            UserIntent::Idle => ranges.idle,
        }
    }
}

/// The most frequent non-degenerate element frame in the scene, normalized.
fn dominant_element_rect(events: &[UnifiedEvent], screen: ScreenBounds) -> Option<NormRect> {
    let mut counted: Vec<(NormRect, usize)> = vec![];
    for event in events {
        let Some(element) = event.metadata.element.as_ref() else {
            continue;
        };
        let Some(rect) = screen.normalize_rect(&element.frame_px) else {
            continue;
        };
        match counted.iter().position(|(seen, _)| *seen == rect) {
            Some(idx) => counted[idx].1 += 1,
            None => counted.push((rect, 1)),
        }
    }
    counted
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(rect, _)| rect)
}

/// Midpoint of the latest caret bounds sampled during the scene.
fn caret_center(events: &[UnifiedEvent], screen: ScreenBounds) -> Option<NormPoint> {
    events
        .iter()
        .rev()
        .find_map(|e| e.metadata.caret_bounds.as_ref())
        .and_then(|caret| screen.normalize_rect(caret))
        .map(|rect| rect.center())
}
