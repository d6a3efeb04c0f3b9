//! Scene segmentation.
//!
//! Collapses intent spans into camera scenes: the contiguous units the
//! camera holds. Adjacent typing spans in the same context merge across
//! short breaks, spatially discontinuous spans split, and each scene gets
//! focus regions from clustered event positions.

use uuid::Uuid;

use reframe_project_model::geometry::{NormPoint, NormRect};

use crate::intent::{IntentSpan, UserIntent};
use crate::timeline::{EventTimeline, UnifiedEvent};

/// Typing spans closer than this (across filler spans) merge into one scene.
const TYPING_MERGE_GAP_SECS: f64 = 2.0;

/// Anchor spread beyond which a span splits into multiple scenes.
const SPATIAL_SPLIT_DISTANCE: f64 = 0.4;

/// Neighborhood radius for focus-region clustering.
const CLUSTER_DISTANCE: f64 = 0.1;

/// Temporal neighborhood for focus-region clustering.
const CLUSTER_TIME_SECS: f64 = 1.0;

/// Clusters need at least this many points to become a region.
const CLUSTER_MIN_POINTS: usize = 2;

/// A contiguous interval the camera treats as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraScene {
    pub id: Uuid,
    pub start_time: f64,
    pub end_time: f64,
    pub primary_intent: UserIntent,
    /// Bounding boxes of clustered activity inside the scene.
    pub focus_regions: Vec<NormRect>,
    /// Dominant application during the scene.
    pub app_context: Option<String>,
}

impl CameraScene {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// The scene segmenter.
pub struct SceneSegmenter;

impl SceneSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Collapse spans into sorted, non-overlapping scenes covering the
    /// same `[0, duration]` interval the spans do.
    pub fn segment(&self, spans: &[IntentSpan], timeline: &EventTimeline) -> Vec<CameraScene> {
        let merged = merge_typing_spans(spans);

        let mut scenes = vec![];
        for span in &merged {
            for (start, end) in split_spatially(span, timeline) {
                let events = timeline.events_in(start, end);
                scenes.push(CameraScene {
                    id: Uuid::new_v4(),
                    start_time: start,
                    end_time: end,
                    primary_intent: span.intent,
                    focus_regions: focus_regions(events),
                    app_context: dominant_app(events),
                });
            }
        }
        scenes
    }
}

impl Default for SceneSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Merged-interval view of the span list where nearby same-context typing
/// spans (separated only by reading/idle filler) become one interval.
fn merge_typing_spans(spans: &[IntentSpan]) -> Vec<IntentSpan> {
    let mut merged: Vec<IntentSpan> = vec![];
    let mut i = 0;
    while i < spans.len() {
        let span = &spans[i];
        let UserIntent::Typing(context) = span.intent else {
            merged.push(span.clone());
            i += 1;
            continue;
        };

        let mut current = span.clone();
        let mut j = i + 1;
        while j < spans.len() {
            // Walk over filler spans looking for the next typing span.
            let mut k = j;
            while k < spans.len()
                && matches!(spans[k].intent, UserIntent::Reading | UserIntent::Idle)
            {
                k += 1;
            }
            let Some(next) = spans.get(k) else { break };
            let UserIntent::Typing(next_context) = next.intent else {
                break;
            };
            if next_context != context
                || next.start_time - current.end_time >= TYPING_MERGE_GAP_SECS
            {
                break;
            }

            current.end_time = next.end_time;
            current.confidence = current.confidence.max(next.confidence);
            current
                .anchor_events
                .extend(next.anchor_events.iter().cloned());
            j = k + 1;
        }

        merged.push(current);
        i = j.max(i + 1);
    }
    merged
}

/// Split one span at spatial discontinuities (> 0.4 between an anchor and
/// the running cluster centroid). Returns contiguous sub-intervals whose
/// union is exactly the span interval.
fn split_spatially(span: &IntentSpan, timeline: &EventTimeline) -> Vec<(f64, f64)> {
    let positioned: Vec<&UnifiedEvent> = timeline
        .events_in(span.start_time, span.end_time)
        .iter()
        .filter(|e| e.kind.is_pointer_positioned())
        .collect();

    if positioned.len() < 2 {
        return vec![(span.start_time, span.end_time)];
    }

    let mut cut_times = vec![];
    let mut centroid = positioned[0].position;
    let mut count = 1.0;
    let mut prev_time = positioned[0].time;

    for event in &positioned[1..] {
        if event.position.distance_to(&centroid) > SPATIAL_SPLIT_DISTANCE {
            cut_times.push((prev_time + event.time) * 0.5);
            centroid = event.position;
            count = 1.0;
        } else {
            count += 1.0;
            centroid = NormPoint::new(
                centroid.x + (event.position.x - centroid.x) / count,
                centroid.y + (event.position.y - centroid.y) / count,
            );
        }
        prev_time = event.time;
    }

    if cut_times.is_empty() {
        return vec![(span.start_time, span.end_time)];
    }

    let mut parts = vec![];
    let mut start = span.start_time;
    for cut in cut_times {
        if cut > start && cut < span.end_time {
            parts.push((start, cut));
            start = cut;
        }
    }
    parts.push((start, span.end_time));
    parts
}

/// DBSCAN-flavored clustering: events join a cluster when within 0.1
/// normalized distance of its centroid and 1.0 s of its latest member.
/// Clusters with at least two points become focus regions.
fn focus_regions(events: &[UnifiedEvent]) -> Vec<NormRect> {
    struct Cluster {
        points: Vec<NormPoint>,
        centroid: NormPoint,
        last_time: f64,
    }

    let mut clusters: Vec<Cluster> = vec![];
    for event in events.iter().filter(|e| e.kind.is_pointer_positioned()) {
        let joined = clusters.iter().position(|c| {
            event.position.distance_to(&c.centroid) <= CLUSTER_DISTANCE
                && event.time - c.last_time <= CLUSTER_TIME_SECS
        });
        match joined {
            Some(idx) => {
                let cluster = &mut clusters[idx];
                cluster.points.push(event.position);
                let n = cluster.points.len() as f64;
                cluster.centroid = NormPoint::new(
                    cluster.centroid.x + (event.position.x - cluster.centroid.x) / n,
                    cluster.centroid.y + (event.position.y - cluster.centroid.y) / n,
                );
                cluster.last_time = event.time;
            }
            None => clusters.push(Cluster {
                points: vec![event.position],
                centroid: event.position,
                last_time: event.time,
            }),
        }
    }

    clusters
        .iter()
        .filter(|c| c.points.len() >= CLUSTER_MIN_POINTS)
        .filter_map(|c| NormRect::bounding(&c.points))
        .collect()
}

/// The most frequent app bundle id among the events; first seen wins ties.
fn dominant_app(events: &[UnifiedEvent]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = vec![];
    for event in events {
        let Some(app) = event.metadata.app_bundle_id.as_deref() else {
            continue;
        };
        match counts.iter().position(|(name, _)| *name == app) {
            Some(idx) => counts[idx].1 += 1,
            None => counts.push((app, 1)),
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{attach_anchors, IntentClassifier, TypingContext};
    use reframe_project_model::event::{
        ClickEvent, ClickType, KeyEventType, KeyboardEvent, Modifiers, MouseMoveSample,
        RecordingInput,
    };
    use reframe_project_model::geometry::ScreenBounds;

    fn recording(duration: f64) -> RecordingInput {
        RecordingInput::empty(duration, ScreenBounds::new(1920.0, 1080.0, 1.0))
    }

    fn scenes_for(recording: &RecordingInput) -> Vec<CameraScene> {
        let timeline = EventTimeline::build(recording);
        let mut spans = IntentClassifier::new().classify(&timeline);
        attach_anchors(&mut spans, &timeline);
        SceneSegmenter::new().segment(&spans, &timeline)
    }

    fn assert_scene_cover(scenes: &[CameraScene], duration: f64) {
        assert!(!scenes.is_empty());
        assert!((scenes.first().unwrap().start_time).abs() < 1e-9);
        assert!((scenes.last().unwrap().end_time - duration).abs() < 1e-9);
        for pair in scenes.windows(2) {
            assert!((pair[0].end_time - pair[1].start_time).abs() < 1e-9);
        }
    }

    fn key_at(time: f64) -> KeyboardEvent {
        KeyboardEvent {
            time,
            key_code: 0,
            event_type: KeyEventType::KeyDown,
            modifiers: Modifiers::NONE,
            character: Some("x".into()),
        }
    }

    #[test]
    fn test_one_scene_per_span_by_default() {
        let mut rec = recording(10.0);
        rec.clicks = vec![ClickEvent {
            time: 3.0,
            position: NormPoint::new(0.5, 0.5),
            click_type: ClickType::LeftDown,
            app_bundle_id: None,
            element: None,
        }];
        let scenes = scenes_for(&rec);
        assert_scene_cover(&scenes, 10.0);
        assert!(scenes.len() >= 2);
        assert!(scenes.iter().any(|s| s.primary_intent == UserIntent::Clicking));
    }

    #[test]
    fn test_nearby_typing_spans_merge() {
        let mut rec = recording(12.0);
        // Two bursts 1.8s apart (run gap > 1.5 so the classifier splits
        // them, but under the 2.0s scene merge threshold).
        rec.keys = vec![key_at(1.0), key_at(1.2), key_at(3.0), key_at(3.2)];
        let scenes = scenes_for(&rec);
        assert_scene_cover(&scenes, 12.0);
        let typing: Vec<_> = scenes
            .iter()
            .filter(|s| matches!(s.primary_intent, UserIntent::Typing(_)))
            .collect();
        assert_eq!(typing.len(), 1);
        assert!((typing[0].start_time - 1.0).abs() < 1e-9);
        assert!((typing[0].end_time - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_distant_typing_spans_stay_separate() {
        let mut rec = recording(20.0);
        rec.keys = vec![key_at(1.0), key_at(1.2), key_at(8.0), key_at(8.2)];
        let scenes = scenes_for(&rec);
        let typing = scenes
            .iter()
            .filter(|s| matches!(s.primary_intent, UserIntent::Typing(_)))
            .count();
        assert_eq!(typing, 2);
    }

    #[test]
    fn test_spatial_discontinuity_splits_span() {
        let mut rec = recording(4.0);
        // Reading motion in one corner, then a jump across the screen.
        rec.mouse_moves = (0..8)
            .map(|i| MouseMoveSample {
                time: 0.5 + i as f64 * 0.4,
                position: if i < 4 {
                    NormPoint::new(0.1 + 0.01 * i as f64, 0.1)
                } else {
                    NormPoint::new(0.85, 0.85)
                },
                app_bundle_id: None,
                element: None,
            })
            .collect();
        let scenes = scenes_for(&rec);
        assert_scene_cover(&scenes, 4.0);
        let reading: Vec<_> = scenes
            .iter()
            .filter(|s| s.primary_intent == UserIntent::Reading)
            .collect();
        assert!(reading.len() >= 2, "expected spatial split, got {reading:?}");
    }

    #[test]
    fn test_focus_regions_from_clusters() {
        let events: Vec<UnifiedEvent> = (0..4)
            .map(|i| UnifiedEvent {
                time: i as f64 * 0.2,
                kind: crate::timeline::UnifiedEventKind::MouseMove,
                position: NormPoint::new(0.5 + 0.01 * i as f64, 0.5),
                metadata: Default::default(),
            })
            .collect();
        let regions = focus_regions(&events);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].contains(&NormPoint::new(0.51, 0.5)));
    }

    #[test]
    fn test_single_point_cluster_is_not_a_region() {
        let events = vec![UnifiedEvent {
            time: 0.0,
            kind: crate::timeline::UnifiedEventKind::MouseMove,
            position: NormPoint::new(0.5, 0.5),
            metadata: Default::default(),
        }];
        assert!(focus_regions(&events).is_empty());
    }

    #[test]
    fn test_dominant_app_context() {
        let mut rec = recording(4.0);
        rec.mouse_moves = vec![
            MouseMoveSample {
                time: 1.0,
                position: NormPoint::new(0.4, 0.4),
                app_bundle_id: Some("com.apple.Safari".into()),
                element: None,
            },
            MouseMoveSample {
                time: 1.5,
                position: NormPoint::new(0.45, 0.42),
                app_bundle_id: Some("com.apple.Safari".into()),
                element: None,
            },
        ];
        let scenes = scenes_for(&rec);
        let reading = scenes
            .iter()
            .find(|s| s.primary_intent == UserIntent::Reading)
            .unwrap();
        assert_eq!(reading.app_context.as_deref(), Some("com.apple.Safari"));
    }

    #[test]
    fn test_typing_context_survives_merge() {
        let mut rec = recording(12.0);
        rec.keys = vec![key_at(1.0), key_at(1.2), key_at(3.0), key_at(3.2)];
        let scenes = scenes_for(&rec);
        let typing = scenes
            .iter()
            .find(|s| matches!(s.primary_intent, UserIntent::Typing(_)))
            .unwrap();
        assert_eq!(
            typing.primary_intent,
            UserIntent::Typing(TypingContext::TextField)
        );
    }
}
