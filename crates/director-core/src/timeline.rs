//! Unified event timeline.
//!
//! Folds the typed recording streams into one stable time-sorted stream so
//! downstream stages can reason about "what happened when" without caring
//! which stream an event arrived on. Mouse moves are downsampled to roughly
//! 10 Hz; clicks, keys, drag endpoints, and UI-state samples are all kept.

use reframe_project_model::event::{ClickType, ElementInfo, Modifiers, RecordingInput};
use reframe_project_model::geometry::{NormPoint, PixelRect};

/// Window used to downsample mouse moves (one sample kept per window).
const MOUSE_MOVE_WINDOW_SECS: f64 = 0.1;

/// What a unified event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnifiedEventKind {
    MouseMove,
    Click(ClickType),
    KeyDown,
    KeyUp,
    DragStart,
    DragEnd,
    Scroll,
    UiStateChange,
}

impl UnifiedEventKind {
    /// Whether the event's position reflects actual pointer placement.
    pub fn is_pointer_positioned(&self) -> bool {
        matches!(
            self,
            Self::MouseMove
                | Self::Click(_)
                | Self::DragStart
                | Self::DragEnd
                | Self::Scroll
                | Self::UiStateChange
        )
    }
}

/// Context carried alongside a unified event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMetadata {
    pub app_bundle_id: Option<String>,
    pub element: Option<ElementInfo>,
    pub caret_bounds: Option<PixelRect>,
    pub modifiers: Option<Modifiers>,
    pub key_code: Option<u16>,
    pub character: Option<String>,
}

/// One event on the unified timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedEvent {
    pub time: f64,
    pub kind: UnifiedEventKind,
    pub position: NormPoint,
    pub metadata: EventMetadata,
}

/// The unified, immutable event timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTimeline {
    events: Vec<UnifiedEvent>,
    duration: f64,
}

impl EventTimeline {
    /// Build the timeline from a recording. An empty recording yields an
    /// empty timeline with the given duration.
    pub fn build(recording: &RecordingInput) -> Self {
        let duration = recording.duration.max(0.0);
        let clamp_time = |t: f64| t.clamp(0.0, duration);

        let mut events: Vec<UnifiedEvent> = Vec::with_capacity(
            recording.mouse_moves.len() / 3
                + recording.clicks.len()
                + recording.keys.len()
                + recording.drags.len() * 2
                + recording.ui_samples.len(),
        );

        // Downsample mouse moves: keep the earliest sample per window.
        let mut moves: Vec<_> = recording.mouse_moves.iter().collect();
        moves.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
        let mut last_window: Option<i64> = None;
        for sample in moves {
            let window = (clamp_time(sample.time) / MOUSE_MOVE_WINDOW_SECS).floor() as i64;
            if last_window == Some(window) {
                continue;
            }
            last_window = Some(window);
            events.push(UnifiedEvent {
                time: clamp_time(sample.time),
                kind: UnifiedEventKind::MouseMove,
                position: sample.position,
                metadata: EventMetadata {
                    app_bundle_id: sample.app_bundle_id.clone(),
                    element: sample.element.clone(),
                    ..EventMetadata::default()
                },
            });
        }

        for click in &recording.clicks {
            events.push(UnifiedEvent {
                time: clamp_time(click.time),
                kind: UnifiedEventKind::Click(click.click_type),
                position: click.position,
                metadata: EventMetadata {
                    app_bundle_id: click.app_bundle_id.clone(),
                    element: click.element.clone(),
                    ..EventMetadata::default()
                },
            });
        }

        // Key events carry the most recent pointer position so spatial
        // stages have something to anchor on.
        for key in &recording.keys {
            events.push(UnifiedEvent {
                time: clamp_time(key.time),
                kind: match key.event_type {
                    reframe_project_model::event::KeyEventType::KeyDown => {
                        UnifiedEventKind::KeyDown
                    }
                    reframe_project_model::event::KeyEventType::KeyUp => UnifiedEventKind::KeyUp,
                },
                position: NormPoint::CENTER,
                metadata: EventMetadata {
                    modifiers: Some(key.modifiers),
                    key_code: Some(key.key_code),
                    character: key.character.clone(),
                    ..EventMetadata::default()
                },
            });
        }

        for drag in &recording.drags {
            events.push(UnifiedEvent {
                time: clamp_time(drag.start_time),
                kind: UnifiedEventKind::DragStart,
                position: drag.start_position,
                metadata: EventMetadata::default(),
            });
            events.push(UnifiedEvent {
                time: clamp_time(drag.end_time),
                kind: UnifiedEventKind::DragEnd,
                position: drag.end_position,
                metadata: EventMetadata::default(),
            });
        }

        for sample in &recording.ui_samples {
            events.push(UnifiedEvent {
                time: clamp_time(sample.time),
                kind: UnifiedEventKind::UiStateChange,
                position: sample.cursor_position,
                metadata: EventMetadata {
                    element: sample.element.clone(),
                    caret_bounds: sample.caret_bounds,
                    ..EventMetadata::default()
                },
            });
        }

        // Stable: equal timestamps preserve stream/insertion order.
        events.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));

        // Fill key-event positions from the latest pointer position seen.
        let mut last_pointer = NormPoint::CENTER;
        for event in &mut events {
            if event.kind.is_pointer_positioned() {
                last_pointer = event.position;
            } else if matches!(event.kind, UnifiedEventKind::KeyDown | UnifiedEventKind::KeyUp) {
                event.position = last_pointer;
            }
        }

        Self { events, duration }
    }

    /// An empty timeline of the given duration.
    pub fn empty(duration: f64) -> Self {
        Self {
            events: vec![],
            duration: duration.max(0.0),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn events(&self) -> &[UnifiedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events with `start <= time <= end` (inclusive on both ends).
    pub fn events_in(&self, start: f64, end: f64) -> &[UnifiedEvent] {
        if end < start {
            return &[];
        }
        let lo = self.events.partition_point(|e| e.time < start);
        let hi = self.events.partition_point(|e| e.time <= end);
        &self.events[lo..hi]
    }

    /// The last recorded pointer position strictly before `t`.
    pub fn last_mouse_position(&self, before: f64) -> Option<NormPoint> {
        let idx = self.events.partition_point(|e| e.time < before);
        self.events[..idx]
            .iter()
            .rev()
            .find(|e| e.kind.is_pointer_positioned())
            .map(|e| e.position)
    }
}
