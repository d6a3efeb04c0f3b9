//! Intent classification.
//!
//! Assigns every instant of the recording to exactly one user intent. The
//! output spans are sorted, non-overlapping, and cover `[0, duration]`
//! without gaps; idle and reading fill whatever the detectors leave open.

use reframe_project_model::event::{ClickType, ElementInfo};

use crate::timeline::{EventTimeline, UnifiedEvent, UnifiedEventKind};

/// Maximum inter-key gap inside one typing run.
const TYPING_GAP_SECS: f64 = 1.5;

/// Click grouping window for navigation detection.
const NAV_WINDOW_SECS: f64 = 2.0;

/// Maximum normalized distance between navigation clicks.
const NAV_RADIUS: f64 = 0.3;

/// Maximum clicks in one navigation burst.
const NAV_MAX_CLICKS: usize = 3;

/// Nominal extent of a lone click span.
const CLICK_SPAN_SECS: f64 = 0.5;

/// Extent of the span emitted at an application change.
const SWITCH_SPAN_SECS: f64 = 0.5;

/// Gaps at least this long become idle; shorter gaps become reading.
const IDLE_GAP_SECS: f64 = 5.0;

/// The editing context a typing run happens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypingContext {
    CodeEditor,
    TextField,
    Terminal,
    RichTextEditor,
}

/// What the user is doing during a span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserIntent {
    Typing(TypingContext),
    Clicking,
    Navigating,
    Dragging,
    Scrolling,
    Reading,
    Switching,
    Idle,
}

impl UserIntent {
    /// Overlap-resolution priority; higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Typing(_) => 7,
            Self::Dragging => 6,
            Self::Navigating => 5,
            Self::Clicking => 4,
            Self::Switching => 3,
            Self::Scrolling => 2,
            Self::Reading => 1,
            Self::Idle => 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// A labelled, anchored interval of the recording.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentSpan {
    pub start_time: f64,
    pub end_time: f64,
    pub intent: UserIntent,
    pub confidence: f64,
    /// Timeline events inside the span, in timeline order.
    pub anchor_events: Vec<UnifiedEvent>,
}

impl IntentSpan {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Candidate span before overlap resolution.
#[derive(Debug, Clone)]
struct Candidate {
    start: f64,
    end: f64,
    intent: UserIntent,
    confidence: f64,
}

/// The intent classifier.
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Label the whole timeline. Returns sorted, non-overlapping spans
    /// covering `[0, duration]`.
    pub fn classify(&self, timeline: &EventTimeline) -> Vec<IntentSpan> {
        let duration = timeline.duration();
        if duration <= 0.0 {
            return vec![];
        }

        let mut candidates = vec![];
        candidates.extend(detect_typing_runs(timeline));
        candidates.extend(detect_drags(timeline));
        candidates.extend(detect_clicks_and_navigation(timeline));
        candidates.extend(detect_app_switches(timeline));

        for candidate in &mut candidates {
            candidate.start = candidate.start.clamp(0.0, duration);
            candidate.end = candidate.end.clamp(0.0, duration);
        }
        candidates.retain(|c| c.end > c.start);

        let spans = resolve_overlaps(&candidates, timeline, duration);
        merge_adjacent(spans)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximal runs of non-shortcut keydowns with inter-arrival ≤ 1.5 s.
fn detect_typing_runs(timeline: &EventTimeline) -> Vec<Candidate> {
    let key_downs: Vec<&UnifiedEvent> = timeline
        .events()
        .iter()
        .filter(|e| {
            e.kind == UnifiedEventKind::KeyDown
                && !e
                    .metadata
                    .modifiers
                    .map(|m| m.has_shortcut_modifier())
                    .unwrap_or(false)
        })
        .collect();

    let mut runs = vec![];
    let mut run: Vec<&UnifiedEvent> = vec![];
    for event in key_downs {
        if let Some(last) = run.last() {
            if event.time - last.time > TYPING_GAP_SECS {
                runs.push(std::mem::take(&mut run));
            }
        }
        run.push(event);
    }
    if !run.is_empty() {
        runs.push(run);
    }

    runs.into_iter()
        .filter(|run| !run.is_empty())
        .map(|run| {
            let start = run.first().expect("non-empty").time;
            let end = run.last().expect("non-empty").time;
            let context = typing_context_at(timeline, start, end);
            Candidate {
                start,
                end,
                intent: UserIntent::Typing(context),
                confidence: (0.5 + 0.05 * run.len() as f64).min(0.95),
            }
        })
        .collect()
}

/// Applications whose focused text area should be treated as a terminal.
const TERMINAL_APP_HINTS: &[&str] = &["Terminal", "iTerm", "Warp", "Alacritty", "kitty", "Ghostty"];

/// Applications whose focused text area should be treated as a code editor.
const CODE_EDITOR_APP_HINTS: &[&str] = &[
    "Visual Studio Code",
    "Code",
    "Xcode",
    "IntelliJ",
    "Sublime Text",
    "Zed",
    "Cursor",
    "Nova",
];

/// Roles treated as rich-text surfaces.
const RICH_TEXT_ROLES: &[&str] = &["AXWebArea"];

/// Choose a typing context from the UI-state sample concurrent with a run.
fn typing_context_at(timeline: &EventTimeline, start: f64, end: f64) -> TypingContext {
    let sample = timeline
        .events_in(start, end)
        .iter()
        .find(|e| e.kind == UnifiedEventKind::UiStateChange && e.metadata.element.is_some())
        .or_else(|| {
            timeline
                .events_in(0.0, start)
                .iter()
                .rev()
                .find(|e| e.kind == UnifiedEventKind::UiStateChange && e.metadata.element.is_some())
        });

    let Some(element) = sample.and_then(|e| e.metadata.element.as_ref()) else {
        return TypingContext::TextField;
    };
    typing_context_for_element(element)
}

fn typing_context_for_element(element: &ElementInfo) -> TypingContext {
    if let Some(app) = element.application_name.as_deref() {
        if TERMINAL_APP_HINTS.iter().any(|hint| app.contains(hint)) {
            return TypingContext::Terminal;
        }
        if CODE_EDITOR_APP_HINTS.iter().any(|hint| app.contains(hint)) {
            return TypingContext::CodeEditor;
        }
    }
    if RICH_TEXT_ROLES.contains(&element.role.as_str()) {
        return TypingContext::RichTextEditor;
    }
    if element.is_text_input_role() {
        return TypingContext::TextField;
    }
    TypingContext::TextField
}

/// One candidate per dragStart/dragEnd pair.
fn detect_drags(timeline: &EventTimeline) -> Vec<Candidate> {
    let mut candidates = vec![];
    let mut open_start: Option<f64> = None;
    for event in timeline.events() {
        match event.kind {
            UnifiedEventKind::DragStart => open_start = Some(event.time),
            UnifiedEventKind::DragEnd => {
                if let Some(start) = open_start.take() {
                    candidates.push(Candidate {
                        start,
                        end: event.time,
                        intent: UserIntent::Dragging,
                        confidence: 0.9,
                    });
                }
            }
            _ => {}
        }
    }
    candidates
}

/// Left clicks grouped into navigation bursts; loners become click spans.
fn detect_clicks_and_navigation(timeline: &EventTimeline) -> Vec<Candidate> {
    let left_downs: Vec<&UnifiedEvent> = timeline
        .events()
        .iter()
        .filter(|e| e.kind == UnifiedEventKind::Click(ClickType::LeftDown))
        .collect();

    let mut candidates = vec![];
    let mut group: Vec<&UnifiedEvent> = vec![];

    let flush = |group: &mut Vec<&UnifiedEvent>, candidates: &mut Vec<Candidate>| {
        match group.len() {
            0 => {}
            1 => {
                let click = group[0];
                candidates.push(Candidate {
                    start: click.time,
                    end: click.time + CLICK_SPAN_SECS,
                    intent: UserIntent::Clicking,
                    confidence: 0.6,
                });
            }
            _ => {
                candidates.push(Candidate {
                    start: group.first().expect("non-empty").time,
                    end: group.last().expect("non-empty").time + CLICK_SPAN_SECS,
                    intent: UserIntent::Navigating,
                    confidence: 0.7,
                });
            }
        }
        group.clear();
    };

    for click in left_downs {
        let joins = group
            .last()
            .map(|last| click.time - last.time <= NAV_WINDOW_SECS)
            .unwrap_or(false)
            && group
                .first()
                .map(|first| click.position.distance_to(&first.position) <= NAV_RADIUS)
                .unwrap_or(false)
            && group.len() < NAV_MAX_CLICKS;

        if !joins {
            flush(&mut group, &mut candidates);
        }
        group.push(click);
    }
    flush(&mut group, &mut candidates);

    candidates
}

/// A short span wherever the frontmost application changes.
fn detect_app_switches(timeline: &EventTimeline) -> Vec<Candidate> {
    let mut candidates = vec![];
    let mut previous: Option<&str> = None;
    for event in timeline.events() {
        let Some(app) = event.metadata.app_bundle_id.as_deref() else {
            continue;
        };
        if let Some(prev) = previous {
            if prev != app {
                candidates.push(Candidate {
                    start: event.time,
                    end: event.time + SWITCH_SPAN_SECS,
                    intent: UserIntent::Switching,
                    confidence: 0.8,
                });
            }
        }
        previous = Some(app);
    }
    candidates
}

/// Resolve overlapping candidates by priority and fill gaps, producing an
/// exact cover of `[0, duration]`.
fn resolve_overlaps(
    candidates: &[Candidate],
    timeline: &EventTimeline,
    duration: f64,
) -> Vec<IntentSpan> {
    // Elementary-interval sweep over all candidate boundaries.
    let mut boundaries: Vec<f64> = vec![0.0, duration];
    for c in candidates {
        boundaries.push(c.start);
        boundaries.push(c.end);
    }
    boundaries.retain(|t| (0.0..=duration).contains(t));
    boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    boundaries.dedup_by(|b, a| (*b - *a).abs() < 1e-9);

    let mut spans: Vec<IntentSpan> = vec![];
    for pair in boundaries.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi - lo < 1e-9 {
            continue;
        }
        let mid = (lo + hi) * 0.5;

        // Highest priority wins; among equal priority the earlier start,
        // then input order.
        let winner = candidates
            .iter()
            .filter(|c| c.start <= mid && mid < c.end)
            .max_by(|a, b| {
                a.intent
                    .priority()
                    .cmp(&b.intent.priority())
                    .then_with(|| {
                        b.start
                            .partial_cmp(&a.start)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            });

        let (intent, confidence) = match winner {
            Some(c) => (c.intent, c.confidence),
            None => gap_label(timeline, lo, hi),
        };

        spans.push(IntentSpan {
            start_time: lo,
            end_time: hi,
            intent,
            confidence,
            anchor_events: vec![],
        });
    }

    spans
}

/// Label an uncovered gap: long gaps idle, short gaps with pointer motion
/// reading, short still gaps idle.
fn gap_label(timeline: &EventTimeline, lo: f64, hi: f64) -> (UserIntent, f64) {
    if hi - lo >= IDLE_GAP_SECS {
        return (UserIntent::Idle, 0.5);
    }
    let has_motion = timeline
        .events_in(lo, hi)
        .iter()
        .any(|e| e.kind == UnifiedEventKind::MouseMove);
    if has_motion {
        (UserIntent::Reading, 0.4)
    } else {
        (UserIntent::Idle, 0.4)
    }
}

/// Merge adjacent spans with identical intent and attach anchor events.
fn merge_adjacent(spans: Vec<IntentSpan>) -> Vec<IntentSpan> {
    let mut merged: Vec<IntentSpan> = vec![];
    for span in spans {
        if let Some(last) = merged.last_mut() {
            if last.intent == span.intent && (span.start_time - last.end_time).abs() < 1e-9 {
                last.end_time = span.end_time;
                last.confidence = last.confidence.max(span.confidence);
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

/// Attach anchor events to finalized spans.
pub fn attach_anchors(spans: &mut [IntentSpan], timeline: &EventTimeline) {
    for span in spans.iter_mut() {
        span.anchor_events = timeline.events_in(span.start_time, span.end_time).to_vec();
    }
}
