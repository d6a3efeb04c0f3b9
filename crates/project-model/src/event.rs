//! Recorded input streams: the immutable input to the director pipeline.
//!
//! Events are recorded in append-only JSONL format for crash safety. All
//! pointer coordinates are normalized to `[0.0, 1.0]` (bottom-left origin)
//! relative to the capture region; element frames and caret bounds stay in
//! screen points until the pipeline normalizes them.

use serde::{Deserialize, Serialize};

use crate::geometry::{NormPoint, PixelRect, ScreenBounds};

/// The complete recorded session handed to the director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInput {
    /// Recording length in seconds.
    pub duration: f64,

    /// Capture frame rate (downstream hint; the pipeline does not depend on it).
    pub fps: u32,

    /// Capture dimensions, used to normalize pixel-valued frames.
    pub screen_bounds: ScreenBounds,

    /// Sampled pointer positions.
    pub mouse_moves: Vec<MouseMoveSample>,

    /// Button press/release events.
    pub clicks: Vec<ClickEvent>,

    /// Keyboard events.
    pub keys: Vec<KeyboardEvent>,

    /// Recorded drags. May be empty; the pipeline also infers drags from
    /// down/up pairs with motion between them.
    pub drags: Vec<DragEvent>,

    /// UI-state samples (focused element, caret bounds).
    pub ui_samples: Vec<UiStateSample>,
}

impl RecordingInput {
    /// An empty recording of the given duration.
    pub fn empty(duration: f64, screen_bounds: ScreenBounds) -> Self {
        Self {
            duration,
            fps: 60,
            screen_bounds,
            mouse_moves: vec![],
            clicks: vec![],
            keys: vec![],
            drags: vec![],
            ui_samples: vec![],
        }
    }
}

/// One sampled pointer position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseMoveSample {
    /// Seconds since recording start.
    pub time: f64,
    pub position: NormPoint,
    /// Bundle identifier of the frontmost application, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_bundle_id: Option<String>,
    /// UI element under the pointer, when sampled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementInfo>,
}

/// Mouse button press or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub time: f64,
    pub position: NormPoint,
    pub click_type: ClickType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementInfo>,
}

/// Which button transition a click event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickType {
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
}

impl ClickType {
    pub fn is_left(self) -> bool {
        matches!(self, Self::LeftDown | Self::LeftUp)
    }

    pub fn is_down(self) -> bool {
        matches!(self, Self::LeftDown | Self::RightDown)
    }
}

/// Keyboard press or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub time: f64,
    /// Platform virtual key code.
    pub key_code: u16,
    pub event_type: KeyEventType,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// The character produced, when the tap reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyEventType {
    KeyDown,
    KeyUp,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub command: bool,
    pub shift: bool,
    pub option: bool,
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        command: false,
        shift: false,
        option: false,
        control: false,
    };

    /// Any modifier held at all.
    pub fn has_any(&self) -> bool {
        self.command || self.shift || self.option || self.control
    }

    /// Modifiers that turn a keypress into a shortcut rather than text input.
    pub fn has_shortcut_modifier(&self) -> bool {
        self.command || self.control
    }
}

/// A pointer drag between two positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub start_time: f64,
    pub end_time: f64,
    pub start_position: NormPoint,
    pub end_position: NormPoint,
    pub drag_type: DragType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragType {
    Selection,
    Move,
    Resize,
}

/// A sampled UI state: pointer position plus accessibility context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiStateSample {
    pub time: f64,
    pub cursor_position: NormPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementInfo>,
    /// Text caret bounds in screen points, when a text field is focused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caret_bounds: Option<PixelRect>,
}

/// Accessibility description of a UI element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Accessibility role, e.g. "AXButton", "AXTextField".
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subrole: Option<String>,
    /// Element frame in screen points (top-left origin).
    pub frame_px: PixelRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_clickable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
}

/// Roles treated as interactive targets when framing shots.
pub const CLICKABLE_ROLES: &[&str] = &[
    "AXButton",
    "AXPopUpButton",
    "AXMenuButton",
    "AXMenuItem",
    "AXMenuBarItem",
    "AXCheckBox",
    "AXRadioButton",
    "AXLink",
    "AXTab",
    "AXDisclosureTriangle",
];

/// Roles treated as text-input surfaces when classifying typing context.
pub const TEXT_INPUT_ROLES: &[&str] = &[
    "AXTextField",
    "AXTextArea",
    "AXSearchField",
    "AXSecureTextField",
    "AXComboBox",
];

impl ElementInfo {
    pub fn is_clickable_role(&self) -> bool {
        self.is_clickable || CLICKABLE_ROLES.contains(&self.role.as_str())
    }

    pub fn is_text_input_role(&self) -> bool {
        TEXT_INPUT_ROLES.contains(&self.role.as_str())
    }
}

/// First line of a recording JSONL file, prefixed with `#`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    pub duration: f64,
    pub fps: u32,
    pub screen_bounds: ScreenBounds,
}

/// One line of a recording JSONL file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordedEvent {
    MouseMove(MouseMoveSample),
    Click(ClickEvent),
    Key(KeyboardEvent),
    Drag(DragEvent),
    UiState(UiStateSample),
}

/// Parse a recording from JSONL content: a `#`-prefixed header line
/// followed by one JSON event object per line.
pub fn parse_recording(jsonl: &str) -> Result<RecordingInput, serde_json::Error> {
    let mut header: Option<RecordingHeader> = None;
    let mut events: Vec<RecordedEvent> = vec![];

    for line in jsonl.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('#') {
            if header.is_none() {
                header = Some(serde_json::from_str(rest.trim())?);
            }
            continue;
        }
        events.push(serde_json::from_str(trimmed)?);
    }

    let header = header.unwrap_or(RecordingHeader {
        schema_version: "1.0".to_string(),
        duration: events
            .iter()
            .map(recorded_event_time)
            .fold(0.0_f64, f64::max),
        fps: 60,
        screen_bounds: ScreenBounds::new(1920.0, 1080.0, 1.0),
    });

    let mut recording = RecordingInput::empty(header.duration, header.screen_bounds);
    recording.fps = header.fps;
    for event in events {
        match event {
            RecordedEvent::MouseMove(sample) => recording.mouse_moves.push(sample),
            RecordedEvent::Click(click) => recording.clicks.push(click),
            RecordedEvent::Key(key) => recording.keys.push(key),
            RecordedEvent::Drag(drag) => recording.drags.push(drag),
            RecordedEvent::UiState(sample) => recording.ui_samples.push(sample),
        }
    }
    Ok(recording)
}

fn recorded_event_time(event: &RecordedEvent) -> f64 {
    match event {
        RecordedEvent::MouseMove(s) => s.time,
        RecordedEvent::Click(c) => c.time,
        RecordedEvent::Key(k) => k.time,
        RecordedEvent::Drag(d) => d.end_time,
        RecordedEvent::UiState(s) => s.time,
    }
}

/// Serialize a recording to JSONL (header line plus one event per line),
/// interleaving streams in time order.
pub fn serialize_recording(recording: &RecordingInput) -> Result<String, serde_json::Error> {
    let header = RecordingHeader {
        schema_version: "1.0".to_string(),
        duration: recording.duration,
        fps: recording.fps,
        screen_bounds: recording.screen_bounds,
    };

    let mut events: Vec<RecordedEvent> = vec![];
    events.extend(
        recording
            .mouse_moves
            .iter()
            .cloned()
            .map(RecordedEvent::MouseMove),
    );
    events.extend(recording.clicks.iter().cloned().map(RecordedEvent::Click));
    events.extend(recording.keys.iter().cloned().map(RecordedEvent::Key));
    events.extend(recording.drags.iter().cloned().map(RecordedEvent::Drag));
    events.extend(
        recording
            .ui_samples
            .iter()
            .cloned()
            .map(RecordedEvent::UiState),
    );
    events.sort_by(|a, b| {
        recorded_event_time(a)
            .partial_cmp(&recorded_event_time(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut output = String::new();
    output.push_str("# ");
    output.push_str(&serde_json::to_string(&header)?);
    output.push('\n');
    for event in &events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
