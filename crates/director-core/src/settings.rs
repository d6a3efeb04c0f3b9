//! Director configuration.
//!
//! Every tunable surfaces as a field on a plain settings struct; defaults
//! are the shipped tuning. No hidden globals — the pipeline reads only what
//! is passed in.

use serde::{Deserialize, Serialize};

use reframe_project_model::easing::Easing;

/// A closed zoom range with a nominal midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// The nominal zoom for this range.
    pub fn nominal(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

/// Per-intent nominal zoom ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentZoomRanges {
    pub typing_code_editor: ZoomRange,
    pub typing_text_field: ZoomRange,
    pub typing_terminal: ZoomRange,
    pub typing_rich_text: ZoomRange,
    pub clicking: ZoomRange,
    pub navigating: ZoomRange,
    pub dragging: ZoomRange,
    pub scrolling: ZoomRange,
    pub reading: ZoomRange,
    pub switching: ZoomRange,
    pub idle: ZoomRange,
}

impl Default for IntentZoomRanges {
    fn default() -> Self {
        Self {
            typing_code_editor: ZoomRange::new(2.0, 2.5),
            typing_text_field: ZoomRange::new(2.2, 2.8),
            typing_terminal: ZoomRange::new(1.6, 2.0),
            typing_rich_text: ZoomRange::new(1.8, 2.2),
            clicking: ZoomRange::fixed(2.0),
            navigating: ZoomRange::new(1.5, 1.8),
            dragging: ZoomRange::new(1.3, 1.6),
            scrolling: ZoomRange::new(1.3, 1.5),
            reading: ZoomRange::new(1.0, 1.3),
            switching: ZoomRange::fixed(1.0),
            idle: ZoomRange::fixed(1.0),
        }
    }
}

/// Shot planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotSettings {
    /// Fraction of the viewport the framed work area should cover.
    pub target_area_coverage: f64,

    /// Padding added around framed work areas (normalized).
    pub work_area_padding: f64,

    pub min_zoom: f64,
    pub max_zoom: f64,

    /// How much of the neighbors' zoom a short idle scene inherits.
    pub idle_zoom_decay: f64,

    pub zoom_ranges: IntentZoomRanges,
}

impl Default for ShotSettings {
    fn default() -> Self {
        Self {
            target_area_coverage: 0.7,
            work_area_padding: 0.08,
            min_zoom: 1.0,
            max_zoom: 2.8,
            idle_zoom_decay: 0.5,
            zoom_ranges: IntentZoomRanges::default(),
        }
    }
}

/// A closed duration range in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: f64,
    pub max: f64,
}

impl DurationRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Pick a duration at fraction `t` through the range.
    pub fn at(&self, t: f64) -> f64 {
        self.min + (self.max - self.min) * t.clamp(0.0, 1.0)
    }
}

/// Transition planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Viewport-relative distance below which a short direct pan is used.
    pub direct_pan_threshold: f64,

    /// Viewport-relative distance below which a gentler direct pan is used.
    pub gentle_pan_threshold: f64,

    /// Viewport-relative distance at which the zoom-out reaches full depth.
    pub full_zoom_out_threshold: f64,

    pub short_pan_duration: DurationRange,
    pub medium_pan_duration: DurationRange,

    /// Base zoom-out/zoom-in phase durations for distant transitions.
    pub zoom_out_duration: f64,
    pub zoom_in_duration: f64,

    pub short_pan_easing: Easing,
    pub medium_pan_easing: Easing,
    pub zoom_out_easing: Easing,
    pub zoom_in_easing: Easing,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            direct_pan_threshold: 0.6,
            gentle_pan_threshold: 1.2,
            full_zoom_out_threshold: 3.0,
            short_pan_duration: DurationRange::new(0.25, 0.45),
            medium_pan_duration: DurationRange::new(0.45, 0.8),
            zoom_out_duration: 0.5,
            zoom_in_duration: 0.6,
            short_pan_easing: Easing::spring_critical(),
            medium_pan_easing: Easing::spring_smooth(),
            zoom_out_easing: Easing::EaseInOut,
            zoom_in_easing: Easing::spring_snappy(),
        }
    }
}

/// Camera simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Zoom at or below which controllers hold static.
    pub min_zoom: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self { min_zoom: 1.0 }
    }
}

/// Cursor overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSettings {
    /// Render scale multiplier for the composited cursor.
    pub scale: f64,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Keystroke overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystrokeSettings {
    pub enabled: bool,

    /// Only show keystrokes with at least one modifier held.
    pub shortcuts_only: bool,

    pub display_duration: f64,
    pub fade_in_duration: f64,
    pub fade_out_duration: f64,

    /// Events closer than this to the previous emitted keystroke are
    /// dropped (auto-repeat filter).
    pub min_interval: f64,
}

impl Default for KeystrokeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            shortcuts_only: false,
            display_duration: 1.5,
            fade_in_duration: 0.15,
            fade_out_duration: 0.3,
            min_interval: 0.05,
        }
    }
}

/// Path smoothing (moving average over interior samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub enabled: bool,
    pub window_size: usize,
    /// Per-axis deviation below which a sample snaps to the window average.
    pub max_deviation: f64,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            window_size: 5,
            max_deviation: 0.02,
        }
    }
}

/// Minimum-hold enforcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldSettings {
    pub min_zoom_in_hold: f64,
    pub min_zoom_out_hold: f64,
    /// Zoom above which a scene counts as zoomed-in.
    pub zoom_in_threshold: f64,
}

impl Default for HoldSettings {
    fn default() -> Self {
        Self {
            min_zoom_in_hold: 0.8,
            min_zoom_out_hold: 0.5,
            zoom_in_threshold: 1.05,
        }
    }
}

/// Scene segment merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Scenes shorter than this are absorbed into a neighbor.
    pub min_segment_duration: f64,
    pub max_zoom_diff_for_merge: f64,
    pub max_center_diff_for_merge: f64,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            min_segment_duration: 0.3,
            max_zoom_diff_for_merge: 0.15,
            max_center_diff_for_merge: 0.08,
        }
    }
}

/// Camera segment optimization (hold collapsing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeSettings {
    pub negligible_zoom_diff: f64,
    pub negligible_center_diff: f64,
    pub merge_consecutive_holds: bool,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            negligible_zoom_diff: 0.03,
            negligible_center_diff: 0.015,
            merge_consecutive_holds: true,
        }
    }
}

/// Post-processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostSettings {
    pub smoothing: SmoothingSettings,
    pub hold: HoldSettings,
    /// Snap transition endpoints to the neighboring scene samples.
    pub refine_transitions: bool,
    pub merge: MergeSettings,
    pub optimize: OptimizeSettings,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            smoothing: SmoothingSettings::default(),
            hold: HoldSettings::default(),
            refine_transitions: true,
            merge: MergeSettings::default(),
            optimize: OptimizeSettings::default(),
        }
    }
}

/// Aggregated director configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorSettings {
    pub shot: ShotSettings,
    pub transition: TransitionSettings,
    pub simulation: SimulationSettings,
    pub cursor: CursorSettings,
    pub keystrokes: KeystrokeSettings,
    pub post: PostSettings,

    /// Post-hoc zoom emphasis: 0 flattens every shot, 1 keeps the plan,
    /// values above 1 exaggerate it.
    pub zoom_intensity: f64,

    /// Emit per-stage diagnostic records through `tracing`.
    pub diagnostics: bool,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            shot: ShotSettings::default(),
            transition: TransitionSettings::default(),
            simulation: SimulationSettings::default(),
            cursor: CursorSettings::default(),
            keystrokes: KeystrokeSettings::default(),
            post: PostSettings::default(),
            zoom_intensity: 1.0,
            diagnostics: false,
        }
    }
}
