//! Run the Auto-Director over a recorded event stream.

use std::path::PathBuf;

use reframe_common::error::{ReframeError, ReframeResult};
use reframe_director_core::settings::DirectorSettings;
use reframe_director_core::Director;
use reframe_project_model::event::parse_recording;

#[allow(clippy::too_many_arguments)]
pub fn run(
    events: PathBuf,
    output: PathBuf,
    settings_path: Option<PathBuf>,
    zoom_intensity: Option<f64>,
    shortcuts_only: bool,
    no_keystrokes: bool,
    smooth: bool,
    verbose: bool,
) -> ReframeResult<()> {
    println!("Analyzing recording: {}", events.display());

    let content =
        std::fs::read_to_string(&events).map_err(|_| ReframeError::file_not_found(&events))?;
    let recording = parse_recording(&content).map_err(|e| {
        ReframeError::event_stream(format!("failed to parse {}: {e}", events.display()))
    })?;

    println!(
        "  Loaded {} moves, {} clicks, {} keys, {} drags, {} UI samples over {:.1}s",
        recording.mouse_moves.len(),
        recording.clicks.len(),
        recording.keys.len(),
        recording.drags.len(),
        recording.ui_samples.len(),
        recording.duration
    );

    let mut settings = load_settings(settings_path)?;
    if let Some(intensity) = zoom_intensity {
        settings.zoom_intensity = intensity.max(0.0);
    }
    if shortcuts_only {
        settings.keystrokes.shortcuts_only = true;
    }
    if no_keystrokes {
        settings.keystrokes.enabled = false;
    }
    if smooth {
        settings.post.smoothing.enabled = true;
    }
    settings.diagnostics = verbose;

    let timeline = Director::new(settings).generate(&recording);

    println!(
        "  Generated {} camera segments, {} keystroke overlays",
        timeline.camera.segments.len(),
        timeline.keystrokes.segments.len()
    );

    let json = serde_json::to_string_pretty(&timeline)?;
    std::fs::write(&output, json)?;

    println!("  Timeline saved to: {}", output.display());
    println!("\nAnalysis complete.");

    Ok(())
}

/// Load director settings from a JSON file, or the defaults when none is
/// configured.
fn load_settings(path: Option<PathBuf>) -> ReframeResult<DirectorSettings> {
    let Some(path) = path else {
        return Ok(DirectorSettings::default());
    };
    let json =
        std::fs::read_to_string(&path).map_err(|_| ReframeError::file_not_found(&path))?;
    serde_json::from_str(&json).map_err(|e| {
        ReframeError::config(format!("invalid settings in {}: {e}", path.display()))
    })
}
