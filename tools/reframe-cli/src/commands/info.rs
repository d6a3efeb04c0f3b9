//! Show statistics about a recorded event stream.

use std::path::PathBuf;

use reframe_common::error::{ReframeError, ReframeResult};
use reframe_project_model::event::{parse_recording, ClickType};

pub fn run(events: PathBuf) -> ReframeResult<()> {
    let content =
        std::fs::read_to_string(&events).map_err(|_| ReframeError::file_not_found(&events))?;
    let recording = parse_recording(&content).map_err(|e| {
        ReframeError::event_stream(format!("failed to parse {}: {e}", events.display()))
    })?;

    println!("Recording: {}", events.display());
    println!("  Duration:      {:.2}s", recording.duration);
    println!("  Frame rate:    {} fps", recording.fps);
    println!(
        "  Screen:        {:.0}x{:.0} px @ {:.1}x",
        recording.screen_bounds.width_px,
        recording.screen_bounds.height_px,
        recording.screen_bounds.scale_factor
    );
    println!("  Mouse moves:   {}", recording.mouse_moves.len());

    let left_clicks = recording
        .clicks
        .iter()
        .filter(|c| c.click_type == ClickType::LeftDown)
        .count();
    let right_clicks = recording
        .clicks
        .iter()
        .filter(|c| c.click_type == ClickType::RightDown)
        .count();
    println!(
        "  Clicks:        {} ({} left, {} right)",
        recording.clicks.len(),
        left_clicks,
        right_clicks
    );
    println!("  Key events:    {}", recording.keys.len());
    println!("  Drags:         {}", recording.drags.len());
    println!("  UI samples:    {}", recording.ui_samples.len());

    if let (Some(first), Some(last)) = (
        recording.mouse_moves.first(),
        recording.mouse_moves.last(),
    ) {
        println!(
            "  Pointer span:  {:.2}s ({:.2}s – {:.2}s)",
            last.time - first.time,
            first.time,
            last.time
        );
    }

    Ok(())
}
