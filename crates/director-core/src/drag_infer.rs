//! Drag inference.
//!
//! Some capture backends report drags as plain down/move/up sequences.
//! When a recording carries no drag events, this pass scans left-button
//! down/up pairs bracketing pointer motion and reclassifies them as
//! selection drags before intent classification runs.

use reframe_project_model::event::{ClickEvent, DragEvent, DragType, RecordingInput};

/// Minimum normalized displacement between the press position and the last
/// bracketed move for a pair to count as a drag.
const MIN_DRAG_DISPLACEMENT: f64 = 0.02;

/// Minimum number of mouse moves between down and up.
const MIN_BRACKETED_MOVES: usize = 2;

/// Result of a drag-inference pass.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredDrags {
    /// Drags recovered from click pairs.
    pub drags: Vec<DragEvent>,
    /// Click events that survived (everything not consumed by a drag).
    pub clicks: Vec<ClickEvent>,
}

/// Infer drags from left down/up pairs with motion between them.
///
/// Returns the recovered drags and the remaining clicks. Right-button
/// pairs are never reclassified; unmatched downs remain clicks.
pub fn infer_drags(recording: &RecordingInput) -> InferredDrags {
    let mut clicks = recording.clicks.clone();
    clicks.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));

    let mut moves: Vec<_> = recording.mouse_moves.iter().collect();
    moves.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));

    let mut drags = vec![];
    let mut consumed = vec![false; clicks.len()];

    for down_idx in 0..clicks.len() {
        if consumed[down_idx] {
            continue;
        }
        let down = &clicks[down_idx];
        if down.click_type != reframe_project_model::event::ClickType::LeftDown {
            continue;
        }

        // The matching release is the first unconsumed LeftUp after the press.
        let Some(up_idx) = clicks.iter().enumerate().position(|(i, c)| {
            i > down_idx
                && !consumed[i]
                && c.click_type == reframe_project_model::event::ClickType::LeftUp
                && c.time >= down.time
        }) else {
            continue;
        };
        let up = &clicks[up_idx];

        let bracketed: Vec<_> = moves
            .iter()
            .filter(|m| m.time >= down.time && m.time <= up.time)
            .collect();
        if bracketed.len() < MIN_BRACKETED_MOVES {
            continue;
        }

        let last_move = bracketed.last().expect("non-empty");
        let displacement = down.position.distance_to(&last_move.position);
        if displacement < MIN_DRAG_DISPLACEMENT {
            continue;
        }

        drags.push(DragEvent {
            start_time: down.time,
            end_time: up.time,
            start_position: down.position,
            end_position: last_move.position,
            drag_type: DragType::Selection,
        });
        consumed[down_idx] = true;
        consumed[up_idx] = true;
    }

    let clicks = clicks
        .into_iter()
        .zip(consumed)
        .filter_map(|(click, used)| (!used).then_some(click))
        .collect();

    InferredDrags { drags, clicks }
}

/// Apply drag inference to a recording, returning an amended copy.
///
/// When the recording already contains drags it is returned unchanged.
pub fn augment_recording(recording: &RecordingInput) -> RecordingInput {
    if !recording.drags.is_empty() {
        return recording.clone();
    }
    let inferred = infer_drags(recording);
    if inferred.drags.is_empty() {
        return recording.clone();
    }

    tracing::debug!(
        inferred = inferred.drags.len(),
        remaining_clicks = inferred.clicks.len(),
        "reclassified click pairs as drags"
    );

    let mut amended = recording.clone();
    amended.drags = inferred.drags;
    amended.clicks = inferred.clicks;
    amended
}
