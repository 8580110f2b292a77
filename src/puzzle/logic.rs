//! Puzzle transitions: move acceptance, cheat detection, progress and timing.

use super::types::{Action, PuzzleLayout, PuzzleState};
use crate::board::{RulesAdapter, Square};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// A knight-legal move the puzzle still forbids: taking the queen, or landing
/// where the queen could take the knight.
pub fn is_cheating(layout: &PuzzleLayout, square: Square) -> bool {
    square == layout.queen_square() || layout.is_attacked(square)
}

/// Apply `action` to `state`. Rejected moves return an unchanged copy.
pub fn transition<R: RulesAdapter>(
    layout: &PuzzleLayout,
    rules: &R,
    state: &PuzzleState,
    action: Action,
    now: DateTime<Utc>,
) -> PuzzleState {
    match action {
        Action::PlaceKnight(square) => place_knight(layout, rules, state, square, now),
        Action::ResetGame => reset(layout),
    }
}

#[instrument(skip(layout, rules, state, now), fields(cursor = state.next_target_index))]
fn place_knight<R: RulesAdapter>(
    layout: &PuzzleLayout,
    rules: &R,
    state: &PuzzleState,
    square: Square,
    now: DateTime<Utc>,
) -> PuzzleState {
    let Some(moved) = rules.apply_knight_move(&state.position, square) else {
        debug!(%square, reason = "illegal", "move rejected");
        return state.clone();
    };
    if is_cheating(layout, square) {
        debug!(%square, reason = "cheating", "move rejected");
        return state.clone();
    }

    // Single player: hand the move straight back to the knight
    let position = moved.with_turn_reset(layout.player());

    let start_time = match state.start_time {
        Some(start) => Some(start),
        None => {
            info!(%square, "puzzle started");
            Some(now)
        }
    };

    let targets = layout.targets();
    let mut next_target_index = state.next_target_index;
    if targets.get(next_target_index) == Some(&square) {
        next_target_index += 1;
        debug!(%square, next_target_index, "target reached");
    }

    let mut stop_time = state.stop_time;
    if next_target_index == targets.len() && stop_time.is_none() {
        info!(%square, "puzzle solved");
        stop_time = Some(now);
    }

    PuzzleState {
        position,
        next_target_index,
        start_time,
        stop_time,
    }
}

fn reset(layout: &PuzzleLayout) -> PuzzleState {
    info!("puzzle reset");
    PuzzleState::initial(layout)
}
