//! Puzzle data structures: the fixed layout and the per-session state.

use crate::board::engine::queen_rays;
use crate::board::{BoardError, Color, PieceKind, Position, Square};
use crate::constants::{INITIAL_TARGET_INDEX, QUEEN_SQUARE, STARTING_POSITION};
use crate::timer::elapsed_display;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The immutable puzzle definition: where the queen stands, which squares it
/// covers, and the order the knight must visit everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleLayout {
    starting_position: Position,
    queen_square: Square,
    attacked: BTreeSet<Square>,
    targets: Vec<Square>,
}

impl PuzzleLayout {
    /// Build a layout from a starting position and the enemy queen's square.
    ///
    /// The starting position must put an enemy queen on `queen_square` and give
    /// the side to move exactly one knight, standing on the first target square.
    pub fn new(starting_position: Position, queen_square: Square) -> Result<Self, BoardError> {
        let player = starting_position.side_to_move;
        match starting_position.piece_at(queen_square) {
            Some(p) if p.kind == PieceKind::Queen && p.color == player.opponent() => {}
            _ => {
                return Err(BoardError::InvalidLayout(format!(
                    "no enemy queen on {queen_square}"
                )))
            }
        }
        let knights: Vec<Square> = starting_position
            .pieces()
            .filter(|(_, p)| p.kind == PieceKind::Knight && p.color == player)
            .map(|(sq, _)| sq)
            .collect();
        let &[knight] = knights.as_slice() else {
            return Err(BoardError::InvalidLayout(format!(
                "expected one knight for the side to move, found {}",
                knights.len()
            )));
        };

        let attacked: BTreeSet<Square> = queen_rays(queen_square).into_iter().collect();

        // Right to left, top to bottom
        let targets: Vec<Square> = (0..8u8)
            .rev()
            .flat_map(|rank| (0..8u8).rev().map(move |file| (file, rank)))
            .filter_map(|(file, rank)| Square::from_file_rank(file, rank))
            .filter(|sq| *sq != queen_square && !attacked.contains(sq))
            .collect();

        // The cursor starts past the first target, so the knight must already stand on it
        if targets.first() != Some(&knight) {
            return Err(BoardError::InvalidLayout(format!(
                "knight on {knight} must start on the first target square"
            )));
        }

        Ok(Self {
            starting_position,
            queen_square,
            attacked,
            targets,
        })
    }

    /// Parse a layout from a FEN string and a square label.
    pub fn from_config(fen: &str, queen_square: &str) -> Result<Self, BoardError> {
        Self::new(Position::from_fen(fen)?, Square::parse(queen_square)?)
    }

    /// Knight in the h8 corner, queen on d5.
    pub fn classic() -> Self {
        Self::from_config(STARTING_POSITION, QUEEN_SQUARE)
            .expect("built-in puzzle layout is valid")
    }

    pub fn starting_position(&self) -> &Position {
        &self.starting_position
    }

    pub fn queen_square(&self) -> Square {
        self.queen_square
    }

    /// The player's color: whoever moves first in the starting position.
    pub fn player(&self) -> Color {
        self.starting_position.side_to_move
    }

    pub fn attacked_squares(&self) -> &BTreeSet<Square> {
        &self.attacked
    }

    pub fn is_attacked(&self, square: Square) -> bool {
        self.attacked.contains(&square)
    }

    /// The required visitation order.
    pub fn targets(&self) -> &[Square] {
        &self.targets
    }
}

/// Coarse lifecycle derived from the timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    InProgress,
    Solved,
}

/// Inputs the puzzle reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move the knight to this square.
    PlaceKnight(Square),
    ResetGame,
}

/// Everything that changes while the puzzle is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleState {
    pub position: Position,
    /// Index into `PuzzleLayout::targets` of the square to reach next.
    pub next_target_index: usize,
    /// Set by the first accepted move.
    pub start_time: Option<DateTime<Utc>>,
    /// Set when the last target is reached.
    pub stop_time: Option<DateTime<Utc>>,
}

impl PuzzleState {
    pub fn initial(layout: &PuzzleLayout) -> Self {
        Self {
            position: layout.starting_position().clone(),
            next_target_index: INITIAL_TARGET_INDEX,
            start_time: None,
            stop_time: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.start_time, self.stop_time) {
            (_, Some(_)) => Phase::Solved,
            (Some(_), None) => Phase::InProgress,
            (None, None) => Phase::NotStarted,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.phase() == Phase::Solved
    }

    /// The square to reach next, or `None` once every target has been visited.
    pub fn next_target(&self, layout: &PuzzleLayout) -> Option<Square> {
        layout.targets().get(self.next_target_index).copied()
    }

    /// Fraction of the target sequence covered, 0.0..=1.0.
    pub fn progress(&self, layout: &PuzzleLayout) -> f64 {
        match layout.targets().len() {
            0 => 1.0,
            len => self.next_target_index as f64 / len as f64,
        }
    }

    pub fn elapsed_display(&self, now: DateTime<Utc>) -> String {
        elapsed_display(self.start_time, self.stop_time, now)
    }
}

/// Read-only snapshot handed to whatever renders the puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleView {
    pub position: Position,
    pub next_target: Option<Square>,
    pub progress: f64,
    pub phase: Phase,
    pub elapsed: String,
}

impl PuzzleView {
    pub fn new(layout: &PuzzleLayout, state: &PuzzleState, now: DateTime<Utc>) -> Self {
        Self {
            position: state.position.clone(),
            next_target: state.next_target(layout),
            progress: state.progress(layout),
            phase: state.phase(),
            elapsed: state.elapsed_display(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sq(label: &str) -> Square {
        Square::parse(label).unwrap()
    }

    #[test]
    fn test_classic_layout_sizes() {
        let layout = PuzzleLayout::classic();
        assert_eq!(layout.queen_square(), sq("d5"));
        assert_eq!(layout.attacked_squares().len(), 27);
        assert_eq!(layout.targets().len(), 64 - 1 - 27);
        assert_eq!(layout.player(), Color::White);
    }

    #[test]
    fn test_classic_attacked_set() {
        let layout = PuzzleLayout::classic();
        let expected = [
            "d8", "d7", "d6", "d4", "d3", "d2", "d1", "g8", "f7", "e6", "c4", "b3", "a2", "h5",
            "g5", "f5", "e5", "c5", "b5", "a5", "h1", "g2", "f3", "e4", "c6", "b7", "a8",
        ];
        for label in expected {
            assert!(layout.is_attacked(sq(label)), "{label} should be attacked");
        }
        assert!(!layout.is_attacked(sq("d5")));
    }

    #[test]
    fn test_target_order_right_to_left_top_to_bottom() {
        let layout = PuzzleLayout::classic();
        let first: Vec<String> = layout.targets()[..6].iter().map(|s| s.to_string()).collect();
        assert_eq!(first, ["h8", "f8", "e8", "c8", "b8", "h7"]);
        assert_eq!(layout.targets().last(), Some(&sq("a1")));
        assert!(!layout.targets().contains(&sq("d5")));
    }

    #[test]
    fn test_layout_rejects_missing_queen() {
        let err = PuzzleLayout::from_config("7N/8/8/3q4/8/8/8/8 w - - 0 1", "e5").unwrap_err();
        assert!(matches!(err, BoardError::InvalidLayout(_)));
    }

    #[test]
    fn test_layout_rejects_own_queen() {
        let err = PuzzleLayout::from_config("7N/8/8/3Q4/8/8/8/8 w - - 0 1", "d5").unwrap_err();
        assert!(matches!(err, BoardError::InvalidLayout(_)));
    }

    #[test]
    fn test_layout_rejects_two_knights() {
        let err = PuzzleLayout::from_config("6NN/8/8/3q4/8/8/8/8 w - - 0 1", "d5").unwrap_err();
        assert!(matches!(err, BoardError::InvalidLayout(_)));
    }

    #[test]
    fn test_layout_rejects_knight_off_first_target() {
        // h8 is the first safe square, but the knight starts in the a1 corner
        let err = PuzzleLayout::from_config("8/8/8/3q4/8/8/8/N7 w - - 0 1", "d5").unwrap_err();
        assert!(matches!(err, BoardError::InvalidLayout(_)));

        // Knight inside the queen's lines is refused the same way
        let err = PuzzleLayout::from_config("6N1/8/8/3q4/8/8/8/8 w - - 0 1", "d5").unwrap_err();
        assert!(matches!(err, BoardError::InvalidLayout(_)));
    }

    #[test]
    fn test_layout_propagates_parse_errors() {
        assert!(matches!(
            PuzzleLayout::from_config("not a fen", "d5"),
            Err(BoardError::InvalidFen(_))
        ));
        assert!(matches!(
            PuzzleLayout::from_config("7N/8/8/3q4/8/8/8/8 w - - 0 1", "z0"),
            Err(BoardError::InvalidSquare(_))
        ));
    }

    #[test]
    fn test_initial_state() {
        let layout = PuzzleLayout::classic();
        let state = PuzzleState::initial(&layout);
        assert_eq!(state.position, *layout.starting_position());
        assert_eq!(state.next_target_index, 1);
        assert_eq!(state.next_target(&layout), Some(sq("f8")));
        assert_eq!(state.phase(), Phase::NotStarted);
        assert!((state.progress(&layout) - 1.0 / 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_from_timestamps() {
        let layout = PuzzleLayout::classic();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut state = PuzzleState::initial(&layout);
        state.start_time = Some(t0);
        assert_eq!(state.phase(), Phase::InProgress);
        state.stop_time = Some(t0);
        assert_eq!(state.phase(), Phase::Solved);
        assert!(state.is_solved());
    }

    #[test]
    fn test_view_when_solved() {
        let layout = PuzzleLayout::classic();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut state = PuzzleState::initial(&layout);
        state.next_target_index = layout.targets().len();
        state.start_time = Some(t0);
        state.stop_time = Some(t0 + chrono::Duration::seconds(65));

        let view = PuzzleView::new(&layout, &state, t0);
        assert_eq!(view.next_target, None);
        assert_eq!(view.progress, 1.0);
        assert_eq!(view.phase, Phase::Solved);
        assert_eq!(view.elapsed, "1:05");
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let layout = PuzzleLayout::classic();
        let mut state = PuzzleState::initial(&layout);
        state.start_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("7N/8/8/3q4/8/8/8/8 w - - 0 1"));
        let back: PuzzleState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
