//! Knight Moves - a knight must tour every square a queen does not cover
//!
//! This module exposes the puzzle logic for testing and for front ends.

pub mod board;
pub mod constants;
pub mod puzzle;
pub mod ticker;
pub mod timer;

pub use board::{BoardError, KnightRules, MoveLog, Position, RulesAdapter, Square};
pub use puzzle::{Action, Phase, PuzzleLayout, PuzzleSession, PuzzleState, PuzzleView};
pub use ticker::TimerTicker;
pub use timer::{elapsed_display, format_elapsed, Clock, ManualClock, SystemClock};
