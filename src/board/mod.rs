//! Board primitives and the chess rules adapter consumed by the puzzle.

pub mod engine;
pub mod position;
pub mod rules;
pub mod square;

pub use position::{CastlingRights, Color, Piece, PieceKind, Position};
pub use rules::{KnightRules, MoveLog, RulesAdapter};
pub use square::Square;

/// Errors raised when board input cannot be understood.
///
/// Move rejections are not errors: the adapter returns `None` and the puzzle
/// keeps its previous state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Not one of the 64 algebraic labels.
    #[display("invalid square: '{}'", _0)]
    InvalidSquare(String),

    /// A FEN string that is missing fields or holds malformed ones.
    #[display("invalid FEN: {}", _0)]
    InvalidFen(String),

    /// A position that cannot host the knight-and-queen puzzle.
    #[display("invalid puzzle layout: {}", _0)]
    InvalidLayout(String),

    /// `undo_last` called with no recorded moves.
    #[display("no moves to undo")]
    NothingToUndo,
}

impl std::error::Error for BoardError {}
