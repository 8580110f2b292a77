//! Chess rules adapter: knight-move legality judged by `chess_engine`.

use super::engine::{copy_placement, from_engine_square, to_engine_board, to_engine_square};
use super::{BoardError, Color, Piece, PieceKind, Position, Square};
use chess_engine::Evaluate;
use tracing::instrument;

/// The rules capability the puzzle consumes.
///
/// Implementations are stateless: every call takes the position to judge and
/// returns a fresh one, so the caller stays the single owner of board state.
pub trait RulesAdapter {
    /// Move the side-to-move's knight to `to`, returning the resulting position,
    /// or `None` when no legal knight move reaches `to`.
    fn apply_knight_move(&self, position: &Position, to: Square) -> Option<Position>;

    /// Legal knight destinations from `from` for the side to move.
    fn legal_destinations(&self, position: &Position, from: Square) -> Vec<Square>;
}

/// Standard chess rules restricted to knight moves, backed by `chess_engine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnightRules;

impl KnightRules {
    /// Play the knight on `from` to `to` if the engine allows it.
    fn play(&self, position: &Position, from: Square, to: Square) -> Option<Position> {
        let knight = Piece::new(position.side_to_move, PieceKind::Knight);
        if position.piece_at(from) != Some(knight) {
            return None;
        }

        let board = to_engine_board(position);
        let m = chess_engine::Move::Piece(to_engine_square(from), to_engine_square(to));
        let mut next = position.clone();
        match board.play_move(m) {
            chess_engine::GameResult::Continuing(after) => copy_placement(&after, &mut next),
            // Legal, but it ended the engine's game; a knight move only touches two squares
            chess_engine::GameResult::Victory(_) | chess_engine::GameResult::Stalemate => {
                next.put_piece(to, Some(knight));
                next.put_piece(from, None);
            }
            chess_engine::GameResult::IllegalMove(_) => return None,
        }
        Some(finish_turn(position, next, to))
    }
}

impl RulesAdapter for KnightRules {
    #[instrument(skip(self, position), fields(fen = %position))]
    fn apply_knight_move(&self, position: &Position, to: Square) -> Option<Position> {
        let knight = Piece::new(position.side_to_move, PieceKind::Knight);
        let mut moves = position
            .pieces()
            .filter(|&(_, piece)| piece == knight)
            .filter_map(|(from, _)| self.play(position, from, to));

        // Exactly one knight must reach the square; two would make "N<square>" ambiguous
        let next = moves.next()?;
        if moves.next().is_some() {
            return None;
        }
        Some(next)
    }

    fn legal_destinations(&self, position: &Position, from: Square) -> Vec<Square> {
        let knight = Piece::new(position.side_to_move, PieceKind::Knight);
        if position.piece_at(from) != Some(knight) {
            return Vec::new();
        }
        let origin = to_engine_square(from);
        to_engine_board(position)
            .get_legal_moves()
            .into_iter()
            .filter_map(|m| match m {
                chess_engine::Move::Piece(f, to) if f == origin => from_engine_square(to),
                _ => None,
            })
            .collect()
    }
}

/// Turn bookkeeping the engine does not track: clocks, castling flags, en passant.
fn finish_turn(before: &Position, mut next: Position, to: Square) -> Position {
    next.en_passant = None;
    next.castling.revoke_rook_square(to);
    next.halfmove_clock = if before.piece_at(to).is_some() {
        0
    } else {
        before.halfmove_clock + 1
    };
    if before.side_to_move == Color::Black {
        next.fullmove_number += 1;
    }
    next.side_to_move = before.side_to_move.opponent();
    next
}

/// Stack of prior positions giving the adapter its undo capability.
#[derive(Debug, Clone, Default)]
pub struct MoveLog {
    history: Vec<Position>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a knight move through `rules`, remembering the position it replaced.
    pub fn apply<R: RulesAdapter>(
        &mut self,
        rules: &R,
        position: &Position,
        to: Square,
    ) -> Option<Position> {
        let next = rules.apply_knight_move(position, to)?;
        self.history.push(position.clone());
        Some(next)
    }

    /// Restore the position from before the most recent applied move.
    pub fn undo_last(&mut self) -> Result<Position, BoardError> {
        self.history.pop().ok_or(BoardError::NothingToUndo)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
