//! Conversions between the puzzle's FEN-backed `Position` and `chess_engine::Board`.
//!
//! The engine has no FEN support and no move counters, so `Position` stays the
//! value the puzzle owns and a `chess_engine::Board` is built per query.

use super::{Color, Piece, PieceKind, Position, Square};

pub(crate) fn to_engine_square(square: Square) -> chess_engine::Position {
    chess_engine::Position::new(square.rank() as i32, square.file() as i32)
}

pub(crate) fn from_engine_square(pos: chess_engine::Position) -> Option<Square> {
    if pos.is_off_board() {
        return None;
    }
    Square::from_file_rank(pos.get_col() as u8, pos.get_row() as u8)
}

fn to_engine_color(color: Color) -> chess_engine::Color {
    match color {
        Color::White => chess_engine::WHITE,
        Color::Black => chess_engine::BLACK,
    }
}

fn from_engine_color(color: chess_engine::Color) -> Color {
    match color {
        chess_engine::Color::White => Color::White,
        chess_engine::Color::Black => Color::Black,
    }
}

fn to_engine_piece(square: Square, piece: Piece) -> chess_engine::Piece {
    let color = to_engine_color(piece.color);
    let pos = to_engine_square(square);
    match piece.kind {
        PieceKind::Pawn => chess_engine::Piece::Pawn(color, pos),
        PieceKind::Knight => chess_engine::Piece::Knight(color, pos),
        PieceKind::Bishop => chess_engine::Piece::Bishop(color, pos),
        PieceKind::Rook => chess_engine::Piece::Rook(color, pos),
        PieceKind::Queen => chess_engine::Piece::Queen(color, pos),
        PieceKind::King => chess_engine::Piece::King(color, pos),
    }
}

fn from_engine_piece(piece: chess_engine::Piece) -> Piece {
    let kind = match piece {
        chess_engine::Piece::Pawn(..) => PieceKind::Pawn,
        chess_engine::Piece::Knight(..) => PieceKind::Knight,
        chess_engine::Piece::Bishop(..) => PieceKind::Bishop,
        chess_engine::Piece::Rook(..) => PieceKind::Rook,
        chess_engine::Piece::Queen(..) => PieceKind::Queen,
        chess_engine::Piece::King(..) => PieceKind::King,
    };
    Piece::new(from_engine_color(piece.get_color()), kind)
}

/// Engine board with the same placement and side to move.
///
/// Castling rights and the en passant square are left out: neither changes
/// which knight moves are legal.
pub(crate) fn to_engine_board(position: &Position) -> chess_engine::Board {
    position
        .pieces()
        .fold(chess_engine::BoardBuilder::default(), |builder, (sq, piece)| {
            builder.piece(to_engine_piece(sq, piece))
        })
        .build()
        .set_turn(to_engine_color(position.side_to_move))
}

/// Overwrite the placement of `position` with the engine board's.
pub(crate) fn copy_placement(board: &chess_engine::Board, position: &mut Position) {
    for sq in Square::all() {
        let piece = board.get_piece(to_engine_square(sq)).map(from_engine_piece);
        position.put_piece(sq, piece);
    }
}

/// Squares a queen on `from` attacks on an otherwise empty board.
pub fn queen_rays(from: Square) -> Vec<Square> {
    let board = chess_engine::BoardBuilder::default()
        .piece(chess_engine::Piece::Queen(
            chess_engine::BLACK,
            to_engine_square(from),
        ))
        .build();
    Square::all()
        .filter(|&sq| sq != from && board.is_threatened(to_engine_square(sq), chess_engine::WHITE))
        .collect()
}
