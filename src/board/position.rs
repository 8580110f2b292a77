//! Full board state and its FEN encoding.

use super::{BoardError, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    fn from_char(ch: char) -> Option<Piece> {
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match ch.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some(Piece { color, kind })
    }

    fn to_char(self) -> char {
        let ch = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => ch.to_ascii_uppercase(),
            Color::Black => ch,
        }
    }
}

/// Castling availability as the FEN `KQkq` flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    fn from_fen(field: &str) -> Option<CastlingRights> {
        let mut rights = CastlingRights::default();
        if field == "-" {
            return Some(rights);
        }
        // Flags must appear at most once and in KQkq order
        let mut last = None;
        for ch in field.chars() {
            let order = "KQkq".find(ch)?;
            if last.is_some_and(|prev| order <= prev) {
                return None;
            }
            last = Some(order);
            match ch {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                _ => rights.black_queenside = true,
            }
        }
        (!field.is_empty()).then_some(rights)
    }

    fn to_fen(self) -> String {
        let mut out = String::new();
        for (flag, ch) in [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ] {
            if flag {
                out.push(ch);
            }
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    /// Drop any right whose rook starts on `square`.
    pub(crate) fn revoke_rook_square(&mut self, square: Square) {
        match square.index() {
            7 => self.white_kingside = false,
            0 => self.white_queenside = false,
            63 => self.black_kingside = false,
            56 => self.black_queenside = false,
            _ => {}
        }
    }
}

/// A complete board state: placement, side to move, castling, en passant and clocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    squares: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::default(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index() as usize]
    }

    pub fn put_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.index() as usize] = piece;
    }

    /// Every occupied square with its piece, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Same placement, castling and en passant; `color` to move and both
    /// counters back at their initial values.
    pub fn with_turn_reset(&self, color: Color) -> Position {
        Position {
            side_to_move: color,
            halfmove_clock: 0,
            fullmove_number: 1,
            ..self.clone()
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let invalid = |msg: String| BoardError::InvalidFen(msg);
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(invalid(format!("expected 6 fields, got {}", fields.len())));
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid(format!("expected 8 ranks, got {}", ranks.len())));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(invalid(format!("too many squares in rank {}", rank + 1)));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(invalid(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some(piece) = Piece::from_char(ch) {
                    if let Some(sq) = Square::from_file_rank(file, rank) {
                        pos.put_piece(sq, Some(piece));
                    }
                    file += 1;
                } else {
                    return Err(invalid(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(invalid(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(invalid(format!("invalid side to move: '{other}'"))),
        };

        pos.castling = CastlingRights::from_fen(fields[2])
            .ok_or_else(|| invalid(format!("invalid castling string: '{}'", fields[2])))?;

        if fields[3] != "-" {
            let ep = Square::parse(fields[3])
                .map_err(|_| invalid(format!("invalid en passant square: '{}'", fields[3])))?;
            if ep.rank() != 2 && ep.rank() != 5 {
                return Err(invalid(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep);
        }

        pos.halfmove_clock = fields[4]
            .parse()
            .map_err(|_| invalid(format!("invalid halfmove clock: '{}'", fields[4])))?;
        pos.fullmove_number = fields[5]
            .parse()
            .map_err(|_| invalid(format!("invalid fullmove number: '{}'", fields[5])))?;
        if pos.fullmove_number == 0 {
            return Err(invalid("fullmove number must be >= 1".to_string()));
        }

        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(64);

        for rank in (0..8).rev() {
            let mut empty = 0u8;
            for file in 0..8 {
                let piece = Square::from_file_rank(file, rank).and_then(|sq| self.piece_at(sq));
                match piece {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push((b'0' + empty) as char);
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });
        fen.push(' ');
        fen.push_str(&self.castling.to_fen());
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

impl TryFrom<String> for Position {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Position::from_fen(&value)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_fen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE_FEN: &str = "7N/8/8/3q4/8/8/8/8 w - - 0 1";

    fn sq(label: &str) -> Square {
        Square::parse(label).unwrap()
    }

    #[test]
    fn test_puzzle_fen_placement() {
        let pos = Position::from_fen(PUZZLE_FEN).unwrap();
        assert_eq!(
            pos.piece_at(sq("h8")),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert_eq!(
            pos.piece_at(sq("d5")),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        assert_eq!(pos.pieces().count(), 2);
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.castling, CastlingRights::default());
        assert_eq!(pos.en_passant, None);
    }

    #[test]
    fn test_fen_is_lossless() {
        for fen in [
            PUZZLE_FEN,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 12 40",
            "8/8/8/8/8/8/8/8 b - - 99 7",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_fen_rejects_malformed_fields() {
        let bad = [
            "7N/8/8/3q4/8/8/8 w - - 0 1",
            "7N/8/8/3q4/8/8/8/8 w - - 0",
            "7N/8/8/3q4/8/8/8/9 w - - 0 1",
            "7N/8/8/3q4/8/8/8/7 w - - 0 1",
            "7X/8/8/3q4/8/8/8/8 w - - 0 1",
            "7N/8/8/3q4/8/8/8/8 x - - 0 1",
            "7N/8/8/3q4/8/8/8/8 w QK - 0 1",
            "7N/8/8/3q4/8/8/8/8 w KK - 0 1",
            "7N/8/8/3q4/8/8/8/8 w - e4 0 1",
            "7N/8/8/3q4/8/8/8/8 w - - -1 1",
            "7N/8/8/3q4/8/8/8/8 w - - 0 0",
        ];
        for fen in bad {
            assert!(
                matches!(Position::from_fen(fen), Err(BoardError::InvalidFen(_))),
                "{fen} should be rejected"
            );
        }
    }

    #[test]
    fn test_turn_reset_keeps_castling_and_en_passant() {
        let pos = Position::from_fen("r3k2r/8/8/8/4P3/8/8/R3K2R b KQkq e3 7 21").unwrap();
        let reset = pos.with_turn_reset(Color::White);
        assert_eq!(reset.to_fen(), "r3k2r/8/8/8/4P3/8/8/R3K2R w KQkq e3 0 1");
    }

    #[test]
    fn test_rook_squares_revoke_castling() {
        let all = CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        };
        let cases = [("h1", "Qkq"), ("a1", "Kkq"), ("h8", "KQq"), ("a8", "KQk"), ("e4", "KQkq")];
        for (label, expected) in cases {
            let mut rights = all;
            rights.revoke_rook_square(sq(label));
            assert_eq!(rights.to_fen(), expected, "after a move to {label}");
        }
    }

    #[test]
    fn test_serde_as_fen_string() {
        let pos = Position::from_fen(PUZZLE_FEN).unwrap();
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, format!("\"{PUZZLE_FEN}\""));
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }
}
