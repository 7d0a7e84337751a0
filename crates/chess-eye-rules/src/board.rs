use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FenError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
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

    /// Back rank of this side, rank 0 for White.
    pub fn home_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub(crate) fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    pub(crate) fn fen_symbol(self) -> char {
        let symbol = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => symbol.to_ascii_uppercase(),
            Color::Black => symbol,
        }
    }

    pub(crate) fn from_fen_symbol(ch: char) -> Option<Self> {
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
        Some(Piece::new(color, kind))
    }
}

/// Board square addressed by rank and file, both `0..8`. Rank 0 is
/// White's back rank.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    pub fn new(rank: u8, file: u8) -> Option<Self> {
        if rank < 8 && file < 8 {
            Some(Self { rank, file })
        } else {
            None
        }
    }

    pub const fn unchecked(rank: u8, file: u8) -> Self {
        Self { rank, file }
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn offset(self, dr: i8, df: i8) -> Option<Self> {
        let rank = self.rank as i8 + dr;
        let file = self.file as i8 + df;
        if (0..=7).contains(&rank) && (0..=7).contains(&file) {
            Some(Square::unchecked(rank as u8, file as u8))
        } else {
            None
        }
    }

    pub fn to_algebraic(self) -> String {
        let file_char = (b'a' + self.file) as char;
        let rank_char = (b'1' + self.rank) as char;
        format!("{file_char}{rank_char}")
    }

    pub fn from_algebraic(value: &str) -> Option<Self> {
        let bytes = value.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        if !(b'a'..=b'h').contains(&bytes[0]) || !(b'1'..=b'8').contains(&bytes[1]) {
            return None;
        }
        Some(Self {
            rank: bytes[1] - b'1',
            file: bytes[0] - b'a',
        })
    }

    pub(crate) fn file_char(self) -> char {
        (b'a' + self.file) as char
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_algebraic())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    pub fn starting_position() -> Self {
        use Color::{Black, White};
        use PieceKind::*;

        let mut board = Board::empty();
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (file, kind) in back_rank.into_iter().enumerate() {
            let file = file as u8;
            board.set_piece(Square::unchecked(0, file), Some(Piece::new(White, kind)));
            board.set_piece(Square::unchecked(1, file), Some(Piece::new(White, Pawn)));
            board.set_piece(Square::unchecked(6, file), Some(Piece::new(Black, Pawn)));
            board.set_piece(Square::unchecked(7, file), Some(Piece::new(Black, kind)));
        }
        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank as usize][square.file as usize]
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.rank as usize][square.file as usize] = piece;
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        for rank in 0..8 {
            for file in 0..8 {
                if self.squares[rank][file] == Some(Piece::new(color, PieceKind::King)) {
                    return Some(Square::unchecked(rank as u8, file as u8));
                }
            }
        }
        None
    }

    /// Piece placement field of a FEN string, rank 8 first.
    pub(crate) fn placement_fen(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.squares[rank][file] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(piece.fen_symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank != 0 {
                out.push('/');
            }
        }
        out
    }

    pub(crate) fn from_placement(field: &str) -> Result<Self, FenError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadRankCount(ranks.len()));
        }

        let mut board = Board::empty();
        for (rank_idx, rank_data) in ranks.iter().rev().enumerate() {
            let mut file = 0usize;
            for ch in rank_data.chars() {
                if let Some(digit) = ch.to_digit(10) {
                    file += digit as usize;
                } else {
                    let piece = Piece::from_fen_symbol(ch).ok_or(FenError::BadPiece(ch))?;
                    if file >= 8 {
                        return Err(FenError::BadRankWidth(rank_idx as u8));
                    }
                    board.set_piece(Square::unchecked(rank_idx as u8, file as u8), Some(piece));
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadRankWidth(rank_idx as u8));
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_algebraic_round_trip() {
        for rank in 0..8 {
            for file in 0..8 {
                let sq = Square::unchecked(rank, file);
                assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
            }
        }
        assert_eq!(Square::unchecked(0, 4).to_algebraic(), "e1");
        assert!(Square::from_algebraic("i3").is_none());
        assert!(Square::from_algebraic("a9").is_none());
    }

    #[test]
    fn square_offset_respects_bounds() {
        let corner = Square::unchecked(0, 0);
        assert!(corner.offset(-1, 0).is_none());
        assert!(corner.offset(0, -1).is_none());
        assert_eq!(corner.offset(2, 1), Some(Square::unchecked(2, 1)));
    }

    #[test]
    fn starting_placement_matches_standard() {
        let board = Board::starting_position();
        assert_eq!(
            board.placement_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    #[test]
    fn placement_round_trip() {
        let board =
            Board::from_placement("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R").unwrap();
        assert_eq!(
            board.placement_fen(),
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R"
        );
        assert_eq!(
            board.piece_at(Square::unchecked(4, 4)),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
    }

    #[test]
    fn placement_rejects_bad_input() {
        assert!(Board::from_placement("8/8/8").is_err());
        assert!(Board::from_placement("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("xxxxxxxx/8/8/8/8/8/8/8").is_err());
    }
}
