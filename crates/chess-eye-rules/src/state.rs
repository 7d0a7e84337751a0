use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Square};
use crate::error::FenError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::all()
    }
}

impl CastlingRights {
    pub fn all() -> Self {
        Self {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        Self {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn allows(self, color: Color, kingside: bool) -> bool {
        match (color, kingside) {
            (Color::White, true) => self.white_kingside,
            (Color::White, false) => self.white_queenside,
            (Color::Black, true) => self.black_kingside,
            (Color::Black, false) => self.black_queenside,
        }
    }

    pub(crate) fn revoke_side(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drop the right tied to a rook standing on `square`, if any.
    pub(crate) fn revoke_rook(&mut self, square: Square, color: Color) {
        match (color, square.rank(), square.file()) {
            (Color::White, 0, 0) => self.white_queenside = false,
            (Color::White, 0, 7) => self.white_kingside = false,
            (Color::Black, 7, 0) => self.black_queenside = false,
            (Color::Black, 7, 7) => self.black_kingside = false,
            _ => {}
        }
    }

    fn as_fen(self) -> String {
        let mut out = String::with_capacity(4);
        if self.white_kingside {
            out.push('K');
        }
        if self.white_queenside {
            out.push('Q');
        }
        if self.black_kingside {
            out.push('k');
        }
        if self.black_queenside {
            out.push('q');
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    fn from_fen(field: &str) -> Result<Self, FenError> {
        if field == "-" {
            return Ok(Self::none());
        }
        let mut rights = Self::none();
        for ch in field.chars() {
            match ch {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                'q' => rights.black_queenside = true,
                _ => return Err(FenError::BadCastlingFlag(ch)),
            }
        }
        Ok(rights)
    }
}

/// Full standing of a game between two observed moves.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
            turn: Color::White,
            castling: CastlingRights::all(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn fen(&self) -> String {
        let mut out = self.board.placement_fen();
        out.push(' ');
        out.push(self.turn.fen_char());
        out.push(' ');
        out.push_str(&self.castling.as_fen());
        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_algebraic()),
            None => out.push('-'),
        }
        out.push(' ');
        out.push_str(&self.halfmove_clock.to_string());
        out.push(' ');
        out.push_str(&self.fullmove_number.to_string());
        out
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut parts = fen.split_whitespace();
        let placement = parts.next().ok_or(FenError::MissingField("placement"))?;
        let active = parts.next().ok_or(FenError::MissingField("active color"))?;
        let castling = parts.next().ok_or(FenError::MissingField("castling"))?;
        let en_passant = parts.next().ok_or(FenError::MissingField("en passant"))?;
        let halfmove = parts.next();
        let fullmove = parts.next();
        if parts.next().is_some() {
            return Err(FenError::TrailingFields);
        }

        let board = Board::from_placement(placement)?;
        let turn = match active {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadActiveColor(other.to_string())),
        };
        let castling = CastlingRights::from_fen(castling)?;
        let en_passant = if en_passant == "-" {
            None
        } else {
            Some(
                Square::from_algebraic(en_passant)
                    .ok_or_else(|| FenError::BadEnPassant(en_passant.to_string()))?,
            )
        };

        let halfmove_clock = match halfmove {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| FenError::BadClock("halfmove", value.to_string()))?,
            None => 0,
        };
        let fullmove_number = match fullmove {
            Some(value) => {
                let n = value
                    .parse::<u32>()
                    .map_err(|_| FenError::BadClock("fullmove", value.to_string()))?;
                if n == 0 {
                    return Err(FenError::BadClock("fullmove", value.to_string()));
                }
                n
            }
            None => 1,
        };

        Ok(Self {
            board,
            turn,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}
