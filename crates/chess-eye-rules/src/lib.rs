//! Chess game state and move resolution for photo-observed games.
//!
//! The crate keeps a full digital [`GameState`] (board, turn, castling
//! rights, en passant target, clocks) and recovers the move that was
//! played from a ranked list of changed board cells via [`resolve_move`].
//! All transitions are pure: a resolution failure leaves the caller's
//! state untouched.

mod apply;
mod board;
mod error;
mod resolve;
mod rules;
mod state;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use error::{FenError, NoLegalMove};
pub use resolve::{resolve_move, CastlingRequest, MoveRecord};
pub use rules::{has_any_legal_move, is_checkmate, is_in_check, is_legal_move, square_attacked};
pub use state::{CastlingRights, GameState};
