//! Move legality.
//!
//! Legality is decided in two stages: a per-piece shape test against the
//! current board, then a scratch application that must leave the mover's
//! king out of check. Check detection reuses the same shape tests from
//! every opposing piece, so there is a single source of movement truth.

use crate::apply::apply_move;
use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::state::GameState;

pub(crate) fn pawn_dir(color: Color) -> i8 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

fn double_push_rank(color: Color) -> u8 {
    match color {
        Color::White => 1,
        Color::Black => 6,
    }
}

/// Every square between `from` and `to` (exclusive) is empty. The two
/// squares must lie on a common rank, file or diagonal.
fn clear_path(board: &Board, from: Square, to: Square) -> bool {
    let dr = (to.rank() as i8 - from.rank() as i8).signum();
    let df = (to.file() as i8 - from.file() as i8).signum();
    let mut current = from;
    loop {
        current = match current.offset(dr, df) {
            Some(sq) => sq,
            None => return false,
        };
        if current == to {
            return true;
        }
        if board.piece_at(current).is_some() {
            return false;
        }
    }
}

/// Shape test for a capture threat: could `piece` standing on `from` take
/// on `target`? Pawns threaten diagonally only; occupancy of `target` is
/// not inspected.
fn piece_attacks(board: &Board, from: Square, target: Square, piece: Piece) -> bool {
    let dr = target.rank() as i8 - from.rank() as i8;
    let df = target.file() as i8 - from.file() as i8;
    if dr == 0 && df == 0 {
        return false;
    }

    match piece.kind {
        PieceKind::Pawn => dr == pawn_dir(piece.color) && df.abs() == 1,
        PieceKind::Knight => {
            (dr.abs() == 1 && df.abs() == 2) || (dr.abs() == 2 && df.abs() == 1)
        }
        PieceKind::Bishop => dr.abs() == df.abs() && clear_path(board, from, target),
        PieceKind::Rook => (dr == 0 || df == 0) && clear_path(board, from, target),
        PieceKind::Queen => {
            (dr.abs() == df.abs() || dr == 0 || df == 0) && clear_path(board, from, target)
        }
        PieceKind::King => dr.abs() <= 1 && df.abs() <= 1,
    }
}

/// Is `square` attacked by any piece of color `by`?
pub fn square_attacked(board: &Board, square: Square, by: Color) -> bool {
    for rank in 0..8u8 {
        for file in 0..8u8 {
            let from = Square::unchecked(rank, file);
            if let Some(piece) = board.piece_at(from) {
                if piece.color == by && piece_attacks(board, from, square, piece) {
                    return true;
                }
            }
        }
    }
    false
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_square(color) {
        Some(king) => square_attacked(board, king, color.opponent()),
        None => false,
    }
}

fn pawn_shape_ok(state: &GameState, from: Square, to: Square, color: Color) -> bool {
    let dir = pawn_dir(color);
    let dr = to.rank() as i8 - from.rank() as i8;
    let df = to.file() as i8 - from.file() as i8;

    if df == 0 {
        if dr == dir {
            return state.board.piece_at(to).is_none();
        }
        if dr == 2 * dir && from.rank() == double_push_rank(color) {
            let Some(mid) = from.offset(dir, 0) else {
                return false;
            };
            return state.board.piece_at(mid).is_none() && state.board.piece_at(to).is_none();
        }
        return false;
    }

    if df.abs() == 1 && dr == dir {
        return match state.board.piece_at(to) {
            Some(target) => target.color != color,
            None => state.en_passant == Some(to),
        };
    }

    false
}

fn move_shape_ok(state: &GameState, from: Square, to: Square, piece: Piece) -> bool {
    match piece.kind {
        PieceKind::Pawn => pawn_shape_ok(state, from, to, piece.color),
        _ => piece_attacks(&state.board, from, to, piece),
    }
}

/// The moving piece when `from -> to` is fully legal for the side to
/// move, `None` otherwise. Legal means: own piece, valid shape, and the
/// applied move does not leave the mover's king in check.
pub(crate) fn legal_piece(state: &GameState, from: Square, to: Square) -> Option<Piece> {
    if from == to {
        return None;
    }
    let piece = state.board.piece_at(from)?;
    if piece.color != state.turn {
        return None;
    }
    if let Some(target) = state.board.piece_at(to) {
        if target.color == piece.color {
            return None;
        }
    }
    if !move_shape_ok(state, from, to, piece) {
        return None;
    }

    let next = apply_move(state, from, to, piece);
    if is_in_check(&next.board, state.turn) {
        return None;
    }
    Some(piece)
}

pub fn is_legal_move(state: &GameState, from: Square, to: Square) -> bool {
    legal_piece(state, from, to).is_some()
}

/// Exhaustive scan over all from/to pairs for the side to move.
pub fn has_any_legal_move(state: &GameState) -> bool {
    for rank in 0..8u8 {
        for file in 0..8u8 {
            let from = Square::unchecked(rank, file);
            match state.board.piece_at(from) {
                Some(piece) if piece.color == state.turn => {}
                _ => continue,
            }
            for to_rank in 0..8u8 {
                for to_file in 0..8u8 {
                    if is_legal_move(state, from, Square::unchecked(to_rank, to_file)) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

pub fn is_checkmate(state: &GameState) -> bool {
    is_in_check(&state.board, state.turn) && !has_any_legal_move(state)
}
