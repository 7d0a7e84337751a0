//! State transitions. Everything here returns a fresh [`GameState`]; the
//! input position is never mutated, so a failed resolution upstream can
//! keep its state untouched.

use crate::board::{Color, Piece, PieceKind, Square};
use crate::rules::{has_any_legal_move, is_in_check};
use crate::state::GameState;

/// Apply an already shape-checked move. Handles en passant removal,
/// castling-rights bookkeeping, the clocks and the turn flip.
pub(crate) fn apply_move(state: &GameState, from: Square, to: Square, piece: Piece) -> GameState {
    let mut board = state.board.clone();
    let captured = board.piece_at(to);

    // en passant: the captured pawn stands beside the destination
    let ep_capture = piece.kind == PieceKind::Pawn
        && captured.is_none()
        && state.en_passant == Some(to)
        && from.file() != to.file();
    if ep_capture {
        board.set_piece(Square::unchecked(from.rank(), to.file()), None);
    }

    board.set_piece(from, None);
    board.set_piece(to, Some(piece));

    let mut castling = state.castling;
    if piece.kind == PieceKind::King {
        castling.revoke_side(piece.color);
    }
    if piece.kind == PieceKind::Rook {
        castling.revoke_rook(from, piece.color);
    }
    if let Some(taken) = captured {
        if taken.kind == PieceKind::Rook {
            castling.revoke_rook(to, taken.color);
        }
    }

    let en_passant = if piece.kind == PieceKind::Pawn
        && (to.rank() as i8 - from.rank() as i8).abs() == 2
    {
        // the square the pawn passed over
        Square::new((from.rank() + to.rank()) / 2, from.file())
    } else {
        None
    };

    let resets_clock = piece.kind == PieceKind::Pawn || captured.is_some();
    GameState {
        board,
        turn: state.turn.opponent(),
        castling,
        en_passant,
        halfmove_clock: if resets_clock {
            0
        } else {
            state.halfmove_clock + 1
        },
        fullmove_number: state.fullmove_number + u32::from(state.turn == Color::Black),
    }
}

/// Move king and rook to their castled squares and strip the mover's
/// rights. The caller has already validated rights and occupancy.
pub(crate) fn apply_castling(state: &GameState, color: Color, kingside: bool) -> GameState {
    let rank = color.home_rank();
    let (rook_from, king_to, rook_to) = if kingside {
        (7, 6, 5)
    } else {
        (0, 2, 3)
    };

    let mut board = state.board.clone();
    board.set_piece(Square::unchecked(rank, 4), None);
    board.set_piece(Square::unchecked(rank, rook_from), None);
    board.set_piece(
        Square::unchecked(rank, king_to),
        Some(Piece::new(color, PieceKind::King)),
    );
    board.set_piece(
        Square::unchecked(rank, rook_to),
        Some(Piece::new(color, PieceKind::Rook)),
    );

    let mut castling = state.castling;
    castling.revoke_side(color);

    GameState {
        board,
        turn: state.turn.opponent(),
        castling,
        en_passant: None,
        halfmove_clock: state.halfmove_clock + 1,
        fullmove_number: state.fullmove_number + u32::from(state.turn == Color::Black),
    }
}

fn piece_letter(kind: PieceKind) -> Option<char> {
    match kind {
        PieceKind::Pawn => None,
        PieceKind::Knight => Some('N'),
        PieceKind::Bishop => Some('B'),
        PieceKind::Rook => Some('R'),
        PieceKind::Queen => Some('Q'),
        PieceKind::King => Some('K'),
    }
}

/// Algebraic notation for an applied move. `capture` is keyed on the
/// destination being occupied before the move, so an en passant capture
/// prints as a plain pawn move.
pub(crate) fn move_notation(piece: Piece, from: Square, to: Square, capture: bool) -> String {
    let mut out = String::with_capacity(8);
    match piece_letter(piece.kind) {
        Some(letter) => out.push(letter),
        None if capture => out.push(from.file_char()),
        None => {}
    }
    if capture {
        out.push('x');
    }
    out.push_str(&to.to_algebraic());
    out
}

/// Append the check, or checkmate-and-result, marker for the position
/// after the move.
pub(crate) fn push_outcome_suffix(notation: &mut String, next: &GameState) {
    if !is_in_check(&next.board, next.turn) {
        return;
    }
    if has_any_legal_move(next) {
        notation.push('+');
    } else {
        let result = match next.turn {
            Color::White => "0-1",
            Color::Black => "1-0",
        };
        notation.push_str("# ");
        notation.push_str(result);
    }
}
