//! Candidate-pair move resolution.
//!
//! The scorer hands over a ranked list of cells that changed between two
//! photos. Walking pairs in rank order, the first pairing that forms a
//! fully legal move is taken as the move that was played.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::apply::{apply_castling, apply_move, move_notation, push_outcome_suffix};
use crate::board::{Color, Piece, PieceKind, Square};
use crate::error::NoLegalMove;
use crate::rules::{is_in_check, legal_piece};
use crate::state::GameState;

/// Castling recovered from the photo pair: the back rank that changed and
/// the home file of the rook that took part (0 or 7).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CastlingRequest {
    pub rank: u8,
    pub rook_file: u8,
}

/// One accepted move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub notation: String,
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    /// The destination held an opposing piece before the move.
    pub capture: bool,
}

/// Resolve the move played between two photos from the ranked changed
/// cells, or from a castling signature when one was detected.
///
/// On success the next state is returned alongside the record; the input
/// state is never touched, so a [`NoLegalMove`] outcome leaves the game
/// exactly as it was.
pub fn resolve_move(
    state: &GameState,
    candidates: &[Square],
    castling: Option<CastlingRequest>,
) -> Result<(GameState, MoveRecord), NoLegalMove> {
    if let Some(request) = castling {
        return try_castling(state, request).ok_or(NoLegalMove {
            candidates: candidates.len(),
        });
    }

    for hi in 1..candidates.len() {
        for lo in 0..hi {
            let pairs = [
                (candidates[lo], candidates[hi]),
                (candidates[hi], candidates[lo]),
            ];
            for (from, to) in pairs {
                debug!("trying {from} -> {to}");
                if let Some(piece) = legal_piece(state, from, to) {
                    let capture = state.board.piece_at(to).is_some();
                    let next = apply_move(state, from, to, piece);
                    let mut notation = move_notation(piece, from, to, capture);
                    push_outcome_suffix(&mut notation, &next);
                    info!("resolved move {notation}");
                    return Ok((
                        next,
                        MoveRecord {
                            notation,
                            from,
                            to,
                            piece,
                            capture,
                        },
                    ));
                }
            }
        }
    }

    Err(NoLegalMove {
        candidates: candidates.len(),
    })
}

fn try_castling(state: &GameState, request: CastlingRequest) -> Option<(GameState, MoveRecord)> {
    let color = match request.rank {
        0 => Color::White,
        7 => Color::Black,
        _ => return None,
    };
    if color != state.turn {
        return None;
    }
    let kingside = match request.rook_file {
        7 => true,
        0 => false,
        _ => return None,
    };
    if !state.castling.allows(color, kingside) {
        return None;
    }

    let rank = color.home_rank();
    let king_from = Square::unchecked(rank, 4);
    let rook_from = Square::unchecked(rank, request.rook_file);
    if state.board.piece_at(king_from) != Some(Piece::new(color, PieceKind::King)) {
        return None;
    }
    if state.board.piece_at(rook_from) != Some(Piece::new(color, PieceKind::Rook)) {
        return None;
    }
    let between: &[u8] = if kingside { &[5, 6] } else { &[1, 2, 3] };
    if between
        .iter()
        .any(|&f| state.board.piece_at(Square::unchecked(rank, f)).is_some())
    {
        return None;
    }

    let next = apply_castling(state, color, kingside);
    if is_in_check(&next.board, color) {
        return None;
    }

    let mut notation = String::from(if kingside { "0-0" } else { "0-0-0" });
    push_outcome_suffix(&mut notation, &next);
    info!("resolved castling {notation}");
    let king_to = Square::unchecked(rank, if kingside { 6 } else { 2 });
    Some((
        next,
        MoveRecord {
            notation,
            from: king_from,
            to: king_to,
            piece: Piece::new(color, PieceKind::King),
            capture: false,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn resolves_a_simple_pawn_push() {
        let state = GameState::new();
        let (next, record) = resolve_move(&state, &[sq("e2"), sq("e4")], None).unwrap();
        assert_eq!(record.notation, "e4");
        assert_eq!(record.from, sq("e2"));
        assert_eq!(record.to, sq("e4"));
        assert!(!record.capture);
        assert_eq!(
            next.fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn direction_is_inferred_from_legality() {
        // candidates listed destination-first
        let state = GameState::new();
        let (_, record) = resolve_move(&state, &[sq("f3"), sq("g1")], None).unwrap();
        assert_eq!(record.notation, "Nf3");
        assert_eq!(record.from, sq("g1"));
    }

    #[test]
    fn earlier_ranked_pairs_win() {
        // both (e2,e4) and (e2,e3) are legal; the pair with the two
        // highest-ranked cells is tried first
        let state = GameState::new();
        let (_, record) = resolve_move(&state, &[sq("e4"), sq("e2"), sq("e3")], None).unwrap();
        assert_eq!(record.notation, "e4");
    }

    #[test]
    fn capture_is_recorded() {
        let state =
            GameState::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let (next, record) = resolve_move(&state, &[sq("d5"), sq("e4")], None).unwrap();
        assert_eq!(record.notation, "exd5");
        assert!(record.capture);
        assert_eq!(next.turn, Color::Black);
    }

    #[test]
    fn noise_cells_are_skipped() {
        // two spurious cells rank ahead of the real move
        let state = GameState::new();
        let candidates = [sq("a5"), sq("h6"), sq("e2"), sq("e4")];
        let (_, record) = resolve_move(&state, &candidates, None).unwrap();
        assert_eq!(record.notation, "e4");
    }

    #[test]
    fn unresolvable_candidates_leave_no_trace() {
        let state = GameState::new();
        let before = state.clone();
        let err = resolve_move(&state, &[sq("a5"), sq("b6"), sq("c5")], None).unwrap_err();
        assert_eq!(err.candidates, 3);
        assert_eq!(state, before);
    }

    #[test]
    fn kingside_castling_from_signature() {
        let state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let request = CastlingRequest {
            rank: 0,
            rook_file: 7,
        };
        let (next, record) = resolve_move(&state, &[], Some(request)).unwrap();
        assert_eq!(record.notation, "0-0");
        assert_eq!(record.to, sq("g1"));
        assert!(next.fen().starts_with("r3k2r/8/8/8/8/8/8/R4RK1 b kq"));
    }

    #[test]
    fn queenside_castling_from_signature() {
        let state = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let request = CastlingRequest {
            rank: 7,
            rook_file: 0,
        };
        let (next, record) = resolve_move(&state, &[], Some(request)).unwrap();
        assert_eq!(record.notation, "0-0-0");
        assert_eq!(record.to, sq("c8"));
        assert!(next.castling.allows(Color::White, true));
        assert!(!next.castling.allows(Color::Black, false));
    }

    #[test]
    fn castling_requires_rights_and_turn() {
        let no_rights = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1").unwrap();
        let request = CastlingRequest {
            rank: 0,
            rook_file: 7,
        };
        assert!(resolve_move(&no_rights, &[], Some(request)).is_err());

        let wrong_turn = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        assert!(resolve_move(&wrong_turn, &[], Some(request)).is_err());
    }

    #[test]
    fn castling_requires_an_empty_corridor() {
        let state =
            GameState::from_fen("r3k2r/8/8/8/8/8/8/R3KB1R w KQkq - 0 1").unwrap();
        let request = CastlingRequest {
            rank: 0,
            rook_file: 7,
        };
        assert!(resolve_move(&state, &[], Some(request)).is_err());
    }

    #[test]
    fn castling_may_not_land_in_check() {
        // black rook on g8 covers g1
        let state = GameState::from_fen("4k1r1/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let request = CastlingRequest {
            rank: 0,
            rook_file: 7,
        };
        assert!(resolve_move(&state, &[], Some(request)).is_err());
    }

    #[test]
    fn en_passant_resolves_and_removes_the_pawn() {
        let state = GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 3").unwrap();
        let (next, record) = resolve_move(&state, &[sq("e5"), sq("d6")], None).unwrap();
        // destination was empty, so the record is a quiet pawn move
        assert_eq!(record.notation, "d6");
        assert!(!record.capture);
        assert!(next.board.piece_at(sq("d5")).is_none());
    }

    #[test]
    fn mate_is_spelled_in_the_notation() {
        let state = GameState::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let (next, record) = resolve_move(&state, &[sq("a1"), sq("a8")], None).unwrap();
        assert_eq!(record.notation, "Ra8# 1-0");
        assert!(crate::rules::is_checkmate(&next));
    }
}
