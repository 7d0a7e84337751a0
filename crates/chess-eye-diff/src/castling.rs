//! Castling recognition from the candidate pattern.
//!
//! Castling disturbs four cells of one home rank at once, which the
//! pairwise source/destination search over candidates cannot express, so
//! the pattern is recognized straight from the ranked list.

use serde::{Deserialize, Serialize};

use crate::scorer::CellChange;

/// Cells a kingside castle disturbs: king and rook start squares plus
/// both landing squares.
const KINGSIDE_FILES: [u8; 4] = [4, 5, 6, 7];
/// Queenside equivalent. The rook crosses file 1, but that cell looks
/// the same before and after, so it is not part of the pattern.
const QUEENSIDE_FILES: [u8; 4] = [0, 2, 3, 4];

/// A castling move read off the change candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingSignature {
    /// Home rank of the moving side, 0 or 7.
    pub rank: u8,
    /// 7 for kingside, 0 for queenside.
    pub rook_file: u8,
}

impl CastlingSignature {
    pub fn kingside(&self) -> bool {
        self.rook_file == 7
    }
}

/// Checks whether the candidates cover every cell of a castling move on
/// either home rank. Kingside wins when one rank covers both patterns,
/// and rank 0 is checked before rank 7.
pub fn detect_castling(candidates: &[CellChange]) -> Option<CastlingSignature> {
    for rank in [0u8, 7] {
        let mut files = 0u16;
        for c in candidates.iter().filter(|c| c.rank == rank) {
            files |= 1 << c.file;
        }
        let covers = |pattern: [u8; 4]| pattern.iter().all(|&f| files & (1 << f) != 0);
        if covers(KINGSIDE_FILES) {
            return Some(CastlingSignature { rank, rook_file: 7 });
        }
        if covers(QUEENSIDE_FILES) {
            return Some(CastlingSignature { rank, rook_file: 0 });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(cells: &[(u8, u8)]) -> Vec<CellChange> {
        cells
            .iter()
            .map(|&(rank, file)| CellChange {
                rank,
                file,
                score: 1.0,
            })
            .collect()
    }

    #[test]
    fn kingside_pattern_is_detected() {
        let list = changes(&[(0, 4), (0, 5), (0, 6), (0, 7), (3, 3)]);
        assert_eq!(
            detect_castling(&list),
            Some(CastlingSignature {
                rank: 0,
                rook_file: 7
            })
        );
    }

    #[test]
    fn queenside_pattern_is_detected() {
        let list = changes(&[(7, 0), (7, 2), (7, 3), (7, 4)]);
        assert_eq!(
            detect_castling(&list),
            Some(CastlingSignature {
                rank: 7,
                rook_file: 0
            })
        );
    }

    #[test]
    fn kingside_wins_when_a_rank_covers_both() {
        let list = changes(&[(0, 0), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7)]);
        assert_eq!(
            detect_castling(&list),
            Some(CastlingSignature {
                rank: 0,
                rook_file: 7
            })
        );
    }

    #[test]
    fn rank_zero_is_preferred_over_rank_seven() {
        let mut list = changes(&[(7, 4), (7, 5), (7, 6), (7, 7)]);
        list.extend(changes(&[(0, 0), (0, 2), (0, 3), (0, 4)]));
        assert_eq!(
            detect_castling(&list),
            Some(CastlingSignature {
                rank: 0,
                rook_file: 0
            })
        );
    }

    #[test]
    fn incomplete_patterns_are_ignored() {
        assert_eq!(detect_castling(&changes(&[(0, 4), (0, 5), (0, 6)])), None);
        // The right files on the wrong rank do not castle.
        assert_eq!(
            detect_castling(&changes(&[(3, 4), (3, 5), (3, 6), (3, 7)])),
            None
        );
        assert_eq!(detect_castling(&[]), None);
    }
}
