use thiserror::Error;

/// No pairing of changed cells corresponds to a legal move in the current
/// position. The position is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no legal move found among {candidates} changed cells")]
pub struct NoLegalMove {
    pub candidates: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("piece placement has {0} ranks, expected 8")]
    BadRankCount(usize),
    #[error("rank {0} does not cover exactly 8 files")]
    BadRankWidth(u8),
    #[error("invalid piece symbol '{0}'")]
    BadPiece(char),
    #[error("invalid active color '{0}'")]
    BadActiveColor(String),
    #[error("invalid castling flag '{0}'")]
    BadCastlingFlag(char),
    #[error("invalid en passant square '{0}'")]
    BadEnPassant(String),
    #[error("invalid {0} clock '{1}'")]
    BadClock(&'static str, String),
    #[error("unexpected trailing fields")]
    TrailingFields,
}
