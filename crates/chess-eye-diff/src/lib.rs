//! Cell-level change detection between two photos of a calibrated board.
//!
//! Given a [`BoardGrid`](chess_eye_core::BoardGrid) and two photos warped
//! into its frame, [`ChangeScorer`] crops all 64 cells and blends a mean
//! intensity difference with a structural similarity term, discounted by
//! sparse feature matches that survive lighting changes. The result is a
//! short ranked list of the cells that most likely gained or lost a
//! piece, plus a [`CastlingSignature`] when the pattern covers one.

mod castling;
mod features;
mod params;
mod scorer;
mod ssim;

pub use castling::{detect_castling, CastlingSignature};
pub use params::ScoreParams;
pub use scorer::{CellChange, ChangeReport, ChangeScorer, ScoreError};
