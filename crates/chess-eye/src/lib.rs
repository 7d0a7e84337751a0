//! Chess move recognition from photos of a physical board.
//!
//! This crate ties the workspace together:
//! - stable re-exports of the calibration, change-scoring and rules crates
//! - photo loading at the `image` crate boundary
//! - [`BoardSession`], the end-to-end flow from an empty-board photo to a
//!   maintained game state with notation and FEN per observed move.
//!
//! ## Quickstart
//!
//! ```no_run
//! use chess_eye::{load_photo, BoardSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = BoardSession::default();
//! session.initialize(&load_photo("empty.png")?)?;
//! session.place_pieces(&load_photo("start.png")?)?;
//!
//! let record = session.observe_move(&load_photo("after_e4.png")?)?;
//! println!("{} {}", record.notation, session.fen());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `chess_eye::core`: grayscale buffers, rotation warp, [`BoardGrid`].
//! - `chess_eye::calib`: ChESS-corner grid calibration.
//! - `chess_eye::diff`: per-cell change scoring and the castling pattern.
//! - `chess_eye::rules`: game state, legality, notation, FEN.

pub use chess_eye_calib as calib;
pub use chess_eye_core as core;
pub use chess_eye_diff as diff;
pub use chess_eye_rules as rules;

pub use chess_eye_calib::{CalibrationError, CalibrationParams, GridCalibrator};
pub use chess_eye_core::{BoardGrid, GrayImage, GrayImageView};
pub use chess_eye_diff::{ChangeReport, ChangeScorer, ScoreParams};
pub use chess_eye_rules::{GameState, MoveRecord};

mod photo;
mod session;

pub use photo::{load_photo, render_board, PhotoError};
pub use session::{BoardSession, SessionError};
