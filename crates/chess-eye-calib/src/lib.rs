//! Board grid calibration from photos of a physical chess board.
//!
//! A ChESS corner detector locates the 49 interior line crossings of the
//! board, the lattice assembler reshapes them into a logical 7x7 matrix,
//! and the extrapolator extends it to the full 8x8 grid of cell anchors
//! with rank 0 on the bottom edge of the rotation-corrected frame. A
//! second entry point reads piece brightness off a filled board to pin
//! down which edge is white's.

mod detect;
mod error;
mod extrapolate;
mod lattice;
mod params;
mod pipeline;
mod side;

pub use error::CalibrationError;
pub use params::CalibrationParams;
pub use pipeline::GridCalibrator;
pub use side::quarter_turns_for_start;
