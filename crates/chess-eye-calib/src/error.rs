use thiserror::Error;

/// Failures of board grid calibration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// The corner detector did not yield a clean 7x7 interior lattice.
    #[error("no 7x7 corner lattice found ({corners} corners detected)")]
    LatticeNotFound { corners: usize },
    /// The board diagonal kept landing off the expected quadrant after
    /// the allowed number of rotation passes.
    #[error("rotation search did not settle (diagonal off by {angle_deg:.1} deg)")]
    RotationUnstable { angle_deg: f32 },
}
