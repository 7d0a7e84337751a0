//! Full calibration pipeline: empty-board photo in, oriented grid out.

use chess_eye_core::{rotation_about_center, BoardGrid, Corner, GrayImageView};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::detect::{chess_config, detect_corners};
use crate::error::CalibrationError;
use crate::extrapolate::grid_from_interior;
use crate::lattice::assemble_lattice;
use crate::params::CalibrationParams;

/// Detection passes the rotation feedback loop may take before giving up.
const MAX_ROTATION_PASSES: usize = 2;

/// Board grid calibration from a photo of the empty board.
#[derive(Clone, Debug, Default)]
pub struct GridCalibrator {
    params: CalibrationParams,
}

impl GridCalibrator {
    pub fn new(params: CalibrationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    /// Locate the 8x8 cell grid on a photo of the empty board.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, photo), fields(width = photo.width, height = photo.height))
    )]
    pub fn calibrate(&self, photo: &GrayImageView<'_>) -> Result<BoardGrid, CalibrationError> {
        self.calibrate_with_rotation(photo, self.params.initial_rotation_deg)
    }

    /// Calibration starting from an explicit working rotation.
    ///
    /// The long board diagonal must run bottom-left to top-right in the
    /// rotation-corrected frame. When a pass lands a quarter turn off,
    /// the quantized deviation feeds back into the working rotation and
    /// the photo goes through one more pass.
    pub fn calibrate_with_rotation(
        &self,
        photo: &GrayImageView<'_>,
        start_rotation_deg: f32,
    ) -> Result<BoardGrid, CalibrationError> {
        let mut rotation_deg = start_rotation_deg;
        let mut misalignment = 0.0_f32;

        for pass in 0..MAX_ROTATION_PASSES {
            let grid = self.calibrate_pass(photo, rotation_deg)?;
            misalignment = diagonal_misalignment(&grid);
            let quantum = 90.0 * (misalignment / 90.0).round();
            if quantum == 0.0 {
                return Ok(grid);
            }
            log::debug!(
                "pass {pass}: board diagonal off by {misalignment:.1} deg, \
                 retrying at {:.1} deg",
                rotation_deg - quantum
            );
            rotation_deg -= quantum;
        }

        Err(CalibrationError::RotationUnstable {
            angle_deg: misalignment,
        })
    }

    /// Assemble a grid from already-detected corners.
    pub fn grid_from_corners(
        &self,
        corners: &[Corner],
        rotation_deg: f32,
    ) -> Result<BoardGrid, CalibrationError> {
        let strong: Vec<Corner> = corners
            .iter()
            .filter(|c| c.strength >= self.params.min_corner_strength)
            .copied()
            .collect();
        let lattice = assemble_lattice(&strong, self.params.spacing_tolerance)?;
        Ok(grid_from_interior(&lattice, rotation_deg))
    }

    fn calibrate_pass(
        &self,
        photo: &GrayImageView<'_>,
        rotation_deg: f32,
    ) -> Result<BoardGrid, CalibrationError> {
        let cfg = chess_config(&self.params);
        let rotated;
        let view = if rotation_deg == 0.0 {
            *photo
        } else {
            rotated = rotation_about_center(photo, rotation_deg);
            rotated.view()
        };
        let corners = detect_corners(&view, &cfg);
        log::info!(
            "calibration pass at {rotation_deg:.1} deg found {} corners",
            corners.len()
        );
        self.grid_from_corners(&corners, rotation_deg)
    }
}

/// Signed deviation of the long board diagonal from its expected -45
/// degrees, wrapped to (-180, 180].
fn diagonal_misalignment(grid: &BoardGrid) -> f32 {
    let d = grid.anchor(6, 6) - grid.anchor(1, 1);
    wrap_degrees(d.y.atan2(d.x).to_degrees() + 45.0)
}

fn wrap_degrees(mut deg: f32) -> f32 {
    while deg > 180.0 {
        deg -= 360.0;
    }
    while deg <= -180.0 {
        deg += 360.0;
    }
    deg
}
