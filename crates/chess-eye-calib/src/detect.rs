//! ChESS corner detection on board photos.

use chess_corners::{find_chess_corners_image, ChessConfig, CornerDescriptor, ThresholdMode};
use chess_eye_core::{Corner, GrayImageView};
use nalgebra::Point2;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::CalibrationParams;

/// Detector configuration derived from the calibration params.
pub(crate) fn chess_config(params: &CalibrationParams) -> ChessConfig {
    let mut cfg = ChessConfig::single_scale();
    cfg.threshold_mode = ThresholdMode::Relative;
    cfg.threshold_value = params.threshold_rel;
    cfg.nms_radius = params.nms_radius;
    cfg
}

/// Run the ChESS detector over a photo.
///
/// Returns an empty list when nothing fires; the caller decides whether
/// that is an error.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(photo, cfg),
        fields(width = photo.width, height = photo.height)
    )
)]
pub(crate) fn detect_corners(photo: &GrayImageView<'_>, cfg: &ChessConfig) -> Vec<Corner> {
    let Some(buffer) = image::GrayImage::from_raw(
        photo.width as u32,
        photo.height as u32,
        photo.data.to_vec(),
    ) else {
        return Vec::new();
    };

    // Detection only errors on a buffer/upscale config mismatch, neither of
    // which this config can produce; an error still maps to "nothing fired".
    let corners = find_chess_corners_image(&buffer, cfg).unwrap_or_default();
    log::debug!("chess corner detector fired {} times", corners.len());
    corners.iter().map(adapt_chess_corner).collect()
}

fn adapt_chess_corner(c: &CornerDescriptor) -> Corner {
    // The descriptor's axes[0] -> axes[1] arc spans a dark sector, so the
    // light-square diagonal bisects the complementary bright sector.
    let orientation = (0.5 * (c.axes[0].angle + c.axes[1].angle + std::f32::consts::PI))
        .rem_euclid(std::f32::consts::PI);
    Corner {
        position: Point2::new(c.x, c.y),
        orientation,
        strength: c.response,
    }
}
