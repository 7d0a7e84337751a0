//! Photo loading and board rendering at the `image` crate boundary.

use std::path::{Path, PathBuf};

use chess_eye_core::{crop_gray, rotation_about_center, BoardGrid, GrayImage, GrayImageView};
use thiserror::Error;

/// A photo that could not be read or decoded.
#[derive(Debug, Error)]
#[error("could not load photo {path}")]
pub struct PhotoError {
    pub path: PathBuf,
    #[source]
    source: image::ImageError,
}

/// Load a photo from disk as a grayscale frame.
pub fn load_photo(path: impl AsRef<Path>) -> Result<GrayImage, PhotoError> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| PhotoError {
        path: path.to_path_buf(),
        source,
    })?;
    let luma = decoded.to_luma8();
    let (width, height) = luma.dimensions();
    log::debug!("loaded {} at {width}x{height}", path.display());

    // Luma8 raw bytes are exactly the row-major layout the core expects.
    Ok(GrayImage {
        width: width as usize,
        height: height as usize,
        data: luma.into_raw(),
    })
}

/// Display crop of the calibrated board: the photo rotated into the grid
/// frame, cut to the 8x8 area with half a cell of margin on every side.
pub fn render_board(grid: &BoardGrid, photo: &GrayImageView<'_>) -> GrayImage {
    let rotated = rotation_about_center(photo, grid.rotation_deg);
    crop_gray(&rotated.view(), grid.board_bounds())
}
