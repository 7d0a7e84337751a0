//! Starting-side orientation from a photo of the filled board.

use chess_eye_core::{crop_gray, BoardGrid, GrayImageView};

/// Clockwise quarter turns that bring the white back ranks to the bottom
/// edge of the frame.
///
/// Expects a photo of the starting position, already rotated into the
/// grid frame. Both armies sit on opposite edges, so whichever edge pair
/// shows the larger brightness disparity fixes the board axis, and the
/// brighter pair of ranks or files is taken to be white. Pure heuristic,
/// it assumes lighter pieces and a full starting setup.
pub fn quarter_turns_for_start(grid: &BoardGrid, photo: &GrayImageView<'_>) -> u8 {
    let bottom = band_mass(grid, photo, (0..2).flat_map(all_files));
    let top = band_mass(grid, photo, (6..8).flat_map(all_files));
    let left = band_mass(grid, photo, (0..2).flat_map(all_ranks));
    let right = band_mass(grid, photo, (6..8).flat_map(all_ranks));

    log::debug!(
        "edge brightness: bottom {bottom:.1} top {top:.1} left {left:.1} right {right:.1}"
    );

    if (bottom - top).abs() >= (left - right).abs() {
        if bottom >= top {
            0
        } else {
            2
        }
    } else if left > right {
        3
    } else {
        1
    }
}

fn all_files(rank: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..8).map(move |file| (rank, file))
}

fn all_ranks(file: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..8).map(move |rank| (rank, file))
}

/// Mean brightness over a band of cells.
fn band_mass(
    grid: &BoardGrid,
    photo: &GrayImageView<'_>,
    cells: impl Iterator<Item = (usize, usize)>,
) -> f32 {
    let mut total = 0.0;
    let mut count = 0usize;
    for (rank, file) in cells {
        total += crop_gray(photo, grid.cell_rect(rank, file)).view().mean();
        count += 1;
    }
    total / count as f32
}
