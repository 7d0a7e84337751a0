//! Extension of the interior lattice to the full 8x8 anchor grid.

use chess_eye_core::BoardGrid;
use nalgebra::Point2;

use crate::lattice::{Lattice, LATTICE_SIDE};

/// Build the calibrated grid from the interior lattice.
///
/// The lattice holds board lines 1..=7 on both axes; the outer line each
/// cell anchor still needs (the top rank edge and the leftmost file edge)
/// is extrapolated linearly from the two innermost lines. Lattice rows run
/// top-down in the frame while ranks count from the bottom edge, so row 6
/// carries the rank 0 anchors and `cell_h` comes out negative.
pub(crate) fn grid_from_interior(lattice: &Lattice, rotation_deg: f32) -> BoardGrid {
    let side = LATTICE_SIDE;

    // ext[a][b]: corner one line above (a = 0) or left (b = 0) of the
    // lattice; otherwise lattice[a - 1][b - 1].
    let mut ext = [[Point2::new(0.0_f32, 0.0); 8]; 8];
    for a in 1..=side {
        for b in 1..=side {
            ext[a][b] = lattice[a - 1][b - 1];
        }
    }
    for b in 1..=side {
        ext[0][b] = lattice[0][b - 1] + (lattice[0][b - 1] - lattice[1][b - 1]);
    }
    for row in ext.iter_mut() {
        row[0] = row[1] + (row[1] - row[2]);
    }

    let mut anchors = [[Point2::new(0.0_f32, 0.0); 8]; 8];
    for (rank, row) in anchors.iter_mut().enumerate() {
        row.copy_from_slice(&ext[side - rank]);
    }

    let mut span_x = 0.0_f32;
    let mut span_y = 0.0_f32;
    for k in 0..side {
        span_x += lattice[k][side - 1].x - lattice[k][0].x;
        span_y += lattice[side - 1][k].y - lattice[0][k].y;
    }
    let steps = (side * (side - 1)) as f32;

    BoardGrid {
        anchors,
        cell_w: span_x / steps,
        cell_h: -span_y / steps,
        rotation_deg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exact_lattice() -> Lattice {
        let mut lattice = [[Point2::new(0.0_f32, 0.0); 7]; 7];
        for (i, row) in lattice.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                *p = Point2::new(100.0 + 40.0 * j as f32, 100.0 + 40.0 * i as f32);
            }
        }
        lattice
    }

    #[test]
    fn anchors_cover_all_cells_with_rank_zero_at_the_bottom() {
        let grid = grid_from_interior(&exact_lattice(), 0.0);

        for rank in 0..8 {
            for file in 0..8 {
                let a = grid.anchor(rank, file);
                assert_relative_eq!(a.x, 60.0 + 40.0 * file as f32, epsilon = 1e-3);
                assert_relative_eq!(a.y, 340.0 - 40.0 * rank as f32, epsilon = 1e-3);
            }
        }
        assert_relative_eq!(grid.cell_w, 40.0, epsilon = 1e-3);
        assert_relative_eq!(grid.cell_h, -40.0, epsilon = 1e-3);
    }

    #[test]
    fn extrapolation_follows_the_innermost_spacing() {
        let mut lattice = exact_lattice();
        // stretch the top interior row upwards; the extrapolated rank 7
        // edge must follow at the stretched spacing
        for p in lattice[0].iter_mut() {
            p.y -= 10.0;
        }
        let grid = grid_from_interior(&lattice, 0.0);
        // row 0 sits at y = 90, row 1 at 140, so the edge lands at 40
        assert_relative_eq!(grid.anchor(7, 3).y, 40.0, epsilon = 1e-3);
        assert_relative_eq!(grid.anchor(6, 3).y, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn rotation_is_carried_into_the_grid() {
        let grid = grid_from_interior(&exact_lattice(), 90.0);
        assert_eq!(grid.rotation_deg, 90.0);
    }
}
