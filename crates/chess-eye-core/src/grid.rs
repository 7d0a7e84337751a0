//! Calibrated board geometry.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::image::PixelRect;

/// Cell geometry of one calibrated physical board.
///
/// `anchors[rank][file]` is the top-left pixel corner of that cell in the
/// rotation-corrected frame. Rank 0 is the board edge at the bottom of the
/// frame, so `cell_h` is negative: ranks ascend upwards, files ascend to
/// the right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardGrid {
    pub anchors: [[Point2<f32>; 8]; 8],
    /// Signed per-file step in x.
    pub cell_w: f32,
    /// Signed per-rank step in y.
    pub cell_h: f32,
    /// Rotation every photo must be warped by before the anchors apply.
    pub rotation_deg: f32,
}

impl BoardGrid {
    #[inline]
    pub fn anchor(&self, rank: usize, file: usize) -> Point2<f32> {
        self.anchors[rank][file]
    }

    /// Pixel rectangle of one cell. Cells extend down-right from their
    /// anchor by the unsigned step sizes.
    pub fn cell_rect(&self, rank: usize, file: usize) -> PixelRect {
        let a = self.anchors[rank][file];
        let w = self.cell_w.abs() as i64;
        let h = self.cell_h.abs() as i64;
        let x0 = a.x as i64;
        let y0 = a.y as i64;
        PixelRect {
            x0,
            y0,
            x1: x0 + w,
            y1: y0 + h,
        }
    }

    /// Display rectangle of the whole board, half a cell of margin on
    /// every side.
    pub fn board_bounds(&self) -> PixelRect {
        let a = self.anchors[0][0];
        let w = self.cell_w.abs();
        let h = self.cell_h.abs();
        PixelRect {
            x0: (a.x - 0.5 * w) as i64,
            y0: (a.y - 7.5 * h) as i64,
            x1: (a.x + 8.5 * w) as i64,
            y1: (a.y + 1.5 * h) as i64,
        }
    }
}
