//! Per-cell change scoring between two aligned photos.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chess_eye_core::{crop_gray, BoardGrid, GrayImage, GrayImageView, PixelRect};

use crate::castling::{detect_castling, CastlingSignature};
use crate::features::{detect_descriptors, match_descriptors};
use crate::params::ScoreParams;
use crate::ssim::mean_ssim;

/// One board cell with its change score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub rank: u8,
    pub file: u8,
    pub score: f32,
}

/// Ranked change candidates of one photo pair.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Cells most likely to have changed, strongest first, capped at
    /// `max_candidates`. Cells scoring zero or below and cells whose
    /// texture demonstrably survived are filtered out, so the list may
    /// be short or empty.
    pub candidates: Vec<CellChange>,
    /// Set when the candidates cover a castling pattern.
    pub castling: Option<CastlingSignature>,
}

#[derive(Debug, Error)]
pub enum ScoreError {
    /// The photos must come from the same camera setup.
    #[error("photo sizes differ: {before:?} vs {after:?}")]
    SizeMismatch {
        before: (usize, usize),
        after: (usize, usize),
    },
}

/// Scores every cell of a calibrated board for change between two
/// photos taken before and after a move.
#[derive(Clone, Debug, Default)]
pub struct ChangeScorer {
    params: ScoreParams,
}

impl ChangeScorer {
    pub fn new(params: ScoreParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScoreParams {
        &self.params
    }

    /// Ranks the 64 cells of `grid` by how much they changed from
    /// `before` to `after`. Both photos must already be rotated into the
    /// grid's frame and share dimensions.
    ///
    /// Per cell, the score blends the mean intensity difference with a
    /// structural `1 - SSIM` term and subtracts a penalty per feature
    /// match between the two crops. Cells that score zero or below, and
    /// cells where too much texture demonstrably survived, are dropped
    /// entirely. Survivors are sorted strongest first, ties keeping
    /// row-major scan order.
    pub fn score(
        &self,
        before: &GrayImageView<'_>,
        after: &GrayImageView<'_>,
        grid: &BoardGrid,
    ) -> Result<ChangeReport, ScoreError> {
        if (before.width, before.height) != (after.width, after.height) {
            return Err(ScoreError::SizeMismatch {
                before: (before.width, before.height),
                after: (after.width, after.height),
            });
        }

        let p = &self.params;
        let nominal_w = grid.cell_w.abs() as i64;
        let nominal_h = grid.cell_h.abs() as i64;
        let nominal_area = (nominal_w * nominal_h).max(1) as f64;

        let mut candidates: Vec<CellChange> = Vec::new();
        for rank in 0..8u8 {
            for file in 0..8u8 {
                let rect = grid.cell_rect(rank as usize, file as usize);
                let cell_before = crop_gray(before, rect);
                let cell_after = crop_gray(after, rect);

                let intensity = mean_abs_difference(&cell_before, &cell_after);
                let ssim = mean_ssim(&cell_before.view(), &cell_after.view(), p.ssim_window);
                let combined = p.color_weight as f64 * (intensity / nominal_area)
                    + p.ssim_weight as f64 * (1.0 - ssim);

                let inner = inset_rect(rect, p.inset_frac);
                let matches = match_descriptors(
                    &detect_descriptors(&crop_gray(before, inner).view()),
                    &detect_descriptors(&crop_gray(after, inner).view()),
                    p.ratio_threshold,
                );

                let score = combined as f32 - p.match_penalty * matches.raw as f32;
                trace!(
                    "cell ({}, {}): intensity {:.2} ssim {:.3} matches {}/{} score {:.4}",
                    rank,
                    file,
                    intensity,
                    ssim,
                    matches.unique,
                    matches.raw,
                    score
                );
                if score > 0.0 && matches.unique < p.max_feature_matches {
                    candidates.push(CellChange { rank, file, score });
                }
            }
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(p.max_candidates);

        let castling = detect_castling(&candidates);
        debug!(
            "{} candidate cells, castling: {:?}",
            candidates.len(),
            castling
        );
        Ok(ChangeReport {
            candidates,
            castling,
        })
    }
}

/// Mean absolute difference over the actual crop pixels. Crops clamped
/// away entirely at the frame border count as unchanged.
fn mean_abs_difference(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.data.is_empty() {
        return 0.0;
    }
    let sum: u64 = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum();
    sum as f64 / a.data.len() as f64
}

/// Shrinks a cell rectangle by `frac` of its nominal span on every side,
/// truncated to whole pixels.
fn inset_rect(rect: PixelRect, frac: f32) -> PixelRect {
    let dx = ((rect.x1 - rect.x0) as f32 * frac) as i64;
    let dy = ((rect.y1 - rect.y0) as f32 * frac) as i64;
    PixelRect {
        x0: rect.x0 + dx,
        y0: rect.y0 + dy,
        x1: rect.x1 - dx,
        y1: rect.y1 - dy,
    }
}
