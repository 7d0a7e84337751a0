//! Tunables for the cell change scorer.

use serde::{Deserialize, Serialize};

/// Weights and thresholds of [`ChangeScorer`](crate::ChangeScorer).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreParams {
    /// Weight of the mean-intensity-difference term.
    pub color_weight: f32,
    /// Weight of the structural `1 - SSIM` term.
    pub ssim_weight: f32,
    /// Score deduction per ratio-test feature match.
    pub match_penalty: f32,
    /// Lowe ratio for the 2-NN feature match test.
    pub ratio_threshold: f32,
    /// Cells with this many deduplicated feature matches or more are
    /// considered unchanged and never enter the candidate list.
    pub max_feature_matches: usize,
    /// Length cap of the ranked candidate list.
    pub max_candidates: usize,
    /// Fraction of the cell trimmed from every side before feature
    /// detection, so texture spilling over from adjacent cells does not
    /// register as a match.
    pub inset_frac: f32,
    /// Side length of the uniform SSIM window. Clamped down (odd) when a
    /// border crop is smaller than the window.
    pub ssim_window: usize,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            color_weight: 0.5,
            ssim_weight: 0.5,
            match_penalty: 0.03,
            ratio_threshold: 0.75,
            max_feature_matches: 5,
            max_candidates: 10,
            inset_frac: 0.1,
            ssim_window: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let params: ScoreParams = serde_json::from_str(r#"{"match_penalty": 0.05}"#).unwrap();
        assert!((params.match_penalty - 0.05).abs() < 1e-6);
        assert_eq!(params.max_candidates, 10);
        assert_eq!(params.ssim_window, 7);
    }
}
