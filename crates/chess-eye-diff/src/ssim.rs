//! Structural similarity over uniform windows.
//!
//! Plain SSIM with box windows: per-window means, unbiased variances and
//! covariance, stabilizers `C1 = (0.01 L)^2` and `C2 = (0.03 L)^2` for
//! `L = 255`, averaged over every window that lies fully inside the crop.

use chess_eye_core::GrayImageView;

const K1: f64 = 0.01;
const K2: f64 = 0.03;
const DYNAMIC_RANGE: f64 = 255.0;

/// Largest odd window that fits both dimensions, at most `preferred`.
pub(crate) fn effective_window(preferred: usize, width: usize, height: usize) -> usize {
    let cap = preferred.min(width).min(height).max(1);
    if cap % 2 == 0 {
        cap - 1
    } else {
        cap
    }
}

/// Mean SSIM of two same-sized crops in `[~-1, 1]`, 1 for identical
/// pixels. Empty crops compare as identical.
pub(crate) fn mean_ssim(a: &GrayImageView<'_>, b: &GrayImageView<'_>, window: usize) -> f64 {
    debug_assert_eq!((a.width, a.height), (b.width, b.height));
    if a.width == 0 || a.height == 0 {
        return 1.0;
    }

    let win = effective_window(window, a.width, a.height);
    let n = (win * win) as f64;
    // A 1x1 window has no sample variance; SSIM then reduces to its
    // luminance term.
    let cov_norm = if win > 1 { n / (n - 1.0) } else { 0.0 };
    let c1 = (K1 * DYNAMIC_RANGE) * (K1 * DYNAMIC_RANGE);
    let c2 = (K2 * DYNAMIC_RANGE) * (K2 * DYNAMIC_RANGE);

    let mut total = 0.0;
    let mut windows = 0usize;
    for y0 in 0..=a.height - win {
        for x0 in 0..=a.width - win {
            let (mut sa, mut sb) = (0.0f64, 0.0f64);
            let (mut saa, mut sbb, mut sab) = (0.0f64, 0.0f64, 0.0f64);
            for dy in 0..win {
                let row_a = &a.data[(y0 + dy) * a.width + x0..][..win];
                let row_b = &b.data[(y0 + dy) * b.width + x0..][..win];
                for (&pa, &pb) in row_a.iter().zip(row_b) {
                    let (pa, pb) = (pa as f64, pb as f64);
                    sa += pa;
                    sb += pb;
                    saa += pa * pa;
                    sbb += pb * pb;
                    sab += pa * pb;
                }
            }
            let ua = sa / n;
            let ub = sb / n;
            let va = cov_norm * (saa / n - ua * ua);
            let vb = cov_norm * (sbb / n - ub * ub);
            let vab = cov_norm * (sab / n - ua * ub);
            total += ((2.0 * ua * ub + c1) * (2.0 * vab + c2))
                / ((ua * ua + ub * ub + c1) * (va + vb + c2));
            windows += 1;
        }
    }
    total / windows as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chess_eye_core::GrayImage;

    fn flat(width: usize, height: usize, value: u8) -> GrayImage {
        GrayImage::from_vec(width, height, vec![value; width * height]).unwrap()
    }

    #[test]
    fn identical_crops_score_one() {
        let data: Vec<u8> = (0..100).map(|i| (i * 7 % 251) as u8).collect();
        let img = GrayImage::from_vec(10, 10, data).unwrap();
        assert_relative_eq!(mean_ssim(&img.view(), &img.view(), 7), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_crops_reduce_to_the_luminance_term() {
        let a = flat(7, 7, 100);
        let b = flat(7, 7, 120);
        // Single window, zero variances: (2*100*120 + C1) / (100^2 + 120^2 + C1).
        let c1 = (0.01f64 * 255.0) * (0.01f64 * 255.0);
        let expected = (2.0 * 100.0 * 120.0 + c1) / (100.0 * 100.0 + 120.0 * 120.0 + c1);
        assert_relative_eq!(mean_ssim(&a.view(), &b.view(), 7), expected, epsilon = 1e-9);
    }

    #[test]
    fn opposite_extremes_score_near_zero() {
        let a = flat(9, 9, 0);
        let b = flat(9, 9, 255);
        assert!(mean_ssim(&a.view(), &b.view(), 7) < 0.01);
    }

    #[test]
    fn inverted_gradient_scores_low() {
        let fwd: Vec<u8> = (0..81).map(|i| (i * 3) as u8).collect();
        let rev: Vec<u8> = fwd.iter().rev().copied().collect();
        let a = GrayImage::from_vec(9, 9, fwd).unwrap();
        let b = GrayImage::from_vec(9, 9, rev).unwrap();
        assert!(mean_ssim(&a.view(), &b.view(), 7) < 0.5);
    }

    #[test]
    fn window_clamps_to_tiny_crops() {
        let a = flat(3, 4, 50);
        let b = flat(3, 4, 50);
        assert_eq!(effective_window(7, 3, 4), 3);
        assert_relative_eq!(mean_ssim(&a.view(), &b.view(), 7), 1.0, epsilon = 1e-9);

        let a = flat(1, 5, 10);
        assert_eq!(effective_window(7, 1, 5), 1);
        assert_relative_eq!(mean_ssim(&a.view(), &a.view(), 7), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_crops_compare_as_identical() {
        let a = GrayImage::new(0, 0);
        assert_relative_eq!(mean_ssim(&a.view(), &a.view(), 7), 1.0);
    }
}
