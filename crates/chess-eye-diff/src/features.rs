//! Sparse feature matching between two crops of the same cell.
//!
//! A piece arriving or leaving destroys the fine texture of a cell, while
//! lighting flicker and slight camera motion keep most of it. Harris
//! corners with normalized patch descriptors are enough to tell the two
//! apart; the match count feeds the score penalty and the eligibility
//! gate in the scorer.

use std::collections::HashSet;

use nalgebra::Point2;

use chess_eye_core::{sample_bilinear, GrayImageView};

/// Harris corner response constant.
const HARRIS_K: f32 = 0.04;
/// Keep responses above this fraction of the strongest one.
const RESPONSE_REL_THRESHOLD: f32 = 0.01;
/// Non-maximum suppression radius in pixels.
const NMS_RADIUS: i32 = 2;
/// Hard cap on keypoints per crop.
const MAX_KEYPOINTS: usize = 64;
/// Descriptors sample a DESC_GRID x DESC_GRID point lattice around the
/// keypoint, DESC_SPACING pixels apart.
const DESC_GRID: usize = 8;
const DESC_SPACING: f32 = 2.0;
/// Pixels a keypoint keeps clear of the crop border so its whole sample
/// lattice stays inside.
const PATCH_MARGIN: i32 = 8;

/// A keypoint with its normalized patch descriptor.
pub(crate) struct Descriptor {
    pub point: Point2<f32>,
    values: [f32; DESC_GRID * DESC_GRID],
}

/// Match counts of one before/after crop pair.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MatchCounts {
    /// Ratio-test survivors, duplicates included.
    pub raw: usize,
    /// After dropping duplicate source points, then duplicate
    /// destination points.
    pub unique: usize,
}

/// Detects Harris corners and describes each with a mean/std normalized
/// patch. Crops too small to hold a single patch yield nothing.
pub(crate) fn detect_descriptors(crop: &GrayImageView<'_>) -> Vec<Descriptor> {
    let (w, h) = (crop.width as i32, crop.height as i32);
    if w <= 2 * PATCH_MARGIN || h <= 2 * PATCH_MARGIN {
        return Vec::new();
    }

    let mut response = vec![0.0f32; crop.width * crop.height];
    let mut strongest = 0.0f32;
    for y in PATCH_MARGIN..h - PATCH_MARGIN {
        for x in PATCH_MARGIN..w - PATCH_MARGIN {
            let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let gx = (crop.get(x + dx + 1, y + dy) as f32
                        - crop.get(x + dx - 1, y + dy) as f32)
                        * 0.5;
                    let gy = (crop.get(x + dx, y + dy + 1) as f32
                        - crop.get(x + dx, y + dy - 1) as f32)
                        * 0.5;
                    sxx += gx * gx;
                    syy += gy * gy;
                    sxy += gx * gy;
                }
            }
            let trace = sxx + syy;
            let r = sxx * syy - sxy * sxy - HARRIS_K * trace * trace;
            response[y as usize * crop.width + x as usize] = r;
            strongest = strongest.max(r);
        }
    }
    if strongest <= 0.0 {
        return Vec::new();
    }

    let threshold = RESPONSE_REL_THRESHOLD * strongest;
    let mut peaks: Vec<(f32, i32, i32)> = Vec::new();
    for y in PATCH_MARGIN..h - PATCH_MARGIN {
        'candidates: for x in PATCH_MARGIN..w - PATCH_MARGIN {
            let r = response[y as usize * crop.width + x as usize];
            if r < threshold {
                continue;
            }
            for dy in -NMS_RADIUS..=NMS_RADIUS {
                for dx in -NMS_RADIUS..=NMS_RADIUS {
                    if response[(y + dy) as usize * crop.width + (x + dx) as usize] > r {
                        continue 'candidates;
                    }
                }
            }
            peaks.push((r, x, y));
        }
    }

    peaks.sort_by(|a, b| b.0.total_cmp(&a.0));
    peaks.truncate(MAX_KEYPOINTS);

    let mut out = Vec::with_capacity(peaks.len());
    for &(_, x, y) in &peaks {
        if let Some(values) = patch_descriptor(crop, x as f32, y as f32) {
            out.push(Descriptor {
                point: Point2::new(x as f32, y as f32),
                values,
            });
        }
    }
    out
}

/// Bilinear patch samples around `(cx, cy)`, normalized to zero mean and
/// unit deviation. Flat patches carry no structure and are dropped.
fn patch_descriptor(
    crop: &GrayImageView<'_>,
    cx: f32,
    cy: f32,
) -> Option<[f32; DESC_GRID * DESC_GRID]> {
    let mut values = [0.0f32; DESC_GRID * DESC_GRID];
    let half = (DESC_GRID as f32 - 1.0) / 2.0;
    for gy in 0..DESC_GRID {
        for gx in 0..DESC_GRID {
            let sx = cx + (gx as f32 - half) * DESC_SPACING;
            let sy = cy + (gy as f32 - half) * DESC_SPACING;
            values[gy * DESC_GRID + gx] = sample_bilinear(crop, sx, sy);
        }
    }

    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let deviation = (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n).sqrt();
    if deviation < 1e-3 {
        return None;
    }
    for v in &mut values {
        *v = (*v - mean) / deviation;
    }
    Some(values)
}

/// Brute-force 2-NN matching with the Lowe ratio test, then duplicate
/// removal first by source point, then by destination point. Fewer than
/// two candidate descriptors on the `after` side cannot form a 2-NN pair,
/// so nothing matches.
pub(crate) fn match_descriptors(
    before: &[Descriptor],
    after: &[Descriptor],
    ratio: f32,
) -> MatchCounts {
    if after.len() < 2 {
        return MatchCounts::default();
    }

    let mut pairs: Vec<(Point2<f32>, Point2<f32>)> = Vec::new();
    for d in before {
        let mut best = f32::INFINITY;
        let mut second = f32::INFINITY;
        let mut best_idx = 0usize;
        for (i, t) in after.iter().enumerate() {
            let dist = squared_distance(&d.values, &t.values);
            if dist < best {
                second = best;
                best = dist;
                best_idx = i;
            } else if dist < second {
                second = dist;
            }
        }
        // Ratio test on squared distances.
        if best < ratio * ratio * second {
            pairs.push((d.point, after[best_idx].point));
        }
    }

    let raw = pairs.len();
    retain_first_by(&mut pairs, |p| p.0);
    retain_first_by(&mut pairs, |p| p.1);
    MatchCounts {
        raw,
        unique: pairs.len(),
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Keeps the first pair for every distinct key point.
fn retain_first_by(
    pairs: &mut Vec<(Point2<f32>, Point2<f32>)>,
    key: impl Fn(&(Point2<f32>, Point2<f32>)) -> Point2<f32>,
) {
    let mut seen = HashSet::new();
    pairs.retain(|p| {
        let k = key(p);
        seen.insert((k.x.to_bits(), k.y.to_bits()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_eye_core::GrayImage;

    fn descriptor(x: f32, y: f32, first: f32, second: f32) -> Descriptor {
        let mut values = [0.0f32; DESC_GRID * DESC_GRID];
        values[0] = first;
        values[1] = second;
        Descriptor {
            point: Point2::new(x, y),
            values,
        }
    }

    /// Flat background with a bright block, corner-like at its edges.
    fn dotted_crop(width: usize, height: usize, dots: &[(usize, usize, u8)]) -> GrayImage {
        let mut img = GrayImage::from_vec(width, height, vec![60; width * height]).unwrap();
        for &(x, y, value) in dots {
            for dy in 0..2 {
                for dx in 0..2 {
                    img.data[(y + dy) * width + x + dx] = value;
                }
            }
        }
        img
    }

    #[test]
    fn flat_crops_yield_no_descriptors() {
        let img = GrayImage::from_vec(32, 32, vec![120; 32 * 32]).unwrap();
        assert!(detect_descriptors(&img.view()).is_empty());
    }

    #[test]
    fn crops_smaller_than_a_patch_yield_no_descriptors() {
        let img = dotted_crop(16, 16, &[(8, 8, 255)]);
        assert!(detect_descriptors(&img.view()).is_empty());
    }

    #[test]
    fn an_isolated_dot_is_detected_near_its_position() {
        let img = dotted_crop(32, 32, &[(15, 15, 255)]);
        let descriptors = detect_descriptors(&img.view());
        assert!(!descriptors.is_empty());
        for d in &descriptors {
            assert!((d.point.x - 15.5).abs() < 3.0, "x = {}", d.point.x);
            assert!((d.point.y - 15.5).abs() < 3.0, "y = {}", d.point.y);
        }
    }

    #[test]
    fn identical_descriptor_sets_all_match() {
        let before = vec![
            descriptor(1.0, 1.0, 5.0, 0.0),
            descriptor(2.0, 2.0, 0.0, 5.0),
            descriptor(3.0, 3.0, -5.0, 5.0),
        ];
        let after = vec![
            descriptor(4.0, 4.0, 5.0, 0.0),
            descriptor(5.0, 5.0, 0.0, 5.0),
            descriptor(6.0, 6.0, -5.0, 5.0),
        ];
        let counts = match_descriptors(&before, &after, 0.75);
        assert_eq!(counts.raw, 3);
        assert_eq!(counts.unique, 3);
    }

    #[test]
    fn a_single_after_descriptor_cannot_form_a_knn_pair() {
        let before = vec![descriptor(1.0, 1.0, 5.0, 0.0)];
        let after = vec![descriptor(1.0, 1.0, 5.0, 0.0)];
        let counts = match_descriptors(&before, &after, 0.75);
        assert_eq!(counts.raw, 0);
    }

    #[test]
    fn ambiguous_matches_fail_the_ratio_test() {
        // Nearest at distance^2 = 1.0, second at 1.21: 1.0 >= 0.5625 * 1.21.
        let before = vec![descriptor(1.0, 1.0, 0.0, 0.0)];
        let after = vec![
            descriptor(2.0, 2.0, 1.0, 0.0),
            descriptor(3.0, 3.0, 1.1, 0.0),
        ];
        let counts = match_descriptors(&before, &after, 0.75);
        assert_eq!(counts.raw, 0);
        assert_eq!(counts.unique, 0);
    }

    #[test]
    fn duplicate_destinations_collapse_to_one() {
        // Both sources land on the same target point.
        let before = vec![
            descriptor(1.0, 1.0, 5.0, 0.0),
            descriptor(2.0, 2.0, 5.0, 0.1),
        ];
        let after = vec![
            descriptor(9.0, 9.0, 5.0, 0.0),
            descriptor(8.0, 8.0, -40.0, 0.0),
        ];
        let counts = match_descriptors(&before, &after, 0.75);
        assert_eq!(counts.raw, 2);
        assert_eq!(counts.unique, 1);
    }
}
