//! 7x7 interior-corner lattice assembly.
//!
//! An 8x8 board exposes 49 interior line crossings. The detector returns
//! them in arbitrary order; this module reshapes the cloud into a logical
//! 7x7 matrix and rejects clouds that do not form a clean lattice.

use chess_eye_core::Corner;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point2;

use crate::error::CalibrationError;

/// Interior corners, `lattice[row][col]` with rows ascending +y (towards
/// the bottom of the frame) and columns ascending +x.
pub(crate) type Lattice = [[Point2<f32>; 7]; 7];

pub(crate) const LATTICE_SIDE: usize = 7;
const LATTICE_CORNERS: usize = LATTICE_SIDE * LATTICE_SIDE;

/// Reshape detected corners into the interior lattice.
///
/// Keeps the 49 strongest corners, projects them onto the grid axes
/// estimated from the corner orientations, splits each projection at its
/// six widest gaps and validates that the spacing is uniform. Any failure
/// maps to [`CalibrationError::LatticeNotFound`].
pub(crate) fn assemble_lattice(
    corners: &[Corner],
    spacing_tolerance: f32,
) -> Result<Lattice, CalibrationError> {
    let not_found = CalibrationError::LatticeNotFound {
        corners: corners.len(),
    };
    if corners.len() < LATTICE_CORNERS {
        return Err(not_found);
    }

    let mut picked: Vec<&Corner> = corners.iter().collect();
    picked.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    picked.truncate(LATTICE_CORNERS);

    let axis = grid_axis(&picked);
    let (sin, cos) = axis.sin_cos();
    let u: Vec<f32> = picked
        .iter()
        .map(|c| c.position.x * cos + c.position.y * sin)
        .collect();
    let v: Vec<f32> = picked
        .iter()
        .map(|c| -c.position.x * sin + c.position.y * cos)
        .collect();

    // Columns must cluster as cleanly as rows before any row is trusted.
    let rows = split_by_gaps(&v).ok_or(not_found.clone())?;
    if split_by_gaps(&u).is_none() {
        return Err(not_found);
    }

    let mut lattice = [[Point2::new(0.0_f32, 0.0); LATTICE_SIDE]; LATTICE_SIDE];
    for (i, row) in rows.iter().enumerate() {
        let mut by_u: Vec<usize> = row.clone();
        by_u.sort_by(|&a, &b| u[a].total_cmp(&u[b]));
        for (j, &k) in by_u.iter().enumerate() {
            lattice[i][j] = picked[k].position;
        }
    }

    check_spacing(&lattice, &picked, spacing_tolerance).map_err(|()| not_found)?;
    normalize_lattice(&mut lattice);
    Ok(lattice)
}

/// Dominant grid axis, radians. Corner orientations mark the light-square
/// diagonal, so the lattice axes sit 45 degrees away; the doubled-angle
/// circular mean tolerates the mod-pi wraparound of the orientations.
fn grid_axis(corners: &[&Corner]) -> f32 {
    let mut sin_sum = 0.0_f32;
    let mut cos_sum = 0.0_f32;
    for corner in corners {
        let (s, c) = (2.0 * corner.orientation).sin_cos();
        sin_sum += s;
        cos_sum += c;
    }
    0.5 * sin_sum.atan2(cos_sum) + std::f32::consts::FRAC_PI_4
}

/// Split projections into seven clusters at the six widest gaps. `None`
/// when any cluster does not hold exactly seven points.
fn split_by_gaps(proj: &[f32]) -> Option<Vec<Vec<usize>>> {
    let mut order: Vec<usize> = (0..proj.len()).collect();
    order.sort_by(|&a, &b| proj[a].total_cmp(&proj[b]));

    let mut gaps: Vec<(usize, f32)> = order
        .windows(2)
        .enumerate()
        .map(|(k, pair)| (k, proj[pair[1]] - proj[pair[0]]))
        .collect();
    gaps.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut cuts: Vec<usize> = gaps.iter().take(LATTICE_SIDE - 1).map(|g| g.0).collect();
    cuts.sort_unstable();

    let mut groups = Vec::with_capacity(LATTICE_SIDE);
    let mut start = 0;
    for &cut in &cuts {
        groups.push(order[start..=cut].to_vec());
        start = cut + 1;
    }
    groups.push(order[start..].to_vec());

    groups
        .iter()
        .all(|g| g.len() == LATTICE_SIDE)
        .then_some(groups)
}

/// Every step between adjacent lattice points must stay close to the
/// median step, and the median step must agree with the nearest-neighbour
/// spacing of the raw cloud.
fn check_spacing(lattice: &Lattice, picked: &[&Corner], tolerance: f32) -> Result<(), ()> {
    let mut steps = Vec::with_capacity(2 * LATTICE_SIDE * (LATTICE_SIDE - 1));
    for row in lattice {
        for j in 0..LATTICE_SIDE - 1 {
            steps.push((row[j + 1] - row[j]).norm());
        }
    }
    for i in 0..LATTICE_SIDE - 1 {
        for j in 0..LATTICE_SIDE {
            steps.push((lattice[i + 1][j] - lattice[i][j]).norm());
        }
    }

    let median_step = median(&mut steps.clone());
    for &step in &steps {
        if (step - median_step).abs() > tolerance * median_step {
            log::debug!("lattice step {step:.1}px deviates from median {median_step:.1}px");
            return Err(());
        }
    }

    let nn_spacing = median_nn_spacing(picked);
    if (median_step - nn_spacing).abs() > tolerance * nn_spacing {
        log::debug!(
            "lattice step {median_step:.1}px disagrees with corner spacing {nn_spacing:.1}px"
        );
        return Err(());
    }
    Ok(())
}

/// Median distance from each corner to its nearest distinct neighbour.
fn median_nn_spacing(corners: &[&Corner]) -> f32 {
    let coords: Vec<[f32; 2]> = corners
        .iter()
        .map(|c| [c.position.x, c.position.y])
        .collect();
    let tree: KdTree<f32, 2> = (&coords).into();

    let mut spacings = Vec::with_capacity(coords.len());
    for point in &coords {
        let hits = tree.nearest_n::<SquaredEuclidean>(point, 2);
        if let Some(other) = hits.into_iter().find(|n| n.distance > 0.0) {
            spacings.push(other.distance.sqrt());
        }
    }
    median(&mut spacings)
}

fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

/// Force rows to ascend +y and columns to ascend +x. The axis estimate is
/// blind to quadrant, so the assembled matrix may come out transposed or
/// reversed along either axis.
pub(crate) fn normalize_lattice(lattice: &mut Lattice) {
    let last = LATTICE_SIDE - 1;

    let col_step = lattice[0][last] - lattice[0][0];
    if col_step.x.abs() < col_step.y.abs() {
        transpose(lattice);
    }
    let col_step = lattice[0][last] - lattice[0][0];
    if col_step.x < 0.0 {
        for row in lattice.iter_mut() {
            row.reverse();
        }
    }
    let row_step = lattice[last][0] - lattice[0][0];
    if row_step.y < 0.0 {
        lattice.reverse();
    }
}

fn transpose(lattice: &mut Lattice) {
    for i in 0..LATTICE_SIDE {
        for j in i + 1..LATTICE_SIDE {
            let held = lattice[i][j];
            lattice[i][j] = lattice[j][i];
            lattice[j][i] = held;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corner(x: f32, y: f32, orientation: f32, strength: f32) -> Corner {
        Corner {
            position: Point2::new(x, y),
            orientation,
            strength,
        }
    }

    /// 49 corners on an exact 40px lattice anchored at (100, 100).
    fn grid_cloud(orientation: f32) -> Vec<Corner> {
        let mut corners = Vec::new();
        for i in 0..LATTICE_SIDE {
            for j in 0..LATTICE_SIDE {
                corners.push(corner(
                    100.0 + 40.0 * j as f32,
                    100.0 + 40.0 * i as f32,
                    orientation,
                    5.0,
                ));
            }
        }
        corners
    }

    fn scramble(mut corners: Vec<Corner>) -> Vec<Corner> {
        corners.reverse();
        corners.rotate_left(17);
        corners
    }

    fn assert_canonical(lattice: &Lattice) {
        for (i, row) in lattice.iter().enumerate() {
            for (j, p) in row.iter().enumerate() {
                assert_relative_eq!(p.x, 100.0 + 40.0 * j as f32, epsilon = 1e-2);
                assert_relative_eq!(p.y, 100.0 + 40.0 * i as f32, epsilon = 1e-2);
            }
        }
    }

    #[test]
    fn scrambled_cloud_reassembles_in_reading_order() {
        let corners = scramble(grid_cloud(3.0 * std::f32::consts::FRAC_PI_4));
        let lattice = assemble_lattice(&corners, 0.25).unwrap();
        assert_canonical(&lattice);
    }

    #[test]
    fn perpendicular_diagonal_orientation_lands_on_the_same_lattice() {
        // This orientation makes the estimated axis run vertically, so
        // assembly has to transpose and reverse to reach canonical order.
        let corners = scramble(grid_cloud(std::f32::consts::FRAC_PI_4));
        let lattice = assemble_lattice(&corners, 0.25).unwrap();
        assert_canonical(&lattice);
    }

    #[test]
    fn too_few_corners_are_reported() {
        let mut corners = grid_cloud(3.0 * std::f32::consts::FRAC_PI_4);
        corners.truncate(48);
        let err = assemble_lattice(&corners, 0.25).unwrap_err();
        assert_eq!(err, CalibrationError::LatticeNotFound { corners: 48 });
    }

    #[test]
    fn weak_clutter_is_dropped_before_assembly() {
        let mut corners = grid_cloud(3.0 * std::f32::consts::FRAC_PI_4);
        for k in 0..15 {
            let x = 90.0 + (k as f32 * 23.0) % 270.0;
            let y = 95.0 + (k as f32 * 31.0) % 255.0;
            corners.push(corner(x, y, 0.3, 0.2));
        }
        let lattice = assemble_lattice(&corners, 0.25).unwrap();
        assert_canonical(&lattice);
    }

    #[test]
    fn uneven_row_spacing_is_rejected() {
        let mut corners = grid_cloud(3.0 * std::f32::consts::FRAC_PI_4);
        for c in corners.iter_mut() {
            // row i = 3 sits at y = 220 on the exact lattice
            if (c.position.y - 220.0).abs() < 1.0 {
                c.position.y += 16.0;
            }
        }
        assert!(assemble_lattice(&corners, 0.25).is_err());
    }

    #[test]
    fn merged_columns_are_rejected() {
        let mut corners = grid_cloud(3.0 * std::f32::consts::FRAC_PI_4);
        for c in corners.iter_mut() {
            if (c.position.x - 140.0).abs() < 1.0 {
                c.position.x = 100.0;
            }
        }
        assert!(assemble_lattice(&corners, 0.25).is_err());
    }

    #[test]
    fn normalization_restores_reading_order() {
        let canonical = assemble_lattice(&grid_cloud(3.0 * std::f32::consts::FRAC_PI_4), 0.25)
            .unwrap();

        let mut upside_down = canonical;
        upside_down.reverse();
        normalize_lattice(&mut upside_down);
        assert_eq!(upside_down, canonical);

        let mut mirrored = canonical;
        for row in mirrored.iter_mut() {
            row.reverse();
        }
        normalize_lattice(&mut mirrored);
        assert_eq!(mirrored, canonical);
    }
}
