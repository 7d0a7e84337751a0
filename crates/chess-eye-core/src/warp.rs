//! Rotation of a grayscale frame about its centre.
//!
//! The output canvas is enlarged so the whole rotated frame fits; samples
//! that fall outside the source are black. Exact quarter turns go through
//! a lossless pixel permutation instead of resampling.

use crate::image::{sample_bilinear_u8, GrayImage, GrayImageView};

/// Canvas size that contains a `width x height` frame rotated by
/// `angle_deg`.
pub fn rotated_canvas_size(width: usize, height: usize, angle_deg: f32) -> (usize, usize) {
    let rad = angle_deg.to_radians();
    let sin = rad.sin().abs();
    let cos = rad.cos().abs();
    let w = width as f32;
    let h = height as f32;
    (
        (w * cos + h * sin).round() as usize,
        (h * cos + w * sin).round() as usize,
    )
}

fn wrap_degrees(angle_deg: f32) -> f32 {
    let mut a = angle_deg % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    a
}

fn quarter_turns(angle_deg: f32) -> Option<u8> {
    let a = wrap_degrees(angle_deg);
    let k = (a / 90.0).round();
    ((a - k * 90.0).abs() < 1e-3).then(|| (k as u8) % 4)
}

fn rotate_quarter(src: &GrayImageView<'_>, turns: u8) -> GrayImage {
    let w = src.width;
    let h = src.height;
    match turns {
        0 => GrayImage {
            width: w,
            height: h,
            data: src.data.to_vec(),
        },
        // clockwise: the left edge of the source becomes the top edge
        1 => {
            let mut data = vec![0u8; w * h];
            for y in 0..w {
                for x in 0..h {
                    data[y * h + x] = src.data[(h - 1 - x) * w + y];
                }
            }
            GrayImage {
                width: h,
                height: w,
                data,
            }
        }
        2 => GrayImage {
            width: w,
            height: h,
            data: src.data.iter().rev().copied().collect(),
        },
        _ => {
            let mut data = vec![0u8; w * h];
            for y in 0..w {
                for x in 0..h {
                    data[y * h + x] = src.data[x * w + (w - 1 - y)];
                }
            }
            GrayImage {
                width: h,
                height: w,
                data,
            }
        }
    }
}

/// Rotate about the frame centre. Positive angles turn the image
/// clockwise.
pub fn rotation_about_center(src: &GrayImageView<'_>, angle_deg: f32) -> GrayImage {
    if let Some(turns) = quarter_turns(angle_deg) {
        return rotate_quarter(src, turns);
    }

    let (out_w, out_h) = rotated_canvas_size(src.width, src.height, angle_deg);
    let rad = angle_deg.to_radians();
    let sin = rad.sin();
    let cos = rad.cos();
    let cx = src.width as f32 / 2.0;
    let cy = src.height as f32 / 2.0;
    let ox = out_w as f32 / 2.0;
    let oy = out_h as f32 / 2.0;

    let mut data = vec![0u8; out_w * out_h];
    for y in 0..out_h {
        for x in 0..out_w {
            // inverse map: undo the rotation at the output pixel centre
            let dx = x as f32 + 0.5 - ox;
            let dy = y as f32 + 0.5 - oy;
            let sx = cos * dx + sin * dy + cx;
            let sy = -sin * dx + cos * dy + cy;
            data[y * out_w + x] = sample_bilinear_u8(src, sx - 0.5, sy - 0.5);
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data,
    }
}
