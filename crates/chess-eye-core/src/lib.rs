//! Core image, geometry and board-grid types for chess move recognition.
//!
//! This crate is intentionally small. It owns the grayscale buffer types,
//! the rotation warp and the calibrated [`BoardGrid`] geometry shared by
//! the detection crates; it knows nothing about chess rules or any
//! concrete corner detector.

mod corner;
mod grid;
mod image;
mod logger;
mod warp;

pub use corner::Corner;
pub use grid::BoardGrid;
pub use image::{
    crop_gray, sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, PixelRect,
};
pub use warp::{rotated_canvas_size, rotation_about_center};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
