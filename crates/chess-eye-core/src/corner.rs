use nalgebra::Point2;

/// Subpixel lattice corner. The orientation is the direction of the
/// light-square diagonal through the corner, mod pi.
#[derive(Clone, Copy, Debug)]
pub struct Corner {
    pub position: Point2<f32>,
    pub orientation: f32,
    pub strength: f32,
}
