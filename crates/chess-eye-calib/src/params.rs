use serde::{Deserialize, Serialize};

/// Tunable knobs of the grid calibration pipeline.
///
/// All fields have defaults, so a partial config deserializes cleanly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Relative corner response threshold of the ChESS detector.
    pub threshold_rel: f32,
    /// Non-maximum suppression radius of the detector, pixels.
    pub nms_radius: u32,
    /// Corners weaker than this are dropped before lattice assembly.
    pub min_corner_strength: f32,
    /// Tolerated relative deviation of a lattice step from the median step.
    pub spacing_tolerance: f32,
    /// Rotation applied to the photo before the first detection pass, degrees.
    pub initial_rotation_deg: f32,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            threshold_rel: 0.2,
            nms_radius: 2,
            min_corner_strength: 0.0,
            spacing_tolerance: 0.25,
            initial_rotation_deg: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let params: CalibrationParams =
            serde_json::from_str(r#"{"spacing_tolerance": 0.4}"#).unwrap();
        assert_eq!(params.spacing_tolerance, 0.4);
        assert_eq!(params.threshold_rel, 0.2);
        assert_eq!(params.nms_radius, 2);
        assert_eq!(params.initial_rotation_deg, 0.0);
    }
}
