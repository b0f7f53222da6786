//! CryoET Data Portal alignment JSON.

use serde::Deserialize;

use super::location::Location;
use crate::alignment::{SectionParams, VolumeDimension};
use crate::error::InspectError;

/// Top level of a portal `alignment.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalAlignment {
    /// Reconstructed volume size, when the record carries one.
    #[serde(default)]
    pub volume_dimension: Option<PortalDimension>,
    /// Offset added to every tilt angle.
    #[serde(default)]
    pub tilt_offset: f64,
    /// Per-section parameters.
    #[serde(default)]
    pub per_section_alignment_parameters: Vec<PortalSection>,
}

/// `volume_dimension` object.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PortalDimension {
    /// Extent along X.
    pub x: f64,
    /// Extent along Y.
    pub y: f64,
    /// Extent along Z.
    pub z: f64,
}

/// One entry of `per_section_alignment_parameters`.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalSection {
    /// Position in the tilt series.
    pub z_index: usize,
    /// Tilt angle in degrees.
    pub tilt_angle: f64,
    /// In-plane shift along X.
    #[serde(default)]
    pub x_offset: f64,
    /// In-plane shift along Y.
    #[serde(default)]
    pub y_offset: f64,
    /// Explicit tilt-axis rotation in degrees.
    #[serde(default)]
    pub tilt_axis_rotation: Option<f64>,
    /// 2×2 in-plane rotation matrix, row-major.
    #[serde(default)]
    pub in_plane_rotation: Option<[[f64; 2]; 2]>,
    /// Rotation about X.
    #[serde(default)]
    pub volume_x_rotation: Option<f64>,
}

impl PortalSection {
    /// Tilt-axis rotation: the explicit field, else the angle of the
    /// in-plane matrix, else zero.
    #[must_use]
    pub fn rotation_degrees(&self) -> f64 {
        self.tilt_axis_rotation
            .or_else(|| {
                self.in_plane_rotation
                    .map(|m| m[1][0].atan2(m[0][0]).to_degrees())
            })
            .unwrap_or(0.0)
    }
}

impl PortalAlignment {
    /// Decode the JSON text read from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Json`] when the text does not decode.
    pub fn parse(text: &str, source: &Location) -> Result<Self, InspectError> {
        serde_json::from_str(text).map_err(|error| InspectError::Json {
            file: source.to_string(),
            error,
        })
    }

    /// Volume size carried by the record, if valid.
    #[must_use]
    pub fn native_dimension(&self) -> Option<VolumeDimension> {
        let d = self.volume_dimension?;
        VolumeDimension::new(d.x, d.y, d.z).ok()
    }

    /// Sections with `tilt_offset` applied.
    #[must_use]
    pub fn sections(&self) -> Vec<SectionParams> {
        self.per_section_alignment_parameters
            .iter()
            .map(|s| SectionParams {
                z_index: s.z_index,
                tilt_angle: s.tilt_angle + self.tilt_offset,
                tilt_axis_rotation: s.rotation_degrees(),
                x_offset: s.x_offset,
                y_offset: s.y_offset,
                volume_x_rotation: s.volume_x_rotation,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "alignment_type": "GLOBAL",
        "volume_dimension": {"x": 4000, "y": 4000, "z": 1200},
        "tilt_offset": 1.5,
        "per_section_alignment_parameters": [
            {"z_index": 0, "tilt_angle": -3.0, "x_offset": 2.0, "y_offset": -1.0,
             "in_plane_rotation": [[0.0, -1.0], [1.0, 0.0]],
             "volume_x_rotation": 0.25, "beam_tilt": 0.0},
            {"z_index": 1, "tilt_angle": 0.0, "tilt_axis_rotation": 84.5}
        ]
    }"#;

    fn src() -> Location {
        Location::parse("alignment.json").unwrap()
    }

    #[test]
    fn decodes_sections_with_offset() {
        let ali = PortalAlignment::parse(JSON, &src()).unwrap();
        let sections = ali.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].tilt_angle, -1.5);
        assert!((sections[0].tilt_axis_rotation - 90.0).abs() < 1e-9);
        assert_eq!(sections[0].volume_x_rotation, Some(0.25));
        assert_eq!(sections[1].tilt_angle, 1.5);
        assert_eq!(sections[1].tilt_axis_rotation, 84.5);
        assert_eq!(sections[1].x_offset, 0.0);
        assert_eq!(
            ali.native_dimension().map(VolumeDimension::to_array),
            Some([4000.0, 4000.0, 1200.0])
        );
    }

    #[test]
    fn missing_dimension_is_none() {
        let ali = PortalAlignment::parse(
            r#"{"per_section_alignment_parameters":
                [{"z_index": 0, "tilt_angle": 0}]}"#,
            &src(),
        )
        .unwrap();
        assert!(ali.native_dimension().is_none());
    }

    #[test]
    fn bad_json_names_the_file() {
        let err = PortalAlignment::parse("{", &src()).unwrap_err();
        assert!(err.to_string().contains("alignment.json"));
    }
}
