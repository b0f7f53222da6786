//! Tilt-series alignment data model.
//!
//! An [`Alignment`] is the normalized form every format adapter produces:
//! the reconstructed volume's dimension plus one [`SectionParams`] per
//! acquired tilt image. It is validated once on construction and read-only
//! afterwards.

mod format;

pub use format::{
    AlignmentFormat, CoordOrder, SceneConvention, ARETOMO3_CONVENTION,
    IMOD_CONVENTION, PORTAL_CONVENTION,
};
use glam::DVec3;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::InspectError;

/// Physical extent of the reconstructed volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeDimension {
    /// Extent along X.
    pub x: f64,
    /// Extent along Y.
    pub y: f64,
    /// Extent along Z (thickness).
    pub z: f64,
}

impl VolumeDimension {
    /// Build a dimension, rejecting non-finite or non-positive components.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::InvalidDimension`] for a non-finite or
    /// non-positive component.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self, InspectError> {
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(InspectError::InvalidDimension(format!(
                    "{axis} = {value}"
                )));
            }
        }
        Ok(Self { x, y, z })
    }

    /// Components as `[x, y, z]`.
    #[must_use]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Components as a vector.
    #[must_use]
    pub fn to_vec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }
}

/// Alignment parameters of one tilt image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionParams {
    /// Position of the image in the tilt series.
    pub z_index: usize,
    /// Stage tilt in degrees (rotation about global Y).
    pub tilt_angle: f64,
    /// In-plane rotation of the tilt axis in degrees (about global Z).
    pub tilt_axis_rotation: f64,
    /// In-plane shift along X.
    pub x_offset: f64,
    /// In-plane shift along Y.
    pub y_offset: f64,
    /// Additional per-section rotation about X, when the format has one.
    pub volume_x_rotation: Option<f64>,
}

/// A validated tilt-series alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    volume_dimension: VolumeDimension,
    sections: Vec<SectionParams>,
}

impl Alignment {
    /// Validate and wrap a section list.
    ///
    /// Sections keep the order they are given in. Fails on an empty list or
    /// when two sections share a z-index.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::EmptyAlignment`] or
    /// [`InspectError::DuplicateZIndex`].
    pub fn new(
        volume_dimension: VolumeDimension,
        sections: Vec<SectionParams>,
    ) -> Result<Self, InspectError> {
        if sections.is_empty() {
            return Err(InspectError::EmptyAlignment);
        }
        let mut seen = FxHashSet::default();
        for section in &sections {
            if !seen.insert(section.z_index) {
                return Err(InspectError::DuplicateZIndex(section.z_index));
            }
        }
        Ok(Self {
            volume_dimension,
            sections,
        })
    }

    /// Dimension of the reconstructed volume.
    #[must_use]
    pub fn volume_dimension(&self) -> VolumeDimension {
        self.volume_dimension
    }

    /// Sections in source order.
    #[must_use]
    pub fn sections(&self) -> &[SectionParams] {
        &self.sections
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false for a constructed alignment; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Largest z-index present.
    #[must_use]
    pub fn max_z_index(&self) -> usize {
        self.sections.iter().map(|s| s.z_index).max().unwrap_or(0)
    }

    /// Section at list position `row`.
    #[must_use]
    pub fn section(&self, row: usize) -> Option<&SectionParams> {
        self.sections.get(row)
    }

    /// Section carrying z-index `z`.
    #[must_use]
    pub fn section_for_z(&self, z: usize) -> Option<&SectionParams> {
        self.sections.iter().find(|s| s.z_index == z)
    }

    /// List position of the section carrying z-index `z`.
    #[must_use]
    pub fn position_of_z(&self, z: usize) -> Option<usize> {
        self.sections.iter().position(|s| s.z_index == z)
    }
}

#[cfg(test)]
pub(crate) fn section(z_index: usize, tilt_angle: f64) -> SectionParams {
    SectionParams {
        z_index,
        tilt_angle,
        tilt_axis_rotation: 0.0,
        x_offset: 0.0,
        y_offset: 0.0,
        volume_x_rotation: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim() -> VolumeDimension {
        VolumeDimension::new(10000.0, 10000.0, 4000.0).unwrap()
    }

    #[test]
    fn rejects_duplicate_z_index() {
        let err = Alignment::new(
            dim(),
            vec![section(0, -3.0), section(1, 0.0), section(0, 3.0)],
        )
        .unwrap_err();
        assert!(matches!(err, InspectError::DuplicateZIndex(0)));
    }

    #[test]
    fn rejects_empty_section_list() {
        assert!(matches!(
            Alignment::new(dim(), Vec::new()),
            Err(InspectError::EmptyAlignment)
        ));
    }

    #[test]
    fn rejects_degenerate_dimension() {
        assert!(VolumeDimension::new(1.0, 0.0, 1.0).is_err());
        assert!(VolumeDimension::new(f64::NAN, 1.0, 1.0).is_err());
        assert!(VolumeDimension::new(1.0, 1.0, -4.0).is_err());
    }

    #[test]
    fn z_index_lookups_allow_gaps() {
        let ali = Alignment::new(
            dim(),
            vec![section(4, -3.0), section(1, 0.0), section(7, 3.0)],
        )
        .unwrap();
        assert_eq!(ali.max_z_index(), 7);
        assert_eq!(ali.position_of_z(1), Some(1));
        assert_eq!(ali.section_for_z(7).map(|s| s.tilt_angle), Some(3.0));
        assert!(ali.section_for_z(2).is_none());
    }
}
