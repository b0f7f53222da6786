//! Alignment-to-scene transform computation.
//!
//! Everything here is pure: given an [`Alignment`](crate::alignment::Alignment)
//! dimension, a [`SceneConvention`] and one section's parameters, compute the
//! rigid transforms the scene builder and controller assign to objects.
//!
//! Composition reads right to left, the way the transforms act on a point:
//!
//! - volume: `R_y(tilt) · R_x(convention) · T(-local_extent / 2)`
//! - aligned image: `R_z(-rot) · T(-offset · step) · T(-w/2, -h/2, depth)`
//!
//! The image rotation is applied last so it pivots about the already
//! shifted position, matching how the formats calibrate per-section
//! corrections.

use glam::{DAffine3, DVec2, DVec3};

use crate::alignment::{SceneConvention, SectionParams, VolumeDimension};

/// Multiplier on the volume's Z extent for the image plane depth.
pub const DEPTH_SCALE: f64 = -4.0;
/// Constant added to the scaled depth.
pub const DEPTH_BIAS: f64 = 1000.0;
/// Multiplier on the volume's Z extent for the axes indicator.
pub const AXES_Z_SCALE: f64 = 2.0;

/// Rotation about `axis` by `degrees`.
#[must_use]
pub fn rotation(axis: DVec3, degrees: f64) -> DAffine3 {
    DAffine3::from_axis_angle(axis, degrees.to_radians())
}

/// Pure translation.
#[must_use]
pub fn translation(offset: DVec3) -> DAffine3 {
    DAffine3::from_translation(offset)
}

/// Placement of the reconstructed volume for a section tilted by
/// `tilt_angle` degrees.
///
/// The volume object's geometric center (in its local axis order) lands on
/// the origin; the convention's fixed correction is applied before the
/// tilt.
#[must_use]
pub fn volume_transform(
    dim: VolumeDimension,
    convention: &SceneConvention,
    tilt_angle: f64,
) -> DAffine3 {
    let half = convention.coord_order.local_extent(dim) / 2.0;
    rotation(DVec3::Y, tilt_angle)
        * rotation(DVec3::X, convention.x_rotation_degrees)
        * translation(-half)
}

/// Depth at which all tilt images are placed, below the volume.
#[must_use]
pub fn depth_offset(dim: VolumeDimension) -> f64 {
    DEPTH_SCALE * dim.z + DEPTH_BIAS
}

/// Half-lengths of the axes indicator arrows.
#[must_use]
pub fn axes_extent(dim: VolumeDimension) -> DVec3 {
    DVec3::new(dim.x, dim.y, AXES_Z_SCALE * dim.z)
}

/// Unit basis of the per-section images.
///
/// A real tilt series is measured in pixels and the per-section offsets are
/// in pixels too, so both scale by the pixel step. Placeholder images take
/// the declared volume size directly and use offsets unscaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageBasis {
    /// Images come from a tilt-series file.
    TiltSeries {
        /// Image width in pixels.
        width_px: u32,
        /// Image height in pixels.
        height_px: u32,
        /// Physical size of one pixel along X and Y.
        step: DVec2,
    },
    /// Placeholder images with a declared physical size.
    Declared {
        /// Physical width.
        width: f64,
        /// Physical height.
        height: f64,
    },
}

impl ImageBasis {
    /// Physical width and height of an image.
    #[must_use]
    pub fn extent(&self) -> DVec2 {
        match *self {
            Self::TiltSeries {
                width_px,
                height_px,
                step,
            } => DVec2::new(f64::from(width_px), f64::from(height_px)) * step,
            Self::Declared { width, height } => DVec2::new(width, height),
        }
    }

    /// Factor converting a section offset into physical units.
    #[must_use]
    pub fn offset_scale(&self) -> DVec2 {
        match *self {
            Self::TiltSeries { step, .. } => step,
            Self::Declared { .. } => DVec2::ONE,
        }
    }
}

/// The image plane shared by every section: unit basis plus depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlane {
    /// Unit basis of the images.
    pub basis: ImageBasis,
    /// Depth along Z, from [`depth_offset`].
    pub z_offset: f64,
}

impl ImagePlane {
    /// Recentre an image in X/Y and move it to the plane depth.
    #[must_use]
    pub fn base_transform(&self) -> DAffine3 {
        image_base_transform(self.basis.extent(), self.z_offset)
    }

    /// Placement of a raw image: plane depth only, not recentred, so the
    /// raw corner sits on the volume axis.
    #[must_use]
    pub fn raw_transform(&self) -> DAffine3 {
        translation(DVec3::new(0.0, 0.0, self.z_offset))
    }

    /// Placement of the aligned image for `section`.
    #[must_use]
    pub fn image_transform(&self, section: &SectionParams) -> DAffine3 {
        image_transform(&self.basis, self.z_offset, section)
    }
}

/// `T(-w/2, -h/2, z_offset)`.
#[must_use]
pub fn image_base_transform(extent: DVec2, z_offset: f64) -> DAffine3 {
    translation(DVec3::new(-extent.x / 2.0, -extent.y / 2.0, z_offset))
}

/// Placement of one aligned tilt image.
#[must_use]
pub fn image_transform(
    basis: &ImageBasis,
    z_offset: f64,
    section: &SectionParams,
) -> DAffine3 {
    let scale = basis.offset_scale();
    let shift = DVec3::new(
        -section.x_offset * scale.x,
        -section.y_offset * scale.y,
        0.0,
    );
    rotation(DVec3::Z, -section.tilt_axis_rotation)
        * translation(shift)
        * image_base_transform(basis.extent(), z_offset)
}
