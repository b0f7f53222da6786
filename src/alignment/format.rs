//! Source formats and the scene convention each one implies.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::VolumeDimension;
use crate::error::InspectError;

/// Alignment file formats the loader understands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum AlignmentFormat {
    /// CryoET Data Portal alignment JSON.
    #[serde(rename = "portal")]
    CryoEtDataPortal,
    /// IMOD basename bundle (`.xf`, `.tlt`, ...).
    #[serde(rename = "imod")]
    Imod,
    /// AreTomo3 `.aln` log.
    #[default]
    #[serde(rename = "aretomo3")]
    AreTomo3,
}

impl AlignmentFormat {
    /// All formats, in selector order.
    pub const ALL: [Self; 3] =
        [Self::CryoEtDataPortal, Self::Imod, Self::AreTomo3];

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CryoEtDataPortal => "CryoET Data Portal",
            Self::Imod => "IMOD",
            Self::AreTomo3 => "AreTomo3",
        }
    }

    /// Scene convention for volumes reconstructed from this format.
    #[must_use]
    pub const fn convention(self) -> SceneConvention {
        match self {
            Self::CryoEtDataPortal => PORTAL_CONVENTION,
            Self::Imod => IMOD_CONVENTION,
            Self::AreTomo3 => ARETOMO3_CONVENTION,
        }
    }
}

impl fmt::Display for AlignmentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AlignmentFormat {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "cryoetdataportal" | "portal" | "cdp" => Ok(Self::CryoEtDataPortal),
            "imod" => Ok(Self::Imod),
            "aretomo3" | "aretomo" => Ok(Self::AreTomo3),
            _ => Err(InspectError::UnknownFormat(s.to_owned())),
        }
    }
}

/// Which volume-dimension component lies along each local axis of the
/// volume object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordOrder(pub [usize; 3]);

impl CoordOrder {
    /// x, y, z stored as x, y, z.
    pub const IDENTITY: Self = Self([0, 1, 2]);
    /// x, y, z stored as x, z, y (IMOD full reconstructions).
    pub const XZY: Self = Self([0, 2, 1]);

    /// Extent of the volume object along its local X, Y, Z.
    #[must_use]
    pub fn local_extent(self, dim: VolumeDimension) -> DVec3 {
        let d = dim.to_array();
        DVec3::new(d[self.0[0]], d[self.0[1]], d[self.0[2]])
    }

    /// Inverse of [`local_extent`](Self::local_extent): recover x, y, z from
    /// an extent measured along the object's local axes.
    #[must_use]
    pub fn global_from_local(self, local: DVec3) -> [f64; 3] {
        let l = local.to_array();
        let mut out = [0.0; 3];
        for (axis, &component) in self.0.iter().enumerate() {
            out[component] = l[axis];
        }
        out
    }
}

/// Fixed placement correction applied to every section of a format.
///
/// These constants are carried as-is; whether they hold for every dataset
/// of a format has not been established.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneConvention {
    /// Rotation about global X applied before the tilt, in degrees.
    pub x_rotation_degrees: f64,
    /// Axis permutation of the volume object.
    pub coord_order: CoordOrder,
}

/// CryoET Data Portal volumes are stored x, y, z with no correction.
pub const PORTAL_CONVENTION: SceneConvention = SceneConvention {
    x_rotation_degrees: 0.0,
    coord_order: CoordOrder::IDENTITY,
};

/// AreTomo3 volumes are stored x, y, z with no correction.
pub const ARETOMO3_CONVENTION: SceneConvention = SceneConvention {
    x_rotation_degrees: 0.0,
    coord_order: CoordOrder::IDENTITY,
};

/// IMOD full reconstructions keep thickness along Y; a -90° turn about X
/// brings it onto Z.
pub const IMOD_CONVENTION: SceneConvention = SceneConvention {
    x_rotation_degrees: -90.0,
    coord_order: CoordOrder::XZY,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selector_labels() {
        for format in AlignmentFormat::ALL {
            assert_eq!(
                format.label().parse::<AlignmentFormat>().unwrap(),
                format
            );
        }
        assert_eq!(
            "cdp".parse::<AlignmentFormat>().unwrap(),
            AlignmentFormat::CryoEtDataPortal
        );
        assert!("etomo-legacy".parse::<AlignmentFormat>().is_err());
    }

    #[test]
    fn coord_order_round_trips() {
        let dim = VolumeDimension::new(10.0, 20.0, 4.0).unwrap();
        let local = CoordOrder::XZY.local_extent(dim);
        assert_eq!(local, DVec3::new(10.0, 4.0, 20.0));
        assert_eq!(CoordOrder::XZY.global_from_local(local), [10.0, 20.0, 4.0]);
    }

    #[test]
    fn imod_is_the_only_corrected_format() {
        assert_eq!(
            AlignmentFormat::Imod.convention().x_rotation_degrees,
            -90.0
        );
        assert_eq!(
            AlignmentFormat::AreTomo3.convention(),
            AlignmentFormat::CryoEtDataPortal.convention()
        );
    }
}
