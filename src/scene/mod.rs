//! Host scene abstraction and the objects an alignment occupies in it.
//!
//! The inspector never renders anything itself. It creates, positions,
//! shows and hides objects through a [`SceneHost`], and keeps the ids of
//! what it created in a [`SceneObjects`] so it can update or tear them
//! down later.

pub mod builder;
pub mod memory;

use std::fmt;

pub use builder::build_scene;
use glam::{DAffine3, DVec3};
pub use memory::{MemoryScene, SceneNode};

use crate::error::InspectError;
use crate::io::Location;
use crate::options::ViewOptions;
use crate::transform::ImagePlane;

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// Handle to an object created in a host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Small sphere drawn at a box's local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginMarker {
    /// Sphere radius.
    pub radius: f64,
    /// RGB color.
    pub color: [f32; 3],
}

/// Solid box anchored at its local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    /// Edge lengths along local X, Y, Z.
    pub size: DVec3,
    /// RGB color.
    pub color: [f32; 3],
    /// 0 is opaque, 1 invisible.
    pub transparency: f32,
    /// Optional origin sphere.
    pub marker: Option<OriginMarker>,
}

/// What to draw for an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Global axes indicator: arrows of half-length `extent` through the
    /// origin, repeated at depth `z_offset`, plus a beam arrow.
    Axes {
        /// Half-lengths of the X, Y and Z arrows.
        extent: DVec3,
        /// Depth of the image plane.
        z_offset: f64,
        /// Colors of X, Y, Z and beam arrows.
        colors: [[f32; 3]; 4],
    },
    /// Placeholder box.
    Box(BoxShape),
    /// Empty container for child objects.
    Group,
    /// Reconstructed volume read by the host from a file.
    VolumeFile {
        /// Volume file.
        location: Location,
    },
    /// One section of a tilt series, shown as a grayscale image plane.
    ImageSection {
        /// Tilt-series file.
        location: Location,
        /// Section index within the stack.
        section: usize,
    },
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Operations the inspector needs from a 3D viewer.
pub trait SceneHost {
    /// Create an object, optionally as a child of `parent`.
    fn create(
        &mut self,
        name: &str,
        shape: Shape,
        parent: Option<ObjectId>,
    ) -> Result<ObjectId, InspectError>;

    /// Delete an object and its children. Unknown ids are ignored.
    fn delete(&mut self, id: ObjectId);

    /// Whether `id` names an object that still exists.
    fn is_live(&self, id: ObjectId) -> bool;

    /// Set an object's placement relative to its parent.
    fn set_position(
        &mut self,
        id: ObjectId,
        position: DAffine3,
    ) -> Result<(), InspectError>;

    /// Show or hide an object.
    fn set_visible(
        &mut self,
        id: ObjectId,
        visible: bool,
    ) -> Result<(), InspectError>;

    /// Render one frame.
    fn draw_new_frame(&mut self);

    /// Apply camera settings.
    fn prepare_view(&mut self, _view: &ViewOptions) {}

    /// Whether frames are actually shown to a user.
    fn is_interactive(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Alignment objects
// ---------------------------------------------------------------------------

/// The aligned and raw image occupying one tilt-series position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePair {
    /// Image placed by the section's alignment.
    pub aligned: ObjectId,
    /// Unaligned outline at the image plane.
    pub raw: ObjectId,
}

/// Everything built for one loaded alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObjects {
    /// Axes indicator.
    pub axes: ObjectId,
    /// Volume or its placeholder box.
    pub volume: ObjectId,
    /// Container of the raw images.
    pub raw_group: ObjectId,
    /// Container of the aligned images.
    pub aligned_group: ObjectId,
    /// Image pairs indexed by tilt-series position.
    pub images: Vec<ImagePair>,
    /// Plane the images were placed on.
    pub plane: ImagePlane,
}

impl SceneObjects {
    /// Top-level objects; deleting these deletes everything.
    #[must_use]
    pub fn roots(&self) -> [ObjectId; 4] {
        [self.axes, self.volume, self.raw_group, self.aligned_group]
    }

    /// Delete every object still live in `host`.
    pub fn teardown<H: SceneHost + ?Sized>(&self, host: &mut H) {
        for id in self.roots() {
            if host.is_live(id) {
                host.delete(id);
            }
        }
        log::debug!("removed {} image pairs", self.images.len());
    }
}
