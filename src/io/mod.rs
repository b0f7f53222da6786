//! Input side: locations, storage access and the per-format adapters.

pub mod aretomo3;
pub mod imod;
pub mod loader;
pub mod location;
pub mod mrc;
pub mod portal;
pub mod storage;

pub use loader::{
    load, AlignmentSource, LoadRequest, LoadedAlignment, TiltSeries,
};
pub use location::{Location, ObjectKey};
pub use mrc::MrcHeader;
pub use storage::Storage;
