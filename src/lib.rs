// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Tilt-series alignment inspector.
//!
//! Inspectet reads tomographic alignment parameters (IMOD, AreTomo3 or
//! CryoET Data Portal), computes where the reconstructed volume and every
//! tilt image sit in 3D, and drives a host scene so the alignment can be
//! scrubbed through section by section or played back.
//!
//! # Key entry points
//!
//! - [`session::Session`] - owns the host scene and what is loaded
//! - [`io::LoadRequest`] / [`io::load`] - read any supported format into a
//!   normalized [`alignment::Alignment`]
//! - [`transform`] - the placement math, free of any scene
//! - [`scene::SceneHost`] - what a 3D viewer must provide;
//!   [`scene::MemoryScene`] is an in-memory implementation
//! - [`options::Options`] - TOML-backed settings
//!
//! # Flow
//!
//! A load resolves the format once, reads every file it needs (local or
//! `s3://`), and only then builds scene objects. Selecting a row re-tilts
//! the volume and shows that section's image pair; playback repeats this
//! over alternating forward and backward passes.

pub mod alignment;
pub mod command;
pub mod controller;
pub mod error;
pub mod io;
pub mod options;
pub mod playback;
pub mod scene;
pub mod session;
pub mod table;
pub mod transform;

pub use error::InspectError;
