use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Colors and sizes of the scene objects.
///
/// Colors are linear RGB, transparencies run from 0 (opaque) to 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Appearance", inline)]
#[serde(default)]
pub struct AppearanceOptions {
    /// Placeholder volume box color.
    #[schemars(skip)]
    pub volume_color: [f32; 3],
    /// Placeholder volume box transparency.
    #[schemars(title = "Volume Transparency", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub volume_transparency: f32,
    /// Origin marker color.
    #[schemars(skip)]
    pub origin_color: [f32; 3],
    /// Origin marker radius.
    #[schemars(title = "Origin Marker Radius", range(min = 0.0, max = 2000.0), extend("step" = 10.0))]
    pub origin_radius: f64,
    /// Aligned placeholder image color.
    #[schemars(skip)]
    pub aligned_color: [f32; 3],
    /// Aligned placeholder image transparency.
    #[schemars(title = "Aligned Transparency", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub aligned_transparency: f32,
    /// Aligned placeholder image thickness.
    #[schemars(skip)]
    pub aligned_thickness: f64,
    /// Raw image outline color.
    #[schemars(skip)]
    pub raw_color: [f32; 3],
    /// Raw image outline transparency.
    #[schemars(title = "Raw Transparency", range(min = 0.0, max = 1.0), extend("step" = 0.05))]
    pub raw_transparency: f32,
    /// Raw image outline thickness.
    #[schemars(skip)]
    pub raw_thickness: f64,
    /// Axis arrow colors: X, Y, Z, beam.
    #[schemars(skip)]
    pub axis_colors: [[f32; 3]; 4],
}

impl Default for AppearanceOptions {
    fn default() -> Self {
        Self {
            volume_color: [0.0, 1.0, 1.0],
            volume_transparency: 0.5,
            origin_color: [1.0, 0.0, 0.0],
            origin_radius: 300.0,
            aligned_color: [0.0, 1.0, 1.0],
            aligned_transparency: 0.5,
            aligned_thickness: 20.0,
            raw_color: [0.5, 0.5, 0.5],
            raw_transparency: 0.5,
            raw_thickness: 19.0,
            axis_colors: [
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0],
            ],
        }
    }
}
