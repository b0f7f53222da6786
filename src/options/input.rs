use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Input", inline)]
#[serde(default)]
/// Defaults offered when loading an alignment.
pub struct InputOptions {
    /// Format preselected for new loads.
    #[schemars(title = "Format")]
    pub format: AlignmentFormat,
    /// Volume size `[x, y, z]` prefilled in the load form.
    #[schemars(title = "Volume Size")]
    pub default_volume_size: [f64; 3],
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            format: AlignmentFormat::AreTomo3,
            default_volume_size: [10000.0, 10000.0, 4000.0],
        }
    }
}
