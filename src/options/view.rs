use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Camera settings applied when a session starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "View", inline)]
#[serde(default)]
pub struct ViewOptions {
    /// Use an orthographic camera.
    #[schemars(title = "Orthographic")]
    pub orthographic: bool,
    /// Fade distant objects.
    #[schemars(title = "Depth Cue")]
    pub depth_cue: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            orthographic: true,
            depth_cue: false,
        }
    }
}
