use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Playback", inline)]
#[serde(default)]
/// Defaults for `inspectet play`.
pub struct PlaybackOptions {
    /// Frames drawn per section.
    #[schemars(title = "Frames per View", range(min = 1, max = 600))]
    pub frames_per_view: u32,
    /// Number of sweeps through the series.
    #[schemars(title = "Loops", range(min = 1, max = 100))]
    pub loop_number: u32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            frames_per_view: 10,
            loop_number: 1,
        }
    }
}
