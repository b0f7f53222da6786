//! Inspector options with TOML file support.
//!
//! Load defaults, playback defaults, object appearance, object-storage
//! access and the initial view are kept here. Every section uses
//! `#[serde(default)]` so a file that only overrides `[playback]` works.

mod appearance;
mod input;
mod playback;
mod storage;
mod view;

use std::path::Path;

pub use appearance::AppearanceOptions;
pub use input::InputOptions;
pub use playback::PlaybackOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use storage::StorageOptions;
pub use view::ViewOptions;

use crate::alignment::VolumeDimension;
use crate::error::InspectError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Load form defaults.
    pub input: InputOptions,
    /// Playback defaults.
    pub playback: PlaybackOptions,
    /// Object colors and sizes.
    pub appearance: AppearanceOptions,
    /// Object-storage endpoint.
    #[schemars(skip)]
    pub storage: StorageOptions,
    /// Initial camera settings.
    pub view: ViewOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, InspectError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InspectError::io(path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| InspectError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be serialized or the file cannot
    /// be written.
    pub fn save(&self, path: &Path) -> Result<(), InspectError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| InspectError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| InspectError::io(parent.display(), e))?;
        }
        std::fs::write(path, content)
            .map_err(|e| InspectError::io(path.display(), e))
    }

    /// The configured default volume size, validated.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::InvalidDimension`] for a non-positive size.
    pub fn default_volume_size(&self) -> Result<VolumeDimension, InspectError> {
        let [x, y, z] = self.input.default_volume_size;
        VolumeDimension::new(x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentFormat;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[playback]
frames_per_view = 3

[input]
format = "imod"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.playback.frames_per_view, 3);
        assert_eq!(opts.playback.loop_number, 1);
        assert_eq!(opts.input.format, AlignmentFormat::Imod);
        assert_eq!(opts.input.default_volume_size, [10000.0, 10000.0, 4000.0]);
        assert!(opts.view.orthographic);
        assert!(!opts.view.depth_cue);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets").join("inspectet.toml");
        let mut opts = Options::default();
        opts.storage.endpoint =
            "http://localhost:9000/{bucket}/{key}".to_owned();
        opts.save(&path).unwrap();
        assert_eq!(Options::load(&path).unwrap(), opts);
    }

    #[test]
    fn bad_toml_is_an_options_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[playback]\nframes_per_view = \"ten\"\n")
            .unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(InspectError::OptionsParse(_))
        ));
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("input"));
        assert!(props.contains_key("playback"));
        assert!(props.contains_key("appearance"));
        assert!(props.contains_key("view"));
        assert!(!props.contains_key("storage"));

        let appearance = &props["appearance"]["properties"];
        assert!(appearance.get("volume_transparency").is_some());
        assert!(appearance.get("volume_color").is_none());
    }
}
