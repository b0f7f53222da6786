//! Crate-level error types.

use thiserror::Error;

/// Errors produced by the inspectet crate.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Local file I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Object-storage read failure (or remote support compiled out).
    #[error("object storage error: {0}")]
    Remote(String),
    /// Malformed line in a text alignment file.
    #[error("{file}:{line}: {message}")]
    Parse {
        /// File the line came from.
        file: String,
        /// 1-based line number (0 when the whole file is at fault).
        line: usize,
        /// What was wrong with it.
        message: String,
    },
    /// Malformed alignment JSON.
    #[error("invalid alignment JSON in {file}: {error}")]
    Json {
        /// File the JSON came from.
        file: String,
        /// Underlying decoder error.
        #[source]
        error: serde_json::Error,
    },
    /// Unreadable or inconsistent MRC header.
    #[error("MRC header error: {0}")]
    Mrc(String),
    /// Neither the request, the alignment nor a volume file gave a volume
    /// size.
    #[error("{0}")]
    MissingVolumeDimensions(String),
    /// A volume dimension was not finite and positive.
    #[error("invalid volume dimension: {0}")]
    InvalidDimension(String),
    /// An alignment contained no sections.
    #[error("alignment has no sections")]
    EmptyAlignment,
    /// Two sections share a z-index.
    #[error("z-index {0} appears more than once in the alignment")]
    DuplicateZIndex(usize),
    /// A section refers to an image position the scene does not have.
    #[error(
        "section z-index {z_index} is out of range ({available} images \
         available)"
    )]
    SectionOutOfRange {
        /// Offending z-index.
        z_index: usize,
        /// Number of image positions built.
        available: usize,
    },
    /// Unrecognised alignment format name.
    #[error("unknown alignment format: {0}")]
    UnknownFormat(String),
    /// Malformed command line.
    #[error("command error: {0}")]
    Command(String),
    /// TOML options parsing/serialization failure.
    #[error("options parse error: {0}")]
    OptionsParse(String),
    /// The host scene refused an operation.
    #[error("scene error: {0}")]
    Scene(String),
}

impl InspectError {
    /// Wrap an I/O error with the path it happened on.
    pub(crate) fn io(
        path: impl std::fmt::Display,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Build a parse error for `file` at 1-based `line`.
    pub(crate) fn parse(
        file: impl std::fmt::Display,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}
