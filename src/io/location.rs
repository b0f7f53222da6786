//! Local paths and `s3://bucket/key` URIs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::InspectError;

const S3_SCHEME: &str = "s3://";

/// An object in an S3-compatible bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    /// Bucket name.
    pub bucket: String,
    /// Key within the bucket.
    pub key: String,
}

/// Where an input file lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// A path on the local filesystem.
    Local(PathBuf),
    /// An object-storage URI (`s3://bucket/key`).
    Remote(ObjectKey),
}

impl Location {
    /// Parse a user-supplied path or `s3://` URI.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty input or an `s3://` URI without a bucket
    /// or key.
    pub fn parse(input: &str) -> Result<Self, InspectError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(InspectError::parse("<location>", 0, "empty location"));
        }
        let Some(rest) = input.strip_prefix(S3_SCHEME) else {
            return Ok(Self::Local(PathBuf::from(input)));
        };
        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => {
                Ok(Self::Remote(ObjectKey {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                }))
            }
            _ => Err(InspectError::Remote(format!(
                "expected s3://bucket/key, got {input}"
            ))),
        }
    }

    /// Whether this location needs object storage.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Append `suffix` to the final component (`tomo` → `tomo.xf`).
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        match self {
            Self::Local(path) => {
                let mut s = path.clone().into_os_string();
                s.push(suffix);
                Self::Local(PathBuf::from(s))
            }
            Self::Remote(obj) => Self::Remote(ObjectKey {
                bucket: obj.bucket.clone(),
                key: format!("{}{suffix}", obj.key),
            }),
        }
    }

    /// A file named `name` in the same directory.
    #[must_use]
    pub fn sibling(&self, name: &str) -> Self {
        match self {
            Self::Local(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Self::Local(dir.join(name))
            }
            Self::Remote(obj) => {
                let key = match obj.key.rsplit_once('/') {
                    Some((dir, _)) => format!("{dir}/{name}"),
                    None => name.to_owned(),
                };
                Self::Remote(ObjectKey {
                    bucket: obj.bucket.clone(),
                    key,
                })
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(obj) => {
                write!(f, "{S3_SCHEME}{}/{}", obj.bucket, obj.key)
            }
        }
    }
}

impl FromStr for Location {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_s3_uri() {
        let loc =
            Location::parse("s3://cryoet-data-portal/10000/TS_01/ali").unwrap();
        assert_eq!(
            loc,
            Location::Remote(ObjectKey {
                bucket: "cryoet-data-portal".to_owned(),
                key: "10000/TS_01/ali".to_owned(),
            })
        );
        assert!(Location::parse("s3://bucket-only").is_err());
    }

    #[test]
    fn local_paths_stay_local() {
        let loc = Location::parse("/data/TS_01/TS_01").unwrap();
        assert!(!loc.is_remote());
        assert_eq!(loc.with_suffix(".xf").to_string(), "/data/TS_01/TS_01.xf");
        assert_eq!(loc.sibling("tilt.com").to_string(), "/data/TS_01/tilt.com");
    }

    #[test]
    fn remote_sibling_and_suffix() {
        let loc = Location::parse("s3://b/run/TS_01/TS_01").unwrap();
        assert_eq!(
            loc.with_suffix(".tlt").to_string(),
            "s3://b/run/TS_01/TS_01.tlt"
        );
        assert_eq!(
            loc.sibling("newst.com").to_string(),
            "s3://b/run/TS_01/newst.com"
        );
        let flat = Location::parse("s3://b/TS_01").unwrap();
        assert_eq!(flat.sibling("tilt.com").to_string(), "s3://b/tilt.com");
    }
}
