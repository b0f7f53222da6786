//! Synchronous reads from local files and S3-compatible object storage.
//!
//! Remote objects are fetched over HTTPS through an endpoint template with
//! `{bucket}` and `{key}` placeholders. There is no retry: a failed read
//! fails the load that asked for it.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::location::{Location, ObjectKey};
use crate::error::InspectError;
use crate::options::StorageOptions;

/// Reader for [`Location`]s.
#[derive(Debug, Clone)]
pub struct Storage {
    endpoint: String,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(&StorageOptions::default())
    }
}

impl Storage {
    /// Storage reading remote objects through `options.endpoint`.
    #[must_use]
    pub fn new(options: &StorageOptions) -> Self {
        Self {
            endpoint: options.endpoint.clone(),
        }
    }

    /// HTTPS URL for a remote object.
    #[must_use]
    pub fn object_url(&self, obj: &ObjectKey) -> String {
        self.endpoint
            .replace("{bucket}", &obj.bucket)
            .replace("{key}", &obj.key)
    }

    /// Read a whole file as bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_bytes(
        &self,
        location: &Location,
    ) -> Result<Vec<u8>, InspectError> {
        match location {
            Location::Local(path) => {
                std::fs::read(path)
                    .map_err(|e| InspectError::io(path.display(), e))
            }
            Location::Remote(obj) => self.fetch(obj, None),
        }
    }

    /// Read a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not UTF-8.
    pub fn read_to_string(
        &self,
        location: &Location,
    ) -> Result<String, InspectError> {
        let bytes = self.read_bytes(location)?;
        String::from_utf8(bytes).map_err(|e| {
            InspectError::parse(location, 0, format!("not valid UTF-8: {e}"))
        })
    }

    /// Read at most the first `len` bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_prefix(
        &self,
        location: &Location,
        len: usize,
    ) -> Result<Vec<u8>, InspectError> {
        match location {
            Location::Local(path) => read_local_prefix(path, len),
            Location::Remote(obj) => {
                let mut bytes = self.fetch(obj, Some(len))?;
                bytes.truncate(len);
                Ok(bytes)
            }
        }
    }

    /// Whether a file exists. Remote objects that answer "not found" or
    /// "forbidden" count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe itself fails.
    pub fn exists(&self, location: &Location) -> Result<bool, InspectError> {
        match location {
            Location::Local(path) => Ok(path.is_file()),
            Location::Remote(obj) => self.probe(obj),
        }
    }

    /// Read an optional companion file; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn read_optional(
        &self,
        location: &Location,
    ) -> Result<Option<String>, InspectError> {
        if self.exists(location)? {
            self.read_to_string(location).map(Some)
        } else {
            log::debug!("optional file {location} not present");
            Ok(None)
        }
    }

    #[cfg(feature = "remote")]
    fn fetch(
        &self,
        obj: &ObjectKey,
        range: Option<usize>,
    ) -> Result<Vec<u8>, InspectError> {
        let url = self.object_url(obj);
        log::debug!("GET {url}");
        let request = ureq::get(&url);
        let request = match range {
            Some(len) if len > 0 => {
                request.header("Range", &format!("bytes=0-{}", len - 1))
            }
            _ => request,
        };
        request
            .call()
            .map_err(|e| InspectError::Remote(format!("{url}: {e}")))?
            .into_body()
            .read_to_vec()
            .map_err(|e| InspectError::Remote(format!("{url}: {e}")))
    }

    #[cfg(feature = "remote")]
    fn probe(&self, obj: &ObjectKey) -> Result<bool, InspectError> {
        let url = self.object_url(obj);
        log::debug!("HEAD {url}");
        match ureq::head(&url).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::StatusCode(403 | 404)) => Ok(false),
            Err(e) => Err(InspectError::Remote(format!("{url}: {e}"))),
        }
    }

    #[cfg(not(feature = "remote"))]
    fn fetch(
        &self,
        obj: &ObjectKey,
        _range: Option<usize>,
    ) -> Result<Vec<u8>, InspectError> {
        Err(remote_disabled(obj))
    }

    #[cfg(not(feature = "remote"))]
    fn probe(&self, obj: &ObjectKey) -> Result<bool, InspectError> {
        Err(remote_disabled(obj))
    }
}

#[cfg(not(feature = "remote"))]
fn remote_disabled(obj: &ObjectKey) -> InspectError {
    InspectError::Remote(format!(
        "s3://{}/{}: built without the `remote` feature",
        obj.bucket, obj.key
    ))
}

fn read_local_prefix(path: &Path, len: usize) -> Result<Vec<u8>, InspectError> {
    let file =
        File::open(path).map_err(|e| InspectError::io(path.display(), e))?;
    let mut bytes = Vec::with_capacity(len);
    let _ = file
        .take(len as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| InspectError::io(path.display(), e))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_fills_template() {
        let storage = Storage::default();
        let obj = ObjectKey {
            bucket: "cryoet-data-portal-public".to_owned(),
            key: "10301/TS_01/Alignments/100/alignment.json".to_owned(),
        };
        assert_eq!(
            storage.object_url(&obj),
            "https://cryoet-data-portal-public.s3.amazonaws.com/\
             10301/TS_01/Alignments/100/alignment.json"
        );
    }

    #[test]
    fn local_reads_and_probes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TS_01.tlt");
        std::fs::write(&path, "-60.0\n-57.0\n").unwrap();
        let storage = Storage::default();
        let loc = Location::Local(path);

        assert!(storage.exists(&loc).unwrap());
        assert_eq!(storage.read_to_string(&loc).unwrap(), "-60.0\n-57.0\n");
        assert_eq!(storage.read_prefix(&loc, 5).unwrap(), b"-60.0");

        let missing = loc.sibling("tilt.com");
        assert!(!storage.exists(&missing).unwrap());
        assert!(storage.read_optional(&missing).unwrap().is_none());
        assert!(matches!(
            storage.read_bytes(&missing),
            Err(InspectError::Io { .. })
        ));
    }
}
