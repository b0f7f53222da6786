//! Resolve a load request into a normalized alignment.
//!
//! This is the only place that branches on [`AlignmentFormat`]. Everything
//! it returns is format-independent: an [`Alignment`], the
//! [`SceneConvention`] to place it with, and the optional volume and
//! tilt-series files. All reads happen here, before any scene object is
//! created.

use super::aretomo3::AlnFile;
use super::imod::ImodBundle;
use super::location::Location;
use super::mrc::{MrcHeader, HEADER_LEN};
use super::portal::PortalAlignment;
use super::storage::Storage;
use crate::alignment::{
    Alignment, AlignmentFormat, SceneConvention, SectionParams, VolumeDimension,
};
use crate::error::InspectError;

/// Where the alignment parameters come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentSource {
    /// A portal `alignment.json`.
    Portal(Location),
    /// An IMOD basename (no extension).
    Imod(Location),
    /// An AreTomo3 `.aln` file.
    AreTomo3(Location),
}

impl AlignmentSource {
    /// Tag `location` with `format`.
    #[must_use]
    pub fn new(format: AlignmentFormat, location: Location) -> Self {
        match format {
            AlignmentFormat::CryoEtDataPortal => Self::Portal(location),
            AlignmentFormat::Imod => Self::Imod(location),
            AlignmentFormat::AreTomo3 => Self::AreTomo3(location),
        }
    }

    /// Format of this source.
    #[must_use]
    pub fn format(&self) -> AlignmentFormat {
        match self {
            Self::Portal(_) => AlignmentFormat::CryoEtDataPortal,
            Self::Imod(_) => AlignmentFormat::Imod,
            Self::AreTomo3(_) => AlignmentFormat::AreTomo3,
        }
    }

    /// The file or basename.
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::Portal(loc) | Self::Imod(loc) | Self::AreTomo3(loc) => loc,
        }
    }
}

/// Everything the user supplied for one load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    /// Alignment parameters.
    pub source: AlignmentSource,
    /// Explicit volume size; takes precedence over every other source.
    pub volume_size: Option<VolumeDimension>,
    /// Reconstructed volume (`.mrc`).
    pub volume_file: Option<Location>,
    /// Raw tilt series (`.mrc`).
    pub tilt_series: Option<Location>,
}

impl LoadRequest {
    /// Request with only the alignment source set.
    #[must_use]
    pub fn new(format: AlignmentFormat, location: Location) -> Self {
        Self {
            source: AlignmentSource::new(format, location),
            volume_size: None,
            volume_file: None,
            tilt_series: None,
        }
    }

    /// Set the explicit volume size.
    #[must_use]
    pub fn with_volume_size(mut self, size: VolumeDimension) -> Self {
        self.volume_size = Some(size);
        self
    }

    /// Set the volume file.
    #[must_use]
    pub fn with_volume_file(mut self, location: Location) -> Self {
        self.volume_file = Some(location);
        self
    }

    /// Set the tilt-series file.
    #[must_use]
    pub fn with_tilt_series(mut self, location: Location) -> Self {
        self.tilt_series = Some(location);
        self
    }
}

/// A tilt-series file and its header.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltSeries {
    /// Where the stack lives.
    pub location: Location,
    /// Its MRC header.
    pub header: MrcHeader,
}

/// Output of [`load`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAlignment {
    /// Format the parameters were read from.
    pub format: AlignmentFormat,
    /// The validated alignment.
    pub alignment: Alignment,
    /// Placement convention for the volume.
    pub convention: SceneConvention,
    /// Reconstructed volume, if one was given or discovered.
    pub volume_file: Option<Location>,
    /// Tilt series, if one was given or discovered.
    pub tilt_series: Option<TiltSeries>,
}

/// Parsed parameters before the volume size is known.
struct Parsed {
    sections: Vec<SectionParams>,
    native_dimension: Option<VolumeDimension>,
}

/// Read and normalize everything `request` names.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or if no volume
/// dimension can be resolved from the request, a volume file or the
/// alignment.
pub fn load(
    storage: &Storage,
    request: &LoadRequest,
) -> Result<LoadedAlignment, InspectError> {
    let format = request.source.format();
    let convention = format.convention();
    let location = request.source.location();
    log::debug!("loading {format} alignment from {location}");

    let parsed = match &request.source {
        AlignmentSource::Portal(loc) => {
            let text = storage.read_to_string(loc)?;
            let ali = PortalAlignment::parse(&text, loc)?;
            Parsed {
                sections: ali.sections(),
                native_dimension: ali.native_dimension(),
            }
        }
        AlignmentSource::Imod(basename) => {
            let bundle = ImodBundle::read(storage, basename)?;
            Parsed {
                sections: bundle.sections()?,
                native_dimension: bundle.native_dimension(),
            }
        }
        AlignmentSource::AreTomo3(loc) => {
            let aln = AlnFile::parse(&storage.read_to_string(loc)?, loc)?;
            Parsed {
                sections: aln.sections(),
                native_dimension: None,
            }
        }
    };

    let (volume_file, tilt_series_loc) = match &request.source {
        AlignmentSource::Imod(basename) => (
            discover(
                storage,
                request.volume_file.clone(),
                basename,
                "_full_rec.mrc",
            )?,
            discover(storage, request.tilt_series.clone(), basename, ".mrc")?,
        ),
        _ => (request.volume_file.clone(), request.tilt_series.clone()),
    };

    // A volume file is drawn in its header units, so its extent beats the
    // format's own dimension.
    let dimension = match (request.volume_size, &volume_file) {
        (Some(dim), _) => dim,
        (None, Some(vol)) => {
            let header = read_header(storage, vol)?;
            let [x, y, z] =
                convention.coord_order.global_from_local(header.extent());
            let dim = VolumeDimension::new(x, y, z)?;
            if let Some(native) = parsed.native_dimension {
                if native != dim {
                    log::debug!(
                        "{vol} extent {:?} overrides {:?} from {location}",
                        dim.to_array(),
                        native.to_array()
                    );
                }
            }
            dim
        }
        (None, None) => parsed.native_dimension.ok_or_else(|| {
            InspectError::MissingVolumeDimensions(missing_dimensions_message(
                &request.source,
            ))
        })?,
    };

    let tilt_series = tilt_series_loc
        .map(|location| {
            read_header(storage, &location)
                .map(|header| TiltSeries { location, header })
        })
        .transpose()?;

    let alignment = Alignment::new(dimension, parsed.sections)?;
    log::info!(
        "loaded {format} alignment from {location}: {} sections, \
         volume {:.1} x {:.1} x {:.1}",
        alignment.len(),
        dimension.x,
        dimension.y,
        dimension.z
    );

    Ok(LoadedAlignment {
        format,
        alignment,
        convention,
        volume_file,
        tilt_series,
    })
}

/// Keep an explicit location, else probe for `<basename><suffix>`.
fn discover(
    storage: &Storage,
    explicit: Option<Location>,
    basename: &Location,
    suffix: &str,
) -> Result<Option<Location>, InspectError> {
    if explicit.is_some() {
        return Ok(explicit);
    }
    let candidate = basename.with_suffix(suffix);
    if storage.exists(&candidate)? {
        log::debug!("found {candidate}");
        Ok(Some(candidate))
    } else {
        Ok(None)
    }
}

fn read_header(
    storage: &Storage,
    location: &Location,
) -> Result<MrcHeader, InspectError> {
    let bytes = storage.read_prefix(location, HEADER_LEN)?;
    MrcHeader::parse(&bytes).map_err(|e| match e {
        InspectError::Mrc(msg) => {
            InspectError::Mrc(format!("{location}: {msg}"))
        }
        other => other,
    })
}

fn missing_dimensions_message(source: &AlignmentSource) -> String {
    match source {
        AlignmentSource::Imod(basename) => format!(
            "No {basename}_full_rec.mrc found and no volume dimensions \
             provided."
        ),
        AlignmentSource::AreTomo3(_) => {
            "Please provide volume dimensions or a volume file.".to_owned()
        }
        AlignmentSource::Portal(loc) => format!(
            "{loc} has no volume_dimension; please provide volume dimensions \
             or a volume file."
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use glam::DVec3;

    use super::*;
    use crate::alignment::{IMOD_CONVENTION, PORTAL_CONVENTION};
    use crate::io::mrc::header_bytes;
    use crate::transform::volume_transform;

    const ALN: &str = "\
# RawSize = 1024 1024 3
# SEC     ROT         GMAG       TX          TY      SMEAN     SFIT    SCALE     BASE     TILT
    0    -85.0    1.0     1.0    2.0     1.0     1.0     1.0     0.0   -3.0
    1    -85.0    1.0     0.0    0.0     1.0     1.0     1.0     0.0    0.0
    2    -85.0    1.0    -1.0   -2.0     1.0     1.0     1.0     0.0    3.0
";

    fn write(dir: &Path, name: &str, contents: &[u8]) -> Location {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        Location::Local(path)
    }

    #[test]
    fn aretomo3_without_dimensions_fails() {
        let dir = tempfile::tempdir().unwrap();
        let aln = write(dir.path(), "TS.aln", ALN.as_bytes());
        let err = load(
            &Storage::default(),
            &LoadRequest::new(AlignmentFormat::AreTomo3, aln),
        )
        .unwrap_err();
        assert!(matches!(err, InspectError::MissingVolumeDimensions(_)));
        assert!(err.to_string().contains("volume dimensions"));
    }

    #[test]
    fn explicit_size_wins() {
        let dir = tempfile::tempdir().unwrap();
        let aln = write(dir.path(), "TS.aln", ALN.as_bytes());
        let vol = write(
            dir.path(),
            "vol.mrc",
            &header_bytes([10, 10, 10], [10.0, 10.0, 10.0], false),
        );
        let size = VolumeDimension::new(500.0, 400.0, 300.0).unwrap();
        let request = LoadRequest::new(AlignmentFormat::AreTomo3, aln)
            .with_volume_size(size)
            .with_volume_file(vol);

        let loaded = load(&Storage::default(), &request).unwrap();
        assert_eq!(loaded.alignment.volume_dimension(), size);
        assert_eq!(loaded.alignment.len(), 3);
        assert!(loaded.volume_file.is_some());
    }

    #[test]
    fn volume_header_follows_coord_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), "1 0 0 1 0 0\n1 0 0 1 0 0\n")
            .unwrap();
        std::fs::write(dir.path().join("TS.tlt"), "-3\n3\n").unwrap();
        // IMOD full reconstructions are stored x, z, y
        let _ = write(
            dir.path(),
            "TS_full_rec.mrc",
            &header_bytes([400, 100, 300], [400.0, 100.0, 300.0], false),
        );
        let basename = Location::Local(dir.path().join("TS"));

        let loaded = load(
            &Storage::default(),
            &LoadRequest::new(AlignmentFormat::Imod, basename),
        )
        .unwrap();
        assert_eq!(loaded.convention, IMOD_CONVENTION);
        assert_eq!(
            loaded.alignment.volume_dimension().to_array(),
            [400.0, 300.0, 100.0]
        );
        assert!(loaded.volume_file.is_some());
        assert!(loaded.tilt_series.is_none());
    }

    #[test]
    fn volume_file_extent_beats_tilt_com() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), "1 0 0 1 0 0\n").unwrap();
        std::fs::write(dir.path().join("TS.tlt"), "0\n").unwrap();
        std::fs::write(
            dir.path().join("tilt.com"),
            "$tilt -StandardInput\nFULLIMAGE 400 300\nTHICKNESS 100\n",
        )
        .unwrap();
        // 2 A voxels, stored x, z, y
        let cella = [800.0, 200.0, 600.0];
        let _ = write(
            dir.path(),
            "TS_full_rec.mrc",
            &header_bytes([400, 100, 300], cella, false),
        );
        let request = LoadRequest::new(
            AlignmentFormat::Imod,
            Location::Local(dir.path().join("TS")),
        );

        let loaded = load(&Storage::default(), &request).unwrap();
        let dim = loaded.alignment.volume_dimension();
        assert_eq!(dim.to_array(), [800.0, 600.0, 200.0]);

        let centre = DVec3::from_array(cella.map(f64::from)) / 2.0;
        for tilt in [0.0, 45.0] {
            let at = volume_transform(dim, &loaded.convention, tilt)
                .transform_point3(centre);
            assert!(at.abs_diff_eq(DVec3::ZERO, 1e-9), "{tilt}: {at}");
        }
    }

    #[test]
    fn tilt_com_sizes_imod_without_volume_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), "1 0 0 1 0 0\n").unwrap();
        std::fs::write(dir.path().join("TS.tlt"), "0\n").unwrap();
        std::fs::write(
            dir.path().join("tilt.com"),
            "FULLIMAGE 400 300\nTHICKNESS 100\n",
        )
        .unwrap();
        let loaded = load(
            &Storage::default(),
            &LoadRequest::new(
                AlignmentFormat::Imod,
                Location::Local(dir.path().join("TS")),
            ),
        )
        .unwrap();
        assert_eq!(
            loaded.alignment.volume_dimension().to_array(),
            [400.0, 300.0, 100.0]
        );
        assert!(loaded.volume_file.is_none());
    }

    #[test]
    fn imod_discovers_tilt_series() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), "1 0 0 1 0 0\n").unwrap();
        std::fs::write(dir.path().join("TS.tlt"), "0\n").unwrap();
        let _ = write(
            dir.path(),
            "TS.mrc",
            &header_bytes([512, 256, 1], [1024.0, 512.0, 2.0], false),
        );
        let request = LoadRequest::new(
            AlignmentFormat::Imod,
            Location::Local(dir.path().join("TS")),
        )
        .with_volume_size(VolumeDimension::new(1.0, 1.0, 1.0).unwrap());

        let loaded = load(&Storage::default(), &request).unwrap();
        let ts = loaded.tilt_series.unwrap();
        assert_eq!((ts.header.nx, ts.header.ny, ts.header.nz), (512, 256, 1));
    }

    #[test]
    fn imod_without_anything_names_full_rec() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), "1 0 0 1 0 0\n").unwrap();
        std::fs::write(dir.path().join("TS.tlt"), "0\n").unwrap();
        let err = load(
            &Storage::default(),
            &LoadRequest::new(
                AlignmentFormat::Imod,
                Location::Local(dir.path().join("TS")),
            ),
        )
        .unwrap_err();
        assert!(err.to_string().contains("_full_rec.mrc"));
    }

    #[test]
    fn portal_uses_native_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let json = write(
            dir.path(),
            "alignment.json",
            br#"{"volume_dimension": {"x": 10, "y": 20, "z": 5},
                 "per_section_alignment_parameters": [
                    {"z_index": 0, "tilt_angle": 0.0}]}"#,
        );
        let loaded = load(
            &Storage::default(),
            &LoadRequest::new(AlignmentFormat::CryoEtDataPortal, json),
        )
        .unwrap();
        assert_eq!(loaded.convention, PORTAL_CONVENTION);
        assert_eq!(
            loaded.alignment.volume_dimension().to_array(),
            [10.0, 20.0, 5.0]
        );
    }

    #[test]
    fn source_round_trips_format() {
        for format in AlignmentFormat::ALL {
            let src =
                AlignmentSource::new(format, Location::parse("x").unwrap());
            assert_eq!(src.format(), format);
        }
    }
}
