//! IMOD alignment bundle: `<basename>.xf`, `<basename>.tlt`, and the
//! optional `<basename>.xtilt`, `tilt.com` and `newst.com`.

use rustc_hash::FxHashSet;

use super::location::Location;
use super::storage::Storage;
use crate::alignment::{SectionParams, VolumeDimension};
use crate::error::InspectError;

/// One line of an `.xf` file: a 2×2 linear part plus a shift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XfTransform {
    /// Row 1, column 1.
    pub a11: f64,
    /// Row 1, column 2.
    pub a12: f64,
    /// Row 2, column 1.
    pub a21: f64,
    /// Row 2, column 2.
    pub a22: f64,
    /// Shift along X in pixels.
    pub dx: f64,
    /// Shift along Y in pixels.
    pub dy: f64,
}

impl XfTransform {
    /// In-plane rotation of the linear part, in degrees.
    #[must_use]
    pub fn rotation_degrees(&self) -> f64 {
        self.a21.atan2(self.a11).to_degrees()
    }
}

/// Reconstruction parameters read from `tilt.com`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TiltCom {
    /// `FULLIMAGE nx ny`: unbinned image size.
    pub full_image: Option<(u32, u32)>,
    /// `THICKNESS t`: reconstruction thickness in binned pixels.
    pub thickness: Option<u32>,
    /// `IMAGEBINNED b`.
    pub image_binned: Option<u32>,
    /// Sections left out of the reconstruction, 1-based.
    pub exclude: Vec<usize>,
}

impl TiltCom {
    /// Parse the keyword lines of a `tilt.com` script.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Parse`] when a known keyword has bad values.
    pub fn parse(text: &str, source: &Location) -> Result<Self, InspectError> {
        let mut com = Self::default();
        for (idx, key, values) in com_entries(text) {
            let line = idx + 1;
            match key.to_ascii_uppercase().as_str() {
                "FULLIMAGE" => {
                    let v = parse_numbers::<u32>(values, source, line)?;
                    if let [nx, ny, ..] = v[..] {
                        com.full_image = Some((nx, ny));
                    } else {
                        return Err(InspectError::parse(
                            source,
                            line,
                            "FULLIMAGE needs two values",
                        ));
                    }
                }
                "THICKNESS" => {
                    com.thickness = first_number(values, source, line)?;
                }
                "IMAGEBINNED" => {
                    com.image_binned = first_number(values, source, line)?;
                }
                "EXCLUDELIST" | "EXCLUDELIST2" => {
                    com.exclude.extend(parse_ranges(values, source, line)?);
                }
                _ => {}
            }
        }
        Ok(com)
    }
}

/// Stack parameters read from `newst.com`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewstCom {
    /// `SizeToOutputInXandY x,y`.
    pub size_out: Option<(u32, u32)>,
    /// `BinByFactor b`.
    pub bin_by: Option<u32>,
}

impl NewstCom {
    /// Parse the keyword lines of a `newst.com` script.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Parse`] when a known keyword has bad values.
    pub fn parse(text: &str, source: &Location) -> Result<Self, InspectError> {
        let mut com = Self::default();
        for (idx, key, values) in com_entries(text) {
            let line = idx + 1;
            match key.to_ascii_lowercase().as_str() {
                "sizetooutputinxandy" => {
                    let v = parse_numbers::<u32>(values, source, line)?;
                    if let [x, y, ..] = v[..] {
                        com.size_out = Some((x, y));
                    }
                }
                "binbyfactor" => {
                    com.bin_by = first_number(values, source, line)?;
                }
                _ => {}
            }
        }
        Ok(com)
    }
}

/// Everything read for one IMOD basename.
#[derive(Debug, Clone, PartialEq)]
pub struct ImodBundle {
    /// Per-section 2D transforms.
    pub xf: Vec<XfTransform>,
    /// Per-section tilt angles.
    pub tlt: Vec<f64>,
    /// Per-section X tilts, when an `.xtilt` file exists.
    pub xtilt: Option<Vec<f64>>,
    /// `tilt.com`, when present next to the basename.
    pub tilt_com: Option<TiltCom>,
    /// `newst.com`, when present next to the basename.
    pub newst_com: Option<NewstCom>,
}

impl ImodBundle {
    /// Read the bundle for `basename` (a path or `s3://` URI without
    /// extension). `.xf` and `.tlt` are required; the rest are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the `.xf` or `.tlt` file cannot be read, or if any
    /// file in the bundle fails to parse.
    pub fn read(
        storage: &Storage,
        basename: &Location,
    ) -> Result<Self, InspectError> {
        let xf_loc = basename.with_suffix(".xf");
        let tlt_loc = basename.with_suffix(".tlt");
        let xtilt_loc = basename.with_suffix(".xtilt");
        let tilt_loc = basename.sibling("tilt.com");
        let newst_loc = basename.sibling("newst.com");

        let xf = parse_xf(&storage.read_to_string(&xf_loc)?, &xf_loc)?;
        let tlt = parse_column(&storage.read_to_string(&tlt_loc)?, &tlt_loc)?;
        let xtilt = storage
            .read_optional(&xtilt_loc)?
            .map(|text| parse_column(&text, &xtilt_loc))
            .transpose()?;
        let tilt_com = storage
            .read_optional(&tilt_loc)?
            .map(|text| TiltCom::parse(&text, &tilt_loc))
            .transpose()?;
        let newst_com = storage
            .read_optional(&newst_loc)?
            .map(|text| NewstCom::parse(&text, &newst_loc))
            .transpose()?;

        log::debug!(
            "IMOD bundle {basename}: {} sections, xtilt={}, tilt.com={}, \
             newst.com={}",
            xf.len(),
            xtilt.is_some(),
            tilt_com.is_some(),
            newst_com.is_some()
        );

        Ok(Self {
            xf,
            tlt,
            xtilt,
            tilt_com,
            newst_com,
        })
    }

    /// Sections in file order, minus those excluded in `tilt.com`.
    ///
    /// Excluded sections keep their slot: the remaining sections retain the
    /// z-index of their line in the `.xf` file.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Parse`] when `.tlt` or `.xtilt` does not have
    /// one line per `.xf` line.
    pub fn sections(&self) -> Result<Vec<SectionParams>, InspectError> {
        if self.xf.len() != self.tlt.len() {
            return Err(InspectError::parse(
                "IMOD bundle",
                0,
                format!(
                    ".xf has {} sections but .tlt has {}",
                    self.xf.len(),
                    self.tlt.len()
                ),
            ));
        }
        if let Some(xtilt) = &self.xtilt {
            if xtilt.len() != self.xf.len() {
                return Err(InspectError::parse(
                    "IMOD bundle",
                    0,
                    format!(
                        ".xf has {} sections but .xtilt has {}",
                        self.xf.len(),
                        xtilt.len()
                    ),
                ));
            }
        }

        let excluded: FxHashSet<usize> = self
            .tilt_com
            .iter()
            .flat_map(|com| com.exclude.iter().map(|&s| s.saturating_sub(1)))
            .collect();

        Ok(self
            .xf
            .iter()
            .zip(&self.tlt)
            .enumerate()
            .filter(|(z, _)| !excluded.contains(z))
            .map(|(z, (xf, &tilt))| SectionParams {
                z_index: z,
                tilt_angle: tilt,
                tilt_axis_rotation: xf.rotation_degrees(),
                x_offset: xf.dx,
                y_offset: xf.dy,
                volume_x_rotation: self.xtilt.as_ref().map(|x| x[z]),
            })
            .collect())
    }

    /// Volume size in unbinned pixels, when the command files give one.
    #[must_use]
    pub fn native_dimension(&self) -> Option<VolumeDimension> {
        let tilt = self.tilt_com.as_ref()?;
        let thickness = tilt.thickness?;
        let (nx, ny) = tilt
            .full_image
            .or_else(|| self.newst_com.as_ref().and_then(|n| n.size_out))?;
        let bin = tilt.image_binned.unwrap_or(1).max(1);
        VolumeDimension::new(
            f64::from(nx),
            f64::from(ny),
            f64::from(thickness) * f64::from(bin),
        )
        .ok()
    }
}

/// Parse an `.xf` file.
///
/// # Errors
///
/// Returns [`InspectError::Parse`] for a line without six numbers.
pub fn parse_xf(
    text: &str,
    source: &Location,
) -> Result<Vec<XfTransform>, InspectError> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let v = parse_numbers::<f64>(raw, source, idx + 1)?;
        let [a11, a12, a21, a22, dx, dy] = v[..] else {
            return Err(InspectError::parse(
                source,
                idx + 1,
                format!("expected 6 values, got {}", v.len()),
            ));
        };
        out.push(XfTransform {
            a11,
            a12,
            a21,
            a22,
            dx,
            dy,
        });
    }
    Ok(out)
}

/// Parse a one-number-per-line file (`.tlt`, `.xtilt`).
///
/// # Errors
///
/// Returns [`InspectError::Parse`] for a line that is not a number.
pub fn parse_column(
    text: &str,
    source: &Location,
) -> Result<Vec<f64>, InspectError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(idx, l)| {
            l.trim().parse::<f64>().map_err(|e| {
                InspectError::parse(source, idx + 1, format!("{l:?}: {e}"))
            })
        })
        .collect()
}

/// `(0-based line, keyword, rest)` for every keyword line of a `.com` file.
fn com_entries(text: &str) -> impl Iterator<Item = (usize, &str, &str)> {
    text.lines().enumerate().filter_map(|(idx, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('$') {
            return None;
        }
        let (key, rest) =
            line.split_once(char::is_whitespace).unwrap_or((line, ""));
        Some((idx, key, rest.trim()))
    })
}

fn parse_numbers<T: std::str::FromStr>(
    values: &str,
    source: &Location,
    line: usize,
) -> Result<Vec<T>, InspectError>
where
    T::Err: std::fmt::Display,
{
    values
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>().map_err(|e| {
                InspectError::parse(source, line, format!("{s:?}: {e}"))
            })
        })
        .collect()
}

fn first_number<T: std::str::FromStr + Copy>(
    values: &str,
    source: &Location,
    line: usize,
) -> Result<Option<T>, InspectError>
where
    T::Err: std::fmt::Display,
{
    Ok(parse_numbers::<T>(values, source, line)?.first().copied())
}

/// Expand `1-3,7` into `[1, 2, 3, 7]`.
fn parse_ranges(
    values: &str,
    source: &Location,
    line: usize,
) -> Result<Vec<usize>, InspectError> {
    let bad = |part: &str| {
        InspectError::parse(source, line, format!("bad range {part:?}"))
    };
    let mut out = Vec::new();
    for part in values.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: usize = lo.trim().parse().map_err(|_| bad(part))?;
                let hi: usize = hi.trim().parse().map_err(|_| bad(part))?;
                if hi < lo {
                    return Err(bad(part));
                }
                out.extend(lo..=hi);
            }
            None => out.push(part.parse().map_err(|_| bad(part))?),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XF: &str = "\
   0.9986   -0.0523    0.0523    0.9986      12.500     -3.250
   1.0000    0.0000    0.0000    1.0000       0.000      0.000
   0.9986    0.0523   -0.0523    0.9986      -4.000      8.000
   0.9986   -0.0523    0.0523    0.9986       1.000      1.000
";
    const TLT: &str = "-6.0\n-3.0\n0.0\n3.0\n";
    const TILT_COM: &str = "\
# Command file to run Tilt
$tilt -StandardInput
FULLIMAGE 4096 4096
IMAGEBINNED 4
THICKNESS 300
EXCLUDELIST 1,4
XAXISTILT 0.0
$if (-e ./savework) ./savework
";

    fn loc(name: &str) -> Location {
        Location::parse(name).unwrap()
    }

    #[test]
    fn xf_rotation_from_matrix() {
        let xf = parse_xf(XF, &loc("TS.xf")).unwrap();
        assert_eq!(xf.len(), 4);
        assert!((xf[0].rotation_degrees() - 3.0).abs() < 0.01);
        assert!((xf[2].rotation_degrees() + 3.0).abs() < 0.01);
        assert_eq!(xf[0].dx, 12.5);
    }

    #[test]
    fn xf_rejects_short_lines() {
        let err = parse_xf("1 0 0 1 0\n", &loc("TS.xf")).unwrap_err();
        assert!(matches!(err, InspectError::Parse { line: 1, .. }));
    }

    #[test]
    fn tilt_com_keywords() {
        let com = TiltCom::parse(TILT_COM, &loc("tilt.com")).unwrap();
        assert_eq!(com.full_image, Some((4096, 4096)));
        assert_eq!(com.thickness, Some(300));
        assert_eq!(com.image_binned, Some(4));
        assert_eq!(com.exclude, vec![1, 4]);
    }

    #[test]
    fn newst_com_keywords() {
        let text = "$newstack -StandardInput\n\
                    SizeToOutputInXandY\t1024,1024\n\
                    BinByFactor\t4\n";
        let com = NewstCom::parse(text, &loc("newst.com")).unwrap();
        assert_eq!(com.size_out, Some((1024, 1024)));
        assert_eq!(com.bin_by, Some(4));
    }

    #[test]
    fn ranges_expand() {
        let src = loc("tilt.com");
        assert_eq!(parse_ranges("1-3, 7", &src, 1).unwrap(), vec![1, 2, 3, 7]);
        assert!(parse_ranges("5-2", &src, 1).is_err());
    }

    #[test]
    fn excluded_sections_keep_z_indices() {
        let bundle = ImodBundle {
            xf: parse_xf(XF, &loc("TS.xf")).unwrap(),
            tlt: parse_column(TLT, &loc("TS.tlt")).unwrap(),
            xtilt: None,
            tilt_com: Some(TiltCom::parse(TILT_COM, &loc("tilt.com")).unwrap()),
            newst_com: None,
        };
        let sections = bundle.sections().unwrap();
        let z: Vec<usize> = sections.iter().map(|s| s.z_index).collect();
        assert_eq!(z, vec![1, 2]);
        assert_eq!(sections[1].tilt_angle, 0.0);
        assert_eq!(sections[1].x_offset, -4.0);

        let dim = bundle.native_dimension().unwrap();
        assert_eq!(dim.to_array(), [4096.0, 4096.0, 1200.0]);
    }

    #[test]
    fn mismatched_tlt_is_an_error() {
        let bundle = ImodBundle {
            xf: parse_xf(XF, &loc("TS.xf")).unwrap(),
            tlt: vec![0.0],
            xtilt: None,
            tilt_com: None,
            newst_com: None,
        };
        assert!(bundle.sections().is_err());
        assert!(bundle.native_dimension().is_none());
    }

    #[test]
    fn reads_bundle_without_optional_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), XF).unwrap();
        std::fs::write(dir.path().join("TS.tlt"), TLT).unwrap();
        let basename = Location::Local(dir.path().join("TS"));

        let bundle = ImodBundle::read(&Storage::default(), &basename).unwrap();
        assert!(bundle.xtilt.is_none());
        assert!(bundle.tilt_com.is_none());
        assert_eq!(bundle.sections().unwrap().len(), 4);
    }

    #[test]
    fn reads_xtilt_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("TS.xf"), XF).unwrap();
        std::fs::write(dir.path().join("TS.tlt"), TLT).unwrap();
        std::fs::write(dir.path().join("TS.xtilt"), "0.5\n0.5\n0.5\n0.5\n")
            .unwrap();
        let basename = Location::Local(dir.path().join("TS"));

        let bundle = ImodBundle::read(&Storage::default(), &basename).unwrap();
        let sections = bundle.sections().unwrap();
        assert!(sections.iter().all(|s| s.volume_x_rotation == Some(0.5)));
    }
}
