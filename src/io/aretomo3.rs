//! AreTomo3 `.aln` alignment logs.
//!
//! The file opens with `# Key = values` header lines, followed by a
//! commented column header (`# SEC ROT GMAG TX TY SMEAN SFIT SCALE BASE
//! TILT`) and one row per section of the global alignment. Anything after
//! the next comment line (local alignment, patch tables) is ignored.

use rustc_hash::FxHashMap;

use super::location::Location;
use crate::alignment::SectionParams;
use crate::error::InspectError;

const COLUMNS: [&str; 10] = [
    "SEC", "ROT", "GMAG", "TX", "TY", "SMEAN", "SFIT", "SCALE", "BASE", "TILT",
];

/// One row of the global alignment table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlnRow {
    /// Section index in the tilt series.
    pub sec: usize,
    /// Tilt-axis rotation in degrees.
    pub rot: f64,
    /// Global magnification.
    pub gmag: f64,
    /// Shift along X in pixels.
    pub tx: f64,
    /// Shift along Y in pixels.
    pub ty: f64,
    /// Mean correlation score.
    pub smean: f64,
    /// Fit score.
    pub sfit: f64,
    /// Scale factor.
    pub scale: f64,
    /// Base value.
    pub base: f64,
    /// Tilt angle in degrees.
    pub tilt: f64,
}

impl From<&AlnRow> for SectionParams {
    fn from(row: &AlnRow) -> Self {
        Self {
            z_index: row.sec,
            tilt_angle: row.tilt,
            tilt_axis_rotation: row.rot,
            x_offset: row.tx,
            y_offset: row.ty,
            volume_x_rotation: None,
        }
    }
}

/// A parsed `.aln` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlnFile {
    /// Header entries by key, values kept as raw text.
    pub header: FxHashMap<String, Vec<String>>,
    /// Global alignment rows in file order.
    pub rows: Vec<AlnRow>,
}

impl AlnFile {
    /// Parse an `.aln` file.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Parse`] when the column header is missing or a
    /// row is malformed.
    pub fn parse(text: &str, source: &Location) -> Result<Self, InspectError> {
        let mut aln = Self::default();
        let mut in_table = false;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('#') {
                let comment = comment.trim();
                if in_table {
                    break;
                }
                if is_column_header(comment) {
                    in_table = true;
                } else if let Some((key, values)) = comment.split_once('=') {
                    aln.header
                        .entry(key.trim().to_owned())
                        .or_default()
                        .extend(values.split_whitespace().map(str::to_owned));
                }
                continue;
            }
            if !in_table {
                return Err(InspectError::parse(
                    source,
                    idx + 1,
                    "data before the `# SEC ...` column header",
                ));
            }
            aln.rows.push(parse_row(line, source, idx + 1)?);
        }

        if !in_table {
            return Err(InspectError::parse(
                source,
                0,
                "no `# SEC ...` column header",
            ));
        }
        log::debug!("{source}: {} global alignment rows", aln.rows.len());
        Ok(aln)
    }

    /// `RawSize` as `(nx, ny, nz)`, when present.
    #[must_use]
    pub fn raw_size(&self) -> Option<(u32, u32, u32)> {
        let values = self.header.get("RawSize")?;
        let mut it = values.iter().map(|v| v.parse::<u32>().ok());
        Some((it.next()??, it.next()??, it.next()??))
    }

    /// Alpha (tilt) offset in degrees, when present.
    #[must_use]
    pub fn alpha_offset(&self) -> Option<f64> {
        self.header_f64("AlphaOffset")
    }

    /// Beta offset in degrees, when present.
    #[must_use]
    pub fn beta_offset(&self) -> Option<f64> {
        self.header_f64("BetaOffset")
    }

    /// Sections in table order.
    #[must_use]
    pub fn sections(&self) -> Vec<SectionParams> {
        self.rows.iter().map(SectionParams::from).collect()
    }

    fn header_f64(&self, key: &str) -> Option<f64> {
        self.header.get(key)?.first()?.parse().ok()
    }
}

fn is_column_header(comment: &str) -> bool {
    let mut words = comment.split_whitespace();
    COLUMNS.iter().all(|c| words.next() == Some(*c))
}

fn parse_row(
    line: &str,
    source: &Location,
    line_no: usize,
) -> Result<AlnRow, InspectError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < COLUMNS.len() {
        return Err(InspectError::parse(
            source,
            line_no,
            format!("expected {} columns, got {}", COLUMNS.len(), fields.len()),
        ));
    }
    let num = |i: usize| {
        fields[i].parse::<f64>().map_err(|e| {
            InspectError::parse(source, line_no, format!("{}: {e}", COLUMNS[i]))
        })
    };
    let sec = fields[0].parse::<usize>().map_err(|e| {
        InspectError::parse(source, line_no, format!("SEC: {e}"))
    })?;
    Ok(AlnRow {
        sec,
        rot: num(1)?,
        gmag: num(2)?,
        tx: num(3)?,
        ty: num(4)?,
        smean: num(5)?,
        sfit: num(6)?,
        scale: num(7)?,
        base: num(8)?,
        tilt: num(9)?,
    })
}
