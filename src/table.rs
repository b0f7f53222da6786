//! Alignment table: one row per section under a fixed header.

use std::fmt::Write as _;

use crate::alignment::{Alignment, SectionParams};

/// Table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Z-index.
    Z,
    /// Tilt angle.
    Tlt,
    /// Tilt-axis rotation.
    Rot,
    /// X offset.
    Tx,
    /// Y offset.
    Ty,
    /// Extra rotation about X.
    RotX,
}

impl Column {
    /// All columns in display order.
    pub const ALL: [Self; 6] =
        [Self::Z, Self::Tlt, Self::Rot, Self::Tx, Self::Ty, Self::RotX];

    /// Header label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Z => "Z",
            Self::Tlt => "TLT",
            Self::Rot => "ROT",
            Self::Tx => "TX",
            Self::Ty => "TY",
            Self::RotX => "ROTX",
        }
    }
}

/// The sections of an alignment, in alignment order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentTable {
    rows: Vec<SectionParams>,
}

impl AlignmentTable {
    /// One row per section of `alignment`.
    #[must_use]
    pub fn new(alignment: &Alignment) -> Self {
        Self {
            rows: alignment.sections().to_vec(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Section shown in `row`.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&SectionParams> {
        self.rows.get(row)
    }

    /// Formatted cell; `None` for a row past the end.
    #[must_use]
    pub fn cell(&self, row: usize, column: Column) -> Option<String> {
        let s = self.rows.get(row)?;
        Some(match column {
            Column::Z => s.z_index.to_string(),
            Column::Tlt => format!("{:.2}", s.tilt_angle),
            Column::Rot => format!("{:.2}", s.tilt_axis_rotation),
            Column::Tx => format!("{:.2}", s.x_offset),
            Column::Ty => format!("{:.2}", s.y_offset),
            Column::RotX => s
                .volume_x_rotation
                .map(|r| format!("{r:.2}"))
                .unwrap_or_default(),
        })
    }

    /// Fixed-width text rendering, right-aligned columns.
    #[must_use]
    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = (0..self.len())
            .map(|r| {
                Column::ALL
                    .iter()
                    .map(|&c| self.cell(r, c).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = Column::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|row| row[i].len())
                    .chain(std::iter::once(c.title().len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let titles = Column::ALL.iter().map(|c| c.title().to_owned());
        write_line(&mut out, titles, &widths);
        for row in cells {
            write_line(&mut out, row.into_iter(), &widths);
        }
        out
    }
}

fn write_line(
    out: &mut String,
    cells: impl Iterator<Item = String>,
    widths: &[usize],
) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:>w$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{section, VolumeDimension};

    fn table() -> AlignmentTable {
        let mut second = section(4, 3.0);
        second.tilt_axis_rotation = -85.4567;
        second.x_offset = 12.5;
        second.volume_x_rotation = Some(0.1267);
        let ali = Alignment::new(
            VolumeDimension::new(1.0, 1.0, 1.0).unwrap(),
            vec![section(1, -3.0), second],
        )
        .unwrap();
        AlignmentTable::new(&ali)
    }

    #[test]
    fn cells_use_two_decimals() {
        let t = table();
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(1, Column::Z).as_deref(), Some("4"));
        assert_eq!(t.cell(1, Column::Rot).as_deref(), Some("-85.46"));
        assert_eq!(t.cell(1, Column::Tx).as_deref(), Some("12.50"));
        assert_eq!(t.cell(1, Column::RotX).as_deref(), Some("0.13"));
        assert_eq!(t.cell(0, Column::RotX).as_deref(), Some(""));
        assert!(t.cell(2, Column::Z).is_none());
    }

    #[test]
    fn render_has_header_and_rows() {
        let text = table().render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with('Z'));
        assert!(lines[0].ends_with("ROTX"));
        assert!(lines[2].ends_with("0.13"));
    }
}
