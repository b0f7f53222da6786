//! MRC header reader.
//!
//! Only the fixed 1024-byte header is decoded: dimensions, mode, sampling,
//! cell size and the machine stamp that gives the byte order. See
//! <https://www.ccpem.ac.uk/mrc_format/mrc2014.php>.

use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use glam::{DVec2, DVec3};

use crate::error::InspectError;

/// Size of the fixed MRC header: 256 four-byte words.
pub const HEADER_LEN: usize = 1024;

// 0-based byte offset of the machine stamp (word 54)
const MACHST_OFFSET: usize = 4 * 53;

/// The header fields needed to place volumes and tilt images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MrcHeader {
    /// Columns (fastest axis).
    pub nx: u32,
    /// Rows.
    pub ny: u32,
    /// Sections (slowest axis; the tilt index of a tilt series).
    pub nz: u32,
    /// Data type code.
    pub mode: i32,
    /// Physical size of one voxel along X, Y, Z.
    pub voxel_size: DVec3,
}

impl MrcHeader {
    /// Decode a header from the first [`HEADER_LEN`] bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::Mrc`] for a short header or non-positive sizes.
    pub fn parse(bytes: &[u8]) -> Result<Self, InspectError> {
        if bytes.len() < HEADER_LEN {
            return Err(InspectError::Mrc(format!(
                "header needs {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        // the machine stamp tells us the byte order: 0x44 0x44 for
        // little-endian, 0x11 0x11 for big-endian. Older writers leave it
        // zeroed, and those files are little-endian in practice.
        match bytes[MACHST_OFFSET] {
            0x11 => Self::parse_with::<BigEndian>(bytes),
            _ => Self::parse_with::<LittleEndian>(bytes),
        }
    }

    fn parse_with<B: ByteOrder>(bytes: &[u8]) -> Result<Self, InspectError> {
        let mut cursor = Cursor::new(bytes);
        let mut word = || {
            cursor
                .read_i32::<B>()
                .map_err(|e| InspectError::Mrc(e.to_string()))
        };

        // words 1-4: dimensions and mode
        let n = [word()?, word()?, word()?];
        let mode = word()?;

        // words 5-7: start indices, unused here
        for _ in 0..3 {
            let _ = word()?;
        }

        // words 8-10: sampling
        let m = [word()?, word()?, word()?];

        // words 11-13: cell dimensions in angstroms (f32)
        let mut cella = [0.0_f32; 3];
        for c in &mut cella {
            *c = f32::from_bits(word()? as u32);
        }

        if n.iter().any(|&v| v <= 0) {
            return Err(InspectError::Mrc(format!(
                "non-positive dimensions {}x{}x{}",
                n[0], n[1], n[2]
            )));
        }

        let mut voxel = [1.0_f64; 3];
        for (axis, size) in voxel.iter_mut().enumerate() {
            let sampling = if m[axis] > 0 { m[axis] } else { n[axis] };
            let cell = f64::from(cella[axis]);
            if cell.is_finite() && cell > 0.0 {
                *size = cell / f64::from(sampling);
            }
        }

        Ok(Self {
            nx: n[0] as u32,
            ny: n[1] as u32,
            nz: n[2] as u32,
            mode,
            voxel_size: DVec3::from_array(voxel),
        })
    }

    /// Physical extent along the file's X, Y, Z.
    #[must_use]
    pub fn extent(&self) -> DVec3 {
        DVec3::new(f64::from(self.nx), f64::from(self.ny), f64::from(self.nz))
            * self.voxel_size
    }

    /// Pixel step of one section.
    #[must_use]
    pub fn pixel_step(&self) -> DVec2 {
        self.voxel_size.truncate()
    }
}

#[cfg(test)]
pub(crate) fn header_bytes(
    n: [i32; 3],
    cella: [f32; 3],
    big_endian: bool,
) -> Vec<u8> {
    use byteorder::WriteBytesExt;

    fn write<B: ByteOrder>(n: [i32; 3], cella: [f32; 3]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        for v in n {
            out.write_i32::<B>(v).unwrap();
        }
        // mode 2: 32-bit float
        out.write_i32::<B>(2).unwrap();
        for _ in 0..3 {
            out.write_i32::<B>(0).unwrap();
        }
        for v in n {
            out.write_i32::<B>(v).unwrap();
        }
        for c in cella {
            out.write_f32::<B>(c).unwrap();
        }
        out.resize(HEADER_LEN, 0);
        out
    }

    let mut bytes = if big_endian {
        write::<BigEndian>(n, cella)
    } else {
        write::<LittleEndian>(n, cella)
    };
    let stamp: [u8; 4] = if big_endian {
        [0x11, 0x11, 0x00, 0x00]
    } else {
        [0x44, 0x44, 0x00, 0x00]
    };
    bytes[MACHST_OFFSET..MACHST_OFFSET + 4].copy_from_slice(&stamp);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_header() {
        let bytes =
            header_bytes([1024, 1024, 41], [1382.4, 1382.4, 55.35], false);
        let header = MrcHeader::parse(&bytes).unwrap();
        assert_eq!((header.nx, header.ny, header.nz), (1024, 1024, 41));
        assert_eq!(header.mode, 2);
        assert!((header.voxel_size.x - 1.35).abs() < 1e-4);
        assert!((header.extent().z - 55.35).abs() < 1e-3);
    }

    #[test]
    fn reads_big_endian_header() {
        let bytes = header_bytes([64, 32, 16], [128.0, 64.0, 32.0], true);
        let header = MrcHeader::parse(&bytes).unwrap();
        assert_eq!((header.nx, header.ny, header.nz), (64, 32, 16));
        assert_eq!(header.pixel_step(), DVec2::new(2.0, 2.0));
    }

    #[test]
    fn zero_cell_falls_back_to_unit_voxels() {
        let bytes = header_bytes([10, 20, 30], [0.0, 0.0, 0.0], false);
        let header = MrcHeader::parse(&bytes).unwrap();
        assert_eq!(header.extent(), DVec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn rejects_short_or_empty_header() {
        assert!(MrcHeader::parse(&[0u8; 100]).is_err());
        assert!(MrcHeader::parse(&[0u8; HEADER_LEN]).is_err());
    }
}
