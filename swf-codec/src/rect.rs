//! The variable width RECT record.

use crate::bits::{signed_bits, BitReadError, BitReader, BitWriter};

/// The width of the field that stores the per-value bit count.
const NBITS_WIDTH: u32 = 5;

/// An axis-aligned rectangle in twips.
///
/// Field order matches the wire format: x bounds first, then y bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        Rect {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// The bit width shared by all four values.
    pub fn value_bits(&self) -> u32 {
        [self.x_min, self.x_max, self.y_min, self.y_max]
            .into_iter()
            .map(signed_bits)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Append this rectangle to `writer`, without byte alignment.
    pub fn write_bits(&self, writer: &mut BitWriter) {
        let n_bits = self.value_bits();
        writer.write_unsigned(n_bits, NBITS_WIDTH);
        for value in [self.x_min, self.x_max, self.y_min, self.y_max] {
            writer.write_signed(value, n_bits);
        }
    }

    /// Encode as a standalone, byte aligned record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        self.write_bits(&mut writer);
        writer.finish()
    }

    pub fn read_bits(reader: &mut BitReader) -> Result<Self, BitReadError> {
        let n_bits = reader.read_unsigned(NBITS_WIDTH)?;
        Ok(Rect {
            x_min: reader.read_signed(n_bits)?,
            x_max: reader.read_signed(n_bits)?,
            y_min: reader.read_signed(n_bits)?,
            y_max: reader.read_signed(n_bits)?,
        })
    }

    /// The encoded length in bytes of a RECT starting at `first_byte`.
    ///
    /// The record is self describing: the top five bits of its first byte
    /// give the width of each of the four values.
    pub fn encoded_len(first_byte: u8) -> usize {
        let n_bits = (first_byte >> 3) as usize;
        (NBITS_WIDTH as usize + 4 * n_bits).div_ceil(8)
    }
}
