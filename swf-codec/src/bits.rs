//! Bit-level reading and writing.
//!
//! SWF packs most of its geometry into fields whose width is chosen per
//! record. Values are stored MSB first and a record ends by padding the last
//! partial byte with zeros.

/// Returns the number of bits needed to store `value` as a two's-complement
/// signed field, including the sign bit.
///
/// Zero needs a single bit.
pub fn signed_bits(value: i32) -> u32 {
    if value == 0 {
        1
    } else if value > 0 {
        u32::BITS - value.leading_zeros() + 1
    } else {
        // !value == |value| - 1 for negative values
        u32::BITS - (!value).leading_zeros() + 1
    }
}

/// An append-only bit buffer.
///
/// Bits accumulate in a pending byte which is pushed to the output once full.
/// The writer does not check that a value fits in the requested width: bits
/// above `n_bits` are discarded, which for signed values means two's-complement
/// truncation.
#[derive(Clone, Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    pending: u8,
    pending_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the low `n_bits` of `value`, most significant bit first.
    pub fn write_unsigned(&mut self, value: u32, n_bits: u32) {
        debug_assert!((1..=32).contains(&n_bits));
        for i in (0..n_bits).rev() {
            self.push_bit((value >> i) & 1 != 0);
        }
    }

    /// Write `value` as an `n_bits` wide two's-complement field.
    ///
    /// `n_bits` counts the sign bit.
    pub fn write_signed(&mut self, value: i32, n_bits: u32) {
        self.write_unsigned(value as u32, n_bits)
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.push_bit(bit)
    }

    /// Pad the pending byte with zeros and push it to the output.
    ///
    /// Does nothing if the writer is already byte aligned.
    pub fn flush(&mut self) {
        if self.pending_bits > 0 {
            self.buf.push(self.pending << (8 - self.pending_bits));
            self.pending = 0;
            self.pending_bits = 0;
        }
    }

    /// The number of bits written so far, including pending ones.
    pub fn bit_len(&self) -> usize {
        self.buf.len() * 8 + self.pending_bits as usize
    }

    /// Flush and return the written bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.buf
    }

    fn push_bit(&mut self, bit: bool) {
        self.pending = (self.pending << 1) | bit as u8;
        self.pending_bits += 1;
        if self.pending_bits == 8 {
            self.buf.push(self.pending);
            self.pending = 0;
            self.pending_bits = 0;
        }
    }
}

/// Errors that can occur when reading bit fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BitReadError {
    #[error("attempted to read {wanted} bits with only {available} remaining")]
    OutOfBounds { wanted: u32, available: usize },
}

/// Reads MSB-first bit fields from a byte slice.
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    // absolute bit position
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read the low `n_bits` of an unsigned field.
    pub fn read_unsigned(&mut self, n_bits: u32) -> Result<u32, BitReadError> {
        if n_bits == 0 {
            return Ok(0);
        }
        let available = self.remaining_bits();
        if n_bits as usize > available {
            return Err(BitReadError::OutOfBounds {
                wanted: n_bits,
                available,
            });
        }
        let mut result = 0u32;
        for _ in 0..n_bits {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            result = (result << 1) | bit as u32;
            self.pos += 1;
        }
        Ok(result)
    }

    /// Read an `n_bits` wide two's-complement field and sign extend it.
    pub fn read_signed(&mut self, n_bits: u32) -> Result<i32, BitReadError> {
        let raw = self.read_unsigned(n_bits)?;
        if n_bits == 0 || n_bits >= 32 {
            return Ok(raw as i32);
        }
        let shift = 32 - n_bits;
        Ok(((raw << shift) as i32) >> shift)
    }

    pub fn read_bit(&mut self) -> Result<bool, BitReadError> {
        self.read_unsigned(1).map(|bit| bit != 0)
    }

    /// Skip to the start of the next byte, if not already aligned.
    pub fn align(&mut self) {
        self.pos = self.pos.div_ceil(8) * 8;
    }

    /// The number of whole or partial bytes consumed so far.
    pub fn byte_position(&self) -> usize {
        self.pos.div_ceil(8)
    }

    pub fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.pos)
    }
}
