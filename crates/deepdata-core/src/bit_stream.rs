//! Fixed-capacity bit buffer with a single cursor and the length-prefixed frame
//! layout shared by all codecs.
//!
//! Bits are packed most-significant-bit first, so a frame built from bytes is
//! byte-for-byte the wire format: a 32-bit big-endian length followed by the
//! payload.

use byteorder::{BigEndian, WriteBytesExt};

use crate::{DeepDataError, Result};

/// Size of the frame length header in bits.
pub const HEADER_BITS: usize = 32;
/// Size of the frame length header in bytes.
pub const HEADER_BYTES: usize = HEADER_BITS / 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    bytes: Vec<u8>,
    capacity: usize,
    position: usize,
}

impl BitStream {
    /// Zero-filled stream of `capacity_bits` bits with the cursor at 0.
    pub fn new(capacity_bits: usize) -> Self {
        Self {
            bytes: vec![0; capacity_bits.div_ceil(8)],
            capacity: capacity_bits,
            position: 0,
        }
    }

    /// Frame `data` as `length (u32, big-endian) ++ data` and rewind, ready to be
    /// consumed bit by bit.
    pub fn from_payload_with_header(data: &[u8]) -> Result<Self> {
        let length = u32::try_from(data.len()).map_err(|_| DeepDataError::CapacityExceeded {
            required: data.len(),
            available: u32::MAX as usize,
        })?;

        let mut bytes = Vec::with_capacity(HEADER_BYTES + data.len());
        bytes.write_u32::<BigEndian>(length)?;
        bytes.extend_from_slice(data);

        Ok(Self {
            capacity: bytes.len() * 8,
            bytes,
            position: 0,
        })
    }

    /// Rewind, read the length header and then that many payload bytes.
    pub fn read_payload_with_header(&mut self) -> Result<Vec<u8>> {
        self.reset();
        if self.capacity < HEADER_BITS {
            return Err(DeepDataError::CorruptFrame {
                required_bits: HEADER_BITS,
                available_bits: self.capacity,
            });
        }

        let length = self.read_uint(32)? as usize;
        let required_bits = length
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(self.position))
            .unwrap_or(usize::MAX);
        if required_bits > self.capacity {
            log::debug!(
                "frame header declares {length} bytes, stream holds {} bits",
                self.capacity
            );
            return Err(DeepDataError::CorruptFrame {
                required_bits,
                available_bits: self.capacity,
            });
        }

        (0..length).map(|_| self.read_byte()).collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.capacity
    }

    /// Move the cursor back to 0, leaving the contents untouched.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    fn ensure(&self, bits: usize) -> Result<()> {
        if bits > self.remaining() {
            return Err(DeepDataError::Overrun {
                position: self.position,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.ensure(1)?;
        let mask = 0x80 >> (self.position % 8);
        let byte = &mut self.bytes[self.position / 8];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.position += 1;
        Ok(())
    }

    /// The bit under the cursor, without advancing.
    pub fn peek_bit(&self) -> Result<bool> {
        self.ensure(1)?;
        Ok(self.bytes[self.position / 8] & (0x80 >> (self.position % 8)) != 0)
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        let bit = self.peek_bit()?;
        self.position += 1;
        Ok(bit)
    }

    /// Write the low `bits` bits of `value`, most significant first.
    ///
    /// Nothing is written when the stream cannot take all of them.
    pub fn write_uint(&mut self, value: u32, bits: u32) -> Result<()> {
        if bits > 32 {
            return Err(DeepDataError::InvalidConfiguration(format!(
                "{bits}-bit integers exceed the 32-bit limit"
            )));
        }
        self.ensure(bits as usize)?;
        for n in (0..bits).rev() {
            self.write_bit((value >> n) & 1 == 1)?;
        }
        Ok(())
    }

    pub fn read_uint(&mut self, bits: u32) -> Result<u32> {
        if bits > 32 {
            return Err(DeepDataError::InvalidConfiguration(format!(
                "{bits}-bit integers exceed the 32-bit limit"
            )));
        }
        self.ensure(bits as usize)?;
        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    /// Write the low `bits` bits of `value`, most significant first.
    pub fn write_bits_from_byte(&mut self, value: u8, bits: u8) -> Result<()> {
        self.write_uint(value as u32, bits.min(8) as u32)
    }

    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_uint(value as u32, 8)
    }

    pub fn write_bytes(&mut self, values: &[u8]) -> Result<()> {
        self.ensure(values.len() * 8)?;
        values.iter().try_for_each(|&b| self.write_byte(b))
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_uint(8)? as u8)
    }

    /// The packed bits; the unused tail of the last byte is zero unless written.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
