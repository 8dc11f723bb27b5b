//! Huffman entropy coding for baseline scans.
//!
//! Decoding uses an 8-bit lookup table with the canonical `MAXCODE`/`VALPTR`
//! fallback of ITU T.81 Figure F.16 for longer codes. Encoding always uses the
//! typical tables of Annex K, which define a code for every baseline symbol.

use crate::error::{JpegError, Result};

const LUT_BITS: u8 = 8;
const LUT_SIZE: usize = 1 << LUT_BITS;

/// A DHT table as defined in the stream: code counts per length and symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    /// 0 = DC, 1 = AC.
    pub class: u8,
    pub id: u8,
    pub code_lengths: [u8; 16],
    pub values: Vec<u8>,
}

impl HuffmanTable {
    /// Annex K.3, Table K.3.
    pub fn luma_dc() -> Self {
        Self::standard(0, 0, STD_DC_LUMA_LENGTHS, &STD_DC_VALUES)
    }

    /// Annex K.3, Table K.4.
    pub fn chroma_dc() -> Self {
        Self::standard(0, 1, STD_DC_CHROMA_LENGTHS, &STD_DC_VALUES)
    }

    /// Annex K.3, Table K.5.
    pub fn luma_ac() -> Self {
        Self::standard(1, 0, STD_AC_LUMA_LENGTHS, &STD_AC_LUMA_VALUES)
    }

    /// Annex K.3, Table K.6.
    pub fn chroma_ac() -> Self {
        Self::standard(1, 1, STD_AC_CHROMA_LENGTHS, &STD_AC_CHROMA_VALUES)
    }

    fn standard(class: u8, id: u8, code_lengths: [u8; 16], values: &[u8]) -> Self {
        Self {
            class,
            id,
            code_lengths,
            values: values.to_vec(),
        }
    }

    /// Serialized form as it appears inside a DHT segment.
    pub fn to_segment_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(17 + self.values.len());
        out.push((self.class << 4) | self.id);
        out.extend_from_slice(&self.code_lengths);
        out.extend_from_slice(&self.values);
        out
    }
}

/// Compiled table for decoding.
#[derive(Debug, Clone)]
pub struct HuffmanLookup {
    /// `(symbol, code length)` for codes of at most 8 bits, `(0, 0)` otherwise.
    lut: [(u8, u8); LUT_SIZE],
    /// Largest code of each length, -1 when the length is unused.
    max_code: [i32; 17],
    /// Index into `values` of the first code of each length, minus that code.
    val_offset: [i32; 17],
    values: Vec<u8>,
}

impl HuffmanLookup {
    pub fn from_table(table: &HuffmanTable) -> Result<Self> {
        let (sizes, codes) = derive_huffman_codes(&table.code_lengths)?;
        if sizes.len() > table.values.len() {
            return Err(JpegError::MalformedSegment {
                segment: "DHT",
                reason: "fewer symbols than codes".to_string(),
            });
        }

        let mut lut = [(0u8, 0u8); LUT_SIZE];
        let mut max_code = [-1i32; 17];
        let mut val_offset = [0i32; 17];

        let mut k = 0usize;
        for len in 1..=16usize {
            let count = table.code_lengths[len - 1] as usize;
            if count == 0 {
                continue;
            }
            val_offset[len] = k as i32 - codes[k] as i32;
            max_code[len] = codes[k + count - 1] as i32;

            if len <= LUT_BITS as usize {
                for idx in k..k + count {
                    let shift = LUT_BITS as usize - len;
                    let base = (codes[idx] as usize) << shift;
                    for entry in &mut lut[base..base + (1 << shift)] {
                        *entry = (table.values[idx], len as u8);
                    }
                }
            }
            k += count;
        }

        Ok(Self {
            lut,
            max_code,
            val_offset,
            values: table.values.clone(),
        })
    }
}

/// Compiled table for encoding: symbol to `(code, length)`.
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    encode_map: [Option<(u16, u8)>; 256],
}

impl HuffmanEncoder {
    pub fn from_table(table: &HuffmanTable) -> Result<Self> {
        let (sizes, codes) = derive_huffman_codes(&table.code_lengths)?;

        let mut encode_map = [None; 256];
        for ((&size, &code), &symbol) in sizes.iter().zip(codes.iter()).zip(&table.values) {
            encode_map[symbol as usize] = Some((code, size));
        }

        Ok(Self { encode_map })
    }

    #[inline]
    pub fn encode(&self, symbol: u8) -> Option<(u16, u8)> {
        self.encode_map[symbol as usize]
    }
}

/// Generate code sizes and codes in symbol order (Figures C.1 and C.2).
fn derive_huffman_codes(code_lengths: &[u8; 16]) -> Result<(Vec<u8>, Vec<u16>)> {
    let total: usize = code_lengths.iter().map(|&n| n as usize).sum();
    if total > 256 {
        return Err(JpegError::MalformedSegment {
            segment: "DHT",
            reason: format!("{total} symbols exceed the limit of 256"),
        });
    }

    let mut sizes = Vec::with_capacity(total);
    for (len, &count) in code_lengths.iter().enumerate() {
        sizes.extend(std::iter::repeat((len + 1) as u8).take(count as usize));
    }

    let mut codes = Vec::with_capacity(total);
    let mut code: u32 = 0;
    let mut current = sizes.first().copied().unwrap_or(0);
    for &size in &sizes {
        while current < size {
            code <<= 1;
            current += 1;
        }
        if code >= (1u32 << size) {
            return Err(JpegError::MalformedSegment {
                segment: "DHT",
                reason: "code space overflow".to_string(),
            });
        }
        codes.push(code as u16);
        code += 1;
    }

    Ok((sizes, codes))
}

/// Reads entropy-coded bits, removing byte stuffing.
///
/// Filling stops in front of any marker. Bits requested past that point are
/// read as zeros but may never be consumed, so a truncated scan is reported
/// instead of decoded from padding.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bits: u32,
    num_bits: u8,
    phantom_bits: u8,
    at_marker: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bits: 0,
            num_bits: 0,
            phantom_bits: 0,
            at_marker: false,
        }
    }

    /// Byte offset of the first byte not yet pulled into the bit buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn fill(&mut self) {
        while self.num_bits <= 24 {
            let byte = if self.at_marker || self.pos >= self.data.len() {
                self.phantom_bits += 8;
                0
            } else {
                let byte = self.data[self.pos];
                if byte == 0xFF {
                    match self.data.get(self.pos + 1) {
                        Some(0x00) => {
                            self.pos += 2;
                            0xFF
                        }
                        Some(0xFF) => {
                            self.pos += 1;
                            continue;
                        }
                        _ => {
                            self.at_marker = true;
                            continue;
                        }
                    }
                } else {
                    self.pos += 1;
                    byte
                }
            };
            self.bits = (self.bits << 8) | byte as u32;
            self.num_bits += 8;
        }
    }

    #[inline]
    fn peek(&mut self, count: u8) -> u16 {
        if self.num_bits < count {
            self.fill();
        }
        let shift = self.num_bits - count;
        ((self.bits >> shift) & ((1u32 << count) - 1)) as u16
    }

    #[inline]
    fn consume(&mut self, count: u8) -> Result<()> {
        if count > self.num_bits.saturating_sub(self.phantom_bits) {
            return Err(JpegError::TruncatedScan);
        }
        self.num_bits -= count;
        self.bits &= (1u32 << self.num_bits).wrapping_sub(1);
        Ok(())
    }

    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        if count == 0 {
            return Ok(0);
        }
        let value = self.peek(count);
        self.consume(count)?;
        Ok(value)
    }

    pub fn decode_huffman(&mut self, table: &HuffmanLookup) -> Result<u8> {
        let (symbol, len) = table.lut[self.peek(LUT_BITS) as usize];
        if len > 0 {
            self.consume(len)?;
            return Ok(symbol);
        }

        let window = self.peek(16) as i32;
        for len in (LUT_BITS + 1)..=16 {
            let code = window >> (16 - len);
            if code <= table.max_code[len as usize] {
                let idx = (table.val_offset[len as usize] + code) as usize;
                let symbol = *table.values.get(idx).ok_or_else(|| {
                    JpegError::InvalidHuffmanData(format!("code {code:b} has no symbol"))
                })?;
                self.consume(len)?;
                return Ok(symbol);
            }
        }

        if self.num_bits <= self.phantom_bits {
            return Err(JpegError::TruncatedScan);
        }
        Err(JpegError::InvalidHuffmanData(format!(
            "no code matches 0b{:016b}",
            window
        )))
    }

    /// Read `size` magnitude bits and sign-extend them (Figure F.12).
    pub fn receive_extend(&mut self, size: u8) -> Result<i16> {
        if size == 0 {
            return Ok(0);
        }
        let value = self.read_bits(size)? as i32;
        if value < (1 << (size - 1)) {
            Ok((value - (1 << size) + 1) as i16)
        } else {
            Ok(value as i16)
        }
    }

    /// Drop the buffered bits at a restart boundary and skip the RSTn marker.
    pub fn restart(&mut self) -> Result<()> {
        self.bits = 0;
        self.num_bits = 0;
        self.phantom_bits = 0;
        self.at_marker = false;

        while self.data.get(self.pos) == Some(&0xFF) && self.data.get(self.pos + 1) == Some(&0xFF)
        {
            self.pos += 1;
        }
        match (self.data.get(self.pos), self.data.get(self.pos + 1)) {
            (Some(0xFF), Some(0xD0..=0xD7)) => {
                self.pos += 2;
                Ok(())
            }
            _ => Err(JpegError::Missing(format!(
                "restart marker at scan offset {}",
                self.pos
            ))),
        }
    }
}

/// Writes entropy-coded bits with byte stuffing.
pub struct BitWriter {
    data: Vec<u8>,
    bits: u32,
    num_bits: u8,
}

impl BitWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            bits: 0,
            num_bits: 0,
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u16, count: u8) {
        if count == 0 {
            return;
        }
        let value = value as u32 & ((1u32 << count) - 1);
        self.bits = (self.bits << count) | value;
        self.num_bits += count;

        while self.num_bits >= 8 {
            self.num_bits -= 8;
            self.write_byte((self.bits >> self.num_bits) as u8);
        }
        self.bits &= (1u32 << self.num_bits) - 1;
    }

    pub fn write_huffman(&mut self, symbol: u8, table: &HuffmanEncoder) -> Result<()> {
        let (code, len) = table.encode(symbol).ok_or_else(|| {
            JpegError::InvalidHuffmanData(format!("symbol 0x{symbol:02X} has no code"))
        })?;
        self.write_bits(code, len);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) {
        self.data.push(byte);
        if byte == 0xFF {
            self.data.push(0x00);
        }
    }

    /// Pad to a byte boundary with 1-bits.
    pub fn flush(&mut self) {
        if self.num_bits > 0 {
            let padding = 8 - self.num_bits;
            let byte = (self.bits << padding) | ((1u32 << padding) - 1);
            self.write_byte(byte as u8);
            self.bits = 0;
            self.num_bits = 0;
        }
    }

    /// Pad and emit `RSTn`; `n` cycles modulo 8.
    pub fn write_restart(&mut self, n: u8) {
        self.flush();
        self.data.push(0xFF);
        self.data.push(0xD0 + (n & 0x07));
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.data
    }
}

/// Magnitude category and appended bits for a coefficient (inverse of F.12).
#[inline]
pub fn encode_coefficient(value: i32) -> (u8, u16) {
    if value == 0 {
        return (0, 0);
    }
    let magnitude = value.unsigned_abs();
    let size = (32 - magnitude.leading_zeros()) as u8;
    let bits = if value < 0 {
        ((1u32 << size) - 1 - magnitude) as u16
    } else {
        magnitude as u16
    };
    (size, bits)
}

const STD_DC_LUMA_LENGTHS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const STD_DC_CHROMA_LENGTHS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const STD_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const STD_AC_LUMA_LENGTHS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7D];
const STD_AC_LUMA_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61,
    0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08, 0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52,
    0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x25,
    0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45,
    0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64,
    0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A, 0x83,
    0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99,
    0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6,
    0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3,
    0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8,
    0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA,
];

const STD_AC_CHROMA_LENGTHS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
const STD_AC_CHROMA_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61,
    0x71, 0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xA1, 0xB1, 0xC1, 0x09, 0x23, 0x33,
    0x52, 0xF0, 0x15, 0x62, 0x72, 0xD1, 0x0A, 0x16, 0x24, 0x34, 0xE1, 0x25, 0xF1, 0x17, 0x18,
    0x19, 0x1A, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44,
    0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x63,
    0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7A,
    0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97,
    0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4,
    0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA,
    0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7,
    0xE8, 0xE9, 0xEA, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA,
];
