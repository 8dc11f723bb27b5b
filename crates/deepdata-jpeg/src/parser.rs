//! Marker segment parsing.
//!
//! Segments are read from a `Cursor` over the whole file so that scan data can
//! be handed to the entropy decoder as a borrowed slice.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{JpegError, Result};
use crate::huffman::HuffmanTable;
use crate::marker::Marker;

/// Frame component as declared in the SOF segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    pub id: u8,
    pub h_sampling: u8,
    pub v_sampling: u8,
    pub quant_table_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Low nibble of the SOF marker; 0 and 1 are the sequential Huffman processes.
    pub sof_type: u8,
    pub precision: u8,
    pub height: u16,
    pub width: u16,
    pub components: Vec<ComponentSpec>,
}

impl FrameHeader {
    pub fn max_sampling(&self) -> (usize, usize) {
        let h = self.components.iter().map(|c| c.h_sampling as usize).max();
        let v = self.components.iter().map(|c| c.v_sampling as usize).max();
        (h.unwrap_or(1), v.unwrap_or(1))
    }

    /// Number of MCUs horizontally and vertically for an interleaved scan.
    pub fn mcu_grid(&self) -> (usize, usize) {
        let (h_max, v_max) = self.max_sampling();
        (
            (self.width as usize).div_ceil(8 * h_max),
            (self.height as usize).div_ceil(8 * v_max),
        )
    }

    /// Blocks a component actually covers (Annex A.1.1), without MCU padding.
    pub fn component_extent(&self, index: usize) -> (usize, usize) {
        let (h_max, v_max) = self.max_sampling();
        let c = &self.components[index];
        let w = (self.width as usize * c.h_sampling as usize).div_ceil(h_max);
        let h = (self.height as usize * c.v_sampling as usize).div_ceil(v_max);
        (w.div_ceil(8), h.div_ceil(8))
    }

    /// Stored block grid of a component: the MCU-padded grid for colour frames,
    /// the plain extent for single-component frames.
    pub fn block_grid(&self, index: usize) -> (usize, usize) {
        if self.components.len() == 1 {
            return self.component_extent(index);
        }
        let (mcus_x, mcus_y) = self.mcu_grid();
        let c = &self.components[index];
        (mcus_x * c.h_sampling as usize, mcus_y * c.v_sampling as usize)
    }

    pub fn to_segment_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + 3 * self.components.len());
        out.push(self.precision);
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.width.to_be_bytes());
        out.push(self.components.len() as u8);
        for c in &self.components {
            out.push(c.id);
            out.push((c.h_sampling << 4) | c.v_sampling);
            out.push(c.quant_table_id);
        }
        out
    }
}

/// One component entry of an SOS header, resolved to its frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanComponent {
    pub index: usize,
    pub dc_table: u8,
    pub ac_table: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub approx_high: u8,
    pub approx_low: u8,
}

/// Segment carried through a transcode unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub marker: Marker,
    pub data: Vec<u8>,
}

/// Reads the two SOI bytes.
pub fn read_soi(cursor: &mut Cursor<&[u8]>) -> Result<()> {
    let mut soi = [0u8; 2];
    cursor.read_exact(&mut soi).map_err(|_| JpegError::MissingSoi)?;
    if soi != [0xFF, 0xD8] {
        return Err(JpegError::MissingSoi);
    }
    Ok(())
}

/// Next marker, skipping fill bytes; `None` at end of data.
pub fn read_marker(cursor: &mut Cursor<&[u8]>) -> Result<Option<Marker>> {
    let mut byte = match cursor.read_u8() {
        Ok(b) => b,
        Err(_) => return Ok(None),
    };
    while byte != 0xFF {
        byte = match cursor.read_u8() {
            Ok(b) => b,
            Err(_) => return Ok(None),
        };
    }
    while byte == 0xFF {
        byte = cursor.read_u8()?;
    }
    Marker::from_u8(byte)
        .map(Some)
        .ok_or(JpegError::InvalidMarker(byte))
}

/// Payload of a segment with a length field, excluding the length itself.
pub fn read_segment(cursor: &mut Cursor<&[u8]>, name: &'static str) -> Result<Vec<u8>> {
    let length = cursor.read_u16::<BigEndian>()? as usize;
    if length < 2 {
        return Err(JpegError::MalformedSegment {
            segment: name,
            reason: format!("length {length} is below the minimum of 2"),
        });
    }
    let mut data = vec![0u8; length - 2];
    cursor.read_exact(&mut data)?;
    Ok(data)
}

/// Borrow the entropy-coded data that follows an SOS header.
///
/// Stuffed bytes, fill bytes and RSTn markers belong to the scan; any other
/// marker ends it. The cursor is left on that marker's 0xFF.
pub fn read_scan_data<'a>(cursor: &mut Cursor<&'a [u8]>) -> &'a [u8] {
    let data: &'a [u8] = *cursor.get_ref();
    let start = cursor.position() as usize;
    let mut pos = start;
    while pos < data.len() {
        if data[pos] == 0xFF {
            match data.get(pos + 1) {
                Some(0x00) | Some(0xD0..=0xD7) => pos += 2,
                Some(0xFF) => pos += 1,
                Some(_) => break,
                None => {
                    pos += 1;
                    break;
                }
            }
        } else {
            pos += 1;
        }
    }
    cursor.set_position(pos as u64);
    &data[start..pos]
}

pub fn parse_dht(data: &[u8]) -> Result<Vec<HuffmanTable>> {
    let mut tables = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let class = data[pos] >> 4;
        let id = data[pos] & 0x0F;
        pos += 1;
        if class > 1 || id > 3 {
            return Err(JpegError::MalformedSegment {
                segment: "DHT",
                reason: format!("invalid table class {class} / id {id}"),
            });
        }

        let lengths = data.get(pos..pos + 16).ok_or_else(|| JpegError::MalformedSegment {
            segment: "DHT",
            reason: "truncated code lengths".to_string(),
        })?;
        let mut code_lengths = [0u8; 16];
        code_lengths.copy_from_slice(lengths);
        pos += 16;

        let total: usize = code_lengths.iter().map(|&n| n as usize).sum();
        let values = data
            .get(pos..pos + total)
            .ok_or_else(|| JpegError::MalformedSegment {
                segment: "DHT",
                reason: "truncated symbol values".to_string(),
            })?
            .to_vec();
        pos += total;

        tables.push(HuffmanTable {
            class,
            id,
            code_lengths,
            values,
        });
    }
    Ok(tables)
}

pub fn parse_sof(sof_type: u8, data: &[u8]) -> Result<FrameHeader> {
    let malformed = |reason: &str| JpegError::MalformedSegment {
        segment: "SOF",
        reason: reason.to_string(),
    };

    let mut cursor = Cursor::new(data);
    let precision = cursor.read_u8().map_err(|_| malformed("truncated header"))?;
    let height = cursor
        .read_u16::<BigEndian>()
        .map_err(|_| malformed("truncated header"))?;
    let width = cursor
        .read_u16::<BigEndian>()
        .map_err(|_| malformed("truncated header"))?;
    let count = cursor.read_u8().map_err(|_| malformed("truncated header"))? as usize;

    if count == 0 {
        return Err(malformed("no components"));
    }
    if width == 0 || height == 0 {
        return Err(JpegError::Unsupported(
            "frames with an undefined dimension (DNL)".to_string(),
        ));
    }

    let mut components = Vec::with_capacity(count);
    for _ in 0..count {
        let mut spec = [0u8; 3];
        cursor
            .read_exact(&mut spec)
            .map_err(|_| malformed("truncated component list"))?;
        let (h_sampling, v_sampling) = (spec[1] >> 4, spec[1] & 0x0F);
        if !(1..=4).contains(&h_sampling) || !(1..=4).contains(&v_sampling) {
            return Err(malformed("sampling factor outside 1..=4"));
        }
        components.push(ComponentSpec {
            id: spec[0],
            h_sampling,
            v_sampling,
            quant_table_id: spec[2],
        });
    }

    Ok(FrameHeader {
        sof_type,
        precision,
        height,
        width,
        components,
    })
}

pub fn parse_sos(data: &[u8], frame: &FrameHeader) -> Result<ScanHeader> {
    let malformed = |reason: String| JpegError::MalformedSegment {
        segment: "SOS",
        reason,
    };

    let count = *data.first().ok_or_else(|| malformed("empty header".to_string()))? as usize;
    if count == 0 || count > 4 || data.len() < 1 + 2 * count + 3 {
        return Err(malformed(format!("{count} components in {} bytes", data.len())));
    }

    let mut components = Vec::with_capacity(count);
    for i in 0..count {
        let id = data[1 + 2 * i];
        let tables = data[2 + 2 * i];
        let index = frame
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| malformed(format!("unknown component id {id}")))?;
        components.push(ScanComponent {
            index,
            dc_table: tables >> 4,
            ac_table: tables & 0x0F,
        });
    }

    let tail = &data[1 + 2 * count..];
    Ok(ScanHeader {
        components,
        spectral_start: tail[0],
        spectral_end: tail[1],
        approx_high: tail[2] >> 4,
        approx_low: tail[2] & 0x0F,
    })
}

pub fn parse_dri(data: &[u8]) -> Result<u16> {
    let mut cursor = Cursor::new(data);
    cursor
        .read_u16::<BigEndian>()
        .map_err(|_| JpegError::MalformedSegment {
            segment: "DRI",
            reason: "missing restart interval".to_string(),
        })
}
