use std::io::Cursor;

use crate::error::{JpegError, Result};
use crate::marker::Marker;
use crate::parser::{
    parse_dht, parse_dri, parse_sof, parse_sos, read_marker, read_scan_data, read_segment,
    read_soi, FrameHeader, Segment,
};
use crate::scan::{decode_scan, encode_scan, TableSlots};
use crate::writer::write_jpeg;

/// Quantized DCT blocks of one frame component.
///
/// Blocks are stored row-major over the component's block grid; each block
/// holds its 64 coefficients in zig-zag order with the DC term at index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCoefficients {
    id: u8,
    h_sampling: u8,
    v_sampling: u8,
    blocks_wide: usize,
    blocks_tall: usize,
    blocks: Vec<[i16; 64]>,
}

impl ComponentCoefficients {
    fn for_frame(frame: &FrameHeader, index: usize) -> Self {
        let spec = &frame.components[index];
        let (blocks_wide, blocks_tall) = frame.block_grid(index);
        Self {
            id: spec.id,
            h_sampling: spec.h_sampling,
            v_sampling: spec.v_sampling,
            blocks_wide,
            blocks_tall,
            blocks: vec![[0i16; 64]; blocks_wide * blocks_tall],
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Horizontal and vertical sampling factors.
    pub fn sampling(&self) -> (u8, u8) {
        (self.h_sampling, self.v_sampling)
    }

    pub fn blocks_wide(&self) -> usize {
        self.blocks_wide
    }

    pub fn blocks_tall(&self) -> usize {
        self.blocks_tall
    }

    pub fn blocks(&self) -> &[[i16; 64]] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [[i16; 64]] {
        &mut self.blocks
    }

    pub fn block(&self, row: usize, col: usize) -> Option<&[i16; 64]> {
        if col >= self.blocks_wide {
            return None;
        }
        self.blocks.get(row * self.blocks_wide + col)
    }

    pub fn block_mut(&mut self, row: usize, col: usize) -> Option<&mut [i16; 64]> {
        if col >= self.blocks_wide {
            return None;
        }
        self.blocks.get_mut(row * self.blocks_wide + col)
    }
}

/// A baseline JPEG held as quantized coefficients.
///
/// ## Example
/// ```no_run
/// let bytes = std::fs::read("photo.jpg").unwrap();
/// let mut jpeg = deepdata_jpeg::JpegImage::decode(&bytes).unwrap();
/// jpeg.components_mut()[0].blocks_mut()[0][1] += 1;
/// std::fs::write("photo-modified.jpg", jpeg.encode().unwrap()).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegImage {
    frame: FrameHeader,
    components: Vec<ComponentCoefficients>,
    restart_interval: u16,
    preserved: Vec<Segment>,
}

impl JpegImage {
    /// Parse a JPEG file and entropy-decode every scan.
    ///
    /// Only 8-bit Huffman sequential frames (SOF0, SOF1) are accepted.
    /// APPn, COM and DQT segments are kept for [`JpegImage::encode`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        read_soi(&mut cursor)?;

        let mut frame: Option<FrameHeader> = None;
        let mut components = Vec::new();
        let mut dc_tables: TableSlots = Default::default();
        let mut ac_tables: TableSlots = Default::default();
        let mut restart_interval = 0;
        let mut preserved = Vec::new();
        let mut scans = 0usize;

        while let Some(marker) = read_marker(&mut cursor)? {
            match marker {
                Marker::EOI => break,
                Marker::SOF(n) => {
                    let data = read_segment(&mut cursor, "SOF")?;
                    if frame.is_some() {
                        return Err(JpegError::MalformedSegment {
                            segment: "SOF",
                            reason: "more than one frame header".to_string(),
                        });
                    }
                    if n > 1 {
                        return Err(JpegError::Unsupported(format!(
                            "SOF{n} frames (progressive, lossless, hierarchical or arithmetic)"
                        )));
                    }
                    let header = parse_sof(n, &data)?;
                    if header.precision != 8 {
                        return Err(JpegError::Unsupported(format!(
                            "{}-bit sample precision",
                            header.precision
                        )));
                    }
                    components = (0..header.components.len())
                        .map(|i| ComponentCoefficients::for_frame(&header, i))
                        .collect();
                    frame = Some(header);
                }
                Marker::DHT => {
                    for table in parse_dht(&read_segment(&mut cursor, "DHT")?)? {
                        let slots = if table.class == 0 {
                            &mut dc_tables
                        } else {
                            &mut ac_tables
                        };
                        let id = table.id as usize;
                        slots[id] = Some(table);
                    }
                }
                Marker::DAC => {
                    return Err(JpegError::Unsupported("arithmetic coding".to_string()));
                }
                Marker::DRI => {
                    restart_interval = parse_dri(&read_segment(&mut cursor, "DRI")?)?;
                }
                Marker::SOS => {
                    let header = read_segment(&mut cursor, "SOS")?;
                    let frame = frame
                        .as_ref()
                        .ok_or_else(|| JpegError::Missing("frame header before scan".to_string()))?;
                    let scan = parse_sos(&header, frame)?;
                    let entropy = read_scan_data(&mut cursor);
                    decode_scan(
                        frame,
                        &scan,
                        &dc_tables,
                        &ac_tables,
                        restart_interval,
                        entropy,
                        &mut components,
                    )?;
                    scans += 1;
                }
                Marker::APP(_) | Marker::COM | Marker::DQT => {
                    let data = read_segment(&mut cursor, "APP/COM/DQT")?;
                    preserved.push(Segment { marker, data });
                }
                other if other.has_length() => {
                    let data = read_segment(&mut cursor, "unknown")?;
                    log::debug!("dropping {other:?} segment of {} bytes", data.len());
                }
                other => log::debug!("ignoring stray {other:?} marker"),
            }
        }

        let frame = frame.ok_or_else(|| JpegError::Missing("frame header".to_string()))?;
        if scans == 0 {
            return Err(JpegError::Missing("scan data".to_string()));
        }
        log::debug!(
            "decoded {}x{} JPEG with {} component(s) in {scans} scan(s)",
            frame.width,
            frame.height,
            components.len()
        );

        Ok(Self {
            frame,
            components,
            restart_interval,
            preserved,
        })
    }

    /// Re-encode the current coefficients into a baseline JPEG file.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let scan = encode_scan(&self.frame, &self.components, self.restart_interval)?;
        Ok(write_jpeg(
            &self.frame,
            &self.preserved,
            self.restart_interval,
            &scan,
        ))
    }

    pub fn width(&self) -> u16 {
        self.frame.width
    }

    pub fn height(&self) -> u16 {
        self.frame.height
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[ComponentCoefficients] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [ComponentCoefficients] {
        &mut self.components
    }

    /// MCUs between restart markers; 0 when restart markers are not used.
    pub fn restart_interval(&self) -> u16 {
        self.restart_interval
    }

    pub fn set_restart_interval(&mut self, interval: u16) {
        self.restart_interval = interval;
    }
}
