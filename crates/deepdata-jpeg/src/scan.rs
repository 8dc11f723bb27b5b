//! Baseline scan decoding and encoding.
//!
//! Both directions walk the same MCU order: a single-component scan visits the
//! component's own block extent row by row, an interleaved scan visits every
//! MCU and, inside it, each component's `h x v` blocks in raster order.

use crate::coefficients::ComponentCoefficients;
use crate::error::{JpegError, Result};
use crate::huffman::{encode_coefficient, BitReader, BitWriter, HuffmanEncoder, HuffmanLookup, HuffmanTable};
use crate::parser::{FrameHeader, ScanHeader};

/// Largest AC magnitude representable with baseline size categories.
pub const MAX_AC_MAGNITUDE: i32 = 1023;

pub type TableSlots = [Option<HuffmanTable>; 4];

/// DC/AC table ids used when writing: luma tables for the first component,
/// chroma tables for the rest.
pub fn table_ids(component_index: usize) -> (u8, u8) {
    if component_index == 0 {
        (0, 0)
    } else {
        (1, 1)
    }
}

fn for_each_mcu<F>(frame: &FrameHeader, scan: &[usize], mut visit: F) -> Result<()>
where
    F: FnMut(usize, &[(usize, usize)]) -> Result<()>,
{
    let mut blocks = Vec::with_capacity(10);

    if let [index] = scan {
        let (cols, rows) = frame.component_extent(*index);
        let (stride, _) = frame.block_grid(*index);
        for row in 0..rows {
            for col in 0..cols {
                blocks.clear();
                blocks.push((0, row * stride + col));
                visit(row * cols + col, &blocks)?;
            }
        }
        return Ok(());
    }

    let (mcus_x, mcus_y) = frame.mcu_grid();
    for mcu_y in 0..mcus_y {
        for mcu_x in 0..mcus_x {
            blocks.clear();
            for (slot, &index) in scan.iter().enumerate() {
                let c = &frame.components[index];
                let (h, v) = (c.h_sampling as usize, c.v_sampling as usize);
                let (stride, _) = frame.block_grid(index);
                for y in 0..v {
                    for x in 0..h {
                        let row = mcu_y * v + y;
                        let col = mcu_x * h + x;
                        blocks.push((slot, row * stride + col));
                    }
                }
            }
            visit(mcu_y * mcus_x + mcu_x, &blocks)?;
        }
    }
    Ok(())
}

fn lookup(tables: &TableSlots, id: u8, class: &str) -> Result<HuffmanLookup> {
    let table = tables
        .get(id as usize)
        .and_then(Option::as_ref)
        .ok_or_else(|| JpegError::Missing(format!("{class} Huffman table {id}")))?;
    HuffmanLookup::from_table(table)
}

/// Decode one baseline scan into the component grids it covers.
pub fn decode_scan(
    frame: &FrameHeader,
    scan: &ScanHeader,
    dc_tables: &TableSlots,
    ac_tables: &TableSlots,
    restart_interval: u16,
    data: &[u8],
    components: &mut [ComponentCoefficients],
) -> Result<()> {
    if scan.spectral_start != 0
        || scan.spectral_end != 63
        || scan.approx_high != 0
        || scan.approx_low != 0
    {
        return Err(JpegError::Unsupported(format!(
            "scan with spectral selection {}..={} and approximation {}/{}",
            scan.spectral_start, scan.spectral_end, scan.approx_high, scan.approx_low
        )));
    }

    let tables = scan
        .components
        .iter()
        .map(|sc| Ok((lookup(dc_tables, sc.dc_table, "DC")?, lookup(ac_tables, sc.ac_table, "AC")?)))
        .collect::<Result<Vec<_>>>()?;
    let indices: Vec<usize> = scan.components.iter().map(|sc| sc.index).collect();

    let mut reader = BitReader::new(data);
    let mut predictors = vec![0i32; indices.len()];
    let interval = restart_interval as usize;

    for_each_mcu(frame, &indices, |mcu, blocks| {
        if interval > 0 && mcu > 0 && mcu % interval == 0 {
            reader.restart()?;
            predictors.fill(0);
        }
        for &(slot, block_index) in blocks {
            let (dc, ac) = &tables[slot];
            let block = &mut components[indices[slot]].blocks_mut()[block_index];
            decode_block(&mut reader, block, dc, ac, &mut predictors[slot])?;
        }
        Ok(())
    })?;

    log::debug!(
        "decoded scan over {} component(s), {} of {} bytes consumed",
        indices.len(),
        reader.position(),
        data.len()
    );
    Ok(())
}

/// Encode all components as a single scan with the standard tables.
pub fn encode_scan(
    frame: &FrameHeader,
    components: &[ComponentCoefficients],
    restart_interval: u16,
) -> Result<Vec<u8>> {
    if components.len() > 4 {
        return Err(JpegError::Unsupported(format!(
            "{} components in one scan",
            components.len()
        )));
    }

    let luma = (
        HuffmanEncoder::from_table(&HuffmanTable::luma_dc())?,
        HuffmanEncoder::from_table(&HuffmanTable::luma_ac())?,
    );
    let chroma = (
        HuffmanEncoder::from_table(&HuffmanTable::chroma_dc())?,
        HuffmanEncoder::from_table(&HuffmanTable::chroma_ac())?,
    );

    let indices: Vec<usize> = (0..components.len()).collect();
    let total_blocks: usize = components.iter().map(|c| c.blocks().len()).sum();
    let mut writer = BitWriter::with_capacity(total_blocks * 16);
    let mut predictors = vec![0i32; indices.len()];
    let interval = restart_interval as usize;

    for_each_mcu(frame, &indices, |mcu, blocks| {
        if interval > 0 && mcu > 0 && mcu % interval == 0 {
            writer.write_restart(((mcu / interval - 1) % 8) as u8);
            predictors.fill(0);
        }
        for &(slot, block_index) in blocks {
            let (dc, ac) = if table_ids(slot).0 == 0 { &luma } else { &chroma };
            let block = &components[slot].blocks()[block_index];
            encode_block(&mut writer, block, dc, ac, &mut predictors[slot])?;
        }
        Ok(())
    })?;

    Ok(writer.into_bytes())
}

fn decode_block(
    reader: &mut BitReader,
    block: &mut [i16; 64],
    dc_table: &HuffmanLookup,
    ac_table: &HuffmanLookup,
    predictor: &mut i32,
) -> Result<()> {
    block.fill(0);

    let dc_size = reader.decode_huffman(dc_table)?;
    if dc_size > 11 {
        return Err(JpegError::InvalidHuffmanData(format!(
            "DC size category {dc_size}"
        )));
    }
    *predictor += reader.receive_extend(dc_size)? as i32;
    block[0] = i16::try_from(*predictor).map_err(|_| {
        JpegError::InvalidHuffmanData(format!("DC value {} overflows", *predictor))
    })?;

    let mut k = 1;
    while k < 64 {
        let symbol = reader.decode_huffman(ac_table)?;
        let run = (symbol >> 4) as usize;
        let size = symbol & 0x0F;

        match (run, size) {
            (0, 0) => break,
            (15, 0) => k += 16,
            (_, 0) => {
                return Err(JpegError::InvalidHuffmanData(format!(
                    "AC symbol 0x{symbol:02X}"
                )))
            }
            _ => {
                k += run;
                if k > 63 || size > 10 {
                    return Err(JpegError::InvalidHuffmanData(format!(
                        "AC symbol 0x{symbol:02X} overruns the block"
                    )));
                }
                block[k] = reader.receive_extend(size)?;
                k += 1;
            }
        }
    }
    Ok(())
}

fn encode_block(
    writer: &mut BitWriter,
    block: &[i16; 64],
    dc_encoder: &HuffmanEncoder,
    ac_encoder: &HuffmanEncoder,
    predictor: &mut i32,
) -> Result<()> {
    let diff = block[0] as i32 - *predictor;
    *predictor = block[0] as i32;
    let (size, bits) = encode_coefficient(diff);
    if size > 11 {
        return Err(JpegError::CoefficientOutOfRange {
            value: block[0] as i32,
            index: 0,
        });
    }
    writer.write_huffman(size, dc_encoder)?;
    writer.write_bits(bits, size);

    let mut run = 0u8;
    for (k, &coefficient) in block.iter().enumerate().skip(1) {
        let value = coefficient as i32;
        if value == 0 {
            run += 1;
            continue;
        }
        if value.abs() > MAX_AC_MAGNITUDE {
            return Err(JpegError::CoefficientOutOfRange { value, index: k });
        }
        while run >= 16 {
            writer.write_huffman(0xF0, ac_encoder)?;
            run -= 16;
        }
        let (size, bits) = encode_coefficient(value);
        writer.write_huffman((run << 4) | size, ac_encoder)?;
        writer.write_bits(bits, size);
        run = 0;
    }
    if run > 0 {
        writer.write_huffman(0x00, ac_encoder)?;
    }
    Ok(())
}
