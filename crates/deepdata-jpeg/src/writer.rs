//! Reassembles a JPEG file around freshly encoded scan data.

use crate::huffman::HuffmanTable;
use crate::marker::Marker;
use crate::parser::{FrameHeader, Segment};
use crate::scan::table_ids;

fn write_segment(out: &mut Vec<u8>, marker: Marker, data: &[u8]) {
    out.push(0xFF);
    out.push(marker.to_u8());
    out.extend_from_slice(&((data.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(data);
}

/// `SOI`, preserved segments, `SOF`, the standard `DHT`s, optional `DRI`,
/// one `SOS` over all components, the scan and `EOI`.
pub fn write_jpeg(
    frame: &FrameHeader,
    preserved: &[Segment],
    restart_interval: u16,
    scan_data: &[u8],
) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        scan_data.len() + preserved.iter().map(|s| s.data.len() + 4).sum::<usize>() + 1024,
    );

    out.extend_from_slice(&[0xFF, Marker::SOI.to_u8()]);

    for segment in preserved {
        write_segment(&mut out, segment.marker, &segment.data);
    }

    write_segment(&mut out, Marker::SOF(frame.sof_type), &frame.to_segment_bytes());

    let mut dht = Vec::new();
    dht.extend(HuffmanTable::luma_dc().to_segment_bytes());
    dht.extend(HuffmanTable::luma_ac().to_segment_bytes());
    if frame.components.len() > 1 {
        dht.extend(HuffmanTable::chroma_dc().to_segment_bytes());
        dht.extend(HuffmanTable::chroma_ac().to_segment_bytes());
    }
    write_segment(&mut out, Marker::DHT, &dht);

    if restart_interval > 0 {
        write_segment(&mut out, Marker::DRI, &restart_interval.to_be_bytes());
    }

    let mut sos = Vec::with_capacity(4 + 2 * frame.components.len());
    sos.push(frame.components.len() as u8);
    for (index, component) in frame.components.iter().enumerate() {
        let (dc, ac) = table_ids(index);
        sos.push(component.id);
        sos.push((dc << 4) | ac);
    }
    sos.extend_from_slice(&[0, 63, 0]);
    write_segment(&mut out, Marker::SOS, &sos);

    out.extend_from_slice(scan_data);
    out.extend_from_slice(&[0xFF, Marker::EOI.to_u8()]);
    out
}
