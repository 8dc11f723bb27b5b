//! Quantization index modulation on single samples.
//!
//! A sample is snapped to the lower edge of its `delta`-wide bin and then moved
//! to the bin's lower quarter (bit `0`) or upper quarter (bit `1`). Extraction
//! only looks at where inside its bin a sample sits.
//!
//! Samples near the top of their range would leave it after the shift. Instead
//! of clamping, which could land the value in the wrong half of a bin, the
//! sample moves one bin down. Every representable sample therefore decodes to
//! the embedded bit.

/// Largest magnitude a signed coefficient is quantized to. Matches the baseline
/// JPEG limit for AC terms.
pub const MAX_COEFFICIENT: i32 = deepdata_jpeg::MAX_AC_MAGNITUDE;

/// Samples that can carry one bit by quantization index modulation.
pub trait Quantize: Copy {
    fn qim_embed(self, bit: bool, delta: u8) -> Self;
    fn qim_extract(self, delta: u8) -> bool;
}

fn embed_magnitude(magnitude: i32, bit: bool, delta: i32, max: i32) -> i32 {
    let base = magnitude / delta * delta;
    let offset = if bit { 3 * delta / 4 } else { delta / 4 };

    if base + offset > max {
        base - delta + offset
    } else {
        base + offset
    }
}

fn extract_magnitude(magnitude: i32, delta: i32) -> bool {
    2 * (magnitude % delta) >= delta
}

impl Quantize for u8 {
    fn qim_embed(self, bit: bool, delta: u8) -> Self {
        embed_magnitude(self as i32, bit, delta as i32, u8::MAX as i32) as u8
    }

    fn qim_extract(self, delta: u8) -> bool {
        extract_magnitude(self as i32, delta as i32)
    }
}

/// Operates on the magnitude and keeps the sign. Zero stays zero, magnitudes
/// beyond [`MAX_COEFFICIENT`] are treated as the maximum.
impl Quantize for i16 {
    fn qim_embed(self, bit: bool, delta: u8) -> Self {
        if self == 0 {
            return 0;
        }
        let magnitude = (self as i32).abs().min(MAX_COEFFICIENT);
        let embedded = embed_magnitude(magnitude, bit, delta as i32, MAX_COEFFICIENT);

        (embedded * (self as i32).signum()) as i16
    }

    fn qim_extract(self, delta: u8) -> bool {
        extract_magnitude((self as i32).abs().min(MAX_COEFFICIENT), delta as i32)
    }
}

/// Majority decision over the channels of one pixel. No active channel is `false`.
pub fn vote(active_channels: usize, true_count: usize) -> bool {
    active_channels > 0 && true_count * 2 > active_channels
}
