//! # DeepData JPEG
//!
//! Coefficient-level access to baseline JPEG files: entropy decoding into
//! quantized DCT blocks and entropy encoding back into a valid file, without
//! dequantization or IDCT.
//!
//! ```text
//! JPEG → markers → Huffman decode → [i16; 64] blocks → Huffman encode → JPEG
//! ```
//!
//! Coefficients stay in zig-zag order, so index 0 of every block is the DC
//! term and indices `1..64` are the AC terms from low to high frequency.

mod coefficients;
pub mod error;
pub mod huffman;
pub mod marker;
pub mod parser;
pub mod scan;
mod writer;

pub use coefficients::{ComponentCoefficients, JpegImage};
pub use error::{JpegError, Result};
pub use scan::MAX_AC_MAGNITUDE;
