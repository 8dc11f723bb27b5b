//! Error types for JPEG coefficient transcoding.

use thiserror::Error;

/// Result type alias for JPEG transcoding.
pub type Result<T> = std::result::Result<T, JpegError>;

#[derive(Error, Debug)]
pub enum JpegError {
    /// The stream does not start with an SOI marker.
    #[error("not a JPEG file (missing SOI marker)")]
    MissingSoi,

    /// A marker byte that ITU T.81 does not define.
    #[error("invalid marker byte: 0x{0:02X}")]
    InvalidMarker(u8),

    /// A marker segment whose content is inconsistent with its declared layout.
    #[error("malformed {segment} segment: {reason}")]
    MalformedSegment {
        segment: &'static str,
        reason: String,
    },

    /// A JPEG coding process other than 8-bit Huffman sequential DCT.
    #[error("unsupported JPEG: {0}")]
    Unsupported(String),

    /// A structural element required for decoding was never defined.
    #[error("missing {0}")]
    Missing(String),

    /// Entropy-coded data that does not match the active Huffman tables.
    #[error("invalid Huffman data: {0}")]
    InvalidHuffmanData(String),

    /// Entropy-coded data ended before all blocks were decoded.
    #[error("scan data ended unexpectedly")]
    TruncatedScan,

    /// A coefficient that baseline Huffman coding cannot represent.
    #[error("coefficient {value} at zig-zag index {index} is out of the baseline range")]
    CoefficientOutOfRange { value: i32, index: usize },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
