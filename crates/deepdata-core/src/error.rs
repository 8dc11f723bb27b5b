use thiserror::Error;

use deepdata_jpeg::JpegError;

use crate::codec_options::Method;

#[derive(Error, Debug)]
pub enum DeepDataError {
    /// Options outside their documented ranges, for example `delta = 0` or an empty channel mask
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The payload plus its 4 byte length header does not fit into the carrier
    #[error("Capacity exceeded: {required} bytes required but the carrier only holds {available} bytes")]
    CapacityExceeded { required: usize, available: usize },

    /// A bit stream access past its capacity. Capacity counting and the embed or
    /// extract walk disagree when this surfaces.
    #[error("Bit stream overrun at bit {position} of {capacity}")]
    Overrun { position: usize, capacity: usize },

    /// The length header of a frame cannot be satisfied by the carrier. The carrier
    /// holds no hidden data or was written with different options.
    #[error("Corrupt frame: {required_bits} bits required but only {available_bits} bits available")]
    CorruptFrame {
        required_bits: usize,
        available_bits: usize,
    },

    /// Represents an unsupported carrier media. For example, a GIF file or a lossy output target
    #[error("Media format is not supported")]
    UnsupportedMedia,

    /// Represents an invalid carrier image media. For example, a broken PNG file
    #[error("Image media is invalid")]
    InvalidImageMedia,

    /// Represents a JPEG that cannot be decoded into coefficients
    #[error("JPEG media is invalid: {0}")]
    InvalidJpegMedia(#[from] JpegError),

    /// The selected method cannot operate on the loaded media kind
    #[error("Method {method} cannot be applied to this media")]
    MethodMediaMismatch { method: Method },

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    /// Represents a failure when re-encoding JPEG coefficients.
    #[error("JPEG encoding error: {0}")]
    JpegEncodingError(#[source] JpegError),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("No carrier media set")]
    CarrierNotSet,

    #[error("No target file set")]
    TargetNotSet,

    #[error("API Error: Missing payload")]
    MissingPayload,
}
