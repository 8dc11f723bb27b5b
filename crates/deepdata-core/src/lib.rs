//! # DeepData Core API
//!
//! Hides a byte payload inside an image and recovers it. Three methods are
//! available, selected by [`CodecOptions`]:
//! - [`Method::Lsb`] replaces the low bits of the raw RGBA bytes
//! - [`Method::Qim`] quantizes the color channels of every pixel
//! - [`Method::DctQim`] quantizes the AC coefficients of a JPEG without
//!   decompressing it
//!
//! Every method writes the same frame: a 32-bit big-endian payload length
//! followed by the payload, most significant bit first.
//!
//! # Usage Examples
//!
//! ## Hide data inside an image
//!
//! ```rust,no_run
//! deepdata_core::api::embed::prepare()
//!     .with_payload("Hello, World!")
//!     .with_image("carrier.png")
//!     .with_output("image-with-a-secret.png")
//!     .execute()
//!     .expect("Failed to hide data in image");
//! ```
//!
//! ## Extract data from an image
//!
//! ```rust,no_run
//! use deepdata_core::codec_options::{CodecOptions, DctQimOptions, JpegComponents};
//!
//! let options = DctQimOptions::new(8, JpegComponents::Y, 32).expect("valid options");
//! let payload = deepdata_core::api::extract::prepare()
//!     .with_options(CodecOptions::DctQim(options))
//!     .from_secret_file("photo-with-a-secret.jpg")
//!     .extract_bytes()
//!     .expect("Failed to extract data from image");
//! ```
//!
//! ## Work on carriers in memory
//!
//! ```rust
//! use deepdata_core::codec::{Capacity, Embed, Extract, LsbCodec};
//! use deepdata_core::progress::NoProgress;
//!
//! let carrier = vec![0u8; 1000];
//! let codec = LsbCodec::default();
//!
//! assert_eq!(codec.capacity(carrier.as_slice()), 250);
//! let secret = codec.embed(carrier.as_slice(), b"hi", &mut NoProgress).unwrap();
//! assert_eq!(codec.extract(secret.as_slice(), &mut NoProgress).unwrap(), b"hi");
//! ```

pub mod api;
pub mod bit_stream;
pub mod codec;
pub mod codec_options;
pub mod commands;
pub mod error;
pub mod media;
pub mod progress;
pub mod quantization;
pub mod result;

pub use crate::bit_stream::BitStream;
pub use crate::codec::{Codec, MediaCodec};
pub use crate::codec_options::{CodecOptions, Method};
pub use crate::error::DeepDataError;
pub use crate::media::{Media, Persist};
pub use crate::progress::{NoProgress, Progress};
pub use crate::result::Result;
