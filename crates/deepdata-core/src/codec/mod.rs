//! The three embedding codecs and the dispatch over them.
//!
//! Every codec works on its own carrier type through [`Capacity`], [`Embed`]
//! and [`Extract`]. [`Codec`] wraps them behind [`MediaCodec`] so callers can
//! work with any loaded [`Media`].

mod dct_qim;
mod lsb;
mod qim;

use enum_dispatch::enum_dispatch;
use image::RgbaImage;

pub use dct_qim::{BlockGrid, CoefficientCarrier, DctQimCodec};
pub use lsb::LsbCodec;
pub use qim::QimCodec;

use crate::bit_stream::HEADER_BYTES;
use crate::media::Media;
use crate::progress::Progress;
use crate::{CodecOptions, DeepDataError, Method, Result};

/// Number of payload bytes, header included, a carrier can hold.
pub trait Capacity<C: ?Sized> {
    fn capacity(&self, carrier: &C) -> usize;
}

/// Hide a payload in a copy of the carrier. The carrier itself is never touched.
pub trait Embed<C: ?Sized + ToOwned>: Capacity<C> {
    fn embed(&self, carrier: &C, payload: &[u8], progress: &mut dyn Progress) -> Result<C::Owned>;
}

/// Recover a payload hidden by the matching [`Embed`] with the same options.
pub trait Extract<C: ?Sized>: Capacity<C> {
    fn extract(&self, carrier: &C, progress: &mut dyn Progress) -> Result<Vec<u8>>;
}

/// Fails with [`DeepDataError::CapacityExceeded`] unless the framed payload fits.
pub(crate) fn ensure_fits(capacity: usize, payload_len: usize) -> Result<()> {
    let required = payload_len.saturating_add(HEADER_BYTES);
    if required > capacity {
        log::debug!("payload needs {required} bytes, carrier holds {capacity} bytes");
        return Err(DeepDataError::CapacityExceeded {
            required,
            available: capacity,
        });
    }
    Ok(())
}

/// Codec operations on loaded media.
#[enum_dispatch]
pub trait MediaCodec {
    fn method(&self) -> Method;
    fn capacity_of(&self, media: &Media) -> Result<usize>;
    fn embed_into(&self, media: &Media, payload: &[u8], progress: &mut dyn Progress)
        -> Result<Media>;
    fn extract_from(&self, media: &Media, progress: &mut dyn Progress) -> Result<Vec<u8>>;
}

#[enum_dispatch(MediaCodec)]
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    LsbCodec,
    QimCodec,
    DctQimCodec,
}

impl From<CodecOptions> for Codec {
    fn from(options: CodecOptions) -> Self {
        match options {
            CodecOptions::Lsb(o) => LsbCodec::new(o).into(),
            CodecOptions::Qim(o) => QimCodec::new(o).into(),
            CodecOptions::DctQim(o) => DctQimCodec::new(o).into(),
        }
    }
}

fn mismatch<T>(codec: &impl MediaCodec) -> Result<T> {
    let method = codec.method();
    log::error!("{method} cannot operate on the loaded media");
    Err(DeepDataError::MethodMediaMismatch { method })
}

/// LSB on a raster image works on its raw RGBA bytes, alpha included.
impl MediaCodec for LsbCodec {
    fn method(&self) -> Method {
        Method::Lsb
    }

    fn capacity_of(&self, media: &Media) -> Result<usize> {
        match media {
            Media::Image(image) => Ok(self.capacity(image.as_raw().as_slice())),
            Media::Jpeg(_) => mismatch(self),
        }
    }

    fn embed_into(
        &self,
        media: &Media,
        payload: &[u8],
        progress: &mut dyn Progress,
    ) -> Result<Media> {
        let Media::Image(image) = media else {
            return mismatch(self);
        };
        let (width, height) = image.dimensions();
        let bytes = self.embed(image.as_raw().as_slice(), payload, progress)?;

        RgbaImage::from_raw(width, height, bytes)
            .map(Media::Image)
            .ok_or(DeepDataError::InvalidImageMedia)
    }

    fn extract_from(&self, media: &Media, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        match media {
            Media::Image(image) => self.extract(image.as_raw().as_slice(), progress),
            Media::Jpeg(_) => mismatch(self),
        }
    }
}

impl MediaCodec for QimCodec {
    fn method(&self) -> Method {
        Method::Qim
    }

    fn capacity_of(&self, media: &Media) -> Result<usize> {
        match media {
            Media::Image(image) => Ok(self.capacity(image)),
            Media::Jpeg(_) => mismatch(self),
        }
    }

    fn embed_into(
        &self,
        media: &Media,
        payload: &[u8],
        progress: &mut dyn Progress,
    ) -> Result<Media> {
        match media {
            Media::Image(image) => Ok(Media::Image(self.embed(image, payload, progress)?)),
            Media::Jpeg(_) => mismatch(self),
        }
    }

    fn extract_from(&self, media: &Media, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        match media {
            Media::Image(image) => self.extract(image, progress),
            Media::Jpeg(_) => mismatch(self),
        }
    }
}

impl MediaCodec for DctQimCodec {
    fn method(&self) -> Method {
        Method::DctQim
    }

    fn capacity_of(&self, media: &Media) -> Result<usize> {
        match media {
            Media::Jpeg(jpeg) => Ok(self.capacity(jpeg)),
            Media::Image(_) => mismatch(self),
        }
    }

    fn embed_into(
        &self,
        media: &Media,
        payload: &[u8],
        progress: &mut dyn Progress,
    ) -> Result<Media> {
        match media {
            Media::Jpeg(jpeg) => Ok(Media::Jpeg(self.embed(jpeg, payload, progress)?)),
            Media::Image(_) => mismatch(self),
        }
    }

    fn extract_from(&self, media: &Media, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        match media {
            Media::Jpeg(jpeg) => self.extract(jpeg, progress),
            Media::Image(_) => mismatch(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec_options::{DctQimOptions, QimOptions};
    use crate::progress::NoProgress;

    fn gray_image(width: u32, height: u32) -> Media {
        Media::Image(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([128, 128, 128, 255]),
        ))
    }

    #[test]
    fn should_build_the_codec_of_the_options() {
        assert_eq!(Codec::from(CodecOptions::default()).method(), Method::Lsb);
        assert_eq!(
            Codec::from(CodecOptions::Qim(QimOptions::default())).method(),
            Method::Qim
        );
        assert_eq!(
            Codec::from(CodecOptions::DctQim(DctQimOptions::default())).method(),
            Method::DctQim
        );
    }

    #[test]
    fn should_round_trip_through_media() {
        let media = gray_image(40, 40);
        for options in [
            CodecOptions::default(),
            CodecOptions::Qim(QimOptions::default()),
        ] {
            let codec = Codec::from(options);
            let stego = codec
                .embed_into(&media, b"media", &mut NoProgress)
                .unwrap();

            assert_eq!(
                codec.extract_from(&stego, &mut NoProgress).unwrap(),
                b"media"
            );
        }
    }

    #[test]
    fn should_refuse_the_wrong_media_kind() {
        let codec = Codec::from(CodecOptions::DctQim(DctQimOptions::default()));

        assert!(matches!(
            codec.capacity_of(&gray_image(8, 8)),
            Err(DeepDataError::MethodMediaMismatch {
                method: Method::DctQim
            })
        ));
    }

    #[test]
    fn lsb_capacity_should_count_alpha_bytes() {
        let codec = Codec::from(CodecOptions::default());

        assert_eq!(codec.capacity_of(&gray_image(10, 10)).unwrap(), 100);
    }

    #[test]
    fn should_require_room_for_the_header() {
        assert!(ensure_fits(5, 1).is_ok());
        assert!(matches!(
            ensure_fits(4, 1),
            Err(DeepDataError::CapacityExceeded {
                required: 5,
                available: 4
            })
        ));
    }
}
