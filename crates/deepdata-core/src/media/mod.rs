mod jpeg;

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

pub use deepdata_jpeg::JpegImage;
use image::ImageFormat;
pub use image::RgbaImage;
use log::error;

use crate::{DeepDataError, Method, Result};

pub trait Persist {
    fn save_as(&mut self, _: &Path) -> Result<()>;
}

/// a carrier in the representation its method works on
#[derive(Debug, Clone)]
pub enum Media {
    /// decoded pixels, for `lsb` and `qim`
    Image(RgbaImage),
    /// quantized DCT coefficients, for `dct-qim`
    Jpeg(JpegImage),
}

fn extension(f: &Path) -> Option<String> {
    f.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

impl Media {
    pub fn from_image(img: RgbaImage) -> Self {
        Self::Image(img)
    }

    pub fn from_jpeg(jpeg: JpegImage) -> Self {
        Self::Jpeg(jpeg)
    }

    /// Load `f` the way `method` needs it: pixel methods decode PNG, BMP and JPEG
    /// files to RGBA, `dct-qim` reads the coefficients of a JPEG file.
    pub fn from_file(f: &Path, method: Method) -> Result<Self> {
        let Some(ext) = extension(f) else {
            return Err(DeepDataError::UnsupportedMedia);
        };

        match (method, ext.as_str()) {
            (Method::Lsb | Method::Qim, "png" | "bmp" | "jpg" | "jpeg") => Ok(Self::Image(
                image::open(f)
                    .map_err(|e| {
                        error!("Error decoding image {f:?}: {e}");
                        DeepDataError::InvalidImageMedia
                    })?
                    .to_rgba8(),
            )),
            (Method::DctQim, "jpg" | "jpeg") => {
                let bytes = std::fs::read(f).map_err(|source| {
                    error!("Error reading file {f:?}: {source}");
                    DeepDataError::ReadError { source }
                })?;
                let jpeg = JpegImage::decode(&bytes).map_err(|e| {
                    error!("Error decoding JPEG coefficients of {f:?}: {e}");
                    DeepDataError::InvalidJpegMedia(e)
                })?;

                Ok(Self::Jpeg(jpeg))
            }
            _ => Err(DeepDataError::UnsupportedMedia),
        }
    }

    /// Formats a media kind can be written as without losing hidden bits.
    fn ensure_lossless(&self, format: ImageFormat) -> Result<()> {
        match (self, format) {
            (Media::Image(_), ImageFormat::Png | ImageFormat::Bmp) => Ok(()),
            (Media::Jpeg(_), ImageFormat::Jpeg) => Ok(()),
            (Media::Image(_), ImageFormat::Jpeg) => {
                error!("Refusing to write pixel media as JPEG, the hidden data would be lost");
                Err(DeepDataError::UnsupportedMedia)
            }
            _ => Err(DeepDataError::UnsupportedMedia),
        }
    }

    pub fn save_to_writer<W: Write + Seek>(&self, mut writer: W, format: ImageFormat) -> Result<()> {
        self.ensure_lossless(format)?;
        match self {
            Media::Image(i) => i.write_to(&mut writer, format).map_err(|e| {
                error!("Error saving image: {e}");
                DeepDataError::ImageEncodingError
            }),
            Media::Jpeg(j) => {
                let bytes = j.encode().map_err(|e| {
                    error!("Error encoding JPEG: {e}");
                    DeepDataError::JpegEncodingError(e)
                })?;
                writer
                    .write_all(&bytes)
                    .map_err(|source| DeepDataError::WriteError { source })
            }
        }
    }
}

impl Persist for Media {
    fn save_as(&mut self, file: &Path) -> Result<()> {
        let format = ImageFormat::from_path(file).map_err(|_| DeepDataError::UnsupportedMedia)?;
        self.ensure_lossless(format)?;

        let f = File::create(file).map_err(|e| {
            error!("Error creating file {file:?}: {e}");
            DeepDataError::WriteError { source: e }
        })?;
        self.save_to_writer(f, format)
    }
}
