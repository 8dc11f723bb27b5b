use image::RgbaImage;

use crate::bit_stream::BitStream;
use crate::codec::{ensure_fits, Capacity, Embed, Extract};
use crate::codec_options::QimOptions;
use crate::progress::Progress;
use crate::quantization::{vote, Quantize};
use crate::Result;

/// One frame bit per pixel, written into every enabled color channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct QimCodec {
    options: QimOptions,
}

impl QimCodec {
    pub fn new(options: QimOptions) -> Self {
        Self { options }
    }
}

fn pixel_count(image: &RgbaImage) -> usize {
    image.width() as usize * image.height() as usize
}

impl Capacity<RgbaImage> for QimCodec {
    fn capacity(&self, image: &RgbaImage) -> usize {
        pixel_count(image) / 8
    }
}

impl Embed<RgbaImage> for QimCodec {
    fn embed(
        &self,
        image: &RgbaImage,
        payload: &[u8],
        progress: &mut dyn Progress,
    ) -> Result<RgbaImage> {
        ensure_fits(self.capacity(image), payload.len())?;

        let mut frame = BitStream::from_payload_with_header(payload)?;
        let channels = self.options.channels();
        let delta = self.options.delta();
        let total = pixel_count(image);
        let mut result = image.clone();

        for (i, pixel) in result.pixels_mut().enumerate() {
            if frame.is_at_end() {
                progress.update(total, total);
                break;
            }
            let bit = frame.read_bit()?;
            for (c, sample) in pixel.0.iter_mut().take(3).enumerate() {
                if channels.includes(c) {
                    *sample = sample.qim_embed(bit, delta);
                }
            }
            progress.update(i + 1, total);
        }
        log::debug!("qim: hid {} bits into channels {channels}", frame.position());

        Ok(result)
    }
}

impl Extract<RgbaImage> for QimCodec {
    fn extract(&self, image: &RgbaImage, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        let channels = self.options.channels();
        let delta = self.options.delta();
        let total = pixel_count(image);
        let mut stream = BitStream::new(total);

        for (i, pixel) in image.pixels().enumerate() {
            let ones = pixel.0[..3]
                .iter()
                .enumerate()
                .filter(|(c, sample)| channels.includes(*c) && sample.qim_extract(delta))
                .count();
            stream.write_bit(vote(channels.count(), ones))?;
            progress.update(i + 1, total);
        }

        stream.read_payload_with_header()
    }
}
