use crate::bit_stream::BitStream;
use crate::codec::{ensure_fits, Capacity, Embed, Extract};
use crate::codec_options::LsbOptions;
use crate::progress::Progress;
use crate::Result;

/// Replaces the low `strength` bits of every byte with frame bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsbCodec {
    options: LsbOptions,
}

impl LsbCodec {
    pub fn new(options: LsbOptions) -> Self {
        Self { options }
    }
}

impl Capacity<[u8]> for LsbCodec {
    fn capacity(&self, source: &[u8]) -> usize {
        source.len() * self.options.strength() as usize / 8
    }
}

impl Embed<[u8]> for LsbCodec {
    fn embed(&self, source: &[u8], payload: &[u8], progress: &mut dyn Progress) -> Result<Vec<u8>> {
        ensure_fits(self.capacity(source), payload.len())?;

        let mut frame = BitStream::from_payload_with_header(payload)?;
        let strength = self.options.strength();
        let mask = self.options.mask();
        let total = source.len();
        let mut result = source.to_vec();

        for (i, byte) in result.iter_mut().enumerate() {
            if frame.is_at_end() {
                progress.update(total, total);
                break;
            }
            // a short final chunk fills the high end of the mask
            let mut bits = 0u8;
            for n in 0..strength {
                if frame.is_at_end() {
                    break;
                }
                if frame.read_bit()? {
                    bits |= 1 << (strength - 1 - n);
                }
            }
            *byte = (*byte & !mask) | (bits & mask);
            progress.update(i + 1, total);
        }
        log::debug!(
            "lsb: hid {} bits in {} bytes with strength {strength}",
            frame.position(),
            total
        );

        Ok(result)
    }
}

impl Extract<[u8]> for LsbCodec {
    fn extract(&self, source: &[u8], progress: &mut dyn Progress) -> Result<Vec<u8>> {
        let strength = self.options.strength();
        let mask = self.options.mask();
        let total = source.len();
        let mut stream = BitStream::new(total * strength as usize);

        for (i, byte) in source.iter().enumerate() {
            stream.write_bits_from_byte(byte & mask, strength)?;
            progress.update(i + 1, total);
        }

        stream.read_payload_with_header()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use crate::DeepDataError;

    fn codec(strength: u8) -> LsbCodec {
        LsbCodec::new(LsbOptions::new(strength).unwrap())
    }

    #[test]
    fn should_hide_hi_in_zero_bytes() {
        let source = vec![0u8; 1000];
        let codec = codec(2);

        assert_eq!(codec.capacity(source.as_slice()), 250);
        let stego = codec.embed(&source[..], b"hi", &mut NoProgress).unwrap();

        assert_eq!(codec.extract(&stego[..], &mut NoProgress).unwrap(), b"hi");
    }

    #[test]
    fn should_refuse_a_payload_beyond_capacity() {
        let source = [0u8; 4];

        assert!(matches!(
            codec(1).embed(&source[..], b"x", &mut NoProgress),
            Err(DeepDataError::CapacityExceeded {
                required: 5,
                available: 0
            })
        ));
    }

    #[test]
    fn should_place_bits_msb_first_into_the_mask() {
        // header 0x00000001 then 0b1010_0101, strength 4
        let source = [0xFFu8; 10];
        let stego = codec(4).embed(&source[..], &[0xA5], &mut NoProgress).unwrap();

        assert_eq!(
            stego,
            [0xF0, 0xF0, 0xF0, 0xF0, 0xF0, 0xF0, 0xF0, 0xF1, 0xFA, 0xF5]
        );
    }

    #[test]
    fn should_leave_bytes_after_the_frame_untouched() {
        let source: Vec<u8> = (0..=255).collect();
        let stego = codec(1).embed(&source[..], b"ab", &mut NoProgress).unwrap();

        assert_eq!(stego.len(), source.len());
        assert_eq!(&stego[48..], &source[48..]);
        assert!(stego[..48]
            .iter()
            .zip(&source[..48])
            .all(|(a, b)| a & !1 == b & !1));
    }

    #[test]
    fn should_zero_fill_a_partial_last_byte() {
        // 40 frame bits over strength 3 leave one bit for the 14th byte
        let source = [0xFFu8; 20];
        let stego = codec(3).embed(&source[..], &[0xFF], &mut NoProgress).unwrap();

        assert_eq!(stego[13], 0b1111_1100);
        assert_eq!(stego[14], 0xFF);
        assert_eq!(codec(3).extract(&stego[..], &mut NoProgress).unwrap(), [0xFF]);
    }

    #[test]
    fn should_round_trip_with_full_bytes() {
        let mut rng = fastrand::Rng::with_seed(3);
        let source: Vec<u8> = (0..64).map(|_| rng.u8(..)).collect();
        let payload: Vec<u8> = (0..60).map(|_| rng.u8(..)).collect();
        let codec = codec(8);

        let stego = codec.embed(&source[..], &payload, &mut NoProgress).unwrap();

        assert_eq!(codec.extract(&stego[..], &mut NoProgress).unwrap(), payload);
    }

    #[test]
    fn should_report_progress_up_to_the_total() {
        let source = vec![0u8; 100];
        let mut updates = Vec::new();
        let mut sink = |processed: usize, total: usize| updates.push((processed, total));

        codec(8).embed(&source[..], b"x", &mut sink).unwrap();

        assert_eq!(updates.first(), Some(&(1, 100)));
        assert_eq!(updates.last(), Some(&(100, 100)));
        assert!(updates.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn should_fail_on_bytes_without_a_frame() {
        let source = [0xFFu8; 16];

        assert!(matches!(
            codec(2).extract(&source[..], &mut NoProgress),
            Err(DeepDataError::CorruptFrame { .. })
        ));
    }
}
