use std::ops::Range;

use crate::bit_stream::BitStream;
use crate::codec::{ensure_fits, Capacity, Embed, Extract};
use crate::codec_options::DctQimOptions;
use crate::progress::Progress;
use crate::quantization::Quantize;
use crate::{DeepDataError, Result};

/// Only Y, Cb and Cr are addressable by the component mask.
const MAX_COMPONENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    pub blocks_wide: usize,
    pub blocks_tall: usize,
}

impl BlockGrid {
    pub fn len(&self) -> usize {
        self.blocks_wide * self.blocks_tall
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Quantized DCT coefficients grouped per component into row-major 8×8 blocks
/// in zig-zag order.
pub trait CoefficientCarrier: Clone {
    fn component_count(&self) -> usize;
    fn block_grid(&self, component: usize) -> BlockGrid;
    fn blocks(&self, component: usize) -> &[[i16; 64]];
    fn blocks_mut(&mut self, component: usize) -> &mut [[i16; 64]];
}

/// One frame bit per usable AC coefficient.
///
/// Components, then blocks, then zig-zag positions are visited in the same
/// order by capacity, embed and extract. A coefficient carries a bit when it
/// is nonzero. Embedding never writes a bit into a coefficient that the bit
/// would drive to zero; that coefficient is zeroed instead and the bit moves
/// on to the next one, so both sides agree on the carrying positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DctQimCodec {
    options: DctQimOptions,
}

impl DctQimCodec {
    pub fn new(options: DctQimOptions) -> Self {
        Self { options }
    }

    fn components<C: CoefficientCarrier>(&self, carrier: &C) -> impl Iterator<Item = usize> {
        let mask = self.options.components();
        (0..carrier.component_count().min(MAX_COMPONENTS)).filter(move |c| mask.includes(*c))
    }

    fn positions(&self) -> Range<usize> {
        1..self.options.window() as usize
    }

    fn block_total<C: CoefficientCarrier>(&self, carrier: &C) -> usize {
        self.components(carrier)
            .map(|c| carrier.block_grid(c).len())
            .sum()
    }

    fn carrying_coefficients<C: CoefficientCarrier>(&self, carrier: &C) -> usize {
        self.components(carrier)
            .flat_map(|c| carrier.blocks(c))
            .map(|block| block[self.positions()].iter().filter(|c| **c != 0).count())
            .sum()
    }
}

impl<C: CoefficientCarrier> Capacity<C> for DctQimCodec {
    /// Counts coefficients that keep a nonzero value for either bit.
    fn capacity(&self, carrier: &C) -> usize {
        let delta = self.options.delta();
        let usable: usize = self
            .components(carrier)
            .flat_map(|c| carrier.blocks(c))
            .map(|block| {
                block[self.positions()]
                    .iter()
                    .filter(|c| **c != 0 && c.qim_embed(false, delta) != 0)
                    .count()
            })
            .sum();
        log::debug!("dct-qim: {usable} usable coefficients");

        usable / 8
    }
}

impl<C: CoefficientCarrier> Embed<C> for DctQimCodec {
    fn embed(&self, carrier: &C, payload: &[u8], progress: &mut dyn Progress) -> Result<C> {
        ensure_fits(self.capacity(carrier), payload.len())?;

        let mut frame = BitStream::from_payload_with_header(payload)?;
        let delta = self.options.delta();
        let total = self.block_total(carrier);
        let mut processed = 0;
        let mut zeroed = 0usize;
        let mut result = carrier.clone();

        let components: Vec<usize> = self.components(carrier).collect();
        'walk: for component in components {
            for block in result.blocks_mut(component) {
                for coefficient in &mut block[self.positions()] {
                    if frame.is_at_end() {
                        break 'walk;
                    }
                    if *coefficient == 0 {
                        continue;
                    }
                    let embedded = coefficient.qim_embed(frame.peek_bit()?, delta);
                    *coefficient = embedded;
                    if embedded == 0 {
                        zeroed += 1;
                    } else {
                        frame.read_bit()?;
                    }
                }
                processed += 1;
                progress.update(processed, total);
            }
        }

        if !frame.is_at_end() {
            return Err(DeepDataError::CapacityExceeded {
                required: frame.capacity().div_ceil(8),
                available: frame.position() / 8,
            });
        }
        if processed < total {
            progress.update(total, total);
        }
        log::debug!(
            "dct-qim: hid {} bits, zeroed {zeroed} coefficients on the way",
            frame.position()
        );

        Ok(result)
    }
}

impl<C: CoefficientCarrier> Extract<C> for DctQimCodec {
    fn extract(&self, carrier: &C, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        let delta = self.options.delta();
        let total = self.block_total(carrier);
        let mut stream = BitStream::new(self.carrying_coefficients(carrier));
        let mut processed = 0;

        for component in self.components(carrier) {
            for block in carrier.blocks(component) {
                for coefficient in &block[self.positions()] {
                    if *coefficient != 0 {
                        stream.write_bit(coefficient.qim_extract(delta))?;
                    }
                }
                processed += 1;
                progress.update(processed, total);
            }
        }

        stream.read_payload_with_header()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec_options::JpegComponents;
    use crate::progress::NoProgress;

    #[derive(Debug, Clone, PartialEq)]
    struct Blocks(Vec<Vec<[i16; 64]>>);

    impl CoefficientCarrier for Blocks {
        fn component_count(&self) -> usize {
            self.0.len()
        }

        fn block_grid(&self, component: usize) -> BlockGrid {
            BlockGrid {
                blocks_wide: self.0[component].len(),
                blocks_tall: 1,
            }
        }

        fn blocks(&self, component: usize) -> &[[i16; 64]] {
            &self.0[component]
        }

        fn blocks_mut(&mut self, component: usize) -> &mut [[i16; 64]] {
            &mut self.0[component]
        }
    }

    fn random_blocks(components: usize, blocks: usize, max: i16, seed: u64) -> Blocks {
        let mut rng = fastrand::Rng::with_seed(seed);
        Blocks(
            (0..components)
                .map(|_| {
                    (0..blocks)
                        .map(|_| std::array::from_fn(|_| rng.i16(-max..=max)))
                        .collect()
                })
                .collect(),
        )
    }

    fn codec(delta: u8, components: JpegComponents, window: u8) -> DctQimCodec {
        DctQimCodec::new(DctQimOptions::new(delta, components, window).unwrap())
    }

    #[test]
    fn should_round_trip_on_all_components() {
        let carrier = random_blocks(3, 12, 40, 1);
        let codec = codec(4, JpegComponents::ALL, 64);

        let stego = codec.embed(&carrier, b"frequency", &mut NoProgress).unwrap();

        assert_eq!(codec.extract(&stego, &mut NoProgress).unwrap(), b"frequency");
    }

    #[test]
    fn should_never_touch_dc_or_positions_outside_the_window() {
        let carrier = random_blocks(1, 40, 30, 2);
        let codec = codec(8, JpegComponents::Y, 10);

        let stego = codec.embed(&carrier, b"dc", &mut NoProgress).unwrap();

        for (before, after) in carrier.0[0].iter().zip(&stego.0[0]) {
            assert_eq!(before[0], after[0]);
            assert_eq!(before[10..], after[10..]);
        }
        assert_eq!(codec.extract(&stego, &mut NoProgress).unwrap(), b"dc");
    }

    #[test]
    fn should_ignore_disabled_components() {
        let carrier = random_blocks(3, 20, 30, 3);
        let codec = codec(4, JpegComponents::CB, 64);

        let stego = codec.embed(&carrier, b"chroma", &mut NoProgress).unwrap();

        assert_eq!(stego.0[0], carrier.0[0]);
        assert_eq!(stego.0[2], carrier.0[2]);
        assert_ne!(stego.0[1], carrier.0[1]);
    }

    #[test]
    fn should_ignore_components_beyond_the_third() {
        let carrier = random_blocks(4, 4, 30, 4);

        assert_eq!(
            codec(4, JpegComponents::ALL, 64).capacity(&carrier),
            codec(4, JpegComponents::ALL, 64).capacity(&Blocks(carrier.0[..3].to_vec()))
        );
    }

    #[test]
    fn should_keep_zero_coefficients_at_zero() {
        let carrier = random_blocks(1, 30, 2, 5);
        let codec = codec(4, JpegComponents::Y, 64);

        let stego = codec.embed(&carrier, b"z", &mut NoProgress).unwrap();

        for (before, after) in carrier.0[0].iter().zip(&stego.0[0]) {
            for (b, a) in before.iter().zip(after) {
                assert_eq!(*b == 0, *a == 0);
            }
        }
    }

    #[test]
    fn should_survive_self_zeroing_coefficients() {
        // magnitudes 1 and 2 collapse to zero on a `0` bit at delta 2 and 3
        for delta in [2, 3] {
            for seed in 0..8 {
                let carrier = random_blocks(3, 24, 3, seed);
                let codec = codec(delta, JpegComponents::ALL, 64);
                let payload: Vec<u8> = (0..codec.capacity(&carrier) - 4)
                    .map(|i| (i as u8).wrapping_mul(37))
                    .collect();

                let stego = codec.embed(&carrier, &payload, &mut NoProgress).unwrap();

                assert_eq!(
                    codec.extract(&stego, &mut NoProgress).unwrap(),
                    payload,
                    "delta {delta}, seed {seed}"
                );
            }
        }
    }

    #[test]
    fn capacity_should_exclude_collapsing_coefficients() {
        let mut block = [0i16; 64];
        block[1..9].copy_from_slice(&[1, -1, 2, -2, 3, -3, 4, 5]);
        let carrier = Blocks(vec![vec![block; 8]]);

        // 1 and 2 collapse at delta 3, leaving 4 usable positions per block
        assert_eq!(codec(3, JpegComponents::Y, 64).capacity(&carrier), 4);
        assert_eq!(codec(4, JpegComponents::Y, 64).capacity(&carrier), 8);
    }

    #[test]
    fn should_refuse_a_payload_beyond_capacity() {
        let carrier = random_blocks(1, 2, 30, 6);
        let codec = codec(4, JpegComponents::ALL, 64);
        let available = codec.capacity(&carrier);

        assert!(matches!(
            codec.embed(&carrier, &vec![0; available], &mut NoProgress),
            Err(DeepDataError::CapacityExceeded { required, .. }) if required == available + 4
        ));
    }

    #[test]
    fn should_report_every_block() {
        let carrier = random_blocks(3, 10, 30, 7);
        let mut updates = Vec::new();
        let mut sink = |processed: usize, total: usize| updates.push((processed, total));

        codec(4, JpegComponents::Y | JpegComponents::CR, 64)
            .embed(&carrier, b"p", &mut sink)
            .unwrap();

        assert_eq!(updates.last(), Some(&(20, 20)));
        assert!(updates.windows(2).all(|w| w[0].0 <= w[1].0));
    }

    #[test]
    fn should_report_a_corrupt_frame_on_a_clean_carrier() {
        let mut block = [0i16; 64];
        block[1..].fill(11);
        let carrier = Blocks(vec![vec![block; 2]]);

        assert!(matches!(
            codec(4, JpegComponents::Y, 64).extract(&carrier, &mut NoProgress),
            Err(DeepDataError::CorruptFrame { .. })
        ));
    }
}
