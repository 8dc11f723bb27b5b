use deepdata_jpeg::JpegImage;

use crate::codec::{BlockGrid, CoefficientCarrier};

/// Component order follows the frame header, so index 0 is luma for YCbCr files.
impl CoefficientCarrier for JpegImage {
    fn component_count(&self) -> usize {
        self.components().len()
    }

    fn block_grid(&self, component: usize) -> BlockGrid {
        let coefficients = &self.components()[component];
        BlockGrid {
            blocks_wide: coefficients.blocks_wide(),
            blocks_tall: coefficients.blocks_tall(),
        }
    }

    fn blocks(&self, component: usize) -> &[[i16; 64]] {
        self.components()[component].blocks()
    }

    fn blocks_mut(&mut self, component: usize) -> &mut [[i16; 64]] {
        self.components_mut()[component].blocks_mut()
    }
}
