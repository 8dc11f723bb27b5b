/// Observer for long running embed and extract walks.
///
/// `processed` never decreases and ends at `total`. Implementations cannot
/// influence the operation they observe.
pub trait Progress {
    fn update(&mut self, processed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> Progress for F {
    fn update(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&mut self, _processed: usize, _total: usize) {}
}
