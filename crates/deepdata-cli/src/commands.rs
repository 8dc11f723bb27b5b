pub mod capacity;
pub mod embed;
pub mod extract;

const MEGABYTE: f64 = 1024.0 * 1024.0;

pub(crate) fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / MEGABYTE
}
