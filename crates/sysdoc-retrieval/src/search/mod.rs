//! Candidate generation: dense and sparse channels and their merge.

mod bm25;
mod dense;
mod hybrid;
mod normalize;
pub mod terms;

pub use bm25::Bm25;
pub use dense::dense_channel;
pub use hybrid::HybridRetriever;
pub use normalize::min_max;

/// A channel hit: position in the pool plus the raw channel score.
pub(crate) type Hit = (usize, f64);
