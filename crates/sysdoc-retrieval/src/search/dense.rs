//! Dense channel: cosine similarity of chunk vectors to the query vector.

use std::sync::Arc;

use rayon::prelude::*;
use sysdoc_core::models::Chunk;
use sysdoc_embeddings::similarity::cosine_similarity;

use super::Hit;

/// Score every embedded chunk of the pool. Chunks without a vector, or with
/// a vector of a different length, are not dense candidates.
pub fn dense_channel(pool: &[Arc<Chunk>], query_vector: &[f32]) -> Vec<Hit> {
    pool.par_iter()
        .enumerate()
        .filter_map(|(i, chunk)| {
            let vector = chunk.dense_vector.as_deref()?;
            (vector.len() == query_vector.len())
                .then(|| (i, cosine_similarity(vector, query_vector)))
        })
        .collect()
}
