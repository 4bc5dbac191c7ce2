//! Hashed-term fallback embedder.
//!
//! Terms land in fixed buckets keyed by their blake3 digest. No model and no
//! corpus statistics are needed, so vectors stay comparable across restarts
//! and the provider closes every fallback chain.

use std::collections::BTreeMap;

use sysdoc_core::errors::SysdocResult;
use sysdoc_core::traits::IEmbeddingProvider;

use crate::similarity::l2_normalize;

/// Deterministic hashed-term embedder.
///
/// Identical text always yields the identical unit-length vector.
pub struct TfIdfFallback {
    dimensions: usize,
}

impl TfIdfFallback {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, term: &str) -> usize {
        let digest = blake3::hash(term.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        (u64::from_le_bytes(head) % self.dimensions as u64) as usize
    }

    /// Lowercase terms of two or more chars. Path separators and dots split
    /// terms, underscores do not.
    pub(crate) fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(str::to_lowercase)
            .collect()
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let terms = Self::tokenize(text);
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for term in &terms {
            *counts.entry(term.as_str()).or_default() += 1;
        }

        let mut out = vec![0.0f32; self.dimensions];
        let total = terms.len().max(1) as f32;
        for (term, count) in counts {
            // Length stands in for rarity; short terms are mostly stopwords.
            let weight = 1.0 + (term.chars().count() as f32).ln();
            out[self.bucket(term)] += weight * count as f32 / total;
        }
        l2_normalize(&mut out);
        out
    }
}

impl IEmbeddingProvider for TfIdfFallback {
    fn embed(&self, text: &str) -> SysdocResult<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    fn embed_batch(&self, texts: &[String]) -> SysdocResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "tfidf-fallback"
    }

    fn is_available(&self) -> bool {
        true
    }
}
