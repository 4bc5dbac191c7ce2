//! Okapi BM25 over an in-memory pool.
//!
//! Statistics (document frequency, average length) come from the pool being
//! searched, so a filtered query scores against its filtered corpus only.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use super::terms::terms;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
}

impl Bm25 {
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Score every document against the query. Documents sharing no term
    /// with the query score 0.
    pub fn score_all(&self, query: &str, documents: &[&str]) -> Vec<f64> {
        let query_terms: HashSet<String> = terms(query).into_iter().collect();
        if query_terms.is_empty() || documents.is_empty() {
            return vec![0.0; documents.len()];
        }

        let term_counts: Vec<(HashMap<String, usize>, usize)> = documents
            .par_iter()
            .map(|doc| {
                let doc_terms = terms(doc);
                let len = doc_terms.len();
                let mut counts: HashMap<String, usize> = HashMap::new();
                for t in doc_terms {
                    if query_terms.contains(&t) {
                        *counts.entry(t).or_default() += 1;
                    }
                }
                (counts, len)
            })
            .collect();

        let n = documents.len() as f64;
        let total_len: usize = term_counts.iter().map(|(_, len)| len).sum();
        let avg_len = (total_len as f64 / n).max(1.0);

        let idf: HashMap<&str, f64> = query_terms
            .iter()
            .map(|term| {
                let df = term_counts
                    .iter()
                    .filter(|(counts, _)| counts.contains_key(term))
                    .count() as f64;
                (term.as_str(), (1.0 + (n - df + 0.5) / (df + 0.5)).ln())
            })
            .collect();

        term_counts
            .iter()
            .map(|(counts, len)| {
                let norm = self.k1 * (1.0 - self.b + self.b * *len as f64 / avg_len);
                counts
                    .iter()
                    .map(|(term, tf)| {
                        let tf = *tf as f64;
                        let weight = idf.get(term.as_str()).copied().unwrap_or(0.0);
                        weight * tf * (self.k1 + 1.0) / (tf + norm)
                    })
                    .sum()
            })
            .collect()
    }
}
