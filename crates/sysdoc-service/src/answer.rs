//! Ask-flow helpers: context rendering and answer confidence.

use serde::{Deserialize, Serialize};
use sysdoc_core::constants::CONFIDENCE_TOP_N;
use sysdoc_core::models::{AssembledResult, Citation};

/// Answer returned when retrieval found nothing.
pub const NO_ANSWER: &str = "I couldn't find relevant information to answer your question.";

const SOURCE_SEPARATOR: &str = "\n\n---\n\n";

/// Generated answer with its sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub citations: Vec<Citation>,
    /// Mean score of the leading primaries, in [0, 1].
    pub confidence: f64,
    pub degraded: bool,
}

impl Answer {
    pub(crate) fn empty() -> Self {
        Self {
            answer: NO_ANSWER.to_string(),
            citations: Vec::new(),
            confidence: 0.0,
            degraded: false,
        }
    }
}

/// Numbered context block, one `[Source n]` entry per item in result order.
pub fn build_context(result: &AssembledResult) -> String {
    result
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut header = format!("[Source {}]", i + 1);
            if let Some(section) = item.section_path.last().filter(|s| !s.is_empty()) {
                header.push_str(" Section: ");
                header.push_str(section);
            }
            format!("{header}\n{}", item.content)
        })
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

/// Mean ranking score of the first primaries, clamped to [0, 1].
pub fn confidence(result: &AssembledResult) -> f64 {
    let scores: Vec<f64> = result
        .primaries()
        .take(CONFIDENCE_TOP_N)
        .map(|item| item.candidate.ranking_score())
        .filter(|s| s.is_finite())
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysdoc_core::models::{ContentType, ResultItem, ResultRole, RetrievalCandidate};

    fn item(id: &str, section: &[&str], score: f64, role: ResultRole) -> ResultItem {
        let mut candidate = RetrievalCandidate::new(id, "doc");
        candidate.merged_score = score;
        ResultItem {
            candidate,
            content: format!("content of {id}"),
            content_type: ContentType::Text,
            section_path: section.iter().map(|s| s.to_string()).collect(),
            role,
        }
    }

    #[test]
    fn context_numbers_sources_and_names_sections() {
        let result = AssembledResult {
            items: vec![
                item("a", &["Users", "Fields"], 0.9, ResultRole::Primary),
                item("b", &[], 0.4, ResultRole::Primary),
            ],
            ..AssembledResult::default()
        };
        let context = build_context(&result);
        assert_eq!(
            context,
            "[Source 1] Section: Fields\ncontent of a\n\n---\n\n[Source 2]\ncontent of b"
        );
    }

    #[test]
    fn confidence_averages_leading_primaries() {
        let extra = ResultRole::CrossReference {
            origin: "a".to_string(),
            relevance: 0.5,
            shared_entities: vec![],
        };
        let result = AssembledResult {
            items: vec![
                item("a", &[], 0.9, ResultRole::Primary),
                item("x", &[], 0.0, extra),
                item("b", &[], 0.6, ResultRole::Primary),
                item("c", &[], 0.3, ResultRole::Primary),
                item("d", &[], 0.0, ResultRole::Primary),
            ],
            ..AssembledResult::default()
        };
        assert!((confidence(&result) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_zero_without_primaries() {
        assert_eq!(confidence(&AssembledResult::default()), 0.0);
    }

    #[test]
    fn confidence_is_clamped() {
        let result = AssembledResult {
            items: vec![item("a", &[], 3.0, ResultRole::Primary)],
            ..AssembledResult::default()
        };
        assert_eq!(confidence(&result), 1.0);
    }
}
