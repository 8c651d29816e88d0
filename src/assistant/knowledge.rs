use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::GenericError;

const BUILTIN: &str = include_str!("knowledge_base.json");

/// Listing advice for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInsight {
    pub category: String,
    pub product: String,
    pub keywords: String,
    pub title_optimization: String,
    pub description: String,
    pub ranking_tips: String,
    pub price_strategy: String,
    pub seo_score: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredInsight {
    pub insight: ProductInsight,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    insights: Vec<ProductInsight>,
}

impl KnowledgeBase {
    pub fn new(insights: Vec<ProductInsight>) -> Self {
        KnowledgeBase { insights }
    }

    pub fn builtin() -> Result<Self, GenericError> {
        Ok(KnowledgeBase::new(serde_json::from_str(BUILTIN)?))
    }

    pub fn insights(&self) -> &[ProductInsight] {
        &self.insights
    }

    /// The `limit` best-scoring insights for `query`, best first, zero scores dropped.
    pub fn retrieve(&self, query: &str, limit: usize) -> Vec<ScoredInsight> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<ScoredInsight> = self
            .insights
            .iter()
            .map(|insight| ScoredInsight {
                insight: insight.clone(),
                score: score(query, insight),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(limit);
        scored.retain(|scored| scored.score > 0.0);
        scored
    }
}

fn score(query: &str, insight: &ProductInsight) -> f64 {
    let needle = query.to_lowercase();
    let weighted = [
        (&insight.product, 3.0),
        (&insight.category, 2.0),
        (&insight.keywords, 2.0),
        (&insight.title_optimization, 1.0),
        (&insight.description, 1.0),
        (&insight.ranking_tips, 2.0),
    ];
    let substring: f64 = weighted
        .iter()
        .filter(|(field, _)| field.to_lowercase().contains(&needle))
        .map(|(_, weight)| weight)
        .sum();

    let overlap = word_overlap(query, &insight.title_optimization)
        + word_overlap(query, &insight.description)
        + word_overlap(query, &insight.ranking_tips);
    substring + overlap * 2.0
}

/// Share of `a`'s words that also occur in `b`, over the longer word count.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    let longest = words_a.len().max(words_b.len());
    if longest == 0 {
        return 0.0;
    }
    let shared = words_a.iter().filter(|word| words_b.contains(word)).count();
    shared as f64 / longest as f64
}
