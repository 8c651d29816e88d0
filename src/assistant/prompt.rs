use super::knowledge::ScoredInsight;

const INSTRUCTION: &str = "You are a marketplace listing and supply-chain consultant for online sellers. \
Using only the context below, answer the seller's question with concrete, actionable improvements \
for the product they asked about. Keep it under 200 words, use short bullet points, and skip any \
general explanation.";

pub fn context_block(scored: &ScoredInsight) -> String {
    let insight = &scored.insight;
    format!(
        "Product: {}\nCategory: {}\nKeywords: {}\nOptimized Title: {}\nDescription: {}\nRanking Tips: {}\nPrice Strategy: {}\nSEO Score: {}",
        insight.product,
        insight.category,
        insight.keywords,
        insight.title_optimization,
        insight.description,
        insight.ranking_tips,
        insight.price_strategy,
        insight.seo_score,
    )
}

pub fn build_prompt(query: &str, context: &[ScoredInsight]) -> String {
    let context = if context.is_empty() {
        "(no matching products)".to_string()
    } else {
        context
            .iter()
            .map(context_block)
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    };
    format!(
        "{}\n\nContext from knowledge base:\n{}\n\nSeller question: {}\n",
        INSTRUCTION,
        context,
        query.trim()
    )
}
