//! Canned replies used when no generative backend answers.

use super::knowledge::{ProductInsight, ScoredInsight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Title,
    Ranking,
    Pricing,
    Keywords,
    General,
}

impl Topic {
    pub fn of(query: &str) -> Self {
        let query = query.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| query.contains(word));
        if mentions(&["title", "optimize"]) {
            Topic::Title
        } else if mentions(&["rank", "seo"]) {
            Topic::Ranking
        } else if mentions(&["price", "pricing"]) {
            Topic::Pricing
        } else if mentions(&["keyword"]) {
            Topic::Keywords
        } else {
            Topic::General
        }
    }
}

pub fn reply(query: &str, context: &[ScoredInsight]) -> String {
    let topic = Topic::of(query);
    if context.is_empty() {
        return generic_tips(topic).to_string();
    }

    let (heading, footer) = match topic {
        Topic::Title => (
            "Here are optimized title examples based on your query:",
            "**Key tips:**\n• Use relevant keywords naturally\n• Highlight unique selling points\n• Keep titles concise but descriptive\n• Include important product specifications",
        ),
        Topic::Ranking => (
            "Here are specific ranking strategies:",
            "**Also:**\n• Monitor competitor performance\n• Update listings regularly\n• A/B test titles and images\n• Watch customer satisfaction metrics",
        ),
        Topic::Pricing => (
            "Here are pricing recommendations:",
            "**General pricing tips:**\n• Monitor market trends regularly\n• Keep an eye on margins\n• Test price sensitivity\n• Use promotional pricing strategically",
        ),
        Topic::Keywords => (
            "Here are relevant keywords for your products:",
            "**Keyword strategy:**\n• Mix high-volume and niche keywords\n• Use synonyms and variations\n• Include brand and model names\n• Target customer problems and solutions",
        ),
        Topic::General => ("Here's relevant information for your query:", ""),
    };

    let body = context
        .iter()
        .map(|scored| section(topic, &scored.insight))
        .collect::<Vec<_>>()
        .join("\n\n");
    if footer.is_empty() {
        format!("{}\n\n{}", heading, body)
    } else {
        format!("{}\n\n{}\n\n{}", heading, body, footer)
    }
}

fn section(topic: Topic, insight: &ProductInsight) -> String {
    match topic {
        Topic::Title => format!(
            "**{} - {}:**\n{}",
            insight.category, insight.product, insight.title_optimization
        ),
        Topic::Ranking => format!(
            "**{} (SEO score: {}):**\n{}",
            insight.product, insight.seo_score, insight.ranking_tips
        ),
        Topic::Pricing => format!("**{}:**\n{}", insight.product, insight.price_strategy),
        Topic::Keywords => format!("**{}:**\nKeywords: {}", insight.product, insight.keywords),
        Topic::General => format!(
            "**{} - {}:**\n{}\n\n*Ranking tips:* {}",
            insight.category, insight.product, insight.description, insight.ranking_tips
        ),
    }
}

fn generic_tips(topic: Topic) -> &'static str {
    match topic {
        Topic::Title => "General title optimization tips:\n\n• Put primary keywords in the first 60 characters\n• Mention key features and benefits\n• Add the brand name if relevant\n• Include size, color or quantity where it applies\n• Stay under 150 characters",
        Topic::Ranking => "Ranking strategies that work:\n\n• Optimize titles with relevant keywords\n• Collect positive customer reviews\n• Use high-quality images\n• Keep pricing competitive and stock stable\n• Answer customer questions quickly\n• Optimize for mobile viewing",
        Topic::Pricing => "Pricing strategies for better sales:\n\n• Research competitor prices weekly\n• Use psychological price points\n• Offer bundles for a higher order value\n• Adjust for seasons\n• Offer volume discounts",
        Topic::Keywords => "Keyword research tips:\n\n• Use the marketplace's keyword tools\n• Analyze competitor keywords\n• Include long-tail keywords\n• Track seasonal trends\n• Fill in backend search terms",
        Topic::General => "I can help you with:\n\n• Product title optimization\n• SEO and ranking strategies\n• Pricing recommendations\n• Keyword research\n• Listing optimization\n\nAsk me something specific about your listings!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::knowledge::KnowledgeBase;
    use rstest::rstest;

    #[rstest]
    #[case("Optimize my listing", Topic::Title)]
    #[case("how do I rank higher", Topic::Ranking)]
    #[case("SEO help", Topic::Ranking)]
    #[case("what pricing should I use", Topic::Pricing)]
    #[case("best keywords?", Topic::Keywords)]
    #[case("hello", Topic::General)]
    fn topic_detection(#[case] query: &str, #[case] topic: Topic) {
        assert_eq!(Topic::of(query), topic);
    }

    #[test]
    fn pricing_reply_uses_retrieved_strategy() {
        let knowledge = KnowledgeBase::builtin().unwrap();
        let context = knowledge.retrieve("yoga", 3);
        let text = reply("price for yoga", &context);
        assert!(text.starts_with("Here are pricing recommendations:"));
        assert!(text.contains("Premium pricing $25-$45"));
    }

    #[test]
    fn empty_context_gets_generic_tips() {
        assert!(reply("what keywords", &[]).starts_with("Keyword research tips:"));
        assert!(reply("hi", &[]).starts_with("I can help you with:"));
    }
}
