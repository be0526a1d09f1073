//! Knowledge snippet scoring.
//!
//! Scores configured snippets by word overlap with a message. Only used for
//! telemetry: which snippets were candidates and which ranked first.

use std::collections::HashSet;

use ankr_core::config::KnowledgeSnippet;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "our", "are", "you", "your", "with", "this", "that", "can", "how",
    "what", "from", "have", "has", "was", "were", "will", "all", "any", "not",
];

/// A snippet that shares at least one word with the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetMatch {
    pub source: String,
    pub score: usize,
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Snippets overlapping `message`, best first. Ties keep configuration order.
pub fn rank_snippets(message: &str, snippets: &[KnowledgeSnippet]) -> Vec<SnippetMatch> {
    let words = tokens(message);
    if words.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<SnippetMatch> = snippets
        .iter()
        .filter_map(|snippet| {
            let haystack = format!("{} {}", snippet.source, snippet.text);
            let score = tokens(&haystack).intersection(&words).count();
            (score > 0).then(|| SnippetMatch {
                source: snippet.source.clone(),
                score,
            })
        })
        .collect();
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippets() -> Vec<KnowledgeSnippet> {
        ankr_core::config::AnalyzerConfig::default().knowledge
    }

    #[test]
    fn test_rank_prefers_best_overlap() {
        let ranked = rank_snippets("what are your business hours on the contact page", &snippets());
        assert_eq!(ranked[0].source, "faq/hours");
        assert!(ranked[0].score >= 2);
    }

    #[test]
    fn test_rank_no_overlap() {
        assert!(rank_snippets("zebra xylophone", &snippets()).is_empty());
        assert!(rank_snippets("", &snippets()).is_empty());
    }

    #[test]
    fn test_tokens_ignore_short_words_and_stopwords() {
        let words = tokens("Is the SEO of our blog OK?");
        assert!(words.contains("seo"));
        assert!(words.contains("blog"));
        assert!(!words.contains("the"));
        assert!(!words.contains("ok"));
    }

    #[test]
    fn test_ties_keep_configuration_order() {
        let snippets = vec![
            KnowledgeSnippet {
                source: "a".to_string(),
                text: "parking lot".to_string(),
            },
            KnowledgeSnippet {
                source: "b".to_string(),
                text: "parking garage".to_string(),
            },
        ];
        let ranked = rank_snippets("parking", &snippets);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].source, "a");
    }
}
