//! Keyword classifier: the built-in text-analysis capability.
//!
//! Regex rules per intent flag and per field of interest, compiled once.
//! Used when no external model is configured, and as the reference
//! behaviour in tests.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use ankr_action::{Analysis, Category, FieldOfInterest};

use crate::analyzer::TextAnalyzer;
use crate::error::AnalyzerError;

const MAX_GOAL_CHARS: usize = 120;

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

static FLAG_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let mk = |flag: &'static str, pattern: &str| {
        (flag, Regex::new(pattern).expect("Invalid intent flag regex"))
    };
    vec![
        mk("update_hours", r"(?i)\b(hours?|opening|open|closed?|closing)\b"),
        mk("update_pricing", r"(?i)\b(prices?|pricing|costs?|rates?|fees?)\b|\$\d"),
        mk("update_contact", r"(?i)\b(phone|number|email|address|contact)\b"),
        mk("promotion", r"(?i)\b(coupons?|promo|promotions?|discounts?|sale|deals?|offers?)\b"),
        mk("gallery", r"(?i)\b(photos?|pictures?|images?|gallery)\b"),
        mk("content", r"(?i)\b(blog|posts?|articles?|seo|content|traffic|keywords?)\b"),
        mk("planning", r"(?i)\b(plan|planning|steps|roadmap|strategy|goals?|launch)\b"),
        mk("question", r"(?i)\?\s*$|^\s*(how|what|why|when|where|who|can|could|do|does|is|are)\b"),
        mk("urgent", r"(?i)\b(urgent|urgently|asap|immediately|right away)\b"),
    ]
});

static FIELD_PATTERNS: LazyLock<Vec<(FieldOfInterest, Regex)>> = LazyLock::new(|| {
    let mk = |field: FieldOfInterest, pattern: &str| {
        (field, Regex::new(pattern).expect("Invalid field regex"))
    };
    vec![
        mk(FieldOfInterest::BusinessHours, r"(?i)\b(hours|opening times?|open (on|until|at)|closed on)\b"),
        mk(FieldOfInterest::Pricing, r"(?i)\b(prices?|pricing|rates?|fees?)\b|\$\d"),
        mk(FieldOfInterest::PhoneNumber, r"(?i)\b(phone|phone number|telephone|call us)\b"),
        mk(FieldOfInterest::CouponPromotion, r"(?i)\b(coupons?|promo|promotions?|discounts?)\b"),
        mk(FieldOfInterest::GalleryPhotos, r"(?i)\b(photos?|pictures?|gallery)\b"),
    ]
});

static LEADING_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(please\s+|can you\s+|could you\s+|i want to\s+|i'd like to\s+|we need to\s+|help me\s+|let's\s+)+",
    )
    .expect("Invalid filler regex")
});

/// Flags from the full pattern set whose rule matches `message`.
pub fn match_flags(message: &str) -> Vec<&'static str> {
    FLAG_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(message))
        .map(|(flag, _)| *flag)
        .collect()
}

/// Fields of interest mentioned in `message`, in table order.
pub fn detect_fields(message: &str) -> Vec<FieldOfInterest> {
    FIELD_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(message))
        .map(|(field, _)| *field)
        .collect()
}

/// The message with conversational filler and trailing punctuation removed.
pub fn extract_goal(message: &str) -> String {
    let stripped = LEADING_FILLER.replace(message, "");
    let goal = stripped
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
        .trim();
    goal.chars().take(MAX_GOAL_CHARS).collect()
}

const SITE_FLAGS: [&str; 5] = [
    "update_hours",
    "update_pricing",
    "update_contact",
    "promotion",
    "gallery",
];

fn categorize(flags: &[&str]) -> Category {
    if flags.contains(&"content") {
        Category::ContentOrSEO
    } else if flags.contains(&"planning") {
        Category::PlanningOrTaskBreakdown
    } else if flags.iter().any(|f| SITE_FLAGS.contains(f)) {
        Category::SiteUpdate
    } else if flags.contains(&"question") {
        Category::Question
    } else {
        Category::Other
    }
}

/// Regex-based [`TextAnalyzer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

#[async_trait]
impl TextAnalyzer for KeywordClassifier {
    async fn classify(
        &self,
        message: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, AnalyzerError> {
        Ok(match_flags(message)
            .into_iter()
            .filter(|flag| vocabulary.iter().any(|v| v == flag))
            .map(str::to_string)
            .collect())
    }

    async fn analyze(&self, message: &str) -> Result<Analysis, AnalyzerError> {
        let flags = match_flags(message);
        let category = categorize(&flags);
        let confidence = match category {
            Category::Other => 0.2,
            _ => (0.4 + 0.15 * flags.len() as f32).min(0.9),
        };

        Ok(Analysis {
            category,
            goal: extract_goal(message),
            related_to: detect_fields(message)
                .into_iter()
                .map(|f| f.label().to_string())
                .collect(),
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vec<String> {
        ankr_core::config::AnalyzerConfig::default().intent_flags
    }

    #[test]
    fn test_match_flags() {
        let flags = match_flags("Can we update our hours and run a coupon this weekend?");
        assert!(flags.contains(&"update_hours"));
        assert!(flags.contains(&"promotion"));
        assert!(flags.contains(&"question"));
        assert!(!flags.contains(&"gallery"));
    }

    #[test]
    fn test_detect_fields_in_table_order() {
        let fields = detect_fields("New photos for the gallery and updated prices");
        assert_eq!(
            fields,
            vec![FieldOfInterest::Pricing, FieldOfInterest::GalleryPhotos]
        );
        assert!(detect_fields("hello there").is_empty());
    }

    #[test]
    fn test_extract_goal_strips_filler() {
        assert_eq!(
            extract_goal("Please help me grow organic traffic!"),
            "grow organic traffic"
        );
        assert_eq!(extract_goal("   "), "");
        assert_eq!(extract_goal(&"x".repeat(500)).chars().count(), MAX_GOAL_CHARS);
    }

    #[test]
    fn test_categorize_priority() {
        assert_eq!(categorize(&["content", "planning"]), Category::ContentOrSEO);
        assert_eq!(categorize(&["planning", "update_hours"]), Category::PlanningOrTaskBreakdown);
        assert_eq!(categorize(&["gallery"]), Category::SiteUpdate);
        assert_eq!(categorize(&["question"]), Category::Question);
        assert_eq!(categorize(&[]), Category::Other);
    }

    #[tokio::test]
    async fn test_classify_filters_to_vocabulary() {
        let classifier = KeywordClassifier;
        let flags = classifier
            .classify("urgent: our phone number changed", &["urgent".to_string()])
            .await
            .unwrap();
        assert_eq!(flags, vec!["urgent"]);

        let flags = classifier
            .classify("urgent: our phone number changed", &vocabulary())
            .await
            .unwrap();
        assert_eq!(flags, vec!["update_contact", "urgent"]);
    }

    #[tokio::test]
    async fn test_analyze_content_message() {
        let analysis = KeywordClassifier
            .analyze("I want to grow organic traffic with a blog")
            .await
            .unwrap();
        assert_eq!(analysis.category, Category::ContentOrSEO);
        assert_eq!(analysis.goal, "grow organic traffic with a blog");
        assert!(analysis.confidence > 0.4);
    }

    #[tokio::test]
    async fn test_analyze_unrelated_message() {
        let analysis = KeywordClassifier.analyze("thanks!").await.unwrap();
        assert_eq!(analysis.category, Category::Other);
        assert_eq!(analysis.goal, "thanks");
        assert!(analysis.related_to.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_related_fields() {
        let analysis = KeywordClassifier
            .analyze("we are closed on Sundays now, change the hours")
            .await
            .unwrap();
        assert_eq!(analysis.category, Category::SiteUpdate);
        assert_eq!(analysis.related_to, vec!["Business Hours"]);
    }
}
