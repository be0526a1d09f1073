//! Intent analyzer.
//!
//! Produces intent flags, a structured analysis, and telemetry for one
//! message. Flag extraction is advisory: any error or timeout from the
//! text-analysis capability yields an empty flag list.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use ankr_action::Analysis;
use ankr_core::config::{AnalyzerConfig, KnowledgeSnippet};

use crate::classifier::KeywordClassifier;
use crate::error::AnalyzerError;
use crate::knowledge::rank_snippets;
use crate::types::{AnalyzeOutput, Telemetry};

/// A capability mapping text to intent flags and a structured analysis.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Flags detected in `message`. Implementations should restrict output to
    /// `vocabulary`, but callers do not rely on it.
    async fn classify(
        &self,
        message: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, AnalyzerError>;

    async fn analyze(&self, message: &str) -> Result<Analysis, AnalyzerError>;
}

async fn with_timeout<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T, AnalyzerError>>,
) -> Result<T, AnalyzerError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| AnalyzerError::Timeout(timeout.as_millis() as u64))?
}

/// Intent flags for `message`, failing open.
///
/// Errors and timeouts from `analyzer` yield an empty list. Returned flags
/// are always members of `vocabulary`, deduplicated, in the order reported.
pub async fn extract_intent_flags(
    analyzer: &dyn TextAnalyzer,
    message: &str,
    vocabulary: &[String],
    timeout: Duration,
) -> Vec<String> {
    match with_timeout(timeout, analyzer.classify(message, vocabulary)).await {
        Ok(flags) => {
            let mut out: Vec<String> = Vec::with_capacity(flags.len());
            for flag in flags {
                if vocabulary.contains(&flag) && !out.contains(&flag) {
                    out.push(flag);
                }
            }
            out
        }
        Err(e) => {
            warn!(error = %e, "Intent flag extraction failed, continuing without flags");
            Vec::new()
        }
    }
}

/// Thread id from the request, or a fresh one for first-contact messages.
pub fn resolve_thread_id(thread_id: Option<&str>) -> String {
    match thread_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

pub struct IntentAnalyzer {
    backend: Arc<dyn TextAnalyzer>,
    vocabulary: Vec<String>,
    timeout: Duration,
    knowledge: Vec<KnowledgeSnippet>,
}

impl IntentAnalyzer {
    pub fn new(backend: Arc<dyn TextAnalyzer>, config: &AnalyzerConfig) -> Self {
        Self {
            backend,
            vocabulary: config.intent_flags.clone(),
            timeout: Duration::from_millis(config.classifier_timeout_ms),
            knowledge: config.knowledge.clone(),
        }
    }

    /// Analyzer backed by the built-in keyword classifier.
    pub fn keyword(config: &AnalyzerConfig) -> Self {
        Self::new(Arc::new(KeywordClassifier), config)
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Analyze one message. Never fails.
    pub async fn analyze(&self, message: &str, thread_id: Option<&str>) -> AnalyzeOutput {
        let started = Instant::now();
        let thread_id = resolve_thread_id(thread_id);

        let intent =
            extract_intent_flags(self.backend.as_ref(), message, &self.vocabulary, self.timeout)
                .await;
        let message_analysis = self.structured_analysis(message).await;

        let ranked = rank_snippets(message, &self.knowledge);
        let telemetry = Telemetry {
            elapsed_ms: started.elapsed().as_millis() as u64,
            candidates_count: ranked.len(),
            top_source: ranked.first().map(|m| m.source.clone()),
        };

        debug!(
            thread_id = %thread_id,
            flags = ?intent,
            category = %message_analysis.category,
            elapsed_ms = telemetry.elapsed_ms,
            "Message analyzed"
        );

        AnalyzeOutput {
            thread_id,
            intent,
            message_analysis,
            telemetry,
        }
    }

    /// Backend analysis, falling back to the keyword classifier.
    async fn structured_analysis(&self, message: &str) -> Analysis {
        let mut analysis = match with_timeout(self.timeout, self.backend.analyze(message)).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "Structured analysis failed, using keyword fallback");
                KeywordClassifier
                    .analyze(message)
                    .await
                    .unwrap_or_default()
            }
        };
        analysis.confidence = analysis.confidence.clamp(0.0, 1.0);
        analysis
    }
}
