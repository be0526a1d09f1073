//! Chat orchestrator: analyzer, proposal engine, and reply composition.

use tracing::info;

use ankr_action::ProposalEngine;

use crate::analyzer::IntentAnalyzer;
use crate::classifier::detect_fields;
use crate::error::ChatError;
use crate::response::compose;
use crate::types::{ChatPlan, ChatRequest, ChatResponse};

pub struct ChatOrchestrator {
    analyzer: IntentAnalyzer,
    proposals: ProposalEngine,
    available_actions: Vec<String>,
    max_message_chars: usize,
}

impl ChatOrchestrator {
    /// `available_actions` is the set of action names the plan may propose,
    /// normally the registry's names.
    pub fn new(
        analyzer: IntentAnalyzer,
        proposals: ProposalEngine,
        available_actions: Vec<String>,
        max_message_chars: usize,
    ) -> Self {
        Self {
            analyzer,
            proposals,
            available_actions,
            max_message_chars,
        }
    }

    /// Validate the message without touching any other state.
    pub fn validate(&self, message: &str) -> Result<(), ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_chars {
            return Err(ChatError::MessageTooLong(self.max_message_chars));
        }
        Ok(())
    }

    /// Analyze a message and propose a plan. Nothing is persisted; the
    /// caller decides which proposals become action calls.
    pub async fn handle_message(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.validate(&request.message)?;

        let output = self
            .analyzer
            .analyze(&request.message, request.thread_id.as_deref())
            .await;

        let fields = detect_fields(&request.message);
        let proposal = self.proposals.propose(
            &output.message_analysis,
            &self.available_actions,
            &fields,
        );
        let plan = ChatPlan {
            auto_actions: proposal.auto_actions,
            suggestions: proposal.suggestions,
            fields_of_interest: fields,
        };

        let assistant_content = compose(request.mode, &output.message_analysis.goal, &plan);
        info!(
            thread_id = %output.thread_id,
            mode = ?request.mode,
            auto_actions = plan.auto_actions.len(),
            "Chat message handled"
        );

        Ok(ChatResponse {
            thread_id: output.thread_id,
            assistant_content,
            plan,
            intent: output.intent,
            message_analysis: output.message_analysis,
            telemetry: output.telemetry,
        })
    }
}
