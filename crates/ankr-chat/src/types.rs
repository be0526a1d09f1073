//! Request and response shapes for the chat front end.

use serde::{Deserialize, Serialize};

use ankr_action::{ActionProposal, Analysis, FieldOfInterest};

/// How the reply should be phrased.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Chat,
    Plan,
}

/// Inbound chat message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub thread_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub mode: ChatMode,
}

/// Analyzer timing and knowledge-snippet bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub elapsed_ms: u64,
    pub candidates_count: usize,
    pub top_source: Option<String>,
}

/// Output of one analyzer pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    pub thread_id: String,
    pub intent: Vec<String>,
    pub message_analysis: Analysis,
    pub telemetry: Telemetry,
}

/// Actions proposed for a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPlan {
    pub auto_actions: Vec<String>,
    pub suggestions: Vec<ActionProposal>,
    pub fields_of_interest: Vec<FieldOfInterest>,
}

/// Reply to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub thread_id: String,
    pub assistant_content: String,
    pub plan: ChatPlan,
    pub intent: Vec<String>,
    pub message_analysis: Analysis,
    pub telemetry: Telemetry,
}
