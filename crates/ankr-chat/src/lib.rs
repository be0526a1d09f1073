//! Conversational front end for ankr.
//!
//! Turns a raw user message into intent flags and a structured analysis,
//! then into a plan of proposed actions and a templated reply.

pub mod analyzer;
pub mod classifier;
pub mod error;
pub mod knowledge;
pub mod orchestrator;
pub mod response;
pub mod types;

pub use analyzer::{extract_intent_flags, IntentAnalyzer, TextAnalyzer};
pub use classifier::KeywordClassifier;
pub use error::{AnalyzerError, ChatError};
pub use orchestrator::ChatOrchestrator;
pub use types::{AnalyzeOutput, ChatMode, ChatPlan, ChatRequest, ChatResponse, Telemetry};
