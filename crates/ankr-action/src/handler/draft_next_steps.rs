//! DraftNextSteps executor.
//!
//! Breaks a goal into three to five ordered steps and keeps them as a note.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;
use crate::handler::{optional_str, required_str, ActionExecutor};
use crate::types::ActionName;

const MAX_CLAUSE_STEPS: usize = 3;

static CLAUSE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:[,;]|\band\b|\bthen\b)\s*").expect("Invalid clause regex"));

pub struct DraftNextStepsExecutor {
    site: Arc<SiteRepository>,
}

impl DraftNextStepsExecutor {
    pub fn new(site: Arc<SiteRepository>) -> Self {
        Self { site }
    }
}

/// Derive ordered next steps from a goal.
///
/// Always an outcome step first and a review step last; each clause of a
/// compound goal gets its own step in between, up to three.
pub fn derive_steps(goal: &str) -> Vec<String> {
    let goal = goal.trim();
    let clauses: Vec<&str> = CLAUSE_SPLIT
        .split(goal)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .take(MAX_CLAUSE_STEPS)
        .collect();

    let mut steps = vec![format!("Clarify the desired outcome: {}", goal)];
    if clauses.len() > 1 {
        steps.extend(clauses.iter().map(|c| format!("Plan and complete: {}", c)));
    } else {
        steps.push("Break the goal into concrete tasks with an owner and a date".to_string());
    }
    steps.push("Review progress after one week and adjust".to_string());
    steps
}

#[async_trait]
impl ActionExecutor for DraftNextStepsExecutor {
    fn name(&self) -> &str {
        ActionName::DraftNextSteps.as_str()
    }

    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
        let goal = required_str(params, "goal")?;
        let thread_id = optional_str(params, "threadId")?;

        let steps = derive_steps(goal);
        let body = steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n");

        let note = self.site.save_note(thread_id, &body)?;
        tracing::info!(note_id = %note.id, steps = steps.len(), "Next steps drafted");

        Ok(json!({
            "steps": steps,
            "noteId": note.id,
        }))
    }
}
