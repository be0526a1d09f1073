//! CreateTopic executor.
//!
//! Adds a blog/content topic. Falls back to `goal` when no `title` is given,
//! so a proposal built straight from an analysis can be executed as-is.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;
use crate::handler::{optional_str, ActionExecutor};
use crate::types::ActionName;

const MAX_TITLE_CHARS: usize = 200;

pub struct CreateTopicExecutor {
    site: Arc<SiteRepository>,
}

impl CreateTopicExecutor {
    pub fn new(site: Arc<SiteRepository>) -> Self {
        Self { site }
    }
}

#[async_trait]
impl ActionExecutor for CreateTopicExecutor {
    fn name(&self) -> &str {
        ActionName::CreateTopic.as_str()
    }

    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
        let title = match optional_str(params, "title")? {
            Some(title) => title,
            None => optional_str(params, "goal")?.ok_or_else(|| {
                ExecutorError::InvalidParams("'title' is required".to_string())
            })?,
        };

        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ExecutorError::InvalidParams(format!(
                "'title' must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }

        if self.site.topic_exists(title)? {
            return Err(ExecutorError::Failed(format!(
                "Topic '{}' already exists",
                title
            )));
        }

        let topic = self.site.create_topic(title)?;
        tracing::info!(topic_id = %topic.id, "Topic created");

        Ok(json!({
            "topicId": topic.id,
            "title": topic.title,
        }))
    }
}
