//! SaveNote executor.
//!
//! Stores a free-text note, optionally attached to a conversation thread.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;
use crate::handler::{optional_str, preview, required_str, ActionExecutor};
use crate::types::ActionName;

pub struct SaveNoteExecutor {
    site: Arc<SiteRepository>,
}

impl SaveNoteExecutor {
    pub fn new(site: Arc<SiteRepository>) -> Self {
        Self { site }
    }
}

#[async_trait]
impl ActionExecutor for SaveNoteExecutor {
    fn name(&self) -> &str {
        ActionName::SaveNote.as_str()
    }

    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
        let text = required_str(params, "text")?;
        let thread_id = optional_str(params, "threadId")?;

        let note = self.site.save_note(thread_id, text)?;
        tracing::info!(note_id = %note.id, text_len = text.len(), "Note saved");

        Ok(json!({
            "noteId": note.id,
            "preview": preview(text, 50),
        }))
    }
}
