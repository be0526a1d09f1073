//! Batch pump: drains `requested` action calls in FIFO order.
//!
//! The pump is pull-based. Something outside the process (a cron entry, an
//! admin button) triggers each drain; there is no background loop.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use ankr_core::types::ActionCallStatus;

use crate::error::LifecycleError;
use crate::lifecycle::LifecycleController;
use crate::types::ExecuteOptions;

/// Outcome of one item in a drain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PumpItem {
    Processed { id: Uuid, status: ActionCallStatus },
    Errored { id: Uuid, error: String },
}

impl PumpItem {
    pub fn id(&self) -> Uuid {
        match self {
            PumpItem::Processed { id, .. } | PumpItem::Errored { id, .. } => *id,
        }
    }
}

/// Result of one drain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PumpReport {
    pub processed: usize,
    pub results: Vec<PumpItem>,
}

/// Drains up to `limit` requested calls through the lifecycle controller.
pub struct PumpController {
    lifecycle: Arc<LifecycleController>,
    default_limit: u32,
    max_limit: u32,
}

impl PumpController {
    pub fn new(lifecycle: Arc<LifecycleController>) -> Self {
        Self {
            lifecycle,
            default_limit: 5,
            max_limit: 20,
        }
    }

    pub fn with_limits(mut self, default_limit: u32, max_limit: u32) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = default_limit.clamp(1, self.max_limit);
        self
    }

    /// Requested limit clamped to `1..=max_limit`.
    pub fn clamp_limit(&self, limit: Option<i64>) -> u32 {
        match limit {
            None => self.default_limit,
            Some(n) => n.clamp(1, i64::from(self.max_limit)) as u32,
        }
    }

    /// Execute the oldest requested calls one after another.
    ///
    /// Only the selection query can fail the drain. Each item's outcome is
    /// reported independently, including errors from the controller itself.
    pub async fn pump(
        &self,
        limit: Option<i64>,
        executor: Option<&str>,
    ) -> Result<PumpReport, LifecycleError> {
        let limit = self.clamp_limit(limit);
        let batch = self.lifecycle.oldest_requested(limit)?;

        let mut results = Vec::with_capacity(batch.len());
        for call in batch {
            let item = match self
                .lifecycle
                .execute(call.id, executor, ExecuteOptions::default())
                .await
            {
                Ok(done) => PumpItem::Processed {
                    id: done.id,
                    status: done.status,
                },
                Err(e) => {
                    warn!(action_id = %call.id, error = %e, "Pump item failed");
                    PumpItem::Errored {
                        id: call.id,
                        error: e.to_string(),
                    }
                }
            };
            results.push(item);
        }

        info!(limit, processed = results.len(), "Pump drained");
        Ok(PumpReport {
            processed: results.len(),
            results,
        })
    }
}
