//! UpdateSiteHours executor.
//!
//! Merges per-day opening hours into the `hours` site setting. Each value is
//! either `HH:MM-HH:MM` (24h, opening before closing) or `closed`.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;
use crate::handler::ActionExecutor;
use crate::types::ActionName;

pub const HOURS_SETTING_KEY: &str = "hours";

const DAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

static HOURS_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)\s*-\s*([01]\d|2[0-3]):([0-5]\d)$")
        .expect("Invalid hours range regex")
});

pub struct UpdateSiteHoursExecutor {
    site: Arc<SiteRepository>,
}

impl UpdateSiteHoursExecutor {
    pub fn new(site: Arc<SiteRepository>) -> Self {
        Self { site }
    }

    fn current_hours(&self) -> Result<Map<String, Value>, ExecutorError> {
        let Some(raw) = self.site.get_setting(HOURS_SETTING_KEY)? else {
            return Ok(Map::new());
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => {
                tracing::warn!("Stored hours setting is not a JSON object, replacing it");
                Ok(Map::new())
            }
        }
    }
}

/// Canonical three-letter day key, or `None` for an unknown day.
pub fn normalize_day(day: &str) -> Option<&'static str> {
    let day = day.trim().to_lowercase();
    let canonical = match day.as_str() {
        "mon" | "monday" => "mon",
        "tue" | "tues" | "tuesday" => "tue",
        "wed" | "weds" | "wednesday" => "wed",
        "thu" | "thur" | "thurs" | "thursday" => "thu",
        "fri" | "friday" => "fri",
        "sat" | "saturday" => "sat",
        "sun" | "sunday" => "sun",
        _ => return None,
    };
    Some(canonical)
}

/// Canonical form of an hours value: `closed` or `HH:MM-HH:MM`.
pub fn normalize_range(value: &str) -> Option<String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("closed") {
        return Some("closed".to_string());
    }
    let caps = HOURS_RANGE.captures(value)?;
    let open = (&caps[1], &caps[2]);
    let close = (&caps[3], &caps[4]);
    if open >= close {
        return None;
    }
    Some(format!("{}:{}-{}:{}", open.0, open.1, close.0, close.1))
}

#[async_trait]
impl ActionExecutor for UpdateSiteHoursExecutor {
    fn name(&self) -> &str {
        ActionName::UpdateSiteHours.as_str()
    }

    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
        let requested = params
            .get("hours")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                ExecutorError::InvalidParams("'hours' must be a non-empty object".to_string())
            })?;

        let mut changes = Vec::with_capacity(requested.len());
        for (day, value) in requested {
            let key = normalize_day(day).ok_or_else(|| {
                ExecutorError::InvalidParams(format!("Unknown day '{}'", day))
            })?;
            let range = value.as_str().and_then(normalize_range).ok_or_else(|| {
                ExecutorError::InvalidParams(format!(
                    "Hours for '{}' must be 'HH:MM-HH:MM' or 'closed'",
                    day
                ))
            })?;
            changes.push((key, range));
        }

        let mut hours = self.current_hours()?;
        for (key, range) in &changes {
            hours.insert(key.to_string(), Value::String(range.clone()));
        }

        let serialized = serde_json::to_string(&hours)
            .map_err(|e| ExecutorError::Failed(format!("Failed to encode hours: {}", e)))?;
        self.site.put_setting(HOURS_SETTING_KEY, &serialized)?;

        let updated: Vec<&str> = DAYS
            .iter()
            .copied()
            .filter(|d| changes.iter().any(|(k, _)| k == d))
            .collect();
        tracing::info!(days = ?updated, "Site hours updated");

        Ok(json!({
            "updated": updated,
            "hours": hours,
        }))
    }
}
