//! Types for the action engine: action names, analysis input, and the
//! option/request shapes the lifecycle controller accepts.

use std::fmt;

use ankr_core::types::ActionCallStatus;
use serde::{Deserialize, Serialize};

// =============================================================================
// ActionName
// =============================================================================

/// Names of the built-in action executors.
///
/// Action calls store their name as a plain string, so a call may name an
/// action that has no executor; that call fails at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionName {
    CreateTopic,
    SaveNote,
    DraftNextSteps,
    UpdateSiteHours,
    CreateChangeRequest,
    PreviewChanges,
}

impl ActionName {
    pub const ALL: [ActionName; 6] = [
        ActionName::CreateTopic,
        ActionName::SaveNote,
        ActionName::DraftNextSteps,
        ActionName::UpdateSiteHours,
        ActionName::CreateChangeRequest,
        ActionName::PreviewChanges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::CreateTopic => "CreateTopic",
            ActionName::SaveNote => "SaveNote",
            ActionName::DraftNextSteps => "DraftNextSteps",
            ActionName::UpdateSiteHours => "UpdateSiteHours",
            ActionName::CreateChangeRequest => "CreateChangeRequest",
            ActionName::PreviewChanges => "PreviewChanges",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("Unknown action name: {}", s))
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Coarse category of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    ContentOrSEO,
    PlanningOrTaskBreakdown,
    SiteUpdate,
    Question,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ContentOrSEO => "ContentOrSEO",
            Category::PlanningOrTaskBreakdown => "PlanningOrTaskBreakdown",
            Category::SiteUpdate => "SiteUpdate",
            Category::Question => "Question",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reading of a user message, as produced by the intent analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_default")]
    pub goal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_to: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f32,
}

/// Read an explicit `null` as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Site fields that carry a preset action mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldOfInterest {
    #[serde(rename = "Business Hours")]
    BusinessHours,
    #[serde(rename = "Pricing")]
    Pricing,
    #[serde(rename = "Phone Number")]
    PhoneNumber,
    #[serde(rename = "Coupon/Promotion")]
    CouponPromotion,
    #[serde(rename = "Gallery Photos")]
    GalleryPhotos,
}

impl FieldOfInterest {
    pub const ALL: [FieldOfInterest; 5] = [
        FieldOfInterest::BusinessHours,
        FieldOfInterest::Pricing,
        FieldOfInterest::PhoneNumber,
        FieldOfInterest::CouponPromotion,
        FieldOfInterest::GalleryPhotos,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FieldOfInterest::BusinessHours => "Business Hours",
            FieldOfInterest::Pricing => "Pricing",
            FieldOfInterest::PhoneNumber => "Phone Number",
            FieldOfInterest::CouponPromotion => "Coupon/Promotion",
            FieldOfInterest::GalleryPhotos => "Gallery Photos",
        }
    }
}

impl fmt::Display for FieldOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Lifecycle requests
// =============================================================================

/// Options for a single execute request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Re-run the executor even if the call already reached a terminal state.
    pub force: bool,
}

/// Terminal states an external executor may report through complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Succeeded,
    Failed,
    Cancelled,
}

impl From<CompletionStatus> for ActionCallStatus {
    fn from(status: CompletionStatus) -> Self {
        match status {
            CompletionStatus::Succeeded => ActionCallStatus::Succeeded,
            CompletionStatus::Failed => ActionCallStatus::Failed,
            CompletionStatus::Cancelled => ActionCallStatus::Cancelled,
        }
    }
}

/// An externally reported outcome for an action call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub status: CompletionStatus,
    pub executed_by: Option<String>,
    pub status_info: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_name_roundtrip() {
        for name in ActionName::ALL {
            assert_eq!(name.to_string().parse::<ActionName>().unwrap(), name);
        }
        assert!("DeleteSite".parse::<ActionName>().is_err());
    }

    #[test]
    fn test_analysis_deserializes_with_defaults() {
        let analysis: Analysis = serde_json::from_str(r#"{"goal": "write a post"}"#).unwrap();
        assert_eq!(analysis.category, Category::Other);
        assert_eq!(analysis.goal, "write a post");
        assert!(analysis.related_to.is_empty());
    }

    #[test]
    fn test_analysis_unknown_category_is_other() {
        let analysis: Analysis =
            serde_json::from_str(r#"{"category": "Marketing", "goal": "grow organic traffic"}"#)
                .unwrap();
        assert_eq!(analysis.category, Category::Other);
        assert_eq!(analysis.goal, "grow organic traffic");
    }

    #[test]
    fn test_analysis_nulls_read_as_defaults() {
        let analysis: Analysis = serde_json::from_str(
            r#"{"category": null, "goal": null, "relatedTo": null, "confidence": null}"#,
        )
        .unwrap();
        assert_eq!(analysis, Analysis::default());
    }

    #[test]
    fn test_analysis_category_names() {
        let analysis: Analysis = serde_json::from_str(
            r#"{"category": "PlanningOrTaskBreakdown", "relatedTo": ["hours"]}"#,
        )
        .unwrap();
        assert_eq!(analysis.category, Category::PlanningOrTaskBreakdown);
        assert_eq!(analysis.related_to, vec!["hours"]);
    }

    #[test]
    fn test_field_of_interest_labels() {
        let json = serde_json::to_string(&FieldOfInterest::CouponPromotion).unwrap();
        assert_eq!(json, "\"Coupon/Promotion\"");
        let parsed: FieldOfInterest = serde_json::from_str("\"Business Hours\"").unwrap();
        assert_eq!(parsed, FieldOfInterest::BusinessHours);
    }

    #[test]
    fn test_completion_status_maps_to_terminal() {
        for status in [
            CompletionStatus::Succeeded,
            CompletionStatus::Failed,
            CompletionStatus::Cancelled,
        ] {
            assert!(ActionCallStatus::from(status).is_terminal());
        }
    }

    #[test]
    fn test_completion_status_rejects_non_terminal() {
        assert!(serde_json::from_str::<CompletionStatus>("\"executing\"").is_err());
    }
}
