//! Action proposal engine.
//!
//! Two independent sources of candidates: heuristic rules over an
//! [`Analysis`], and a static preset table keyed by field of interest. The
//! engine only deduplicates and caps; weights are informational.

use serde::Serialize;

use crate::types::{ActionName, Analysis, Category, FieldOfInterest};

/// Default cap on automatically proposed actions.
pub const MAX_AUTO_ACTIONS: usize = 4;

/// A ranked candidate action, not yet persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionProposal {
    pub name: ActionName,
    pub weight: f32,
}

const fn weighted(name: ActionName, weight: f32) -> ActionProposal {
    ActionProposal { name, weight }
}

static BUSINESS_HOURS: [ActionProposal; 2] = [
    weighted(ActionName::UpdateSiteHours, 0.9),
    weighted(ActionName::PreviewChanges, 0.7),
];

static PRICING: [ActionProposal; 2] = [
    weighted(ActionName::CreateChangeRequest, 0.85),
    weighted(ActionName::PreviewChanges, 0.7),
];

static PHONE_NUMBER: [ActionProposal; 2] = [
    weighted(ActionName::CreateChangeRequest, 0.8),
    weighted(ActionName::PreviewChanges, 0.6),
];

static COUPON_PROMOTION: [ActionProposal; 3] = [
    weighted(ActionName::CreateChangeRequest, 0.8),
    weighted(ActionName::CreateTopic, 0.5),
    weighted(ActionName::PreviewChanges, 0.5),
];

static GALLERY_PHOTOS: [ActionProposal; 2] = [
    weighted(ActionName::CreateChangeRequest, 0.7),
    weighted(ActionName::SaveNote, 0.4),
];

/// Preset weighted actions for a field of interest.
pub fn preset_actions(field: FieldOfInterest) -> &'static [ActionProposal] {
    match field {
        FieldOfInterest::BusinessHours => &BUSINESS_HOURS,
        FieldOfInterest::Pricing => &PRICING,
        FieldOfInterest::PhoneNumber => &PHONE_NUMBER,
        FieldOfInterest::CouponPromotion => &COUPON_PROMOTION,
        FieldOfInterest::GalleryPhotos => &GALLERY_PHOTOS,
    }
}

/// Heuristic and preset proposals for one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub auto_actions: Vec<String>,
    pub suggestions: Vec<ActionProposal>,
}

pub struct ProposalEngine {
    max_auto_actions: usize,
}

impl Default for ProposalEngine {
    fn default() -> Self {
        Self::new(MAX_AUTO_ACTIONS)
    }
}

impl ProposalEngine {
    pub fn new(max_auto_actions: usize) -> Self {
        Self { max_auto_actions }
    }

    /// Heuristic auto actions for an analysis.
    ///
    /// Rules run in a fixed order and each gates on the action being in
    /// `available`:
    /// 1. `CreateTopic` when the trimmed goal has at least 4 characters.
    /// 2. `SaveNote` when it has at least 8.
    /// 3. `DraftNextSteps` for content/SEO and planning messages.
    pub fn suggest(&self, analysis: &Analysis, available: &[String]) -> Vec<String> {
        self.normalize(heuristic_candidates(analysis), available)
    }

    /// Heuristic candidates followed by preset candidates for `fields`.
    pub fn propose(
        &self,
        analysis: &Analysis,
        available: &[String],
        fields: &[FieldOfInterest],
    ) -> Proposal {
        let presets: Vec<ActionProposal> = fields
            .iter()
            .flat_map(|f| preset_actions(*f).iter().copied())
            .collect();

        let mut candidates = heuristic_candidates(analysis);
        candidates.extend(presets.iter().map(|p| p.name));

        let mut suggestions: Vec<ActionProposal> = Vec::new();
        for proposal in presets {
            let offered = available.iter().any(|a| a == proposal.name.as_str());
            if offered && !suggestions.iter().any(|s| s.name == proposal.name) {
                suggestions.push(proposal);
            }
        }

        Proposal {
            auto_actions: self.normalize(candidates, available),
            suggestions,
        }
    }

    /// Drop unavailable names and duplicates, keep first-insertion order, cap.
    fn normalize(&self, candidates: Vec<ActionName>, available: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.max_auto_actions);
        for name in candidates {
            if out.len() >= self.max_auto_actions {
                break;
            }
            let name = name.as_str();
            if available.iter().any(|a| a == name) && !out.iter().any(|o| o == name) {
                out.push(name.to_string());
            }
        }
        out
    }
}

fn heuristic_candidates(analysis: &Analysis) -> Vec<ActionName> {
    let goal_len = analysis.goal.trim().chars().count();
    let mut candidates = Vec::new();
    if goal_len >= 4 {
        candidates.push(ActionName::CreateTopic);
    }
    if goal_len >= 8 {
        candidates.push(ActionName::SaveNote);
    }
    if matches!(
        analysis.category,
        Category::ContentOrSEO | Category::PlanningOrTaskBreakdown
    ) {
        candidates.push(ActionName::DraftNextSteps);
    }
    candidates
}
