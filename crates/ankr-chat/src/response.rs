//! Templated assistant replies.

use ankr_action::{ActionName, FieldOfInterest};

use crate::types::{ChatMode, ChatPlan};

/// Human phrasing for an action name. Unknown names are shown as-is.
pub fn describe_action(name: &str) -> String {
    match name.parse::<ActionName>() {
        Ok(ActionName::CreateTopic) => "Create a blog topic".to_string(),
        Ok(ActionName::SaveNote) => "Save a note for later".to_string(),
        Ok(ActionName::DraftNextSteps) => "Draft the next steps".to_string(),
        Ok(ActionName::UpdateSiteHours) => "Update your business hours".to_string(),
        Ok(ActionName::CreateChangeRequest) => "Open a change request for review".to_string(),
        Ok(ActionName::PreviewChanges) => "Preview pending site changes".to_string(),
        Err(_) => format!("Run {}", name),
    }
}

fn field_list(fields: &[FieldOfInterest]) -> String {
    fields
        .iter()
        .map(FieldOfInterest::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compose the reply text for a plan.
pub fn compose(mode: ChatMode, goal: &str, plan: &ChatPlan) -> String {
    match mode {
        ChatMode::Chat => compose_chat(goal, plan),
        ChatMode::Plan => compose_plan(goal, plan),
    }
}

fn compose_chat(goal: &str, plan: &ChatPlan) -> String {
    let mut reply = if goal.is_empty() {
        "Got it.".to_string()
    } else {
        format!("Got it: {}.", goal)
    };

    if !plan.fields_of_interest.is_empty() {
        reply.push_str(&format!(
            " This touches your {}.",
            field_list(&plan.fields_of_interest)
        ));
    }

    if plan.auto_actions.is_empty() {
        reply.push_str(" Tell me a bit more about what you'd like to change and I'll suggest next steps.");
    } else {
        let actions: Vec<String> = plan
            .auto_actions
            .iter()
            .map(|a| describe_action(a).to_lowercase())
            .collect();
        reply.push_str(&format!(" I can help with: {}.", actions.join("; ")));
    }
    reply
}

fn compose_plan(goal: &str, plan: &ChatPlan) -> String {
    if plan.auto_actions.is_empty() {
        return "I don't have a plan for this yet. Could you describe the outcome you want?"
            .to_string();
    }

    let heading = if goal.is_empty() {
        "Here's a plan:".to_string()
    } else {
        format!("Here's a plan for \"{}\":", goal)
    };
    let steps = plan
        .auto_actions
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, describe_action(name)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", heading, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(actions: &[&str], fields: Vec<FieldOfInterest>) -> ChatPlan {
        ChatPlan {
            auto_actions: actions.iter().map(|s| s.to_string()).collect(),
            suggestions: vec![],
            fields_of_interest: fields,
        }
    }

    #[test]
    fn test_describe_action() {
        assert_eq!(describe_action("SaveNote"), "Save a note for later");
        assert_eq!(describe_action("Custom"), "Run Custom");
    }

    #[test]
    fn test_compose_chat_with_actions() {
        let reply = compose(
            ChatMode::Chat,
            "change the hours",
            &plan(&["UpdateSiteHours"], vec![FieldOfInterest::BusinessHours]),
        );
        assert_eq!(
            reply,
            "Got it: change the hours. This touches your Business Hours. I can help with: update your business hours."
        );
    }

    #[test]
    fn test_compose_chat_without_actions() {
        let reply = compose(ChatMode::Chat, "", &plan(&[], vec![]));
        assert!(reply.starts_with("Got it."));
        assert!(reply.contains("Tell me a bit more"));
    }

    #[test]
    fn test_compose_plan_numbers_steps() {
        let reply = compose(
            ChatMode::Plan,
            "grow organic traffic",
            &plan(&["CreateTopic", "DraftNextSteps"], vec![]),
        );
        assert_eq!(
            reply,
            "Here's a plan for \"grow organic traffic\":\n1. Create a blog topic\n2. Draft the next steps"
        );
    }

    #[test]
    fn test_compose_plan_empty() {
        let reply = compose(ChatMode::Plan, "x", &plan(&[], vec![]));
        assert!(reply.starts_with("I don't have a plan"));
    }
}
