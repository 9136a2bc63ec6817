//! Action decision: ask for missing slots, call an endpoint, or answer directly

use crate::schema::Endpoint;
use crate::types::{ActionType, ExtractedInfo, Intent};

/// What to do with a classified request
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDecision {
    AskForInfo {
        intent: Intent,
        missing_fields: Vec<String>,
        message: String,
    },
    CallApi {
        intent: Intent,
        endpoint: Endpoint,
        payload: ExtractedInfo,
    },
    AnswerDirectly {
        intent: Intent,
        message: String,
    },
}

impl ActionDecision {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionDecision::AskForInfo { .. } => ActionType::AskForInfo,
            ActionDecision::CallApi { .. } => ActionType::CallApi,
            ActionDecision::AnswerDirectly { .. } => ActionType::AnswerDirectly,
        }
    }

    pub fn intent(&self) -> Intent {
        match self {
            ActionDecision::AskForInfo { intent, .. }
            | ActionDecision::CallApi { intent, .. }
            | ActionDecision::AnswerDirectly { intent, .. } => *intent,
        }
    }
}

/// Missing slots win over everything; otherwise route by endpoint.
pub fn decide_action(intent: Intent, missing: &[String], info: &ExtractedInfo) -> ActionDecision {
    if !missing.is_empty() {
        return ActionDecision::AskForInfo {
            intent,
            missing_fields: missing.to_vec(),
            message: missing_info_message(intent, missing),
        };
    }

    match intent.endpoint() {
        Some(endpoint) => ActionDecision::CallApi {
            intent,
            endpoint,
            payload: info.clone(),
        },
        None => ActionDecision::AnswerDirectly {
            intent,
            message: direct_answer(intent, info),
        },
    }
}

fn base_prompt(intent: Intent) -> &'static str {
    match intent {
        Intent::Calculate => "I need to know what numbers you want to calculate with.",
        Intent::Weather => "I need to know which location you want weather information for.",
        Intent::BookFlight => "I need the origin, destination, and date for your flight.",
        Intent::SendEmail => "I need the recipient, subject, and message for your email.",
        Intent::Search => "I need to know what you want to search for.",
        Intent::ScheduleMeeting => "I need to know who to meet with, when, and for how long.",
        Intent::Unknown => "I need more information to help you.",
    }
}

fn field_question(field: &str) -> String {
    let question = match field {
        "operation" => "What operation would you like to perform? (add, subtract, multiply, divide, power, sqrt)",
        "numbers" => "What numbers would you like to calculate with?",
        "location" => "Which location would you like weather information for?",
        "origin" => "Where are you departing from?",
        "destination" => "Where are you traveling to?",
        "date" => "What date would you like?",
        "recipient" => "Who should I send the email to?",
        "subject" => "What should the email subject be?",
        "message" => "What message would you like to send?",
        "query" => "What would you like to search for?",
        "participants" => "Who should attend the meeting?",
        "duration" => "How long should the meeting be?",
        other => return format!("Please provide {}.", other),
    };
    question.to_string()
}

fn missing_info_message(intent: Intent, missing: &[String]) -> String {
    let base = base_prompt(intent);
    match missing {
        [only] => format!("{} {}", base, field_question(only)),
        _ => base.to_string(),
    }
}

fn direct_answer(intent: Intent, info: &ExtractedInfo) -> String {
    match intent {
        Intent::Search => {
            let query = info.get("query").and_then(|v| v.as_text()).unwrap_or_default();
            format!("I'll search for information about '{}' for you.", query)
        }
        Intent::Unknown => {
            "I'm not sure what you'd like me to do. Could you rephrase your request?".to_string()
        }
        other => format!("I understand you want to {}. Let me help you with that.", other),
    }
}
