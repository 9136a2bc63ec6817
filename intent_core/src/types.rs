//! Core data types for detection, decisions and results

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of intents an utterance can be classified into.
///
/// Declaration order matters: it is the tie-break order of the keyword stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Calculate,
    Weather,
    BookFlight,
    SendEmail,
    Search,
    ScheduleMeeting,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Calculate,
        Intent::Weather,
        Intent::BookFlight,
        Intent::SendEmail,
        Intent::Search,
        Intent::ScheduleMeeting,
        Intent::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Calculate => "calculate",
            Intent::Weather => "weather",
            Intent::BookFlight => "book_flight",
            Intent::SendEmail => "send_email",
            Intent::Search => "search",
            Intent::ScheduleMeeting => "schedule_meeting",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cascade stage produced the intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Pattern,
    Keywords,
    Default,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Pattern => "pattern",
            DetectionMethod::Keywords => "keywords",
            DetectionMethod::Default => "default",
        }
    }
}

/// A single extracted slot value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Text(String),
    List(Vec<String>),
}

impl SlotValue {
    /// Empty text (after trimming) and empty lists count as "not provided".
    pub fn is_empty(&self) -> bool {
        match self {
            SlotValue::Text(s) => s.trim().is_empty(),
            SlotValue::List(items) => items.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(s) => Some(s),
            SlotValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SlotValue::List(items) => Some(items),
            SlotValue::Text(_) => None,
        }
    }
}

impl From<&str> for SlotValue {
    fn from(value: &str) -> Self {
        SlotValue::Text(value.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(value: String) -> Self {
        SlotValue::Text(value)
    }
}

impl From<Vec<String>> for SlotValue {
    fn from(value: Vec<String>) -> Self {
        SlotValue::List(value)
    }
}

/// Slot name -> value. Ordered so serialized output is stable.
pub type ExtractedInfo = BTreeMap<String, SlotValue>;

/// Output of the detection cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub intent: Intent,
    pub confidence: f64,
    pub method: DetectionMethod,
    pub extracted_info: ExtractedInfo,
}

/// The next step chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AskForInfo,
    CallApi,
    AnswerDirectly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Error,
}

/// Error tag carried by failed API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CalculationError,
    UnknownEndpoint,
}

/// Response from the calculator or an external service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub endpoint: String,
    pub result: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
    pub data: serde_json::Value,
}

impl ApiResponse {
    pub fn success(endpoint: impl Into<String>, result: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            result: result.into(),
            status: Status::Success,
            error_type: None,
            data,
        }
    }

    pub fn error(
        endpoint: impl Into<String>,
        kind: ErrorKind,
        result: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            result: result.into(),
            status: Status::Error,
            error_type: Some(kind),
            data,
        }
    }
}

/// Result of executing an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionResult {
    AskForInfo {
        response: String,
        missing_fields: Vec<String>,
        intent: Intent,
    },
    DirectAnswer {
        response: String,
        intent: Intent,
    },
    ApiResponse(ApiResponse),
}

impl ActionResult {
    /// Prompts and canned answers always succeed; only API responses can fail.
    pub fn status(&self) -> Status {
        match self {
            ActionResult::ApiResponse(response) => response.status,
            _ => Status::Success,
        }
    }

    pub fn error_type(&self) -> Option<ErrorKind> {
        match self {
            ActionResult::ApiResponse(response) => response.error_type,
            _ => None,
        }
    }

    /// Human-readable text of the result
    pub fn text(&self) -> &str {
        match self {
            ActionResult::AskForInfo { response, .. } => response,
            ActionResult::DirectAnswer { response, .. } => response,
            ActionResult::ApiResponse(response) => &response.result,
        }
    }
}

/// Full response for one call to `process_input`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub input: String,
    pub intent: Intent,
    pub confidence: f64,
    pub detection_method: DetectionMethod,
    pub extracted_info: ExtractedInfo,
    pub missing_info: Vec<String>,
    pub action_taken: ActionType,
    pub result: ActionResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slot_value_emptiness() {
        assert!(SlotValue::from("   ").is_empty());
        assert!(SlotValue::List(Vec::new()).is_empty());
        assert!(!SlotValue::from("paris").is_empty());
        assert!(!SlotValue::List(vec!["1".to_string()]).is_empty());
    }

    #[test]
    fn test_slot_value_serializes_untagged() {
        let mut info = ExtractedInfo::new();
        info.insert("operation".to_string(), SlotValue::from("add"));
        info.insert("numbers".to_string(), SlotValue::List(vec!["1".into(), "2".into()]));

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value, json!({"numbers": ["1", "2"], "operation": "add"}));
    }

    #[test]
    fn test_api_response_shape() {
        let response = ActionResult::ApiResponse(ApiResponse::error(
            "calculator",
            ErrorKind::CalculationError,
            "Error: cannot divide by zero",
            json!({"operation": "divide", "numbers": ["10", "0"]}),
        ));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "api_response");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error_type"], "calculation_error");
        assert_eq!(value["data"]["operation"], "divide");
    }

    #[test]
    fn test_success_response_omits_error_type() {
        let response = ApiResponse::success("weather", "Weather information for Oslo", json!({}));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("error_type").is_none());
    }

    #[test]
    fn test_intent_names() {
        for intent in Intent::ALL {
            let encoded = serde_json::to_value(intent).unwrap();
            assert_eq!(encoded, json!(intent.as_str()));
        }
    }
}
