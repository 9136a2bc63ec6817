//! Field schema: required slots and endpoints per intent

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ExtractedInfo, Intent};

/// Identifier of the service a `call_api` action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Calculator,
    Weather,
    FlightBooking,
    Email,
    Calendar,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Calculator => "calculator",
            Endpoint::Weather => "weather",
            Endpoint::FlightBooking => "flight_booking",
            Endpoint::Email => "email",
            Endpoint::Calendar => "calendar",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Intent {
    /// Slots that must be filled before the intent can be acted on, in prompt order.
    ///
    /// This is also the full slot vocabulary of the intent.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Intent::Calculate => &["operation", "numbers"],
            Intent::Weather => &["location"],
            Intent::BookFlight => &["origin", "destination", "date"],
            Intent::SendEmail => &["recipient", "subject", "message"],
            Intent::Search => &["query"],
            Intent::ScheduleMeeting => &["participants", "date", "duration"],
            Intent::Unknown => &[],
        }
    }

    /// `None` marks a direct-answer intent.
    pub fn endpoint(self) -> Option<Endpoint> {
        match self {
            Intent::Calculate => Some(Endpoint::Calculator),
            Intent::Weather => Some(Endpoint::Weather),
            Intent::BookFlight => Some(Endpoint::FlightBooking),
            Intent::SendEmail => Some(Endpoint::Email),
            Intent::ScheduleMeeting => Some(Endpoint::Calendar),
            Intent::Search | Intent::Unknown => None,
        }
    }

    pub fn recognizes_slot(self, slot: &str) -> bool {
        self.required_fields().iter().any(|field| *field == slot)
    }
}

/// List the required fields of `intent` that are absent or empty in `info`.
pub fn missing_fields(intent: Intent, info: &ExtractedInfo) -> Vec<String> {
    intent
        .required_fields()
        .iter()
        .filter(|field| info.get(**field).map_or(true, |value| value.is_empty()))
        .map(|field| field.to_string())
        .collect()
}

/// Drop slots outside the intent's vocabulary.
pub fn retain_known_slots(intent: Intent, info: &mut ExtractedInfo) {
    info.retain(|slot, _| intent.recognizes_slot(slot));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlotValue;

    #[test]
    fn test_missing_fields_in_declared_order() {
        let mut info = ExtractedInfo::new();
        info.insert("destination".to_string(), SlotValue::from("Lisbon"));

        let missing = missing_fields(Intent::BookFlight, &info);
        assert_eq!(missing, vec!["origin".to_string(), "date".to_string()]);
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let mut info = ExtractedInfo::new();
        info.insert("operation".to_string(), SlotValue::from("add"));
        info.insert("numbers".to_string(), SlotValue::List(Vec::new()));

        assert_eq!(missing_fields(Intent::Calculate, &info), vec!["numbers".to_string()]);
    }

    #[test]
    fn test_unknown_has_nothing_missing() {
        assert!(missing_fields(Intent::Unknown, &ExtractedInfo::new()).is_empty());
    }

    #[test]
    fn test_direct_answer_intents_have_no_endpoint() {
        assert_eq!(Intent::Search.endpoint(), None);
        assert_eq!(Intent::Unknown.endpoint(), None);
        assert_eq!(Intent::Calculate.endpoint(), Some(Endpoint::Calculator));
    }

    #[test]
    fn test_retain_known_slots() {
        let mut info = ExtractedInfo::new();
        info.insert("query".to_string(), SlotValue::from("rust"));
        info.insert("location".to_string(), SlotValue::from("Berlin"));

        retain_known_slots(Intent::Search, &mut info);
        assert_eq!(info.len(), 1);
        assert!(info.contains_key("query"));
    }
}
