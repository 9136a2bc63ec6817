//! Slot extraction helpers
//!
//! Pattern rules pull slots straight out of their captures; these helpers cover
//! the shared pieces (numbers, operation words) and the looser keyword-stage
//! extraction used when no rule matched.

use regex::{Regex, RegexBuilder};

use crate::calculator::Operation;
use crate::types::{ExtractedInfo, Intent, SlotValue};

/// Words the search keyword stage strips before taking the query
const SEARCH_LEADS: &[&str] = &[
    "search", "find", "look", "what", "tell", "information", "know", "help",
];

/// Compiled helper patterns shared by all extractors
pub struct SlotExtractor {
    number: Regex,
    location: Regex,
    proper_name: Regex,
    route: Regex,
    date: Regex,
    duration: Regex,
    participants: Regex,
    email_address: Regex,
    subject: Regex,
    operator: Regex,
    search_lead: Regex,
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

impl SlotExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            number: Regex::new(r"-?\d+(?:\.\d+)?")?,
            location: case_insensitive(
                r"\b(?:in|at|for)\s+([a-z][a-z .'-]*?)(?:\s+(?:today|tomorrow|tonight|now|this week))?\s*[?.!]*$",
            )?,
            // Case-sensitive on purpose: capitalisation is the signal
            proper_name: Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b")?,
            route: case_insensitive(
                r"\b(?:from|departing)\s+([a-z][a-z .'-]*?)\s+(?:to|arriving (?:at|in))\s+([a-z][a-z .'-]*?)(?:\s+(?:on|at|for|tomorrow|today|next)\b|\s*[?.!]*$)",
            )?,
            date: case_insensitive(
                r"\b(today|tomorrow|tonight|next\s+(?:week|month|monday|tuesday|wednesday|thursday|friday|saturday|sunday)|(?:on|date|when)\s+(?:[a-z]+\s+\d{1,2}(?:st|nd|rd|th)?,?(?:\s+\d{4})?|\d{1,2}/\d{1,2}(?:/\d{2,4})?|\d{1,2}-\d{1,2}-\d{2,4}|\d{4}-\d{2}-\d{2}|monday|tuesday|wednesday|thursday|friday|saturday|sunday))\b",
            )?,
            duration: case_insensitive(
                r"\b(\d+(?:\.\d+)?\s*(?:minutes?|mins?|hours?|hrs?)|an?\s+hour|half\s+an\s+hour)\b",
            )?,
            participants: case_insensitive(
                r"\bwith\s+([a-z][a-z ,.'&-]*?)(?:\s+(?:on|at|for|today|tomorrow|next)\b|\s*[?.!]*$)",
            )?,
            email_address: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")?,
            subject: case_insensitive(
                r"\b(?:about|regarding|subject)\s+(.+?)(?:\s+(?:saying|that says)\b.*)?\s*[?.!]*$",
            )?,
            // A symbol only counts as an operator right after a digit; otherwise it is a sign
            operator: case_insensitive(
                r"\d\s*([-+*/x^×÷])|\b(plus|minus|times|multiplied\s+by|divided\s+by|over|to\s+the\s+power\s+of|raised\s+to)\b",
            )?,
            search_lead: case_insensitive(&format!(r"\b(?:{})\w*", SEARCH_LEADS.join("|")))?,
        })
    }

    /// Numeric tokens in order of appearance.
    ///
    /// A minus glued to a preceding letter or digit (`10-3`) is an operator, not a sign.
    pub fn numbers(&self, text: &str) -> Vec<String> {
        self.number
            .find_iter(text)
            .map(|m| {
                let token = m.as_str();
                let glued = text[..m.start()]
                    .chars()
                    .next_back()
                    .map_or(false, |c| c.is_alphanumeric());
                match token.strip_prefix('-') {
                    Some(unsigned) if glued => unsigned.to_string(),
                    _ => token.to_string(),
                }
            })
            .collect()
    }

    /// Map operator words and symbols to an operation, defaulting to addition.
    pub fn operation(&self, text: &str) -> Operation {
        detect_operation(text)
    }

    /// Infix operators in order of appearance, e.g. `[Add, Multiply]` for `2+3*4`.
    pub fn operators(&self, text: &str) -> Vec<Operation> {
        self.operator
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| operator_token(m.as_str()))
            .collect()
    }

    /// True when `text` chains more than one distinct operator.
    pub fn mixes_operators(&self, text: &str) -> bool {
        let operators = self.operators(text);
        operators.windows(2).any(|pair| pair[0] != pair[1])
    }

    /// Loose extraction for the keyword stage
    pub fn from_keywords(&self, intent: Intent, text: &str) -> ExtractedInfo {
        let mut info = ExtractedInfo::new();

        match intent {
            Intent::Calculate => {
                // Mixed operators have no single left-to-right reading; leave the operation unset
                if !self.mixes_operators(text) {
                    info.insert("operation".to_string(), self.operation(text).as_str().into());
                }
                info.insert("numbers".to_string(), SlotValue::List(self.numbers(text)));
            }
            Intent::Weather => {
                if let Some(location) = self.location(text) {
                    info.insert("location".to_string(), location.into());
                }
            }
            Intent::BookFlight => {
                if let Some(caps) = self.route.captures(text) {
                    insert_group(&mut info, "origin", caps.get(1).map(|m| m.as_str()));
                    insert_group(&mut info, "destination", caps.get(2).map(|m| m.as_str()));
                }
                insert_group(&mut info, "date", self.date(text).as_deref());
            }
            Intent::SendEmail => {
                let recipient = self.email_address.find(text).map(|m| m.as_str());
                insert_group(&mut info, "recipient", recipient);
                let subject = self.subject.captures(text).and_then(|caps| caps.get(1));
                insert_group(&mut info, "subject", subject.map(|m| m.as_str()));
            }
            Intent::Search => {
                info.insert("query".to_string(), self.search_query(text).into());
            }
            Intent::ScheduleMeeting => {
                let participants = self.participants.captures(text).and_then(|caps| caps.get(1));
                insert_group(&mut info, "participants", participants.map(|m| m.as_str()));
                insert_group(&mut info, "date", self.date(text).as_deref());
                let duration = self.duration.captures(text).and_then(|caps| caps.get(1));
                insert_group(&mut info, "duration", duration.map(|m| m.as_str()));
            }
            Intent::Unknown => {}
        }

        info
    }

    fn location(&self, text: &str) -> Option<String> {
        if let Some(m) = self.location.captures(text).and_then(|caps| caps.get(1)) {
            return Some(m.as_str().trim().to_string());
        }

        // Fall back to the first capitalised name that does not open the sentence
        self.proper_name
            .find_iter(text)
            .find(|m| m.start() > 0)
            .map(|m| m.as_str().to_string())
    }

    /// Everything after the first search lead word, or the whole text.
    fn search_query(&self, text: &str) -> String {
        self.search_lead
            .find(text)
            .map(|m| text[m.end()..].trim().to_string())
            .filter(|rest| !rest.is_empty())
            .unwrap_or_else(|| text.trim().to_string())
    }

    fn date(&self, text: &str) -> Option<String> {
        let caps = self.date.captures(text)?;
        let raw = caps.get(1)?.as_str();
        let value = ["on ", "date ", "when "]
            .iter()
            .find_map(|lead| {
                raw.get(..lead.len())
                    .filter(|head| head.eq_ignore_ascii_case(lead))
                    .map(|_| &raw[lead.len()..])
            })
            .unwrap_or(raw);
        Some(value.trim().to_string())
    }
}

/// Insert a trimmed text slot unless it is empty.
pub(crate) fn insert_group(info: &mut ExtractedInfo, slot: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        info.insert(slot.to_string(), SlotValue::from(value));
    }
}

/// Map a single infix operator token (`+`, `times`, `divided by`, ...) to its operation.
pub(crate) fn operator_token(token: &str) -> Operation {
    let token = token.to_lowercase();
    match token.as_str() {
        "+" | "plus" => Operation::Add,
        "-" | "minus" => Operation::Subtract,
        "*" | "x" | "×" | "times" => Operation::Multiply,
        "/" | "÷" | "over" => Operation::Divide,
        "^" => Operation::Power,
        other if other.starts_with("multiplied") => Operation::Multiply,
        other if other.starts_with("divided") => Operation::Divide,
        other if other.starts_with("to") || other.starts_with("raised") => Operation::Power,
        other => detect_operation(other),
    }
}

pub(crate) fn detect_operation(text: &str) -> Operation {
    let text = text.to_lowercase();

    if contains_any(&text, &["plus", "add", "sum", "total", "+"]) {
        Operation::Add
    } else if contains_any(&text, &["minus", "subtract", "difference", " - "]) {
        Operation::Subtract
    } else if contains_any(&text, &["times", "multiply", "multiplied", "product", "*", "×"]) {
        Operation::Multiply
    } else if contains_any(&text, &["divide", "divided", "quotient", "/", "÷"]) {
        Operation::Divide
    } else if contains_any(&text, &["power", "exponent", "raised to", "^"]) {
        Operation::Power
    } else if contains_any(&text, &["square root", "sqrt", "root", "radical", "√"]) {
        Operation::Sqrt
    } else {
        Operation::Add
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SlotExtractor {
        SlotExtractor::new().unwrap()
    }

    #[test]
    fn test_numbers_keep_sign_and_decimals() {
        let slots = extractor();
        assert_eq!(slots.numbers("square root of -4"), vec!["-4"]);
        assert_eq!(slots.numbers("add 1.5 and 2"), vec!["1.5", "2"]);
    }

    #[test]
    fn test_glued_minus_is_an_operator() {
        assert_eq!(extractor().numbers("10-3"), vec!["10", "3"]);
        assert_eq!(extractor().numbers("10 - -3"), vec!["10", "-3"]);
    }

    #[test]
    fn test_detect_operation() {
        assert_eq!(detect_operation("15 plus 27"), Operation::Add);
        assert_eq!(detect_operation("10 minus 4"), Operation::Subtract);
        assert_eq!(detect_operation("6 TIMES 7"), Operation::Multiply);
        assert_eq!(detect_operation("divide 9 by 3"), Operation::Divide);
        assert_eq!(detect_operation("2 raised to 8"), Operation::Power);
        assert_eq!(detect_operation("sqrt 9"), Operation::Sqrt);
        assert_eq!(detect_operation("calculate 1 2 3"), Operation::Add);
    }

    #[test]
    fn test_operators_in_order() {
        let slots = extractor();
        assert_eq!(
            slots.operators("2+3*4"),
            vec![Operation::Add, Operation::Multiply]
        );
        assert_eq!(slots.operators("10 - -2"), vec![Operation::Subtract]);
        assert_eq!(
            slots.operators("15 plus 27 divided by 3"),
            vec![Operation::Add, Operation::Divide]
        );
        assert!(slots.operators("square root of -4").is_empty());
    }

    #[test]
    fn test_mixes_operators() {
        let slots = extractor();
        assert!(slots.mixes_operators("8 / 2 + 2"));
        assert!(!slots.mixes_operators("1 + 2 + 3"));
        assert!(!slots.mixes_operators("10 - -3"));
    }

    #[test]
    fn test_keyword_calculate_mixed_operators_leaves_operation_unset() {
        let info = extractor().from_keywords(Intent::Calculate, "calculate 2 plus 3 times 4");
        assert!(!info.contains_key("operation"));
        assert_eq!(info.get("numbers").and_then(|v| v.as_list()).map(|n| n.len()), Some(3));
    }

    #[test]
    fn test_keyword_calculate() {
        let info = extractor().from_keywords(Intent::Calculate, "calculate 1 2 3");
        assert_eq!(info.get("operation"), Some(&SlotValue::from("add")));
        assert_eq!(
            info.get("numbers"),
            Some(&SlotValue::List(vec!["1".into(), "2".into(), "3".into()]))
        );
    }

    #[test]
    fn test_keyword_weather_location() {
        let slots = extractor();
        let info = slots.from_keywords(Intent::Weather, "will there be rain in New York tomorrow?");
        assert_eq!(info.get("location"), Some(&SlotValue::from("New York")));

        let info = slots.from_keywords(Intent::Weather, "Hot days ahead, Madrid?");
        assert_eq!(info.get("location"), Some(&SlotValue::from("Madrid")));

        assert!(slots.from_keywords(Intent::Weather, "cold outside").is_empty());
    }

    #[test]
    fn test_keyword_flight_route_and_date() {
        let info = extractor().from_keywords(
            Intent::BookFlight,
            "need an airline ticket from Boston to Denver on March 3, 2025",
        );
        assert_eq!(info.get("origin"), Some(&SlotValue::from("Boston")));
        assert_eq!(info.get("destination"), Some(&SlotValue::from("Denver")));
        assert_eq!(info.get("date"), Some(&SlotValue::from("March 3, 2025")));
    }

    #[test]
    fn test_keyword_email() {
        let info = extractor().from_keywords(
            Intent::SendEmail,
            "send a note to jane.doe@example.com regarding quarterly numbers",
        );
        assert_eq!(info.get("recipient"), Some(&SlotValue::from("jane.doe@example.com")));
        assert_eq!(info.get("subject"), Some(&SlotValue::from("quarterly numbers")));
        assert!(!info.contains_key("message"));
    }

    #[test]
    fn test_keyword_search_query() {
        let slots = extractor();
        let info = slots.from_keywords(Intent::Search, "could you help me with borrow checking");
        assert_eq!(info.get("query"), Some(&SlotValue::from("me with borrow checking")));

        let info = slots.from_keywords(Intent::Search, "lookup");
        assert_eq!(info.get("query"), Some(&SlotValue::from("lookup")));
    }

    #[test]
    fn test_search_query_with_non_ascii_prefix() {
        // "İ" lowercases to a longer byte sequence
        let info = extractor().from_keywords(Intent::Search, "İİİ HELP with kebabs");
        assert_eq!(info.get("query"), Some(&SlotValue::from("with kebabs")));
    }

    #[test]
    fn test_keyword_meeting() {
        let info = extractor().from_keywords(
            Intent::ScheduleMeeting,
            "calendar slot with Priya and Tom tomorrow for 45 minutes",
        );
        assert_eq!(info.get("participants"), Some(&SlotValue::from("Priya and Tom")));
        assert_eq!(info.get("date"), Some(&SlotValue::from("tomorrow")));
        assert_eq!(info.get("duration"), Some(&SlotValue::from("45 minutes")));
    }
}
