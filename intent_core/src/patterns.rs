//! Pattern matcher - ordered regex rules, first match wins
//!
//! Every rule is anchored at both ends and case-insensitive. Its extractor only
//! reads the rule's own capture groups.

use regex::{Captures, Regex, RegexBuilder};

use crate::calculator::Operation;
use crate::extract::{detect_operation, insert_group, operator_token, SlotExtractor};
use crate::types::{ExtractedInfo, Intent, SlotValue};

/// Builds the slot mapping from a successful match
pub type Extractor = fn(&Captures<'_>, &SlotExtractor) -> ExtractedInfo;

pub struct PatternRule {
    pub intent: Intent,
    pub regex: Regex,
    pub extract: Extractor,
    pub confidence: f64,
}

/// Result of a pattern match
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub intent: Intent,
    pub confidence: f64,
    pub extracted_info: ExtractedInfo,
    /// Position of the winning rule in priority order
    pub rule: usize,
}

const NUMBER: &str = r"-?\d+(?:\.\d+)?";
const CALC_LEAD: &str = r"(?:please\s+)?(?:calculate|compute|evaluate|solve|what(?:'s|\s+is)|how\s+much\s+is)";
const OP_WORD: &str = r"plus|minus|times|multiplied\s+by|divided\s+by|over|to\s+the\s+power\s+of|raised\s+to(?:\s+the\s+power\s+of)?";
const WHEN: &str = r"today|tomorrow|tonight|this\s+week|next\s+\w+";
const WANT: &str = r"(?:(?:i\s+)?(?:want|need|would\s+like)\s+to\s+|can\s+you\s+|please\s+)?";

fn rule(intent: Intent, pattern: impl Into<String>, extract: Extractor) -> (Intent, String, Extractor) {
    (intent, pattern.into(), extract)
}

/// Rule table in priority order: (intent, pattern, extractor).
fn rule_table() -> Vec<(Intent, String, Extractor)> {
    vec![
        // square root / radical
        rule(
            Intent::Calculate,
            format!(
                r"^(?:{CALC_LEAD}\s+|find\s+)?(?:the\s+)?(?:(?:square\s+root|radical|root)\s+of|sqrt(?:\s+of)?|√)\s*(?P<operand>.+?)\s*\??$"
            ),
            extract_sqrt,
        ),
        // "calculate 15 plus 27", "what is 6 times 7"
        rule(
            Intent::Calculate,
            format!(r"^{CALC_LEAD}\s+(?P<lhs>.+?)\s+(?P<op>{OP_WORD})\s+(?P<rhs>.+?)\s*\??$"),
            extract_binary,
        ),
        // "15 plus 27"
        rule(
            Intent::Calculate,
            format!(r"^(?P<lhs>{NUMBER})\s+(?P<op>{OP_WORD})\s+(?P<rhs>.+?)\s*\??$"),
            extract_binary,
        ),
        // "15 + 27", "what is 2^10"
        rule(
            Intent::Calculate,
            format!(
                r"^(?:{CALC_LEAD}\s+)?(?P<lhs>{NUMBER})\s*(?P<op>[-+*/x^×÷])\s*(?P<rhs>{NUMBER}(?:\s*[-+*/x^×÷]\s*{NUMBER})*)\s*=?\s*\??$"
            ),
            extract_binary,
        ),
        // "divide 10 by 2", "subtract 3 from 10"
        rule(
            Intent::Calculate,
            r"^(?:please\s+)?(?P<verb>add|subtract|multiply|divide|sum|total)\s+(?P<lhs>.+?)\s+(?P<conj>and|to|by|from|with)\s+(?P<rhs>.+?)\s*\??$",
            extract_verb_first,
        ),
        // "the sum of 4 and 5"
        rule(
            Intent::Calculate,
            format!(
                r"^(?:{CALC_LEAD}\s+)?(?:the\s+)?(?P<agg>sum|total|product|difference|quotient)\s+of\s+(?P<lhs>.+?)\s+(?:and|plus|with)\s+(?P<rhs>.+?)\s*\??$"
            ),
            extract_aggregate,
        ),
        // "power of 2 to 8"
        rule(
            Intent::Calculate,
            format!(
                r"^(?:{CALC_LEAD}\s+)?(?:the\s+)?(?:power|exponent)\s+(?:of\s+)?(?P<lhs>.+?)\s+(?:to|raised\s+to)(?:\s+the\s+power(?:\s+of)?)?\s+(?P<rhs>.+?)\s*\??$"
            ),
            extract_power,
        ),
        // "calculate 4 and 5"
        rule(
            Intent::Calculate,
            r"^(?:please\s+)?(?:calculate|compute)\s+(?P<lhs>.+?)\s+(?:and|with)\s+(?P<rhs>.+?)\s*\??$",
            extract_binary,
        ),
        // "what's the weather like in Oslo", "how is the forecast"
        rule(
            Intent::Weather,
            format!(
                r"^(?:what(?:'s|\s+is)|how(?:'s|\s+is))\s+the\s+(?:weather|temperature|forecast)(?:\s+like)?(?:\s+(?:in|for|at)\s+(?P<location>.+?))?(?:\s+(?:{WHEN}|right\s+now|now))?\s*\??$"
            ),
            extract_weather,
        ),
        // "weather in Paris", "forecast for Tokyo tomorrow"
        rule(
            Intent::Weather,
            format!(
                r"^(?:(?:show\s+me|get|check)\s+)?(?:the\s+)?(?:weather(?:\s+forecast)?|temperature|forecast)\s+(?:in|for|at)\s+(?P<location>.+?)(?:\s+(?:{WHEN}|right\s+now|now))?\s*\??$"
            ),
            extract_weather,
        ),
        // "is it raining in London"
        rule(
            Intent::Weather,
            format!(
                r"^(?:is\s+it|will\s+it)\s+(?:be\s+)?(?:rain(?:ing|y)?|snow(?:ing|y)?|sunny|cloudy|hot|cold|windy)\s+(?:in|at)\s+(?P<location>.+?)(?:\s+(?:{WHEN}))?\s*\??$"
            ),
            extract_weather,
        ),
        // "book a flight from Boston to Denver on May 2", "i want to fly to Rome"
        rule(
            Intent::BookFlight,
            format!(
                r"^{WANT}(?:(?:book|reserve|find|get)\s+(?:me\s+)?(?:an?\s+)?(?:flight|plane\s+ticket|ticket|seat)|fly|travel)(?:\s+from\s+(?P<origin>.+?))?(?:\s+to\s+(?P<destination>.+?))?(?:\s+on\s+(?P<date>.+?)|\s+(?P<when>{WHEN}))?\s*\??$"
            ),
            extract_flight,
        ),
        // "flight from Boston to Denver"
        rule(
            Intent::BookFlight,
            format!(
                r"^(?:an?\s+)?(?:flights?|tickets?)\s+from\s+(?P<origin>.+?)\s+to\s+(?P<destination>.+?)(?:\s+on\s+(?P<date>.+?)|\s+(?P<when>{WHEN}))?\s*\??$"
            ),
            extract_flight,
        ),
        // "from Boston to Denver on May 2"
        rule(
            Intent::BookFlight,
            format!(
                r"^from\s+(?P<origin>.+?)\s+to\s+(?P<destination>.+?)(?:\s+on\s+(?P<date>.+?)|\s+(?P<when>{WHEN}))?\s*\??$"
            ),
            extract_flight,
        ),
        // "send an email to bob about lunch saying see you at noon"
        rule(
            Intent::SendEmail,
            format!(
                r"^{WANT}(?:(?:send|write|compose|draft)\s+(?:an?\s+)?(?:e-?mail|mail|message|note)|e-?mail|mail|contact|reach\s+out)(?:\s+to)?\s+(?P<recipient>.+?)(?:\s+(?:about|regarding|re:?|with\s+(?:the\s+)?subject)\s+(?P<subject>.+?))?(?:\s+(?:saying|that\s+says|with\s+(?:the\s+)?message)\s+(?P<message>.+?))?\s*$"
            ),
            extract_email,
        ),
        // "search for rust tutorials"
        rule(
            Intent::Search,
            r"^(?:please\s+)?(?:search(?:\s+for)?|find(?:\s+me)?|look\s+up|google)\s+(?P<query>.+?)\s*\??$",
            extract_search,
        ),
        // "what is ownership", "tell me about lifetimes"
        rule(
            Intent::Search,
            r"^(?:what(?:'s|\s+is|\s+are)|who(?:'s|\s+is|\s+are)|tell\s+me\s+about|information\s+(?:about|on)|i\s+(?:want|need)\s+to\s+know(?:\s+about)?|can\s+you\s+tell\s+me(?:\s+about)?|do\s+you\s+know(?:\s+about)?|help\s+me\s+find|show\s+me)\s+(?P<query>.+?)\s*\??$",
            extract_search,
        ),
        // "schedule a meeting with Ann on Friday for 30 minutes"
        rule(
            Intent::ScheduleMeeting,
            format!(
                r"^{WANT}(?:(?:schedule|book|arrange|set\s+up|organi[sz]e|plan)\s+(?:an?\s+)?(?:meeting|call|appointment)|meet|(?:an?\s+)?(?:meeting|appointment))(?:\s+with\s+(?P<participants>.+?))?(?:\s+on\s+(?P<date>.+?)|\s+(?P<when>{WHEN}))?(?:\s+for\s+(?P<duration>\d+(?:\.\d+)?\s*(?:minutes?|mins?|hours?|hrs?)|an?\s+hour|half\s+an\s+hour))?\s*\??$"
            ),
            extract_meeting,
        ),
    ]
}

/// Ordered rule set. Order is part of the contract: the first rule that matches wins.
pub struct PatternMatcher {
    rules: Vec<PatternRule>,
}

impl PatternMatcher {
    pub fn new(confidence: f64) -> Result<Self, regex::Error> {
        let rules = rule_table()
            .into_iter()
            .map(|(intent, pattern, extract)| {
                let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
                Ok(PatternRule {
                    intent,
                    regex,
                    extract,
                    confidence,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        tracing::debug!("Compiled {} intent pattern rules", rules.len());
        Ok(Self { rules })
    }

    /// Try each rule in priority order against normalised input.
    pub fn match_input(&self, text: &str, slots: &SlotExtractor) -> Option<PatternMatch> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            rule.regex.captures(text).map(|caps| PatternMatch {
                intent: rule.intent,
                confidence: rule.confidence,
                extracted_info: (rule.extract)(&caps, slots),
                rule: index,
            })
        })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str())
}

fn calculation(operation: Operation, numbers: Vec<String>) -> ExtractedInfo {
    let mut info = ExtractedInfo::new();
    info.insert("operation".to_string(), SlotValue::from(operation.as_str()));
    info.insert("numbers".to_string(), SlotValue::List(numbers));
    info
}

fn operands(caps: &Captures<'_>, slots: &SlotExtractor) -> Vec<String> {
    ["lhs", "rhs"]
        .iter()
        .filter_map(|name| group(caps, name))
        .flat_map(|text| slots.numbers(text))
        .collect()
}

/// A binary-style calculation. Every infix operator inside the operands must
/// agree with `operation`; a mixed chain such as `2+3*4` leaves the operation
/// unset so the user is asked which one they meant.
fn chained(
    operation: Operation,
    numbers: Vec<String>,
    caps: &Captures<'_>,
    slots: &SlotExtractor,
) -> ExtractedInfo {
    let consistent = ["lhs", "rhs"]
        .iter()
        .filter_map(|name| group(caps, name))
        .flat_map(|text| slots.operators(text))
        .all(|op| op == operation);

    let mut info = calculation(operation, numbers);
    if !consistent {
        tracing::debug!(operation = %operation, "mixed operators, leaving operation unset");
        info.remove("operation");
    }
    info
}

fn extract_sqrt(caps: &Captures<'_>, slots: &SlotExtractor) -> ExtractedInfo {
    let numbers = group(caps, "operand").map(|text| slots.numbers(text)).unwrap_or_default();
    calculation(Operation::Sqrt, numbers)
}

fn extract_binary(caps: &Captures<'_>, slots: &SlotExtractor) -> ExtractedInfo {
    let operation = match group(caps, "op") {
        Some(op) => operator_token(op),
        None => detect_operation(caps.get(0).map_or("", |m| m.as_str())),
    };
    chained(operation, operands(caps, slots), caps, slots)
}

fn extract_verb_first(caps: &Captures<'_>, slots: &SlotExtractor) -> ExtractedInfo {
    let verb = group(caps, "verb").unwrap_or("add").to_lowercase();
    let operation = match verb.as_str() {
        "subtract" => Operation::Subtract,
        "multiply" => Operation::Multiply,
        "divide" => Operation::Divide,
        _ => Operation::Add,
    };

    let mut numbers = operands(caps, slots);
    // "subtract 3 from 10" is 10 - 3
    let reversed = group(caps, "conj").map_or(false, |conj| conj.eq_ignore_ascii_case("from"));
    if operation == Operation::Subtract && reversed {
        let lhs = group(caps, "lhs").map(|text| slots.numbers(text)).unwrap_or_default();
        let rhs = group(caps, "rhs").map(|text| slots.numbers(text)).unwrap_or_default();
        numbers = rhs.into_iter().chain(lhs).collect();
    }

    chained(operation, numbers, caps, slots)
}

fn extract_aggregate(caps: &Captures<'_>, slots: &SlotExtractor) -> ExtractedInfo {
    let operation = match group(caps, "agg").map(str::to_lowercase).as_deref() {
        Some("product") => Operation::Multiply,
        Some("difference") => Operation::Subtract,
        Some("quotient") => Operation::Divide,
        _ => Operation::Add,
    };
    chained(operation, operands(caps, slots), caps, slots)
}

fn extract_power(caps: &Captures<'_>, slots: &SlotExtractor) -> ExtractedInfo {
    chained(Operation::Power, operands(caps, slots), caps, slots)
}

fn extract_weather(caps: &Captures<'_>, _slots: &SlotExtractor) -> ExtractedInfo {
    let mut info = ExtractedInfo::new();
    insert_group(&mut info, "location", group(caps, "location"));
    info
}

fn extract_flight(caps: &Captures<'_>, _slots: &SlotExtractor) -> ExtractedInfo {
    let mut info = ExtractedInfo::new();
    insert_group(&mut info, "origin", group(caps, "origin"));
    insert_group(&mut info, "destination", group(caps, "destination"));
    insert_group(&mut info, "date", group(caps, "date").or_else(|| group(caps, "when")));
    info
}

fn extract_email(caps: &Captures<'_>, _slots: &SlotExtractor) -> ExtractedInfo {
    let mut info = ExtractedInfo::new();
    insert_group(&mut info, "recipient", group(caps, "recipient"));
    insert_group(&mut info, "subject", group(caps, "subject"));
    insert_group(&mut info, "message", group(caps, "message"));
    info
}

fn extract_search(caps: &Captures<'_>, _slots: &SlotExtractor) -> ExtractedInfo {
    let mut info = ExtractedInfo::new();
    insert_group(&mut info, "query", group(caps, "query"));
    info
}

fn extract_meeting(caps: &Captures<'_>, _slots: &SlotExtractor) -> ExtractedInfo {
    let mut info = ExtractedInfo::new();
    insert_group(&mut info, "participants", group(caps, "participants"));
    insert_group(&mut info, "date", group(caps, "date").or_else(|| group(caps, "when")));
    insert_group(&mut info, "duration", group(caps, "duration"));
    info
}
