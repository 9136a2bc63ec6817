//! Intent detection cascade: pattern rules, then keywords, then the fallback intent

use crate::config::DetectionConfig;
use crate::extract::SlotExtractor;
use crate::keywords::KeywordMatcher;
use crate::patterns::PatternMatcher;
use crate::schema::retain_known_slots;
use crate::types::{Detection, DetectionMethod, ExtractedInfo, Intent, SlotValue};

pub struct IntentDetector {
    patterns: PatternMatcher,
    keywords: KeywordMatcher,
    slots: SlotExtractor,
    keyword_confidence: f64,
    default_confidence: f64,
    fallback_intent: Intent,
}

impl IntentDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: PatternMatcher::new(config.pattern_confidence)?,
            keywords: KeywordMatcher::new(config.whole_word_bonus),
            slots: SlotExtractor::new()?,
            keyword_confidence: config.keyword_confidence,
            default_confidence: config.default_confidence,
            fallback_intent: config.fallback_intent,
        })
    }

    /// Classify `text`. Never fails: the last stage always produces an intent.
    pub fn detect(&self, text: &str) -> Detection {
        let normalized = normalize(text);

        let mut detection = self
            .match_pattern(&normalized)
            .or_else(|| self.match_keywords(&normalized))
            .unwrap_or_else(|| self.fallback(&normalized));

        retain_known_slots(detection.intent, &mut detection.extracted_info);
        detection
    }

    fn match_pattern(&self, text: &str) -> Option<Detection> {
        let found = self.patterns.match_input(text, &self.slots)?;
        tracing::debug!(intent = %found.intent, rule = found.rule, "pattern match");

        Some(Detection {
            intent: found.intent,
            confidence: found.confidence,
            method: DetectionMethod::Pattern,
            extracted_info: found.extracted_info,
        })
    }

    fn match_keywords(&self, text: &str) -> Option<Detection> {
        let (intent, score) = self.keywords.best_match(&text.to_lowercase())?;
        tracing::debug!(intent = %intent, score, "keyword match");

        Some(Detection {
            intent,
            confidence: self.keyword_confidence,
            method: DetectionMethod::Keywords,
            extracted_info: self.slots.from_keywords(intent, text),
        })
    }

    fn fallback(&self, text: &str) -> Detection {
        tracing::debug!(intent = %self.fallback_intent, "no pattern or keyword match, using fallback");

        let mut extracted_info = ExtractedInfo::new();
        extracted_info.insert("query".to_string(), SlotValue::from(text));

        Detection {
            intent: self.fallback_intent,
            confidence: self.default_confidence,
            method: DetectionMethod::Default,
            extracted_info,
        }
    }
}

/// Collapse whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::missing_fields;

    fn detector() -> IntentDetector {
        IntentDetector::new(&DetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_pattern_stage() {
        let detection = detector().detect("calculate 15 plus 27");
        assert_eq!(detection.intent, Intent::Calculate);
        assert_eq!(detection.method, DetectionMethod::Pattern);
        assert_eq!(detection.confidence, 0.9);
    }

    #[test]
    fn test_keyword_stage() {
        let detection = detector().detect("calculate 1 2 3 4 5 6 7 8 9 10 11");
        assert_eq!(detection.intent, Intent::Calculate);
        assert_eq!(detection.method, DetectionMethod::Keywords);
        assert_eq!(detection.confidence, 0.7);
        assert_eq!(detection.extracted_info["numbers"].as_list().map(|n| n.len()), Some(11));
    }

    #[test]
    fn test_default_stage() {
        let detection = detector().detect("  Hello   there  ");
        assert_eq!(detection.intent, Intent::Search);
        assert_eq!(detection.method, DetectionMethod::Default);
        assert_eq!(detection.confidence, 0.5);
        assert_eq!(detection.extracted_info["query"], SlotValue::from("Hello there"));
    }

    #[test]
    fn test_empty_input_reaches_default() {
        let detection = detector().detect("   ");
        assert_eq!(detection.method, DetectionMethod::Default);
        assert_eq!(missing_fields(detection.intent, &detection.extracted_info), vec!["query"]);
    }

    #[test]
    fn test_unknown_fallback_drops_query() {
        let config = DetectionConfig {
            fallback_intent: Intent::Unknown,
            ..DetectionConfig::default()
        };
        let detection = IntentDetector::new(&config).unwrap().detect("hello there");
        assert_eq!(detection.intent, Intent::Unknown);
        assert!(detection.extracted_info.is_empty());
    }

    #[test]
    fn test_slots_stay_in_vocabulary() {
        let detector = detector();
        let inputs = [
            "book a flight from Oslo to Rome on June 1",
            "weather in Lima",
            "email bob about dinner",
            "raining cats",
            "calculate something",
            "",
        ];
        for input in inputs {
            let detection = detector.detect(input);
            for slot in detection.extracted_info.keys() {
                assert!(
                    detection.intent.recognizes_slot(slot),
                    "{} produced foreign slot {}",
                    input,
                    slot
                );
            }
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" a \t b\n c "), "a b c");
        assert_eq!(normalize("   "), "");
    }
}
