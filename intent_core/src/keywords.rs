//! Keyword fallback matcher
//!
//! Scores every intent by the keywords present in the lowercased input and keeps
//! the best. Only reached when no pattern rule matched.

use ahash::AHashSet;

use crate::types::Intent;

/// Keyword sets in intent declaration order. Ties go to the earlier entry.
const KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Calculate,
        &[
            "calculate", "compute", "add", "subtract", "multiply", "divide", "math", "sum",
            "total", "plus", "minus", "times", "sqrt", "square root", "power",
        ],
    ),
    (
        Intent::Weather,
        &[
            "weather", "temperature", "forecast", "rain", "snow", "sunny", "cloudy", "hot",
            "cold", "humid", "windy",
        ],
    ),
    (
        Intent::BookFlight,
        &["flight", "fly", "travel", "ticket", "airline", "airport", "destination", "origin"],
    ),
    (
        Intent::SendEmail,
        &["email", "mail", "send", "message", "contact", "recipient", "inbox"],
    ),
    (
        Intent::Search,
        &["search", "find", "look", "what", "tell", "information", "know", "help"],
    ),
    (
        Intent::ScheduleMeeting,
        &["meeting", "schedule", "appointment", "call", "meet", "calendar"],
    ),
];

pub struct KeywordMatcher {
    whole_word_bonus: f64,
}

impl KeywordMatcher {
    pub fn new(whole_word_bonus: f64) -> Self {
        Self { whole_word_bonus }
    }

    /// Best-scoring intent for already-lowercased text, if any keyword occurs.
    pub fn best_match(&self, text: &str) -> Option<(Intent, f64)> {
        let words: AHashSet<&str> = text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .collect();

        let mut best: Option<(Intent, f64)> = None;
        for (intent, keywords) in KEYWORDS {
            let score = self.score(text, &words, keywords);
            tracing::trace!(intent = %intent, score, "keyword score");

            // Strictly greater keeps the first-declared intent on ties
            if score > 0.0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((*intent, score));
            }
        }

        best
    }

    fn score(&self, text: &str, words: &AHashSet<&str>, keywords: &[&str]) -> f64 {
        keywords
            .iter()
            .filter(|keyword| text.contains(**keyword))
            .map(|keyword| {
                if words.contains(keyword) {
                    1.0 + self.whole_word_bonus
                } else {
                    1.0
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_keyword() {
        let matcher = KeywordMatcher::new(0.5);
        match matcher.best_match("calculate something") {
            Some((intent, score)) => {
                assert_eq!(intent, Intent::Calculate);
                assert_eq!(score, 1.5);
            }
            None => panic!("Expected keyword match"),
        }
    }

    #[test]
    fn test_substring_scores_without_bonus() {
        let matcher = KeywordMatcher::new(0.5);
        // "raining" contains "rain" but is not the word "rain"
        assert_eq!(matcher.best_match("raining hard"), Some((Intent::Weather, 1.0)));
    }

    #[test]
    fn test_highest_score_wins() {
        let matcher = KeywordMatcher::new(0.5);
        let (intent, _) = matcher.best_match("send the meeting calendar invite").unwrap();
        assert_eq!(intent, Intent::ScheduleMeeting);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let matcher = KeywordMatcher::new(0.5);
        // one whole-word hit each for weather and search
        let (intent, _) = matcher.best_match("cold help").unwrap();
        assert_eq!(intent, Intent::Weather);
    }

    #[test]
    fn test_no_keywords() {
        let matcher = KeywordMatcher::new(0.5);
        assert_eq!(matcher.best_match("hello there"), None);
        assert_eq!(matcher.best_match(""), None);
    }
}
