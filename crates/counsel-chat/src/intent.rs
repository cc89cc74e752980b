//! Intent classification.
//!
//! An active flow owns the conversation; otherwise the utterance is matched
//! against fixed keyword sets, case-insensitive and whole-word, in order
//! booking, messaging, information.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Intent, Session};

fn keyword_regex(words: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("Invalid intent regex")
}

static BOOKING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&["book", "appointment", "schedule", "consultation", "meet"])
});

static MESSAGING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&["contact", "message", "reach", "email", "phone", "send"])
});

static INFO_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    keyword_regex(&[
        "service",
        "practice",
        "offer",
        "area",
        "policy",
        "team",
        "case",
        "experience",
        "about",
        "who",
        "what",
        "where",
        "when",
        "how",
    ])
});

/// Maps an utterance and its session to an [`Intent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, utterance: &str, session: &Session) -> Intent {
        if let Some(flow) = session.active_flow() {
            return Intent::from(flow);
        }
        classify_utterance(utterance)
    }
}

/// Keyword classification ignoring any session state.
pub fn classify_utterance(utterance: &str) -> Intent {
    if BOOKING_WORDS.is_match(utterance) {
        Intent::BookAppointment
    } else if MESSAGING_WORDS.is_match(utterance) {
        Intent::MessageStaff
    } else if INFO_WORDS.is_match(utterance) {
        Intent::Info
    } else {
        Intent::Ambiguous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlowKind, FlowStep};

    #[test]
    fn test_booking_keywords() {
        for text in [
            "I want to book an appointment",
            "Can we SCHEDULE a call?",
            "I'd like a consultation",
            "When can we meet",
        ] {
            assert_eq!(classify_utterance(text), Intent::BookAppointment, "{}", text);
        }
    }

    #[test]
    fn test_messaging_keywords() {
        for text in ["How do I contact a lawyer", "Send a note", "Your phone number?"] {
            assert_eq!(classify_utterance(text), Intent::MessageStaff, "{}", text);
        }
    }

    #[test]
    fn test_info_keywords() {
        for text in [
            "What practice areas do you cover?",
            "Tell me about the firm",
            "Who is on your team",
        ] {
            assert_eq!(classify_utterance(text), Intent::Info, "{}", text);
        }
    }

    #[test]
    fn test_ambiguous() {
        assert_eq!(classify_utterance("hello there"), Intent::Ambiguous);
        assert_eq!(classify_utterance(""), Intent::Ambiguous);
    }

    #[test]
    fn test_whole_word_matching() {
        // "booking" and "messages" are not whole-word hits; "about" is.
        assert_eq!(classify_utterance("bookings"), Intent::Ambiguous);
        assert_eq!(classify_utterance("meeting notes about messages"), Intent::Info);
    }

    #[test]
    fn test_booking_beats_messaging() {
        assert_eq!(
            classify_utterance("send me an appointment"),
            Intent::BookAppointment
        );
    }

    #[test]
    fn test_active_flow_wins() {
        let session = Session {
            flow: Some(FlowKind::MessageStaff),
            step: FlowStep::Collecting,
            slots: None,
        };
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("I want to book an appointment", &session),
            Intent::MessageStaff
        );
        assert_eq!(classifier.classify("hello", &session), Intent::MessageStaff);
    }

    #[test]
    fn test_idle_session_uses_keywords() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("What services do you offer", &Session::new()),
            Intent::Info
        );
    }
}
