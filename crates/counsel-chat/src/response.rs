//! Response synthesis.
//!
//! Builds user-facing text for informational answers from retrieved
//! documents, for the ambiguous-intent menu, and for every step of the two
//! transactional flows.

use counsel_core::types::ScoredDocument;

use crate::types::{FlowKind, FlowSlots};

/// Default snippet length in characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 350;

const ELLIPSIS: &str = "...";

const FLOW_OFFER: &str = "If you'd like, I can also help you book a consultation \
     appointment or send a message to our staff.";

const NO_RESULTS: &str = "I'm sorry, I couldn't find information about that in our \
     knowledge base.";

const MENU: &str = "I can help you with three things: answering questions about our \
     firm, practice areas, and policies; booking a consultation appointment; or \
     sending a message to our staff. Could you rephrase your request so I know \
     which you need?";

const ALTERNATIVE_CONTACT: &str = "Please call our office during business hours or \
     use the contact form on our website instead.";

/// A slot the current utterance did not supply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingSlot {
    Message,
    Contact,
    DateTime,
}

impl MissingSlot {
    fn describe(&self) -> &'static str {
        match self {
            MissingSlot::Message => "the message you'd like to leave",
            MissingSlot::Contact => "an email address or phone number (at least 10 digits)",
            MissingSlot::DateTime => "your preferred date and time",
        }
    }
}

/// Composes response text. Holds only the snippet length.
#[derive(Debug, Clone)]
pub struct ResponseSynthesizer {
    snippet_chars: usize,
}

impl Default for ResponseSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_SNIPPET_CHARS)
    }
}

impl ResponseSynthesizer {
    pub fn new(snippet_chars: usize) -> Self {
        Self { snippet_chars }
    }

    /// Answer an informational query from retrieved documents.
    ///
    /// Each document contributes one snippet with a `(see: title, category)`
    /// citation when it has a title; the reply always ends with an offer
    /// of the two flows.
    pub fn info(&self, documents: &[ScoredDocument]) -> String {
        if documents.is_empty() {
            return format!("{} {}", NO_RESULTS, FLOW_OFFER);
        }

        let snippets: Vec<String> = documents
            .iter()
            .map(|scored| {
                let doc = &scored.document;
                let text = snippet(&doc.content, self.snippet_chars);
                match doc.title {
                    Some(ref title) => format!("{} (see: {}, {})", text, title, doc.category),
                    None => text,
                }
            })
            .collect();

        format!("{}\n\n{}", snippets.join("\n\n"), FLOW_OFFER)
    }

    /// Menu for utterances that match no intent.
    pub fn ambiguous(&self) -> String {
        MENU.to_string()
    }

    /// Prompt when a flow is entered.
    pub fn enter_prompt(&self, kind: FlowKind) -> String {
        match kind {
            FlowKind::MessageStaff => "I'd be happy to pass a message to our staff. Please \
                 share your message along with an email address or phone number where we \
                 can reach you."
                .to_string(),
            FlowKind::BookAppointment => "I'd be happy to help you book a consultation. \
                 Please tell me the type of legal matter, your preferred date and time, and \
                 an email address or phone number where we can contact you."
                .to_string(),
        }
    }

    /// Ask for the pieces the last utterance did not supply.
    pub fn clarification(&self, kind: FlowKind, missing: &[MissingSlot]) -> String {
        let pieces: Vec<&str> = missing.iter().map(MissingSlot::describe).collect();
        let action = match kind {
            FlowKind::MessageStaff => "send your message",
            FlowKind::BookAppointment => "request your appointment",
        };
        format!(
            "Thanks. To {} I still need {}. Please include it in your reply.",
            action,
            join_with_and(&pieces)
        )
    }

    /// Summary of the collected slots with a yes/no prompt.
    pub fn confirmation(&self, slots: &FlowSlots) -> String {
        match slots {
            FlowSlots::MessageStaff { message, contact } => format!(
                "Here is the message I'll send to our staff:\n\nMessage: {}\nContact: {}\n\n\
                 Shall I send it? (yes/no)",
                message, contact
            ),
            FlowSlots::BookAppointment {
                matter_type,
                date_time,
                contact,
            } => format!(
                "Here are your appointment details:\n\nMatter: {}\nPreferred time: {}\n\
                 Contact: {}\n\nShall I submit this request? (yes/no)",
                matter_type, date_time, contact
            ),
        }
    }

    /// Prompt after the caller declines the confirmation.
    pub fn restart_prompt(&self, kind: FlowKind) -> String {
        format!("No problem, let's start over. {}", self.enter_prompt(kind))
    }

    pub fn submission_success(&self, slots: &FlowSlots) -> String {
        match slots {
            FlowSlots::MessageStaff { contact, .. } => format!(
                "Your message has been sent. A member of our staff will get back to you at {}.",
                contact
            ),
            FlowSlots::BookAppointment {
                matter_type,
                date_time,
                contact,
            } => format!(
                "Your {} consultation request for {} has been submitted. We'll confirm \
                 the appointment at {}.",
                matter_type, date_time, contact
            ),
        }
    }

    pub fn submission_failure(&self, kind: FlowKind) -> String {
        let what = match kind {
            FlowKind::MessageStaff => "send your message",
            FlowKind::BookAppointment => "submit your appointment request",
        };
        format!(
            "I'm sorry, I wasn't able to {} right now. {}",
            what, ALTERNATIVE_CONTACT
        )
    }
}

/// Whitespace-collapsed `text`, at most `max_chars` characters.
///
/// Truncated snippets end in `...`, which counts toward the limit.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let ellipsis_len = ELLIPSIS.len();
    if max_chars <= ellipsis_len {
        return collapsed.chars().take(max_chars).collect();
    }
    let mut out: String = collapsed.chars().take(max_chars - ellipsis_len).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Number of whitespace-separated words; the per-turn cost metric.
pub fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

fn join_with_and(pieces: &[&str]) -> String {
    match pieces {
        [] => String::new(),
        [one] => (*one).to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
