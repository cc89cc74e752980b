//! Conversational assistant for the Counsel law-firm backend.
//!
//! Classifies each utterance, answers informational questions from the
//! knowledge base with cited snippets, and drives the message-staff and
//! book-appointment flows to completion.

pub mod collaborators;
pub mod error;
pub mod extract;
pub mod flow;
pub mod intent;
pub mod orchestrator;
pub mod response;
pub mod session;
pub mod types;

pub use collaborators::{AppointmentSubmitter, ConversationLog, StaffMessageSubmitter};
pub use error::{ChatError, SubmissionError};
pub use flow::FlowEngine;
pub use intent::IntentClassifier;
pub use orchestrator::{ChatOrchestrator, Collaborators};
pub use response::ResponseSynthesizer;
pub use session::{InMemorySessionStore, SessionRepository};
pub use types::{FlowKind, FlowSlots, FlowStep, Intent, Session, TurnRequest, TurnResponse};
