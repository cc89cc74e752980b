//! Session, flow, and turn types for the assistant.

use serde::{Deserialize, Serialize};

use counsel_core::types::{CallerId, ScoredDocument};

// =============================================================================
// Flows
// =============================================================================

/// The two transactional dialogues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    MessageStaff,
    BookAppointment,
}

impl FlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::MessageStaff => "message_staff",
            FlowKind::BookAppointment => "book_appointment",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position within a flow. Serialized as 0, 1, 2.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum FlowStep {
    #[default]
    NotStarted,
    Collecting,
    Confirming,
}

impl From<FlowStep> for u8 {
    fn from(step: FlowStep) -> Self {
        match step {
            FlowStep::NotStarted => 0,
            FlowStep::Collecting => 1,
            FlowStep::Confirming => 2,
        }
    }
}

impl TryFrom<u8> for FlowStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FlowStep::NotStarted),
            1 => Ok(FlowStep::Collecting),
            2 => Ok(FlowStep::Confirming),
            other => Err(format!("invalid flow step: {}", other)),
        }
    }
}

/// Slots collected by a flow, typed per flow kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum FlowSlots {
    MessageStaff {
        message: String,
        contact: String,
    },
    BookAppointment {
        matter_type: String,
        date_time: String,
        contact: String,
    },
}

impl FlowSlots {
    pub fn kind(&self) -> FlowKind {
        match self {
            FlowSlots::MessageStaff { .. } => FlowKind::MessageStaff,
            FlowSlots::BookAppointment { .. } => FlowKind::BookAppointment,
        }
    }

    pub fn contact(&self) -> &str {
        match self {
            FlowSlots::MessageStaff { contact, .. } | FlowSlots::BookAppointment { contact, .. } => {
                contact
            }
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Per-session conversation state.
///
/// Idle is `{flow: None, step: NotStarted, slots: None}`. Slots are only
/// stored once every required slot for the flow has been collected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub flow: Option<FlowKind>,
    pub step: FlowStep,
    pub slots: Option<FlowSlots>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flow in progress, if any.
    pub fn active_flow(&self) -> Option<FlowKind> {
        match self.step {
            FlowStep::NotStarted => None,
            FlowStep::Collecting | FlowStep::Confirming => self.flow,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.flow.is_none() && self.step == FlowStep::NotStarted && self.slots.is_none()
    }

    /// Return to the idle state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Intent
// =============================================================================

/// Classified purpose of an utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BookAppointment,
    MessageStaff,
    Info,
    Ambiguous,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::BookAppointment => "book_appointment",
            Intent::MessageStaff => "message_staff",
            Intent::Info => "info",
            Intent::Ambiguous => "ambiguous",
        }
    }
}

impl From<FlowKind> for Intent {
    fn from(kind: FlowKind) -> Self {
        match kind {
            FlowKind::MessageStaff => Intent::MessageStaff,
            FlowKind::BookAppointment => Intent::BookAppointment,
        }
    }
}

// =============================================================================
// Turn request / response
// =============================================================================

/// One inbound utterance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnRequest {
    pub message: String,
    /// Absent disables flow continuity and conversation logging.
    pub session_id: Option<String>,
    /// Identity resolved upstream; present means authenticated.
    pub caller_id: Option<CallerId>,
}

impl TurnRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_caller(mut self, caller_id: CallerId) -> Self {
        self.caller_id = Some(caller_id);
        self
    }
}

/// Reply for one turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub response: String,
    pub documents: Vec<ScoredDocument>,
    /// Word count of `response`.
    pub tokens_used: u32,
    pub authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_default_is_idle() {
        let s = Session::new();
        assert!(s.is_idle());
        assert_eq!(s.active_flow(), None);
        assert_eq!(u8::from(s.step), 0);
    }

    #[test]
    fn test_session_reset() {
        let mut s = Session {
            flow: Some(FlowKind::BookAppointment),
            step: FlowStep::Confirming,
            slots: Some(FlowSlots::BookAppointment {
                matter_type: "Tax Law".into(),
                date_time: "Friday".into(),
                contact: "a@b.com".into(),
            }),
        };
        assert_eq!(s.active_flow(), Some(FlowKind::BookAppointment));
        s.reset();
        assert!(s.is_idle());
    }

    #[test]
    fn test_flow_step_serializes_as_number() {
        assert_eq!(serde_json::to_string(&FlowStep::Confirming).unwrap(), "2");
        let step: FlowStep = serde_json::from_str("1").unwrap();
        assert_eq!(step, FlowStep::Collecting);
        assert!(serde_json::from_str::<FlowStep>("7").is_err());
    }

    #[test]
    fn test_flow_slots_tagged() {
        let slots = FlowSlots::MessageStaff {
            message: "Call me".into(),
            contact: "5551234567".into(),
        };
        let json = serde_json::to_value(&slots).unwrap();
        assert_eq!(json["flow"], "message_staff");
        assert_eq!(slots.kind(), FlowKind::MessageStaff);
        assert_eq!(slots.contact(), "5551234567");
    }

    #[test]
    fn test_intent_flow_mapping() {
        assert_eq!(Intent::from(FlowKind::MessageStaff), Intent::MessageStaff);
        assert_eq!(Intent::from(FlowKind::BookAppointment), Intent::BookAppointment);
        assert_eq!(Intent::Ambiguous.as_str(), "ambiguous");
    }

    #[test]
    fn test_turn_request_builder() {
        let req = TurnRequest::new("hi")
            .with_session("s1")
            .with_caller(CallerId("u1".into()));
        assert_eq!(req.session_id.as_deref(), Some("s1"));
        assert!(req.caller_id.is_some());
    }
}
