//! Transactional flow engine.
//!
//! Drives the message-staff and book-appointment dialogues through
//! `NotStarted -> Collecting -> Confirming -> NotStarted`. The engine only
//! mutates the session it is handed and calls the terminal submission
//! collaborator; persistence of the session and logging belong to the
//! orchestrator.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::collaborators::{AppointmentSubmitter, StaffMessageSubmitter};
use crate::error::SubmissionError;
use crate::extract;
use crate::response::{MissingSlot, ResponseSynthesizer};
use crate::types::{FlowKind, FlowSlots, FlowStep, Session};

static AFFIRMATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:yes|confirm|send)\b").expect("Invalid affirmation regex")
});

/// Whether `utterance` accepts a confirmation prompt.
pub fn affirms(utterance: &str) -> bool {
    AFFIRMATION.is_match(utterance)
}

/// Extract every slot `kind` requires from `utterance`.
///
/// Returns the slots only when all are present, otherwise the missing ones.
pub fn collect_slots(kind: FlowKind, utterance: &str) -> Result<FlowSlots, Vec<MissingSlot>> {
    let contact = extract::extract_contact(utterance);
    let remainder = extract::without_contact(utterance, contact.as_deref());

    match kind {
        FlowKind::MessageStaff => {
            let message = extract::extract_message(utterance, contact.as_deref());
            match (message, contact) {
                (Some(message), Some(contact)) => Ok(FlowSlots::MessageStaff { message, contact }),
                (message, contact) => Err(missing(&[
                    (message.is_none(), MissingSlot::Message),
                    (contact.is_none(), MissingSlot::Contact),
                ])),
            }
        }
        FlowKind::BookAppointment => {
            let matter_type = extract::infer_matter_type(&remainder);
            let date_time = extract::extract_date_time(&remainder);
            match (date_time, contact) {
                (Some(date_time), Some(contact)) => Ok(FlowSlots::BookAppointment {
                    matter_type,
                    date_time,
                    contact,
                }),
                (date_time, contact) => Err(missing(&[
                    (date_time.is_none(), MissingSlot::DateTime),
                    (contact.is_none(), MissingSlot::Contact),
                ])),
            }
        }
    }
}

fn missing(checks: &[(bool, MissingSlot)]) -> Vec<MissingSlot> {
    checks
        .iter()
        .filter(|(absent, _)| *absent)
        .map(|(_, slot)| *slot)
        .collect()
}

/// Runs one turn of a transactional flow.
pub struct FlowEngine {
    staff_messages: Arc<dyn StaffMessageSubmitter>,
    appointments: Arc<dyn AppointmentSubmitter>,
    synthesizer: ResponseSynthesizer,
}

impl FlowEngine {
    pub fn new(
        staff_messages: Arc<dyn StaffMessageSubmitter>,
        appointments: Arc<dyn AppointmentSubmitter>,
        synthesizer: ResponseSynthesizer,
    ) -> Self {
        Self {
            staff_messages,
            appointments,
            synthesizer,
        }
    }

    /// Advance `session` by one utterance and return the reply.
    ///
    /// `kind` only matters when the session is idle; an active flow always
    /// keeps its own kind.
    pub async fn advance(&self, kind: FlowKind, session: &mut Session, utterance: &str) -> String {
        let kind = session.active_flow().unwrap_or(kind);

        match session.step {
            FlowStep::NotStarted => {
                session.flow = Some(kind);
                session.step = FlowStep::Collecting;
                session.slots = None;
                self.synthesizer.enter_prompt(kind)
            }
            FlowStep::Collecting => match collect_slots(kind, utterance) {
                Ok(slots) => {
                    let reply = self.synthesizer.confirmation(&slots);
                    session.slots = Some(slots);
                    session.step = FlowStep::Confirming;
                    reply
                }
                Err(missing) => self.synthesizer.clarification(kind, &missing),
            },
            FlowStep::Confirming => {
                let slots = match session.slots.take() {
                    Some(slots) if affirms(utterance) => slots,
                    _ => {
                        session.step = FlowStep::Collecting;
                        return self.synthesizer.restart_prompt(kind);
                    }
                };

                let reply = match self.submit(&slots).await {
                    Ok(()) => {
                        info!(flow = %kind, "Flow completed");
                        self.synthesizer.submission_success(&slots)
                    }
                    Err(e) => {
                        warn!(flow = %kind, error = %e, "Flow submission failed");
                        self.synthesizer.submission_failure(kind)
                    }
                };
                session.reset();
                reply
            }
        }
    }

    async fn submit(&self, slots: &FlowSlots) -> Result<(), SubmissionError> {
        match slots {
            FlowSlots::MessageStaff { message, contact } => {
                self.staff_messages.send(message, contact).await
            }
            FlowSlots::BookAppointment {
                matter_type,
                date_time,
                contact,
            } => {
                self.appointments
                    .submit(matter_type, date_time, contact)
                    .await
            }
        }
    }
}
