//! External collaborators consumed by the assistant.
//!
//! Each trait has a SQLite-backed implementation over the matching
//! repository in `counsel-storage`.

use async_trait::async_trait;
use tracing::info;

use counsel_core::types::ConversationRecord;
use counsel_storage::{AppointmentRepository, ConversationRepository, StaffMessageRepository};

use crate::error::{ChatError, SubmissionError};

/// Delivers a message to firm staff.
#[async_trait]
pub trait StaffMessageSubmitter: Send + Sync {
    async fn send(&self, content: &str, contact: &str) -> Result<(), SubmissionError>;
}

/// Books a consultation request.
#[async_trait]
pub trait AppointmentSubmitter: Send + Sync {
    async fn submit(
        &self,
        matter_type: &str,
        date_time: &str,
        contact: &str,
    ) -> Result<(), SubmissionError>;
}

/// Append-only conversation log. Best effort.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn append(&self, record: ConversationRecord) -> Result<(), ChatError>;
}

#[async_trait]
impl StaffMessageSubmitter for StaffMessageRepository {
    async fn send(&self, content: &str, contact: &str) -> Result<(), SubmissionError> {
        let saved = self.save(content, contact)?;
        info!(message_id = %saved.id, "Staff message recorded");
        Ok(())
    }
}

#[async_trait]
impl AppointmentSubmitter for AppointmentRepository {
    async fn submit(
        &self,
        matter_type: &str,
        date_time: &str,
        contact: &str,
    ) -> Result<(), SubmissionError> {
        let saved = self.save(matter_type, date_time, contact)?;
        info!(request_id = %saved.id, matter_type = %matter_type, "Appointment request recorded");
        Ok(())
    }
}

#[async_trait]
impl ConversationLog for ConversationRepository {
    async fn append(&self, record: ConversationRecord) -> Result<(), ChatError> {
        self.save(&record).map_err(|e| ChatError::Log(e.to_string()))
    }
}
