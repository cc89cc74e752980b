//! Counsel Storage crate - SQLite persistence for the assistant.
//!
//! Provides a WAL-mode SQLite database with migrations and repositories
//! for knowledge-base documents, the conversation log, appointment
//! requests, and staff messages.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::{Database, DATABASE_FILE};
pub use repository::{
    AppointmentRepository, AppointmentRequest, ConversationRepository, DocumentRepository,
    StaffMessage, StaffMessageRepository,
};
