//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use counsel_chat::{ChatOrchestrator, Collaborators, InMemorySessionStore};
use counsel_core::config::CounselConfig;
use counsel_storage::{
    AppointmentRepository, ConversationRepository, Database, StaffMessageRepository,
};
use counsel_vector::DocumentIndex;

use crate::auth::{IdentityResolver, StaticTokenResolver};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CounselConfig>,
    pub orchestrator: Arc<ChatOrchestrator>,
    pub identity: Arc<dyn IdentityResolver>,
    /// Knowledge base searched by the orchestrator.
    pub index: DocumentIndex,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: CounselConfig,
        orchestrator: ChatOrchestrator,
        identity: Arc<dyn IdentityResolver>,
        index: DocumentIndex,
    ) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            identity,
            index,
            start_time: Instant::now(),
        }
    }

    /// Wire the orchestrator to SQLite-backed collaborators, an in-memory
    /// session store, and the given document index.
    pub fn with_database(
        config: CounselConfig,
        database: Arc<Database>,
        index: DocumentIndex,
    ) -> Self {
        let collaborators = Collaborators {
            vector_store: Arc::new(index.clone()),
            sessions: Arc::new(InMemorySessionStore::from_config(&config.sessions)),
            staff_messages: Arc::new(StaffMessageRepository::new(Arc::clone(&database))),
            appointments: Arc::new(AppointmentRepository::new(Arc::clone(&database))),
            conversation_log: Arc::new(ConversationRepository::new(database)),
        };
        let orchestrator = ChatOrchestrator::new(config.chat.clone(), collaborators);
        let identity = Arc::new(StaticTokenResolver::from_config(&config.auth));
        Self::new(config, orchestrator, identity, index)
    }
}
