//! Chat orchestrator: central coordinator for one conversational turn.
//!
//! Validates the utterance, loads the session, routes by intent to either
//! retrieval and synthesis or the flow engine, saves the session, and
//! finally writes the best-effort conversation log.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use counsel_core::config::ChatConfig;
use counsel_core::types::{ConversationRecord, ScoredDocument};
use counsel_vector::{DocumentRetriever, EmbeddingService, PseudoEmbedding, VectorStore};

use crate::collaborators::{AppointmentSubmitter, ConversationLog, StaffMessageSubmitter};
use crate::error::ChatError;
use crate::flow::FlowEngine;
use crate::intent::IntentClassifier;
use crate::response::{word_count, ResponseSynthesizer};
use crate::session::SessionRepository;
use crate::types::{FlowKind, Intent, Session, TurnRequest, TurnResponse};

/// External services the orchestrator is wired to.
pub struct Collaborators {
    pub vector_store: Arc<dyn VectorStore>,
    pub sessions: Arc<dyn SessionRepository>,
    pub staff_messages: Arc<dyn StaffMessageSubmitter>,
    pub appointments: Arc<dyn AppointmentSubmitter>,
    pub conversation_log: Arc<dyn ConversationLog>,
}

/// Sequences classification, retrieval or flow handling, and synthesis.
pub struct ChatOrchestrator {
    config: ChatConfig,
    classifier: IntentClassifier,
    embedder: Arc<dyn EmbeddingService>,
    retriever: DocumentRetriever,
    flows: FlowEngine,
    synthesizer: ResponseSynthesizer,
    sessions: Arc<dyn SessionRepository>,
    conversation_log: Arc<dyn ConversationLog>,
}

impl ChatOrchestrator {
    pub fn new(config: ChatConfig, collaborators: Collaborators) -> Self {
        let synthesizer = ResponseSynthesizer::new(config.snippet_chars);
        let retriever = DocumentRetriever::new(
            collaborators.vector_store,
            config.similarity_threshold,
            config.max_documents,
        );
        let flows = FlowEngine::new(
            collaborators.staff_messages,
            collaborators.appointments,
            synthesizer.clone(),
        );

        Self {
            config,
            classifier: IntentClassifier::new(),
            embedder: Arc::new(PseudoEmbedding::new()),
            retriever,
            flows,
            synthesizer,
            sessions: collaborators.sessions,
            conversation_log: collaborators.conversation_log,
        }
    }

    /// Handle one inbound utterance.
    ///
    /// Only validation (and a disabled chat) produce errors; every
    /// collaborator failure degrades to a textual response.
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse, ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }

        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let session_id = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let mut session = match session_id {
            Some(id) => self.load_session(id).await,
            None => Session::new(),
        };

        let intent = self.classifier.classify(message, &session);
        debug!(intent = intent.as_str(), "Turn classified");

        let (response, documents) = match intent {
            Intent::BookAppointment => {
                let reply = self
                    .flows
                    .advance(FlowKind::BookAppointment, &mut session, message)
                    .await;
                (reply, Vec::new())
            }
            Intent::MessageStaff => {
                let reply = self
                    .flows
                    .advance(FlowKind::MessageStaff, &mut session, message)
                    .await;
                (reply, Vec::new())
            }
            Intent::Info => {
                let query = self.embedder.embed(message);
                let documents = self.retriever.retrieve(&query).await;
                (self.synthesizer.info(&documents), documents)
            }
            Intent::Ambiguous => (self.synthesizer.ambiguous(), Vec::new()),
        };

        if let Some(id) = session_id {
            if let Err(e) = self.sessions.put(id, session).await {
                warn!(session_id = %id, error = %e, "Failed to save session");
            }
        }

        let tokens_used = word_count(&response);

        if let (Some(id), Some(caller)) = (session_id, request.caller_id.as_ref()) {
            let record = ConversationRecord::new(
                id,
                Some(caller.clone()),
                message,
                response.as_str(),
                cited_ids(&documents),
                tokens_used,
            );
            if let Err(e) = self.conversation_log.append(record).await {
                warn!(session_id = %id, error = %e, "Failed to log conversation");
            }
        }

        Ok(TurnResponse {
            response,
            documents,
            tokens_used,
            authenticated: request.caller_id.is_some(),
        })
    }

    /// Number of live sessions in the session store.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    async fn load_session(&self, id: &str) -> Session {
        match self.sessions.get(id).await {
            Ok(session) => session,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Session store unavailable; using a fresh session");
                Session::new()
            }
        }
    }
}

fn cited_ids(documents: &[ScoredDocument]) -> Vec<Uuid> {
    documents.iter().map(|d| d.document.id).collect()
}
