//! Repository implementations for SQLite-backed persistence.
//!
//! Provides DocumentRepository, ConversationRepository,
//! AppointmentRepository, and StaffMessageRepository that operate on the
//! Database struct using raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use counsel_core::error::CounselError;
use counsel_core::types::{CallerId, ConversationRecord, Document};

use crate::db::Database;

/// Repository for knowledge-base documents and their fingerprints.
pub struct DocumentRepository {
    db: Arc<Database>,
}

impl DocumentRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a document with its fingerprint.
    pub fn save(&self, doc: &Document) -> Result<(), CounselError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (id, title, category, content, fingerprint)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    doc.id.to_string(),
                    doc.title,
                    doc.category,
                    doc.content,
                    encode_fingerprint(&doc.fingerprint),
                ],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to save document: {}", e)))?;
            Ok(())
        })
    }

    /// Whether a document with this title and category is already stored.
    pub fn exists(&self, title: Option<&str>, category: &str) -> Result<bool, CounselError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM documents WHERE title IS ?1 AND category = ?2",
                    rusqlite::params![title, category],
                    |row| row.get(0),
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;
            Ok(count > 0)
        })
    }

    /// Load every document, oldest first.
    pub fn list_all(&self) -> Result<Vec<Document>, CounselError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, category, content, fingerprint
                     FROM documents
                     ORDER BY created_at ASC, rowid ASC",
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| Ok(row_to_document(row)))
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let mut docs = Vec::new();
            for row in rows {
                docs.push(row.map_err(|e| CounselError::Storage(e.to_string()))??);
            }
            Ok(docs)
        })
    }

    pub fn count(&self) -> Result<u64, CounselError> {
        count_rows(&self.db, "documents")
    }
}

/// Repository for the append-only conversation log.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append one conversation record.
    pub fn save(&self, record: &ConversationRecord) -> Result<(), CounselError> {
        let cited = serde_json::to_string(&record.cited_document_ids)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, session_id, caller_id, message, response, cited_documents, cost_metric, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    record.id.to_string(),
                    record.session_id,
                    record.caller_id.as_ref().map(|c| c.0.as_str()),
                    record.message,
                    record.response,
                    cited,
                    record.cost_metric,
                    record.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to save conversation: {}", e)))?;
            Ok(())
        })
    }

    /// Records for one session in the order they were written.
    pub fn find_by_session(
        &self,
        session_id: &str,
        limit: u64,
    ) -> Result<Vec<ConversationRecord>, CounselError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, session_id, caller_id, message, response, cited_documents, cost_metric, timestamp
                     FROM conversations
                     WHERE session_id = ?1
                     ORDER BY timestamp ASC, rowid ASC
                     LIMIT ?2",
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![session_id, limit], |row| {
                    Ok(row_to_conversation(row))
                })
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let mut records = Vec::new();
            for row in rows {
                records.push(row.map_err(|e| CounselError::Storage(e.to_string()))??);
            }
            Ok(records)
        })
    }

    pub fn count(&self) -> Result<u64, CounselError> {
        count_rows(&self.db, "conversations")
    }
}

/// A consultation request left through the booking flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub id: Uuid,
    pub matter_type: String,
    pub date_time: String,
    pub contact: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Repository for consultation requests awaiting staff follow-up.
pub struct AppointmentRepository {
    db: Arc<Database>,
}

impl AppointmentRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record a pending consultation request.
    pub fn save(
        &self,
        matter_type: &str,
        date_time: &str,
        contact: &str,
    ) -> Result<AppointmentRequest, CounselError> {
        let request = AppointmentRequest {
            id: Uuid::new_v4(),
            matter_type: matter_type.to_string(),
            date_time: date_time.to_string(),
            contact: contact.to_string(),
            status: "pending".to_string(),
            timestamp: Utc::now(),
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO appointment_requests (id, matter_type, date_time, contact, status, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    request.id.to_string(),
                    request.matter_type,
                    request.date_time,
                    request.contact,
                    request.status,
                    request.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| {
                CounselError::Storage(format!("Failed to save appointment request: {}", e))
            })?;
            Ok(())
        })?;

        Ok(request)
    }

    /// Pending requests, newest first.
    pub fn list_pending(&self, limit: u64) -> Result<Vec<AppointmentRequest>, CounselError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, matter_type, date_time, contact, status, timestamp
                     FROM appointment_requests
                     WHERE status = 'pending'
                     ORDER BY timestamp DESC, rowid DESC
                     LIMIT ?1",
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![limit], |row| {
                    Ok(row_to_appointment(row))
                })
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let mut requests = Vec::new();
            for row in rows {
                requests.push(row.map_err(|e| CounselError::Storage(e.to_string()))??);
            }
            Ok(requests)
        })
    }

    pub fn count(&self) -> Result<u64, CounselError> {
        count_rows(&self.db, "appointment_requests")
    }
}

/// A message left for firm staff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaffMessage {
    pub id: Uuid,
    pub content: String,
    pub contact: String,
    pub timestamp: DateTime<Utc>,
}

/// Repository for messages left for firm staff.
pub struct StaffMessageRepository {
    db: Arc<Database>,
}

impl StaffMessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, content: &str, contact: &str) -> Result<StaffMessage, CounselError> {
        let message = StaffMessage {
            id: Uuid::new_v4(),
            content: content.to_string(),
            contact: contact.to_string(),
            timestamp: Utc::now(),
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO staff_messages (id, content, contact, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    message.id.to_string(),
                    message.content,
                    message.contact,
                    message.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| CounselError::Storage(format!("Failed to save staff message: {}", e)))?;
            Ok(())
        })?;

        Ok(message)
    }

    /// Most recent messages, newest first.
    pub fn list_recent(&self, limit: u64) -> Result<Vec<StaffMessage>, CounselError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, content, contact, timestamp
                     FROM staff_messages
                     ORDER BY timestamp DESC, rowid DESC
                     LIMIT ?1",
                )
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![limit], |row| {
                    Ok(row_to_staff_message(row))
                })
                .map_err(|e| CounselError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row.map_err(|e| CounselError::Storage(e.to_string()))??);
            }
            Ok(messages)
        })
    }

    pub fn count(&self) -> Result<u64, CounselError> {
        count_rows(&self.db, "staff_messages")
    }
}

// ============================================================================
// Helper functions for row-to-entity conversion.
// ============================================================================

/// Serialize a fingerprint as packed little-endian f32s.
pub fn encode_fingerprint(fingerprint: &[f32]) -> Vec<u8> {
    fingerprint.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Inverse of [`encode_fingerprint`].
pub fn decode_fingerprint(bytes: &[u8]) -> Result<Vec<f32>, CounselError> {
    if bytes.len() % 4 != 0 {
        return Err(CounselError::Storage(format!(
            "Fingerprint blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn count_rows(db: &Database, table: &'static str) -> Result<u64, CounselError> {
    db.with_conn(|conn| {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .map_err(|e| CounselError::Storage(e.to_string()))?;
        Ok(count as u64)
    })
}

fn parse_id(raw: &str) -> Result<Uuid, CounselError> {
    Uuid::parse_str(raw).map_err(|e| CounselError::Storage(format!("Invalid UUID: {}", e)))
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

fn row_to_document(row: &rusqlite::Row<'_>) -> Result<Document, CounselError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let title: Option<String> = row
        .get(1)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let category: String = row
        .get(2)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let content: String = row
        .get(3)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let blob: Vec<u8> = row
        .get(4)
        .map_err(|e| CounselError::Storage(e.to_string()))?;

    Ok(Document {
        id: parse_id(&id_str)?,
        title,
        category,
        content,
        fingerprint: decode_fingerprint(&blob)?,
    })
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> Result<ConversationRecord, CounselError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let session_id: String = row
        .get(1)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let caller_id: Option<String> = row
        .get(2)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let message: String = row
        .get(3)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let response: String = row
        .get(4)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let cited: String = row
        .get(5)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let cost_metric: u32 = row
        .get(6)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let timestamp: i64 = row
        .get(7)
        .map_err(|e| CounselError::Storage(e.to_string()))?;

    Ok(ConversationRecord {
        id: parse_id(&id_str)?,
        session_id,
        caller_id: caller_id.map(CallerId),
        message,
        response,
        cited_document_ids: serde_json::from_str(&cited)?,
        cost_metric,
        created_at: millis_to_datetime(timestamp),
    })
}

fn row_to_appointment(row: &rusqlite::Row<'_>) -> Result<AppointmentRequest, CounselError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let matter_type: String = row
        .get(1)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let date_time: String = row
        .get(2)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let contact: String = row
        .get(3)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let status: String = row
        .get(4)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let timestamp: i64 = row
        .get(5)
        .map_err(|e| CounselError::Storage(e.to_string()))?;

    Ok(AppointmentRequest {
        id: parse_id(&id_str)?,
        matter_type,
        date_time,
        contact,
        status,
        timestamp: millis_to_datetime(timestamp),
    })
}

fn row_to_staff_message(row: &rusqlite::Row<'_>) -> Result<StaffMessage, CounselError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let content: String = row
        .get(1)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let contact: String = row
        .get(2)
        .map_err(|e| CounselError::Storage(e.to_string()))?;
    let timestamp: i64 = row
        .get(3)
        .map_err(|e| CounselError::Storage(e.to_string()))?;

    Ok(StaffMessage {
        id: parse_id(&id_str)?,
        content,
        contact,
        timestamp: millis_to_datetime(timestamp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::types::EMBEDDING_DIM;

    fn make_db() -> Arc<Database> {
        Arc::new(Database::in_memory().unwrap())
    }

    fn make_document(title: Option<&str>, category: &str) -> Document {
        let fingerprint = (0..EMBEDDING_DIM).map(|i| i as f32 / EMBEDDING_DIM as f32).collect();
        Document::new(
            title.map(str::to_string),
            category,
            "We advise on mergers and acquisitions.",
            fingerprint,
        )
    }

    // ========================================================================
    // DocumentRepository tests
    // ========================================================================

    #[test]
    fn test_document_save_round_trips_fingerprint() {
        let repo = DocumentRepository::new(make_db());
        let doc = make_document(Some("Corporate Practice"), "practice_areas");
        repo.save(&doc).unwrap();

        let stored = repo.list_all().unwrap();
        assert_eq!(stored, vec![doc]);
    }

    #[test]
    fn test_document_list_all_and_count() {
        let repo = DocumentRepository::new(make_db());
        repo.save(&make_document(Some("A"), "faq")).unwrap();
        repo.save(&make_document(None, "faq")).unwrap();

        assert_eq!(repo.count().unwrap(), 2);
        let docs = repo.list_all().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title.as_deref(), Some("A"));
        assert!(docs[1].title.is_none());
        assert_eq!(docs[1].fingerprint.len(), EMBEDDING_DIM);
    }

    #[test]
    fn test_document_exists() {
        let repo = DocumentRepository::new(make_db());
        repo.save(&make_document(Some("Fees"), "billing")).unwrap();
        repo.save(&make_document(None, "general")).unwrap();

        assert!(repo.exists(Some("Fees"), "billing").unwrap());
        assert!(!repo.exists(Some("Fees"), "faq").unwrap());
        assert!(repo.exists(None, "general").unwrap());
        assert!(!repo.exists(None, "billing").unwrap());
    }

    #[test]
    fn test_fingerprint_codec() {
        let v = vec![0.0f32, 1.0, 0.25, -3.5];
        let bytes = encode_fingerprint(&v);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &1.0f32.to_le_bytes());
        assert_eq!(decode_fingerprint(&bytes).unwrap(), v);
    }

    #[test]
    fn test_decode_fingerprint_rejects_ragged_blob() {
        assert!(decode_fingerprint(&[0u8; 5]).is_err());
    }

    // ========================================================================
    // ConversationRepository tests
    // ========================================================================

    #[test]
    fn test_conversation_save_and_find_by_session() {
        let repo = ConversationRepository::new(make_db());
        let cited = vec![Uuid::new_v4(), Uuid::new_v4()];
        let first = ConversationRecord::new(
            "sess-1",
            Some(CallerId("user-42".into())),
            "What areas do you practice?",
            "We practice corporate law.",
            cited.clone(),
            5,
        );
        let other = ConversationRecord::new("sess-2", None, "hi", "hello", vec![], 1);
        repo.save(&first).unwrap();
        repo.save(&other).unwrap();

        let records = repo.find_by_session("sess-1", 10).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, first.id);
        assert_eq!(r.caller_id, Some(CallerId("user-42".into())));
        assert_eq!(r.cited_document_ids, cited);
        assert_eq!(r.cost_metric, 5);
        assert_eq!(r.created_at.timestamp_millis(), first.created_at.timestamp_millis());
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_conversation_session_order() {
        let repo = ConversationRepository::new(make_db());
        for i in 0..3 {
            let rec = ConversationRecord::new("s", None, format!("m{}", i), "r", vec![], 1);
            repo.save(&rec).unwrap();
        }
        let messages: Vec<_> = repo
            .find_by_session("s", 10)
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["m0", "m1", "m2"]);
    }

    // ========================================================================
    // AppointmentRepository / StaffMessageRepository tests
    // ========================================================================

    #[test]
    fn test_appointment_save_and_list() {
        let repo = AppointmentRepository::new(make_db());
        let saved = repo
            .save("Corporate Law", "Monday 2 PM", "jane@example.com")
            .unwrap();
        assert_eq!(saved.status, "pending");

        let pending = repo.list_pending(10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, saved.id);
        assert_eq!(pending[0].matter_type, "Corporate Law");
        assert_eq!(pending[0].date_time, "Monday 2 PM");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_staff_message_save_and_list() {
        let repo = StaffMessageRepository::new(make_db());
        repo.save("Please call me back", "555-123-4567").unwrap();
        repo.save("Second note", "jo@example.com").unwrap();

        let recent = repo.list_recent(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "Second note");
        assert_eq!(repo.count().unwrap(), 2);
    }
}
