use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CounselError;

/// Dimensionality of every query vector and document fingerprint.
pub const EMBEDDING_DIM: usize = 1536;

// =============================================================================
// Vectors
// =============================================================================

/// Fixed-length vector derived from an utterance. Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryVector(Vec<f32>);

impl QueryVector {
    /// Wrap raw components, rejecting anything that is not `EMBEDDING_DIM` long.
    pub fn new(components: Vec<f32>) -> Result<Self, CounselError> {
        if components.len() != EMBEDDING_DIM {
            return Err(CounselError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: components.len(),
            });
        }
        Ok(Self(components))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<[f32; EMBEDDING_DIM]> for QueryVector {
    fn from(components: [f32; EMBEDDING_DIM]) -> Self {
        Self(components.to_vec())
    }
}

// =============================================================================
// Knowledge base
// =============================================================================

/// A retrievable knowledge snippet with its precomputed fingerprint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Citation title. Documents without one are quoted without a citation.
    pub title: Option<String>,
    pub category: String,
    pub content: String,
    /// Precomputed pseudo-embedding of the document text.
    #[serde(skip_serializing, default)]
    pub fingerprint: Vec<f32>,
}

impl Document {
    /// Create a document with a fresh id.
    pub fn new(
        title: Option<String>,
        category: impl Into<String>,
        content: impl Into<String>,
        fingerprint: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            category: category.into(),
            content: content.into(),
            fingerprint,
        }
    }

    /// Text fed to the embedding generator when fingerprinting this document.
    pub fn fingerprint_text(&self) -> String {
        match self.title {
            Some(ref title) => format!("{} {} {}", title, self.category, self.content),
            None => format!("{} {}", self.category, self.content),
        }
    }
}

/// A document returned by similarity search, with its score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    #[serde(flatten)]
    pub document: Document,
    /// Cosine similarity against the query vector.
    pub similarity: f32,
}

// =============================================================================
// Conversation log
// =============================================================================

/// Opaque identity of an authenticated caller, as resolved upstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(pub String);

impl std::fmt::Display for CallerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only log entry for one turn of an authenticated conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: Uuid,
    pub session_id: String,
    pub caller_id: Option<CallerId>,
    pub message: String,
    pub response: String,
    pub cited_document_ids: Vec<Uuid>,
    /// Word count of the response.
    pub cost_metric: u32,
    pub created_at: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(
        session_id: impl Into<String>,
        caller_id: Option<CallerId>,
        message: impl Into<String>,
        response: impl Into<String>,
        cited_document_ids: Vec<Uuid>,
        cost_metric: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            caller_id,
            message: message.into(),
            response: response.into(),
            cited_document_ids,
            cost_metric,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_vector_accepts_exact_dimension() {
        let v = QueryVector::new(vec![0.5; EMBEDDING_DIM]).unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_query_vector_rejects_wrong_dimension() {
        let err = QueryVector::new(vec![0.0; 384]).unwrap_err();
        assert!(matches!(
            err,
            CounselError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: 384
            }
        ));
    }

    #[test]
    fn test_document_fingerprint_text() {
        let doc = Document::new(
            Some("Practice Areas".to_string()),
            "services",
            "We handle litigation.",
            vec![],
        );
        assert_eq!(
            doc.fingerprint_text(),
            "Practice Areas services We handle litigation."
        );

        let untitled = Document::new(None, "faq", "Office hours are 9-5.", vec![]);
        assert_eq!(untitled.fingerprint_text(), "faq Office hours are 9-5.");
    }

    #[test]
    fn test_document_serialization_omits_fingerprint() {
        let doc = Document::new(None, "faq", "text", vec![0.1; 4]);
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("fingerprint").is_none());
        assert_eq!(json["category"], "faq");
    }

    #[test]
    fn test_scored_document_flattens() {
        let scored = ScoredDocument {
            document: Document::new(Some("Team".to_string()), "about", "Our team.", vec![]),
            similarity: 0.4,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["title"], "Team");
        assert!((json["similarity"].as_f64().unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_caller_id_serializes_transparently() {
        let id = CallerId("user-42".to_string());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-42\"");
        assert_eq!(id.to_string(), "user-42");
    }

    #[test]
    fn test_conversation_record_new() {
        let rec = ConversationRecord::new("s1", None, "hi", "hello there", vec![], 2);
        assert_eq!(rec.session_id, "s1");
        assert_eq!(rec.cost_metric, 2);
        assert!(rec.caller_id.is_none());
    }
}
