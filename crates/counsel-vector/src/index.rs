//! In-memory document index with brute-force cosine similarity search.
//!
//! Holds the knowledge base with its precomputed fingerprints. Search is
//! O(n), which is fine for a firm-sized knowledge base; a hosted vector
//! store can replace it behind the [`VectorStore`] trait.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use counsel_core::error::CounselError;
use counsel_core::types::{Document, QueryVector, ScoredDocument, EMBEDDING_DIM};

use crate::retriever::VectorStore;

/// Thread-safe in-memory document index.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    entries: Arc<RwLock<HashMap<Uuid, Document>>>,
}

impl DocumentIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, overwriting any existing entry with the same id.
    ///
    /// The fingerprint must have exactly `EMBEDDING_DIM` components.
    pub fn insert(&self, document: Document) -> Result<(), CounselError> {
        if document.fingerprint.len() != EMBEDDING_DIM {
            return Err(CounselError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: document.fingerprint.len(),
            });
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CounselError::Storage(format!("Lock poisoned: {}", e)))?;
        entries.insert(document.id, document);
        Ok(())
    }

    /// Insert many documents, returning how many were accepted.
    ///
    /// Documents with malformed fingerprints are skipped with a warning.
    pub fn load(&self, documents: Vec<Document>) -> usize {
        let mut loaded = 0;
        for doc in documents {
            let id = doc.id;
            match self.insert(doc) {
                Ok(()) => loaded += 1,
                Err(e) => tracing::warn!(document_id = %id, error = %e, "Skipping document"),
            }
        }
        loaded
    }

    /// Return documents whose similarity to `query` is at least `threshold`,
    /// best first, at most `k` of them.
    pub fn search(
        &self,
        query: &[f32],
        threshold: f32,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, CounselError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| CounselError::Storage(format!("Lock poisoned: {}", e)))?;

        let mut scored: Vec<ScoredDocument> = entries
            .values()
            .filter_map(|doc| {
                let similarity = cosine_similarity(query, &doc.fingerprint) as f32;
                (similarity >= threshold).then(|| ScoredDocument {
                    document: doc.clone(),
                    similarity,
                })
            })
            .collect();

        // Ties broken by id so results do not depend on map order.
        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        scored.truncate(k);

        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for DocumentIndex {
    async fn search(
        &self,
        query: &QueryVector,
        threshold: f32,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, CounselError> {
        DocumentIndex::search(self, query.as_slice(), threshold, k)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
