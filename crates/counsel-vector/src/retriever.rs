//! Document retrieval in front of a vector store.
//!
//! `DocumentRetriever` delegates similarity search to a [`VectorStore`] and
//! fails soft: if the store errors, the turn proceeds with no documents.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use counsel_core::error::CounselError;
use counsel_core::types::{QueryVector, ScoredDocument};

/// External similarity-search collaborator.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return documents with similarity >= `threshold`, best first, at most `k`.
    async fn search(
        &self,
        query: &QueryVector,
        threshold: f32,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, CounselError>;
}

/// Fail-soft retriever over a shared vector store.
pub struct DocumentRetriever {
    store: Arc<dyn VectorStore>,
    threshold: f32,
    limit: usize,
}

impl DocumentRetriever {
    pub fn new(store: Arc<dyn VectorStore>, threshold: f32, limit: usize) -> Self {
        Self {
            store,
            threshold,
            limit,
        }
    }

    /// Look up documents for `query`.
    ///
    /// The threshold, ordering, and limit are re-applied to whatever the
    /// store returns. Store errors are logged and yield an empty list.
    pub async fn retrieve(&self, query: &QueryVector) -> Vec<ScoredDocument> {
        match self.store.search(query, self.threshold, self.limit).await {
            Ok(mut docs) => {
                docs.retain(|d| d.similarity >= self.threshold);
                docs.sort_by(|a, b| {
                    b.similarity
                        .partial_cmp(&a.similarity)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                docs.truncate(self.limit);
                debug!(count = docs.len(), "Documents retrieved");
                docs
            }
            Err(e) => {
                warn!(error = %e, "Document retrieval failed; continuing without documents");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_core::types::{Document, EMBEDDING_DIM};

    /// Store that returns a fixed list regardless of the query.
    struct FixedStore(Vec<ScoredDocument>);

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn search(
            &self,
            _query: &QueryVector,
            _threshold: f32,
            _k: usize,
        ) -> Result<Vec<ScoredDocument>, CounselError> {
            Ok(self.0.clone())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl VectorStore for FailingStore {
        async fn search(
            &self,
            _query: &QueryVector,
            _threshold: f32,
            _k: usize,
        ) -> Result<Vec<ScoredDocument>, CounselError> {
            Err(CounselError::Retrieval("connection refused".to_string()))
        }
    }

    fn scored(title: &str, similarity: f32) -> ScoredDocument {
        ScoredDocument {
            document: Document::new(Some(title.to_string()), "test", "content", vec![]),
            similarity,
        }
    }

    fn query() -> QueryVector {
        QueryVector::new(vec![0.5; EMBEDDING_DIM]).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_filters_sorts_and_limits() {
        let store = FixedStore(vec![
            scored("low", 0.05),
            scored("mid", 0.2),
            scored("high", 0.4),
            scored("mid2", 0.3),
        ]);
        let retriever = DocumentRetriever::new(Arc::new(store), 0.1, 2);
        let docs = retriever.retrieve(&query()).await;
        let titles: Vec<_> = docs
            .iter()
            .map(|d| d.document.title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["high", "mid2"]);
    }

    #[tokio::test]
    async fn test_retrieve_fails_soft() {
        let retriever = DocumentRetriever::new(Arc::new(FailingStore), 0.1, 5);
        assert!(retriever.retrieve(&query()).await.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_empty_store() {
        let retriever = DocumentRetriever::new(Arc::new(FixedStore(vec![])), 0.1, 5);
        assert!(retriever.retrieve(&query()).await.is_empty());
    }
}
