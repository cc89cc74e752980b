//! Counsel Vector crate - pseudo-embedding, document index, and retrieval.
//!
//! Provides the deterministic text-to-vector generator used for both
//! document fingerprints and query vectors, an in-memory cosine-similarity
//! document index, and the fail-soft retriever that sits in front of any
//! [`VectorStore`].

pub mod embedding;
pub mod index;
pub mod retriever;

pub use embedding::{EmbeddingService, PseudoEmbedding};
pub use index::DocumentIndex;
pub use retriever::{DocumentRetriever, VectorStore};
