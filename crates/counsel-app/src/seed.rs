//! Knowledge-base seeding from a TOML file.
//!
//! ```toml
//! [[documents]]
//! title = "Practice Areas"
//! category = "practice_areas"
//! content = "We advise on corporate, employment, and tax matters."
//! ```
//!
//! Each document is fingerprinted before it is stored. Documents already
//! present with the same title and category are skipped, so seeding the
//! same file twice is harmless.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use counsel_core::error::CounselError;
use counsel_core::types::Document;
use counsel_storage::DocumentRepository;
use counsel_vector::PseudoEmbedding;

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    documents: Vec<SeedDocument>,
}

/// One `[[documents]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub title: Option<String>,
    pub category: String,
    pub content: String,
}

/// Parse a seed file.
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedDocument>, CounselError> {
    let content = std::fs::read_to_string(path)?;
    let file: SeedFile = toml::from_str(&content)?;
    Ok(file.documents)
}

/// Fingerprint and store `documents`, returning how many were new.
pub fn seed_documents(
    repo: &DocumentRepository,
    embedder: &PseudoEmbedding,
    documents: Vec<SeedDocument>,
) -> Result<usize, CounselError> {
    let mut inserted = 0;
    for entry in documents {
        if repo.exists(entry.title.as_deref(), &entry.category)? {
            debug!(title = ?entry.title, category = %entry.category, "Seed document already present");
            continue;
        }
        let mut doc = Document::new(entry.title, entry.category, entry.content, Vec::new());
        doc.fingerprint = embedder.generate(&doc.fingerprint_text());
        repo.save(&doc)?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Import a seed file into the document repository.
pub fn seed_from_file(repo: &DocumentRepository, path: &Path) -> Result<usize, CounselError> {
    let documents = load_seed_file(path)?;
    let total = documents.len();
    let inserted = seed_documents(repo, &PseudoEmbedding::new(), documents)?;
    info!(
        path = %path.display(),
        total,
        inserted,
        "Knowledge base seeded"
    );
    Ok(inserted)
}
