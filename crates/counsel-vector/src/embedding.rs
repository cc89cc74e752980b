//! Deterministic pseudo-embedding of text.
//!
//! `PseudoEmbedding` maps text to a fixed 1536-dimensional vector with every
//! component in `[0, 1]`. It is not a learned model: tokens are hashed and
//! scattered across the vector, weighted by a fixed table of legal-domain
//! terms. Identical input always yields an identical vector, which is what
//! document fingerprints and query vectors rely on to be comparable.

use std::collections::HashMap;
use std::sync::LazyLock;

use counsel_core::types::{QueryVector, EMBEDDING_DIM};

/// Characters of input considered; the rest is ignored.
pub const MAX_INPUT_CHARS: usize = 8000;

/// Tokens considered per input.
pub const MAX_TOKENS: usize = 800;

/// Weight for tokens missing from the term table.
const DEFAULT_WEIGHT: f64 = 0.1;

/// Fixed contribution at `(index * 7) mod D` for each token.
const POSITION_SIGNAL: f64 = 0.1;

/// Fixed contribution at `(token_len * 13) mod D` for each token.
const LENGTH_SIGNAL: f64 = 0.05;

/// Amplitude of the sinusoidal noise floor added after normalization.
const NOISE_AMPLITUDE: f64 = 0.05;

/// Legal-domain vocabulary and its weight in (0, 1].
static TERM_WEIGHTS: &[(&str, f64)] = &[
    // Core legal vocabulary
    ("law", 0.9),
    ("legal", 0.9),
    ("lawyer", 0.9),
    ("lawyers", 0.9),
    ("attorney", 0.9),
    ("attorneys", 0.9),
    ("counsel", 0.8),
    ("firm", 0.7),
    ("client", 0.6),
    ("clients", 0.6),
    ("case", 0.7),
    ("cases", 0.7),
    ("matter", 0.6),
    ("advice", 0.6),
    ("consultation", 0.8),
    ("appointment", 0.7),
    ("schedule", 0.5),
    // Litigation
    ("litigation", 1.0),
    ("lawsuit", 0.9),
    ("court", 0.8),
    ("trial", 0.8),
    ("appeal", 0.8),
    ("dispute", 0.8),
    ("settlement", 0.8),
    ("arbitration", 0.9),
    ("mediation", 0.9),
    ("damages", 0.7),
    ("claim", 0.6),
    ("claims", 0.6),
    ("negligence", 0.8),
    ("liability", 0.8),
    // Corporate
    ("corporate", 1.0),
    ("business", 0.7),
    ("company", 0.6),
    ("merger", 0.9),
    ("acquisition", 0.9),
    ("contract", 0.8),
    ("contracts", 0.8),
    ("agreement", 0.7),
    ("compliance", 0.8),
    ("regulatory", 0.8),
    ("governance", 0.8),
    ("securities", 0.9),
    ("startup", 0.6),
    // Employment
    ("employment", 1.0),
    ("employee", 0.8),
    ("employees", 0.8),
    ("employer", 0.8),
    ("workplace", 0.8),
    ("discrimination", 0.9),
    ("harassment", 0.9),
    ("termination", 0.8),
    ("wrongful", 0.8),
    ("wage", 0.7),
    // Intellectual property
    ("intellectual", 1.0),
    ("patent", 0.9),
    ("patents", 0.9),
    ("trademark", 0.9),
    ("copyright", 0.9),
    ("licensing", 0.8),
    ("infringement", 0.9),
    // Real estate
    ("real", 0.5),
    ("estate", 0.8),
    ("property", 0.8),
    ("lease", 0.8),
    ("landlord", 0.8),
    ("tenant", 0.8),
    ("zoning", 0.9),
    // Tax
    ("tax", 1.0),
    ("taxes", 1.0),
    ("taxation", 1.0),
    ("irs", 0.9),
    ("audit", 0.8),
    // Environmental
    ("environmental", 1.0),
    ("pollution", 0.9),
    ("emissions", 0.9),
    ("permit", 0.7),
    ("epa", 0.9),
    // Firm information
    ("practice", 0.7),
    ("service", 0.6),
    ("services", 0.6),
    ("area", 0.4),
    ("areas", 0.4),
    ("team", 0.6),
    ("partner", 0.6),
    ("partners", 0.6),
    ("experience", 0.6),
    ("policy", 0.6),
    ("privacy", 0.7),
    ("confidential", 0.7),
    ("fee", 0.7),
    ("fees", 0.7),
    ("retainer", 0.8),
    ("billing", 0.7),
    ("office", 0.5),
    ("hours", 0.4),
    ("location", 0.5),
];

static WEIGHT_TABLE: LazyLock<HashMap<&'static str, f64>> =
    LazyLock::new(|| TERM_WEIGHTS.iter().copied().collect());

/// Service for turning text into vectors.
///
/// Kept as a trait so the retrieval path does not depend on the concrete
/// generator.
pub trait EmbeddingService: Send + Sync {
    /// Produce the vector for `text`. Never fails.
    fn embed(&self, text: &str) -> QueryVector;

    /// Return the dimensionality of vectors produced by this service.
    fn dimensions(&self) -> usize;
}

/// Deterministic hash-and-scatter text embedding.
#[derive(Debug, Clone, Copy, Default)]
pub struct PseudoEmbedding;

impl PseudoEmbedding {
    pub fn new() -> Self {
        Self
    }

    /// Compute the components for `text` as a plain vector.
    pub fn generate(&self, text: &str) -> Vec<f32> {
        self.components(text).to_vec()
    }

    fn components(&self, text: &str) -> [f32; EMBEDDING_DIM] {
        let mut acc = vec![0.0f64; EMBEDDING_DIM];
        let dim = EMBEDDING_DIM as u64;

        for (i, token) in tokenize(text).iter().enumerate() {
            let weight = term_weight(token);
            let hash = u64::from(rolling_hash(token));
            let spread = (weight * 10.0).ceil() as u64;

            for k in 0..spread {
                let pos = ((hash + k * 31) % dim) as usize;
                acc[pos] += weight * (1.0 - k as f64 * 0.1);
            }

            acc[(i * 7) % EMBEDDING_DIM] += POSITION_SIGNAL;
            acc[(token.chars().count() * 13) % EMBEDDING_DIM] += LENGTH_SIGNAL;
        }

        let max = acc.iter().copied().fold(0.0f64, f64::max);
        if max > 0.0 {
            for v in &mut acc {
                *v /= max;
            }
        }

        let mut out = [0.0f32; EMBEDDING_DIM];
        for (pos, v) in acc.iter().enumerate() {
            out[pos] = (v + noise(pos)).min(1.0) as f32;
        }
        out
    }
}

impl EmbeddingService for PseudoEmbedding {
    fn embed(&self, text: &str) -> QueryVector {
        QueryVector::from(self.components(text))
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Lowercase, strip punctuation, split on whitespace, drop tokens of two
/// characters or fewer, and cap the token count.
pub fn tokenize(text: &str) -> Vec<String> {
    let truncated: String = text.chars().take(MAX_INPUT_CHARS).collect();
    let cleaned: String = truncated
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .take(MAX_TOKENS)
        .map(str::to_string)
        .collect()
}

/// Weight of a (lowercased) token; unknown tokens get the default.
pub fn term_weight(token: &str) -> f64 {
    WEIGHT_TABLE.get(token).copied().unwrap_or(DEFAULT_WEIGHT)
}

/// 32-bit `hash * 31 + code` rolling hash with wrap-around.
pub fn rolling_hash(token: &str) -> u32 {
    token
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

fn noise(pos: usize) -> f64 {
    ((pos as f64 * 0.1).sin() + 1.0) * NOISE_AMPLITUDE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed(text: &str) -> Vec<f32> {
        PseudoEmbedding::new().generate(text)
    }

    #[test]
    fn test_dimension_is_fixed() {
        assert_eq!(embed("litigation services").len(), EMBEDDING_DIM);
        assert_eq!(embed("").len(), EMBEDDING_DIM);
        assert_eq!(embed(&"word ".repeat(5000)).len(), EMBEDDING_DIM);
    }

    #[test]
    fn test_components_in_unit_range() {
        for text in [
            "What practice areas does your firm cover?",
            "",
            "tax tax tax tax tax tax",
            "!!!???",
        ] {
            for (i, v) in embed(text).iter().enumerate() {
                assert!((0.0..=1.0).contains(v), "component {} = {} for {:?}", i, v, text);
            }
        }
    }

    #[test]
    fn test_generated_inputs_stay_in_unit_range() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let fragments: Vec<String> = vec![
            "litigation".to_string(),
            "Tax TAX taxes".to_string(),
            "corporate merger acquisition securities".to_string(),
            "litigation ".repeat(120),
            "z".repeat(300),
            "supercalifragilisticexpialidocious".to_string(),
            "abcdefghijklmnopqrstuvwxyz0123456789".repeat(4),
            "2025-03-14 10:30, (555) 123-4567!".to_string(),
            "Étude juridique à Genève".to_string(),
            "法律事务所 咨询".to_string(),
            "Ωμέγα δίκη 😀🎉".to_string(),
            "word ".repeat(1200),
            "a an of to".to_string(),
            "   \t\n  ".to_string(),
            "?!.,;:".to_string(),
        ];

        let mut rng = StdRng::seed_from_u64(0x00c0_05e1);
        for _ in 0..300 {
            let count = rng.random_range(1..=12);
            let text = (0..count)
                .map(|_| fragments[rng.random_range(0..fragments.len())].as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let v = embed(&text);
            assert_eq!(v.len(), EMBEDDING_DIM);
            for (i, c) in v.iter().enumerate() {
                assert!(
                    (0.0..=1.0).contains(c),
                    "component {} = {} for input of {} chars",
                    i,
                    c,
                    text.chars().count()
                );
            }
            assert_eq!(v, embed(&text));
        }
    }

    #[test]
    fn test_deterministic() {
        let a = embed("Do you handle employment discrimination cases?");
        let b = embed("Do you handle employment discrimination cases?");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(embed("corporate mergers"), embed("environmental permits"));
    }

    #[test]
    fn test_empty_input_is_pure_noise() {
        let v = embed("");
        for (pos, c) in v.iter().enumerate() {
            assert_eq!(*c, noise(pos) as f32);
        }
    }

    #[test]
    fn test_short_tokens_only_is_pure_noise() {
        assert_eq!(embed("a an to of"), embed(""));
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(embed("Litigation, Appeals!"), embed("litigation appeals"));
    }

    #[test]
    fn test_input_truncated_to_max_chars() {
        let head = "abc ".repeat(MAX_INPUT_CHARS / 4);
        let long = format!("{}zebra crossing", head);
        assert_eq!(embed(&long), embed(&head));
    }

    #[test]
    fn test_tokenize_rules() {
        let tokens = tokenize("The IRS audit, in 2024: is it OK?");
        assert_eq!(tokens, vec!["the", "irs", "audit", "2024"]);
    }

    #[test]
    fn test_tokenize_caps_token_count() {
        let text = "token ".repeat(MAX_TOKENS + 100);
        assert_eq!(tokenize(&text).len(), MAX_TOKENS);
    }

    #[test]
    fn test_term_weight_lookup() {
        assert_eq!(term_weight("litigation"), 1.0);
        assert_eq!(term_weight("unknownword"), DEFAULT_WEIGHT);
        assert!(TERM_WEIGHTS.len() >= 90);
        for (term, w) in TERM_WEIGHTS {
            assert!(*w > 0.0 && *w <= 1.0, "{} has weight {}", term, w);
        }
    }

    #[test]
    fn test_rolling_hash() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("ab"), 97 * 31 + 98);
        // Long tokens wrap instead of overflowing.
        let _ = rolling_hash(&"z".repeat(100));
    }

    #[test]
    fn test_single_token_peak_is_normalized_to_one() {
        // One known token: its first scatter slot carries the maximum mass.
        let v = embed("litigation");
        let pos = (u64::from(rolling_hash("litigation")) % EMBEDDING_DIM as u64) as usize;
        assert_eq!(v[pos], 1.0);
    }

    #[test]
    fn test_embedding_service_trait() {
        let svc = PseudoEmbedding::new();
        let q = svc.embed("patent licensing");
        assert_eq!(q.len(), EMBEDDING_DIM);
        assert_eq!(svc.dimensions(), EMBEDDING_DIM);
    }
}
