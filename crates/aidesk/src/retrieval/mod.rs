//! In-memory vector index with cosine top-k retrieval.
//!
//! One index per uploaded document, alive for the session; nothing is
//! persisted. Entry norms are precomputed so a search is one dot product
//! per entry.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct IndexEntry {
    id: Uuid,
    chunk_index: usize,
    text: String,
    vector: Vec<f32>,
    norm: f32,
}

/// A retrieved chunk with its similarity score, highest first.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub chunk_index: usize,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chunk_index: usize, text: String, vector: Vec<f32>) {
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        self.entries.push(IndexEntry {
            id: Uuid::new_v4(),
            chunk_index,
            text,
            vector,
            norm,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k entries by cosine similarity to `query`. Zero-norm vectors and
    /// dimension mismatches score 0 instead of poisoning the ranking.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedChunk> {
        let query_norm = query.iter().map(|v| v * v).sum::<f32>().sqrt();

        let mut scored: Vec<RetrievedChunk> = self
            .entries
            .iter()
            .map(|entry| RetrievedChunk {
                chunk_index: entry.chunk_index,
                text: entry.text.clone(),
                score: cosine(query, query_norm, entry),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            candidates = self.entries.len(),
            returned = scored.len(),
            top_score = scored.first().map(|r| r.score).unwrap_or(0.0),
            "Vector search complete"
        );
        scored
    }
}

fn cosine(query: &[f32], query_norm: f32, entry: &IndexEntry) -> f32 {
    if query.len() != entry.vector.len() || query_norm == 0.0 || entry.norm == 0.0 {
        return 0.0;
    }
    let dot = query
        .iter()
        .zip(entry.vector.iter())
        .map(|(a, b)| a * b)
        .sum::<f32>();
    dot / (query_norm * entry.norm)
}
