//! Vector store abstraction for the document index.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Source file this chunk came from.
    pub source: String,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Order of this chunk in the source.
    pub chunk_order: i32,
    /// When this chunk was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(source: String, content: String, embedding: Vec<f32>, chunk_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            content,
            embedding,
            chunk_order,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedSource {
    pub source: String,
    pub chunk_count: u32,
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk upsert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for similar documents scoring at least `min_score`, best first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete every chunk of a source.
    async fn delete_by_source(&self, source: &str) -> Result<usize>;

    /// List all indexed sources, most recent first.
    async fn list_sources(&self) -> Result<Vec<IndexedSource>>;

    /// Check if a source is indexed.
    async fn is_source_indexed(&self, source: &str) -> Result<bool>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score, filter, sort and truncate candidate documents.
pub(crate) fn rank<I>(
    docs: I,
    query_embedding: &[f32],
    limit: usize,
    min_score: f32,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = Document>,
{
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|doc| {
            let score = cosine_similarity(query_embedding, &doc.embedding);
            SearchResult { document: doc, score }
        })
        .filter(|r| r.score >= min_score)
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_filters_and_truncates() {
        let docs = vec![
            Document::new("a.txt".into(), "far".into(), vec![0.0, 1.0], 0),
            Document::new("a.txt".into(), "near".into(), vec![1.0, 0.1], 1),
            Document::new("b.txt".into(), "exact".into(), vec![1.0, 0.0], 0),
            Document::new("b.txt".into(), "opposite".into(), vec![-1.0, 0.0], 1),
        ];

        let results = rank(docs, &[1.0, 0.0], 2, 0.0);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "exact");
        assert_eq!(results[1].document.content, "near");
    }
}
