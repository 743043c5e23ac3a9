//! In-memory vector store implementation.
//!
//! Useful for testing and small document sets.

use super::{rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{Result, WaypointError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory vector store.
#[derive(Default)]
pub struct MemoryVectorStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Document>>> {
        self.documents
            .read()
            .map_err(|e| WaypointError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Document>>> {
        self.documents
            .write()
            .map_err(|e| WaypointError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.write()?;
        for doc in docs {
            store.insert(doc.id, doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.read()?;
        Ok(rank(docs.values().cloned(), query_embedding, limit, min_score))
    }

    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let mut docs = self.write()?;
        let initial_len = docs.len();
        docs.retain(|_, doc| doc.source != source);
        Ok(initial_len - docs.len())
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let docs = self.read()?;

        let mut by_source: HashMap<String, IndexedSource> = HashMap::new();
        for doc in docs.values() {
            let entry = by_source
                .entry(doc.source.clone())
                .or_insert_with(|| IndexedSource {
                    source: doc.source.clone(),
                    chunk_count: 0,
                    indexed_at: doc.indexed_at,
                });
            entry.chunk_count += 1;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut sources: Vec<IndexedSource> = by_source.into_values().collect();
        sources.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(sources)
    }

    async fn is_source_indexed(&self, source: &str) -> Result<bool> {
        Ok(self.read()?.values().any(|d| d.source == source))
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
