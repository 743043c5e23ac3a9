//! SQLite-based vector store implementation.
//!
//! Uses SQLite for storage with cosine similarity computed in Rust.

use super::{rank, Document, IndexedSource, SearchResult, VectorStore};
use crate::error::{Result, WaypointError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    chunk_order INTEGER NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| WaypointError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(3)?;
        let indexed_at_str: String = row.get(5)?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            source: row.get(1)?,
            content: row.get(2)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            chunk_order: row.get(4)?,
            indexed_at: Self::parse_timestamp(&indexed_at_str),
        })
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, source, content, embedding, chunk_order, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    doc.id.to_string(),
                    doc.source,
                    doc.content,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.chunk_order,
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        debug!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, source, content, embedding, chunk_order, indexed_at FROM documents",
        )?;
        let docs: Vec<Document> = stmt
            .query_map([], Self::row_to_document)?
            .filter_map(|d| d.ok())
            .collect();

        let results = rank(docs, query_embedding, limit, min_score);
        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source: &str) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM documents WHERE source = ?1", params![source])?;
        debug!("Deleted {} documents for {}", deleted, source);
        Ok(deleted)
    }

    async fn list_sources(&self) -> Result<Vec<IndexedSource>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source, COUNT(*) AS chunk_count, MAX(indexed_at) AS indexed_at
            FROM documents
            GROUP BY source
            ORDER BY indexed_at DESC
            "#,
        )?;

        let sources = stmt
            .query_map([], |row| {
                let indexed_at_str: String = row.get(2)?;
                Ok(IndexedSource {
                    source: row.get(0)?,
                    chunk_count: row.get(1)?,
                    indexed_at: Self::parse_timestamp(&indexed_at_str),
                })
            })?
            .filter_map(|s| s.ok())
            .collect();

        Ok(sources)
    }

    async fn is_source_indexed(&self, source: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE source = ?1",
            params![source],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let doc = Document::new(
            "climate.md".to_string(),
            "Paris has an oceanic climate.".to_string(),
            vec![1.0, 0.0, 0.0],
            0,
        );
        store.upsert_batch(&[doc]).await.unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source, "climate.md");
        assert_eq!(sources[0].chunk_count, 1);

        let results = store.search(&[1.0, 0.0, 0.0], 10, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.embedding, vec![1.0, 0.0, 0.0]);

        assert!(store.search(&[0.0, 1.0, 0.0], 10, 0.5).await.unwrap().is_empty());

        assert_eq!(store.delete_by_source("climate.md").await.unwrap(), 1);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            let doc = Document::new("a.txt".into(), "kept".into(), vec![0.5, 0.5], 3);
            store.upsert_batch(&[doc]).await.unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert!(store.is_source_indexed("a.txt").await.unwrap());
        assert_eq!(store.document_count().await.unwrap(), 1);
    }
}
