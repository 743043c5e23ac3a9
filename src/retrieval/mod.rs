//! Passage retrieval from the document index.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A retrieved text passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Source file the passage came from.
    pub source: String,
    /// Passage text.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for Passage {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.document.source,
            content: result.document.content,
            score: result.score,
        }
    }
}

/// Returns passages relevant to a query, most relevant first.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>>;
}

/// Embeds the query and runs a similarity search over the vector store.
pub struct VectorRetriever {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    min_score: f32,
}

impl VectorRetriever {
    pub fn new(vector_store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            vector_store,
            embedder,
            top_k: 3,
            min_score: 0.0,
        }
    }

    /// Set the maximum number of passages returned.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    #[instrument(skip(self))]
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>> {
        if self.vector_store.document_count().await? == 0 {
            debug!("Document index is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let results = self
            .vector_store
            .search(&query_embedding, self.top_k, self.min_score)
            .await?;

        debug!("Retrieved {} passages", results.len());
        Ok(results.into_iter().map(Passage::from).collect())
    }
}

/// Join passage texts into a prompt context block.
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::fakes::LetterEmbedder;
    use crate::error::WaypointError;
    use crate::vector_store::{Document, MemoryVectorStore};

    /// Fails on any call so tests can prove the embedder was skipped.
    struct UnreachableEmbedder;

    #[async_trait]
    impl Embedder for UnreachableEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(WaypointError::Embedding("should not be called".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(WaypointError::Embedding("should not be called".to_string()))
        }

        fn dimensions(&self) -> usize {
            0
        }
    }

    async fn indexed_store(texts: &[&str]) -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = LetterEmbedder;
        let mut docs = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let embedding = embedder.embed(text).await.unwrap();
            docs.push(Document::new("guide.md".into(), text.to_string(), embedding, i as i32));
        }
        store.upsert_batch(&docs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_empty_index_skips_embedding() {
        let retriever = VectorRetriever::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(UnreachableEmbedder),
        );
        assert!(retriever.retrieve("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_returns_top_k_best_first() {
        let store = indexed_store(&[
            "zzzz zzzz",
            "kyoto temples in autumn",
            "kyoto autumn leaves",
            "xxxx",
        ])
        .await;

        let retriever = VectorRetriever::new(store, Arc::new(LetterEmbedder)).with_top_k(2);
        let passages = retriever.retrieve("kyoto autumn").await.unwrap();

        assert_eq!(passages.len(), 2);
        assert!(passages.iter().all(|p| p.content.contains("kyoto")));
        assert!(passages[0].score >= passages[1].score);
        assert_eq!(passages[0].source, "guide.md");
    }

    #[test]
    fn test_join_passages_uses_newlines_in_order() {
        let passages = vec![
            Passage {
                source: "a".into(),
                content: "first".into(),
                score: 0.9,
            },
            Passage {
                source: "b".into(),
                content: "second".into(),
                score: 0.5,
            },
        ];
        assert_eq!(join_passages(&passages), "first\nsecond");
        assert_eq!(join_passages(&[]), "");
    }
}
