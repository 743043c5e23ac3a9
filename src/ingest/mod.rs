//! Document loading and indexing.
//!
//! Reads plain-text and Markdown files from a directory, splits them into
//! overlapping chunks, embeds the chunks and writes them to the vector store.

mod splitter;

pub use splitter::TextSplitter;

use crate::embedding::Embedder;
use crate::error::{Result, WaypointError};
use crate::vector_store::{Document, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// A loaded source file.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name relative to the document directory.
    pub source: String,
    pub text: String,
}

/// Load every supported document from a directory, sorted by file name.
#[instrument]
pub fn load_documents(dir: &Path) -> Result<Vec<SourceDocument>> {
    if !dir.is_dir() {
        return Err(WaypointError::Ingest(format!(
            "Document directory not found: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable file {:?}: {}", path, e);
                continue;
            }
        };

        if text.trim().is_empty() {
            debug!("Skipping empty file {:?}", path);
            continue;
        }

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        documents.push(SourceDocument { source, text });
    }

    if documents.is_empty() {
        return Err(WaypointError::Ingest(format!(
            "No documents were loaded from {}",
            dir.display()
        )));
    }

    info!("Loaded {} documents from {:?}", documents.len(), dir);
    Ok(documents)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    /// Sources written this run with their chunk counts.
    pub indexed: Vec<(String, usize)>,
    /// Sources left untouched because they were already indexed.
    pub skipped: Vec<String>,
}

impl IndexReport {
    pub fn total_chunks(&self) -> usize {
        self.indexed.iter().map(|(_, n)| n).sum()
    }
}

/// Splits, embeds and stores documents.
pub struct Indexer {
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    splitter: TextSplitter,
}

impl Indexer {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        splitter: TextSplitter,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            splitter,
        }
    }

    /// Index documents. Sources already in the store are skipped unless `force` is set.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn index(&self, documents: &[SourceDocument], force: bool) -> Result<IndexReport> {
        let mut report = IndexReport::default();

        for doc in documents {
            if !force && self.vector_store.is_source_indexed(&doc.source).await? {
                debug!("{} already indexed, skipping", doc.source);
                report.skipped.push(doc.source.clone());
                continue;
            }

            let chunks = self.index_one(doc).await?;
            report.indexed.push((doc.source.clone(), chunks));
        }

        info!(
            "Indexed {} sources ({} chunks), skipped {}",
            report.indexed.len(),
            report.total_chunks(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn index_one(&self, doc: &SourceDocument) -> Result<usize> {
        let removed = self.vector_store.delete_by_source(&doc.source).await?;
        if removed > 0 {
            debug!("Removed {} stale chunks for {}", removed, doc.source);
        }

        let chunks = self.splitter.split(&doc.text);
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(WaypointError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (content, embedding))| {
                Document::new(doc.source.clone(), content, embedding, order as i32)
            })
            .collect();

        self.vector_store.upsert_batch(&documents).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::fakes::LetterEmbedder;
    use crate::vector_store::MemoryVectorStore;
    use std::fs;

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(&dir.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("Document directory not found"));
    }

    #[test]
    fn test_directory_without_documents_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("image.png"), b"\x89PNG").unwrap();
        fs::write(dir.path().join("blank.txt"), "   \n").unwrap();

        let err = load_documents(dir.path()).unwrap_err();
        assert!(err.to_string().contains("No documents were loaded"));
    }

    #[test]
    fn test_loads_text_and_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "# Monsoon\nBring a raincoat.").unwrap();
        fs::write(dir.path().join("a.txt"), "Winters are mild.").unwrap();
        fs::write(dir.path().join("c.pdf"), "%PDF-1.4").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let sources: Vec<_> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.md"]);
    }

    #[tokio::test]
    async fn test_index_skips_existing_unless_forced() {
        let store = Arc::new(MemoryVectorStore::new());
        let indexer = Indexer::new(
            store.clone(),
            Arc::new(LetterEmbedder),
            TextSplitter::new(30, 5),
        );

        let docs = vec![SourceDocument {
            source: "tips.txt".to_string(),
            text: "Carry cash in rural areas. Tipping is not expected in Japan.".to_string(),
        }];

        let first = indexer.index(&docs, false).await.unwrap();
        assert_eq!(first.indexed.len(), 1);
        let chunk_count = first.total_chunks();
        assert!(chunk_count >= 2);
        assert_eq!(store.document_count().await.unwrap(), chunk_count);

        let second = indexer.index(&docs, false).await.unwrap();
        assert_eq!(second.skipped, vec!["tips.txt".to_string()]);
        assert_eq!(second.total_chunks(), 0);

        let forced = indexer.index(&docs, true).await.unwrap();
        assert_eq!(forced.total_chunks(), chunk_count);
        assert_eq!(store.document_count().await.unwrap(), chunk_count);
    }
}
