//! Embedding generation for document indexing and retrieval.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    /// Bag-of-letters embedder: counts a-z occurrences.
    ///
    /// Texts sharing vocabulary land close together, which is enough to
    /// exercise ranking without a network call.
    pub struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut vector = vec![0.0; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                vector[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(vector)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            26
        }
    }
}
