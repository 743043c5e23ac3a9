//! LLM-backed intent classification.

use super::Intent;
use crate::config::Prompts;
use crate::llm::LanguageModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Classifies a question into one [`Intent`] with a single completion.
pub struct Router {
    llm: Arc<dyn LanguageModel>,
    prompts: Arc<Prompts>,
}

impl Router {
    /// The model should be configured for deterministic output.
    pub fn new(llm: Arc<dyn LanguageModel>, prompts: Arc<Prompts>) -> Self {
        Self { llm, prompts }
    }

    /// Never fails: classifier errors and unknown labels route to `Rag`.
    #[instrument(skip(self))]
    pub async fn route(&self, question: &str) -> Intent {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.router.user, &vars);

        match self.llm.complete(&prompt).await {
            Ok(label) => {
                let intent = Intent::from_label(&label);
                debug!("Classifier said {:?}, routing to {}", label.trim(), intent);
                intent
            }
            Err(e) => {
                warn!("Classifier failed, routing to rag: {}", e);
                Intent::Rag
            }
        }
    }
}
