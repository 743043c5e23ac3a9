//! Handler nodes: one per intent.

use crate::config::Prompts;
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::retrieval::{join_passages, Retriever};
use crate::tools::{Toolbox, WEATHER_UNAVAILABLE};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Answers with current conditions from the weather adapter.
pub struct WeatherHandler {
    toolbox: Arc<Toolbox>,
}

impl WeatherHandler {
    pub fn new(toolbox: Arc<Toolbox>) -> Self {
        Self { toolbox }
    }

    /// Never fails. A missing city or adapter error yields [`WEATHER_UNAVAILABLE`].
    #[instrument(skip(self))]
    pub async fn run(&self, city: Option<&str>) -> String {
        match city {
            Some(city) => self.toolbox.weather(city).await,
            None => {
                warn!("Weather requested without a city");
                WEATHER_UNAVAILABLE.to_string()
            }
        }
    }
}

/// Answers from retrieved document passages.
pub struct RagHandler {
    llm: Arc<dyn LanguageModel>,
    retriever: Arc<dyn Retriever>,
    prompts: Arc<Prompts>,
}

impl RagHandler {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        retriever: Arc<dyn Retriever>,
        prompts: Arc<Prompts>,
    ) -> Self {
        Self {
            llm,
            retriever,
            prompts,
        }
    }

    /// Returns the completion verbatim. An empty context still calls the model.
    #[instrument(skip(self))]
    pub async fn run(&self, question: &str) -> Result<String> {
        let passages = self.retriever.retrieve(question).await?;
        debug!("Answering from {} passages", passages.len());

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), join_passages(&passages));
        vars.insert("question".to_string(), question.to_string());
        let prompt = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);

        self.llm.complete(&prompt).await
    }
}
