//! Component wiring for Waypoint.
//!
//! Builds every adapter once from [`Settings`] and hands out the graphs that
//! share them. [`DocumentIndex`] holds only what indexing needs, so `ingest`
//! never builds the tool adapters.

use crate::config::{Prompts, Settings, WeatherProviderKind};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, WaypointError};
use crate::graph::{RagHandler, Router, RoutingGraph, TravelAssistant, WeatherHandler};
use crate::ingest::{load_documents, IndexReport, Indexer, TextSplitter};
use crate::llm::{LanguageModel, OpenAIChat};
use crate::retrieval::{Retriever, VectorRetriever};
use crate::tools::{
    Dictionary, DuckDuckGo, OpenWeatherMap, SimulatedWeather, Toolbox, WeatherSource,
};
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Shared components for a Waypoint process.
pub struct Orchestrator {
    settings: Settings,
    prompts: Arc<Prompts>,
    chat: Arc<dyn LanguageModel>,
    router_llm: Arc<dyn LanguageModel>,
    toolbox: Arc<Toolbox>,
    documents: DocumentIndex,
}

impl Orchestrator {
    /// Build all components from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let chat = OpenAIChat::new(&settings.llm)?;
        info!("Using chat model {}", chat.model());

        let router_llm = OpenAIChat::new(&settings.llm)?
            .with_model(settings.llm.router_model())
            .with_temperature(0.0);

        let toolbox = build_toolbox(&settings)?;
        let documents = DocumentIndex::new(&settings)?;

        Ok(Self {
            settings,
            prompts: Arc::new(prompts),
            chat: Arc::new(chat),
            router_llm: Arc::new(router_llm),
            toolbox: Arc::new(toolbox),
            documents,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        chat: Arc<dyn LanguageModel>,
        router_llm: Arc<dyn LanguageModel>,
        toolbox: Arc<Toolbox>,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        let documents = DocumentIndex::with_components(&settings, embedder, vector_store);
        Self {
            settings,
            prompts: Arc::new(prompts),
            chat,
            router_llm,
            toolbox,
            documents,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn toolbox(&self) -> Arc<Toolbox> {
        self.toolbox.clone()
    }

    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.documents.vector_store()
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.documents.embedder()
    }

    /// Retriever over the document index.
    pub fn retriever(&self) -> Arc<dyn Retriever> {
        Arc::new(
            VectorRetriever::new(self.vector_store(), self.embedder())
                .with_top_k(self.settings.rag.top_k)
                .with_min_score(self.settings.rag.min_score),
        )
    }

    /// Router → weather | rag → end.
    pub fn routing_graph(&self) -> RoutingGraph {
        RoutingGraph::new(
            Router::new(self.router_llm.clone(), self.prompts.clone()),
            WeatherHandler::new(self.toolbox.clone()),
            RagHandler::new(self.chat.clone(), self.retriever(), self.prompts.clone()),
        )
    }

    /// Tool-calling assistant.
    pub fn assistant(&self) -> TravelAssistant {
        TravelAssistant::new(self.chat.clone(), self.toolbox.clone(), self.prompts.clone())
            .with_max_iterations(self.settings.agent.max_iterations)
    }

    /// Load, split, embed and store documents. Defaults to `documents.dir`.
    pub async fn index_documents(&self, dir: Option<&Path>, force: bool) -> Result<IndexReport> {
        self.documents.index(dir, force).await
    }
}

/// Embedder and vector store for building the document index.
pub struct DocumentIndex {
    default_dir: PathBuf,
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
}

impl DocumentIndex {
    /// Build the embedder and vector store from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let embedder = OpenAIEmbedder::new(&settings.llm, &settings.embedding)?;
        info!("Using embedding model {}", embedder.model());
        let vector_store = build_vector_store(settings)?;
        Ok(Self::with_components(settings, Arc::new(embedder), vector_store))
    }

    pub fn with_components(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            default_dir: settings.documents_dir(),
            splitter: TextSplitter::from_settings(&settings.documents),
            embedder,
            vector_store,
        }
    }

    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Load, split, embed and store documents. Defaults to `documents.dir`.
    #[instrument(skip(self))]
    pub async fn index(&self, dir: Option<&Path>, force: bool) -> Result<IndexReport> {
        let dir = dir.unwrap_or(self.default_dir.as_path());
        let documents = load_documents(dir)?;
        let indexer = Indexer::new(
            self.vector_store.clone(),
            self.embedder.clone(),
            self.splitter.clone(),
        );
        indexer.index(&documents, force).await
    }
}

/// Build the toolbox from the weather, dictionary and search settings.
pub fn build_toolbox(settings: &Settings) -> Result<Toolbox> {
    let weather = build_weather_source(settings)?;
    let dictionary = Dictionary::new().with_entries(&settings.dictionary.entries);
    let search = DuckDuckGo::new(&settings.search)?;

    Ok(Toolbox::new(weather, dictionary, Arc::new(search))
        .with_max_search_results(settings.search.max_results))
}

/// Build the configured weather provider.
pub fn build_weather_source(settings: &Settings) -> Result<Arc<dyn WeatherSource>> {
    info!("Using {} weather provider", settings.weather.provider);
    Ok(match settings.weather.provider {
        WeatherProviderKind::OpenWeatherMap => Arc::new(OpenWeatherMap::new(&settings.weather)?),
        WeatherProviderKind::Simulated => Arc::new(SimulatedWeather),
    })
}

fn build_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    match settings.vector_store.provider.to_lowercase().as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => Err(WaypointError::Config(format!(
            "Unknown vector store provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::fakes::LetterEmbedder;
    use crate::llm::scripted::ScriptedModel;
    use crate::graph::Request;
    use crate::tools::fakes::{toolbox, FixedSearch, FixedWeather};

    fn simulated_settings() -> Settings {
        let mut settings = Settings::default();
        settings.weather.provider = WeatherProviderKind::Simulated;
        settings.vector_store.provider = "memory".to_string();
        settings
    }

    #[test]
    fn test_new_builds_offline_components() {
        let orchestrator = Orchestrator::new(simulated_settings()).unwrap();
        assert_eq!(orchestrator.settings().agent.max_iterations, 5);
    }

    #[tokio::test]
    async fn test_document_index_builds_without_weather_key() {
        let mut settings = Settings::default();
        settings.llm.api_key = Some("sk-test".to_string());
        settings.weather.provider = WeatherProviderKind::OpenWeatherMap;
        settings.weather.api_key = None;
        settings.vector_store.provider = "memory".to_string();

        let index = DocumentIndex::new(&settings).unwrap();
        assert_eq!(index.vector_store().document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_document_index_indexes_default_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("oslo.txt"), "Oslo has long summer evenings.").unwrap();

        let mut settings = Settings::default();
        settings.documents.dir = dir.path().display().to_string();
        let index = DocumentIndex::with_components(
            &settings,
            Arc::new(LetterEmbedder),
            Arc::new(MemoryVectorStore::new()),
        );

        let report = index.index(None, false).await.unwrap();
        assert_eq!(report.indexed.len(), 1);
        assert_eq!(report.indexed[0].0, "oslo.txt");
    }

    #[test]
    fn test_unknown_vector_store_is_rejected() {
        let mut settings = simulated_settings();
        settings.vector_store.provider = "chroma".to_string();
        let err = build_vector_store(&settings).err().unwrap();
        assert!(err.to_string().contains("Unknown vector store provider"));
    }

    #[test]
    fn test_config_dictionary_entries_reach_toolbox() {
        let mut settings = simulated_settings();
        settings
            .dictionary
            .entries
            .insert("jet lag".to_string(), "Tiredness after a long flight.".to_string());

        let toolbox = build_toolbox(&settings).unwrap();
        assert_eq!(toolbox.define("Jet Lag"), "Tiredness after a long flight.");
    }

    #[tokio::test]
    async fn test_index_then_answer_from_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("kyoto.md"),
            "Kyoto is best visited in autumn when the maple leaves turn red.",
        )
        .unwrap();

        let chat = Arc::new(ScriptedModel::texts(&["Visit in autumn."]));
        let orchestrator = Orchestrator::with_components(
            simulated_settings(),
            Prompts::default(),
            chat.clone(),
            Arc::new(ScriptedModel::texts(&["rag"])),
            Arc::new(toolbox(FixedWeather::sunny(), FixedSearch(None))),
            Arc::new(LetterEmbedder),
            Arc::new(MemoryVectorStore::new()),
        );

        let report = orchestrator
            .index_documents(Some(dir.path()), false)
            .await
            .unwrap();
        assert_eq!(report.indexed.len(), 1);

        let answer = orchestrator
            .routing_graph()
            .answer(Request::new("When should I visit Kyoto?"))
            .await
            .unwrap();
        assert_eq!(answer, "Visit in autumn.");
        assert!(chat.user_prompt(0).contains("maple leaves"));
    }
}
