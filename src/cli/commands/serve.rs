//! HTTP API server.
//!
//! Exposes the routing graph and the tool-calling assistant as JSON endpoints.

use crate::cli::Output;
use crate::config::Settings;
use crate::graph::{Request, RoutingGraph, TravelAssistant};
use crate::llm::ToolSpec;
use crate::orchestrator::Orchestrator;
use crate::tools::{tool_definitions, TOOL_NAMES};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state.
pub struct AppState {
    graph: RoutingGraph,
    assistant: TravelAssistant,
    request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: &Orchestrator) -> Self {
        Self {
            graph: orchestrator.routing_graph(),
            assistant: orchestrator.assistant(),
            request_timeout: Duration::from_secs(
                orchestrator.settings().server.request_timeout_secs,
            ),
        }
    }

    /// Override the per-request time limit.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/api/assist", post(assist))
        .route("/api/tools", get(list_tools))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;
    let app = router(Arc::new(AppState::new(&orchestrator)));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Waypoint API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask (router)", "POST /ask");
    Output::kv("Assist (tools)", "POST /api/assist");
    Output::kv("Tools", "GET  /api/tools");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
struct AskResponse {
    answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssistResponse {
    answer: String,
    tool_used: Option<String>,
    city: Option<String>,
    success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    tools_available: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ToolsResponse {
    tools: Vec<ToolSpec>,
}

/// Request failure, rendered as `{"detail": ...}`.
#[derive(Debug)]
enum ApiError {
    Failed(String),
    TimedOut(Duration),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Failed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing request: {}", e),
            ),
            ApiError::TimedOut(limit) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("Request timed out after {}s", limit.as_secs_f64()),
            ),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

/// Await a pipeline future under the request time limit.
async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = crate::error::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!("Request failed: {}", e);
            Err(ApiError::Failed(e.to_string()))
        }
        Err(_) => {
            error!("Request exceeded {:?}", limit);
            Err(ApiError::TimedOut(limit))
        }
    }
}

// === Handlers ===

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tools_available: TOOL_NAMES.iter().map(|t| t.to_string()).collect(),
    })
}

async fn list_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: tool_definitions(),
    })
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Request>,
) -> Result<Json<AskResponse>, ApiError> {
    info!("POST /ask");
    let answer = bounded(state.request_timeout, state.graph.answer(req)).await?;
    Ok(Json(AskResponse { answer }))
}

async fn assist(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Request>,
) -> Result<Json<AssistResponse>, ApiError> {
    info!("POST /api/assist");
    let city = req.city.clone();
    let run = bounded(state.request_timeout, state.assistant.run(req)).await?;

    Ok(Json(AssistResponse {
        answer: run.answer,
        tool_used: run.tool_used,
        city,
        success: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::embedding::fakes::LetterEmbedder;
    use crate::error::Result;
    use crate::llm::scripted::ScriptedModel;
    use crate::llm::{ChatMessage, Completion, LanguageModel, ToolInvocation};
    use crate::tools::fakes::{toolbox, FixedSearch, FixedWeather};
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    struct SlowModel;

    #[async_trait]
    impl LanguageModel for SlowModel {
        async fn chat(&self, _messages: &[ChatMessage], _tools: &[ToolSpec]) -> Result<Completion> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Completion::text("too late"))
        }
    }

    fn orchestrator(
        chat: Arc<dyn LanguageModel>,
        router_llm: Arc<dyn LanguageModel>,
    ) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            chat,
            router_llm,
            Arc::new(toolbox(FixedWeather::sunny(), FixedSearch(Some(Vec::new())))),
            Arc::new(LetterEmbedder),
            Arc::new(MemoryVectorStore::new()),
        )
    }

    async fn spawn(state: AppState) -> String {
        let app = router(Arc::new(state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health_and_root() {
        let orch = orchestrator(
            Arc::new(ScriptedModel::default()),
            Arc::new(ScriptedModel::default()),
        );
        let base = spawn(AppState::new(&orch)).await;

        for path in ["/", "/health"] {
            let health: HealthResponse = reqwest::get(format!("{}{}", base, path))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(health.status, "healthy");
            assert_eq!(health.tools_available, vec!["get_weather", "define_word", "web_search"]);
        }
    }

    #[tokio::test]
    async fn test_list_tools() {
        let orch = orchestrator(
            Arc::new(ScriptedModel::default()),
            Arc::new(ScriptedModel::default()),
        );
        let base = spawn(AppState::new(&orch)).await;

        let body: serde_json::Value = reqwest::get(format!("{}/api/tools", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let tools = body["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 3);
        assert_eq!(tools[0]["name"], "get_weather");
        assert!(tools[0]["parameters"]["properties"]["city"].is_object());
    }

    #[tokio::test]
    async fn test_ask_routes_weather() {
        let orch = orchestrator(
            Arc::new(ScriptedModel::default()),
            Arc::new(ScriptedModel::texts(&["weather"])),
        );
        let base = spawn(AppState::new(&orch)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&serde_json::json!({"question": "What's the weather?", "city": "Paris"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: AskResponse = response.json().await.unwrap();
        assert!(body.answer.contains("Weather in Paris"));
    }

    #[tokio::test]
    async fn test_assist_reports_first_tool() {
        let chat = ScriptedModel::new(vec![
            Completion {
                content: None,
                tool_calls: vec![ToolInvocation {
                    id: "call_1".to_string(),
                    name: "define_word".to_string(),
                    arguments: r#"{"word": "visa"}"#.to_string(),
                }],
            },
            Completion::text("A visa lets you enter a country."),
        ]);
        let orch = orchestrator(Arc::new(chat), Arc::new(ScriptedModel::default()));
        let base = spawn(AppState::new(&orch)).await;

        let body: AssistResponse = reqwest::Client::new()
            .post(format!("{}/api/assist", base))
            .json(&serde_json::json!({"question": "What is a visa?", "city": "Tokyo"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body.answer, "A visa lets you enter a country.");
        assert_eq!(body.tool_used.as_deref(), Some("define_word"));
        assert_eq!(body.city.as_deref(), Some("Tokyo"));
        assert!(body.success);
    }

    #[tokio::test]
    async fn test_pipeline_error_is_500_with_detail() {
        let orch = orchestrator(
            Arc::new(ScriptedModel::failing("model unavailable")),
            Arc::new(ScriptedModel::texts(&["rag"])),
        );
        let base = spawn(AppState::new(&orch)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&serde_json::json!({"question": "What is a layover?"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);

        let body: serde_json::Value = response.json().await.unwrap();
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Error processing request: "));
        assert!(detail.contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let orch = orchestrator(Arc::new(SlowModel), Arc::new(ScriptedModel::default()));
        let state = AppState::new(&orch).with_request_timeout(Duration::from_millis(100));
        let base = spawn(state).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/assist", base))
            .json(&serde_json::json!({"question": "Hello?"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 504);
    }

    #[tokio::test]
    async fn test_missing_question_is_rejected() {
        let orch = orchestrator(
            Arc::new(ScriptedModel::default()),
            Arc::new(ScriptedModel::default()),
        );
        let base = spawn(AppState::new(&orch)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/ask", base))
            .json(&serde_json::json!({"city": "Paris"}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
