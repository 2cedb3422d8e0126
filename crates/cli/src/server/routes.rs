//! Route handlers.
//!
//! Every response body is JSON; failures carry a single `error` field.

use super::AppState;
use agrodoc_core::AppError;
use agrodoc_knowledge::IngestRequest;
use agrodoc_rag::{QueryRequest, QueryResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error body with a matching status code.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /query
///
/// Once a query passes validation the pipeline's body is returned with 200,
/// including `{"error": ...}` bodies; clients check for the `error` field.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.orchestrator.handle(request).await?;

    Ok(Json(response))
}

/// POST /ingest
pub async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload?;
    let stats = state.ingestor.ingest(&request).await?;

    Ok(Json(json!({ "message": stats.message() })))
}

#[cfg(test)]
mod tests {
    use crate::server::{build_router, AppState};
    use agrodoc_core::{AppError, AppResult};
    use agrodoc_knowledge::embeddings::providers::TrigramProvider;
    use agrodoc_knowledge::{Ingestor, SqliteIndex, VectorIndex};
    use agrodoc_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use agrodoc_rag::{
        AnswerCache, AnswerGenerator, ContextRetriever, QueryOrchestrator, Translator,
        WeatherAugmenter, WeatherProvider, WeatherReading,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct EchoLlm;

    #[async_trait::async_trait]
    impl LlmClient for EchoLlm {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            if request.prompt.contains("Query: crash") {
                panic!("boom");
            }
            Ok(LlmResponse {
                content: "Irrigate at dawn.".to_string(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            })
        }
    }

    struct NoWeather;

    #[async_trait::async_trait]
    impl WeatherProvider for NoWeather {
        fn provider_name(&self) -> &str {
            "none"
        }

        async fn current(&self, _location: &str) -> AppResult<WeatherReading> {
            Err(AppError::Weather("offline".to_string()))
        }
    }

    fn app() -> (Router, Arc<SqliteIndex>) {
        let index = Arc::new(SqliteIndex::in_memory().unwrap());
        let embedder = Arc::new(TrigramProvider::new(64));
        let cache = AnswerCache::new(16, None);

        let orchestrator = QueryOrchestrator::new(
            cache.clone(),
            ContextRetriever::new(embedder.clone(), index.clone()),
            WeatherAugmenter::new(Arc::new(NoWeather)),
            AnswerGenerator::new(Arc::new(EchoLlm), "test-model", cache).unwrap(),
            Translator::new(),
        );
        let ingestor = Ingestor::new(embedder, index.clone()).unwrap();

        let state = AppState::new(Arc::new(orchestrator), Arc::new(ingestor));
        (build_router(state), index)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_query_answer() {
        let (app, _) = app();
        let response = app
            .oneshot(post(
                "/query",
                json!({"query": "When to irrigate?", "location": "Lahore", "target_lang": "en"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["answer"], "Irrigate at dawn.");
        assert_eq!(body["translated_answer"], "Irrigate at dawn.");
        assert_eq!(body["context"], json!([]));
    }

    #[tokio::test]
    async fn test_query_missing_text() {
        let (app, _) = app();
        let response = app.oneshot(post("/query", json!({"query": ""}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Query is required"}));
    }

    #[tokio::test]
    async fn test_query_malformed_body() {
        let (app, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_query_pipeline_failure_keeps_ok_status() {
        let (app, _) = app();
        let response = app
            .oneshot(post("/query", json!({"query": "crash", "target_lang": "en"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Failed to process query"})
        );
    }

    #[tokio::test]
    async fn test_ingest() {
        let (app, index) = app();
        let response = app
            .oneshot(post(
                "/ingest",
                json!({
                    "documents": ["Mulch keeps soil moist.", "Prune citrus after harvest."],
                    "metadata": [{"source": "mulch.txt"}]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Ingested 2 document chunks"})
        );
        assert_eq!(index.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ingest_empty() {
        let (app, _) = app();
        let response = app
            .oneshot(post("/ingest", json!({"documents": []})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "No documents provided"})
        );
    }
}
