//! HTTP surface of the chatbot backend.

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::app_state::{AppConfig, AppState};
use crate::error_handler::AppError;
use crate::routes::{health_route, info_route, query_route};

/// Loads configuration, wires the assembler, and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let config = AppConfig::from_env();
    let address = config.api_address.clone();
    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Builds the full application router.
///
/// The textbook frontend is served from arbitrary origins (local dev,
/// static hosting), so CORS allows any origin with the methods and headers
/// the client actually sends.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(info_route::info))
        .route("/health", get(health_route::health))
        .route(
            "/api/query",
            post(query_route::query).fallback(query_route::method_not_allowed),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        build_router(AppState::new(AppConfig::unconfigured()))
    }

    async fn body_json(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_query(payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn missing_question_returns_exact_400_body() {
        let res = app().oneshot(post_query(json!({}))).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res.into_body()).await,
            json!({ "error": "Question is required" })
        );
    }

    #[tokio::test]
    async fn blank_question_returns_exact_400_body() {
        let res = app()
            .oneshot(post_query(json!({ "question": "   " })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res.into_body()).await,
            json!({ "error": "Question is required" })
        );
    }

    #[tokio::test]
    async fn malformed_body_returns_exact_400_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(res.into_body()).await,
            json!({ "error": "Question is required" })
        );
    }

    #[tokio::test]
    async fn get_on_query_is_405_with_error_body() {
        let req = Request::builder()
            .method("GET")
            .uri("/api/query")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(res.into_body()).await,
            json!({ "error": "Method not allowed" })
        );
    }

    #[tokio::test]
    async fn options_preflight_succeeds_with_cors_headers() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/query")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn unconfigured_service_still_answers_degraded() {
        let res = app()
            .oneshot(post_query(json!({ "question": "What is Physical AI?" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res.into_body()).await;
        assert!(body["answer"].as_str().unwrap().contains("unavailable"));
        assert_eq!(body["sources"][0]["chunk_id"], "placeholder-0");
        assert_eq!(body["chapter_id"], Value::Null);
        assert!(body["query_time_ms"].is_number());
        assert_eq!(body["educational_metadata"]["questionType"], "definition");
        assert_eq!(body["educational_metadata"]["complexity"], "simple");
        assert_eq!(body["educational_metadata"]["needsStructure"], false);
    }

    #[tokio::test]
    async fn context_only_query_carries_context_citation() {
        let res = app()
            .oneshot(post_query(json!({
                "question": "Summarize this passage.",
                "context": "ROS 2 nodes communicate over DDS topics.",
                "use_context_only": true,
                "chapter_id": 3,
            })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res.into_body()).await;
        assert_eq!(body["chapter_id"], 3);
        assert_eq!(body["sources"][0]["chunk_id"], "context-based");
        assert_eq!(body["sources"][0]["chapter_id"], 3);
        assert_eq!(body["sources"][0]["section_title"], "Selected Text Context");
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = body_json(res.into_body()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["collaborators"]["generation"]["configured"], false);
        assert_eq!(
            body["collaborators"]["structured_store"]["configured"],
            false
        );
    }
}
