//! `GET /health`, a per-collaborator readiness snapshot.

use axum::Json;
use axum::extract::State;
use llm_service::probe_endpoint;
use serde_json::{Value, json};

use crate::core::app_state::AppState;

/// Reports which collaborators are configured, and probes the generation
/// endpoint when one is. Always 200: a degraded service still serves.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let cfg = &state.config;

    let generation = match &state.generation_cfg {
        Some(llm_cfg) => {
            let probe = probe_endpoint(llm_cfg).await;
            json!({
                "configured": true,
                "model": probe.model,
                "ok": probe.ok,
                "latency_ms": probe.latency_ms,
                "message": probe.message,
            })
        }
        None => json!({ "configured": false }),
    };

    Json(json!({
        "status": "ok",
        "collaborators": {
            "structured_store": { "configured": cfg.database_url.is_some() },
            "vector_index": {
                "configured": cfg.qdrant_url.is_some(),
                "collection": cfg.qdrant_collection,
            },
            "embedding": {
                "configured": cfg.embedding_llm().is_some(),
                "dim": cfg.embedding_dim,
            },
            "generation": generation,
            "enhancement": { "configured": cfg.enhancer_llm().is_some() },
        },
    }))
}
