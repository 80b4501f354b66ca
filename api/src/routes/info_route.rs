//! `GET /`, a small service description for anyone poking the root URL.

use axum::Json;
use serde_json::{Value, json};

pub async fn info() -> Json<Value> {
    Json(json!({
        "service": "Physical AI Textbook Chatbot API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/query": "Ask a question about the textbook",
            "GET /health": "Collaborator readiness snapshot",
        },
    }))
}
