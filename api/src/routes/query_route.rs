//! `POST /api/query`, the main question-answering endpoint.

use assembler::{Query, SourceCitation};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Json, http::Method};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::app_state::AppState;
use crate::error_handler::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub use_context_only: bool,
    #[serde(default)]
    pub chapter_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
    pub chapter_id: Option<i32>,
    pub query_time_ms: f64,
    pub educational_metadata: EducationalMetadata,
}

/// Heuristic hints the frontend uses to lay out the answer.
///
/// Derived from the question alone, before any retrieval happens, so they
/// are stable even when the pipeline degrades.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationalMetadata {
    pub question_type: &'static str,
    pub complexity: &'static str,
    pub estimated_word_count: &'static str,
    pub needs_structure: bool,
}

impl EducationalMetadata {
    pub fn for_question(question: &str) -> Self {
        let lower = question.trim().to_lowercase();
        let question_type = if lower.starts_with("what is") || lower.starts_with("what are") {
            "definition"
        } else {
            "explanation"
        };
        let simple = question.trim().chars().count() < 50;
        Self {
            question_type,
            complexity: if simple { "simple" } else { "moderate" },
            estimated_word_count: if simple { "< 300" } else { "300-500" },
            needs_structure: !simple,
        }
    }
}

pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<QueryResponse>> {
    let Json(req) = payload?;
    let q = Query {
        question: req.question,
        context: req.context,
        use_context_only: req.use_context_only,
        chapter_scope: req.chapter_id,
    };

    let result = state.assembler.assemble(&q).await?;
    info!(
        chapter = ?req.chapter_id,
        sources = result.sources.len(),
        timing_ms = result.timing_ms,
        "query answered"
    );

    Ok(Json(QueryResponse {
        answer: result.answer,
        sources: result.sources,
        chapter_id: req.chapter_id,
        query_time_ms: (result.timing_ms * 10.0).round() / 10.0,
        educational_metadata: EducationalMetadata::for_question(&q.question),
    }))
}

/// Fallback for `/api/query` with any method other than POST.
///
/// OPTIONS gets an empty 200 so CORS preflights succeed; everything else is
/// a 405 with the fixed error body.
pub async fn method_not_allowed(method: Method) -> AppResult<()> {
    if method == Method::OPTIONS {
        Ok(())
    } else {
        Err(AppError::MethodNotAllowed)
    }
}
