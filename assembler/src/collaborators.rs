//! Trait seams for the four external collaborators.
//!
//! The pipeline only sees these traits; production adapters live in
//! [`crate::adapters`], and tests plug in mocks. Every method returns a
//! uniform [`CollaboratorError`] so the fallback policy can be applied
//! without caring which concrete client failed.

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::types::SourceCitation;

/// Structured passage store: keyword/metadata lookup over textbook chunks.
#[async_trait]
pub trait PassageStore: Send + Sync {
    async fn find_passages(
        &self,
        question: &str,
        chapter_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<SourceCitation>, CollaboratorError>;
}

/// Vector index: embedding-based nearest-neighbor lookup.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn similar_passages(
        &self,
        question: &str,
        chapter_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<SourceCitation>, CollaboratorError>;
}

/// Chat-completion style generation service.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, CollaboratorError>;
}

/// Optional post-processing pass over the draft answer.
#[async_trait]
pub trait AnswerEnhancer: Send + Sync {
    async fn enhance(&self, draft: &str) -> Result<String, CollaboratorError>;
}
