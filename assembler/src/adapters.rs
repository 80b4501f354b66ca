//! Production adapters binding the collaborator traits to the client crates.
//!
//! Each adapter holds an `Option` of its client: a service left unconfigured
//! at startup yields [`CollaboratorError::Unconfigured`] on every call, and
//! the fallback policy degrades from there. The process always starts.

use async_trait::async_trait;
use chunk_store::{ChunkStore, PassageRow};
use llm_service::ChatClient;
use vector_store::{PassageHit, VectorStore};

use crate::collaborators::{AnswerEnhancer, AnswerGenerator, PassageStore, VectorIndex};
use crate::error::CollaboratorError;
use crate::prompt;
use crate::types::SourceCitation;

/// Full-text passage lookup over the Postgres chunk metadata table.
pub struct StructuredStoreAdapter {
    store: Option<ChunkStore>,
}

impl StructuredStoreAdapter {
    pub fn new(store: Option<ChunkStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PassageStore for StructuredStoreAdapter {
    async fn find_passages(
        &self,
        question: &str,
        chapter_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<SourceCitation>, CollaboratorError> {
        let store = self.store.as_ref().ok_or(CollaboratorError::Unconfigured {
            service: "structured passage store",
        })?;
        let rows = store
            .search_passages(question, chapter_id, limit)
            .await?;
        Ok(rows.into_iter().map(row_to_citation).collect())
    }
}

fn row_to_citation(row: PassageRow) -> SourceCitation {
    SourceCitation {
        chunk_id: row.chunk_id.to_string(),
        chapter_id: row.chapter_id,
        section_id: row.section_id,
        section_title: row.section_title,
        preview_text: row.preview_text,
        // ts_rank is unbounded above; citations carry a 0..=1 score.
        relevance_score: row.rank.clamp(0.0, 1.0),
    }
}

/// Embeds the question, then searches the Qdrant collection.
///
/// Two dependencies back one logical collaborator; whichever is missing or
/// failing surfaces as the vector index being down.
pub struct VectorIndexAdapter {
    embedder: Option<ChatClient>,
    index: Option<VectorStore>,
}

impl VectorIndexAdapter {
    pub fn new(embedder: Option<ChatClient>, index: Option<VectorStore>) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl VectorIndex for VectorIndexAdapter {
    async fn similar_passages(
        &self,
        question: &str,
        chapter_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<SourceCitation>, CollaboratorError> {
        let embedder = self.embedder.as_ref().ok_or(CollaboratorError::Unconfigured {
            service: "embedding service",
        })?;
        let index = self.index.as_ref().ok_or(CollaboratorError::Unconfigured {
            service: "vector index",
        })?;

        let embedding = embedder.embed(question).await?;
        let hits = index.nearest(embedding, limit as u64, chapter_id).await?;
        Ok(hits.into_iter().map(hit_to_citation).collect())
    }
}

fn hit_to_citation(hit: PassageHit) -> SourceCitation {
    SourceCitation {
        chunk_id: hit.chunk_id,
        chapter_id: hit.chapter_id,
        section_id: hit.section_id,
        section_title: hit.section_title,
        preview_text: hit.preview_text,
        relevance_score: hit.score,
    }
}

/// The single generation call per request.
pub struct GenerationAdapter {
    client: Option<ChatClient>,
}

impl GenerationAdapter {
    pub fn new(client: Option<ChatClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnswerGenerator for GenerationAdapter {
    async fn generate(&self, system: &str, user: &str) -> Result<String, CollaboratorError> {
        let client = self.client.as_ref().ok_or(CollaboratorError::Unconfigured {
            service: "generation service",
        })?;
        Ok(client.complete(Some(system), user).await?)
    }
}

/// Best-effort rewrite pass over the draft answer.
pub struct EnhancementAdapter {
    client: Option<ChatClient>,
}

impl EnhancementAdapter {
    pub fn new(client: Option<ChatClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnswerEnhancer for EnhancementAdapter {
    async fn enhance(&self, draft: &str) -> Result<String, CollaboratorError> {
        let client = self.client.as_ref().ok_or(CollaboratorError::Unconfigured {
            service: "enhancement service",
        })?;
        Ok(client.complete(Some(prompt::ENHANCER_SYSTEM), draft).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_adapters_name_their_service() {
        let store = StructuredStoreAdapter::new(None);
        let err = store.find_passages("q", None, 5).await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::Unconfigured {
                service: "structured passage store"
            }
        ));

        let vectors = VectorIndexAdapter::new(None, None);
        let err = vectors.similar_passages("q", None, 5).await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::Unconfigured {
                service: "embedding service"
            }
        ));

        let generator = GenerationAdapter::new(None);
        let err = generator.generate("s", "u").await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::Unconfigured {
                service: "generation service"
            }
        ));

        let enhancer = EnhancementAdapter::new(None);
        let err = enhancer.enhance("draft").await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::Unconfigured {
                service: "enhancement service"
            }
        ));
    }
}
