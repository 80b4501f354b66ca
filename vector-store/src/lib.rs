//! Read-side facade over a Qdrant collection of textbook passages.
//!
//! This crate only searches; corpus ingestion happens elsewhere. The facade
//! hides the verbose builder API of `qdrant-client` and decodes point payloads
//! into typed [`PassageHit`] values so callers never touch raw JSON.

mod config;
mod errors;
mod facade;
mod filters;
mod hit;

pub use config::VectorStoreConfig;
pub use errors::VectorStoreError;
pub use hit::PassageHit;

use tracing::trace;

/// Entry point for similarity search against the passage collection.
pub struct VectorStore {
    client: facade::QdrantFacade,
}

impl VectorStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `VectorStoreError::Config` if the config is invalid or the
    /// client cannot be initialized.
    pub fn new(cfg: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        trace!("VectorStore::new collection={}", cfg.collection);
        let client = facade::QdrantFacade::new(cfg)?;
        Ok(Self { client })
    }

    /// Finds the nearest passages for a precomputed query embedding,
    /// optionally restricted to one chapter.
    ///
    /// Hits come back in Qdrant score order; payload fields that are missing
    /// or of the wrong type decode to defaults rather than failing the search.
    ///
    /// # Errors
    /// Returns `VectorStoreError::Qdrant` on client failures.
    pub async fn nearest(
        &self,
        embedding: Vec<f32>,
        top_k: u64,
        chapter_id: Option<i32>,
    ) -> Result<Vec<PassageHit>, VectorStoreError> {
        trace!("VectorStore::nearest top_k={top_k} chapter={chapter_id:?}");
        let filter = chapter_id.map(filters::chapter_filter);
        let raw = self.client.search(embedding, top_k, filter).await?;
        Ok(raw
            .into_iter()
            .map(|(score, payload)| PassageHit::from_payload(score, &payload))
            .collect())
    }
}
