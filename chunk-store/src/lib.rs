//! Postgres client for the `chunk_metadata` table.
//!
//! The structured store holds one row per indexed textbook passage. Lookup is
//! keyword-based full-text search (`plainto_tsquery`), optionally restricted
//! to a single chapter. The rank returned by Postgres is a keyword-overlap
//! style score and is not comparable with vector similarity scores.

mod errors;

pub use errors::ChunkStoreError;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::types::Uuid;
use sqlx::{FromRow, PgPool};
use tracing::{debug, trace};

/// One passage row returned by full-text lookup.
#[derive(Clone, Debug, FromRow)]
pub struct PassageRow {
    pub chunk_id: Uuid,
    pub chapter_id: i32,
    pub section_id: String,
    pub section_title: String,
    pub preview_text: String,
    /// `ts_rank` of the passage against the query terms.
    pub rank: f32,
}

/// Connection settings for the metadata database.
#[derive(Clone, Debug)]
pub struct ChunkStoreConfig {
    /// Postgres connection string (`DATABASE_URL`).
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl ChunkStoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Pooled client for passage metadata lookups.
pub struct ChunkStore {
    pool: PgPool,
}

impl ChunkStore {
    /// Builds a lazily connecting pool.
    ///
    /// No I/O happens here: an unreachable database shows up as a per-query
    /// error, which the caller degrades, never as a startup failure.
    ///
    /// # Errors
    /// Returns `ChunkStoreError::Config` when the URL cannot be parsed.
    pub fn connect_lazy(cfg: &ChunkStoreConfig) -> Result<Self, ChunkStoreError> {
        if cfg.database_url.trim().is_empty() {
            return Err(ChunkStoreError::Config("database_url is empty".into()));
        }
        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.acquire_timeout)
            .connect_lazy(&cfg.database_url)
            .map_err(ChunkStoreError::from)?;
        debug!("chunk store pool created (lazy)");
        Ok(Self { pool })
    }

    /// Full-text search for passages matching the question terms, best
    /// ranked first, optionally restricted to one chapter.
    ///
    /// # Errors
    /// Returns `ChunkStoreError::Database` on connection or query failure.
    pub async fn search_passages(
        &self,
        question: &str,
        chapter_id: Option<i32>,
        limit: usize,
    ) -> Result<Vec<PassageRow>, ChunkStoreError> {
        let terms = sanitize_terms(question);
        trace!("search_passages terms={terms:?} chapter={chapter_id:?} limit={limit}");
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PassageRow>(
            r#"
            SELECT chunk_id, chapter_id, section_id, section_title, preview_text,
                   ts_rank(
                       to_tsvector('english', section_title || ' ' || preview_text),
                       plainto_tsquery('english', $1)
                   ) AS rank
            FROM chunk_metadata
            WHERE to_tsvector('english', section_title || ' ' || preview_text)
                      @@ plainto_tsquery('english', $1)
              AND ($2::int IS NULL OR chapter_id = $2)
            ORDER BY rank DESC
            LIMIT $3
            "#,
        )
        .bind(&terms)
        .bind(chapter_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!("search_passages returned {} rows", rows.len());
        Ok(rows)
    }

    /// Cheap liveness probe (`SELECT 1`).
    pub async fn health(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

/// Normalizes question text into search terms: drops control characters,
/// collapses whitespace, and caps the length Postgres has to tokenize.
fn sanitize_terms(question: &str) -> String {
    const MAX_TERM_CHARS: usize = 200;

    let cleaned: String = question
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TERM_CHARS)
        .collect()
}
