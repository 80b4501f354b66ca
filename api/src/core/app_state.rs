//! Application configuration and shared handler state.

use std::sync::Arc;
use std::time::Duration;

use assembler::{
    AssembleOptions, Assembler, EnhancementAdapter, GenerationAdapter, StructuredStoreAdapter,
    VectorIndexAdapter,
};
use chunk_store::{ChunkStore, ChunkStoreConfig};
use llm_service::{ChatClient, LlmModelConfig};
use tracing::warn;
use vector_store::{VectorStore, VectorStoreConfig};

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

/// All environment-driven settings, read once at startup.
///
/// A missing variable marks the corresponding service unconfigured; it never
/// prevents the process from starting.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_address: String,
    pub database_url: Option<String>,
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub qdrant_collection: String,
    pub openrouter_url: String,
    pub openrouter_api_key: Option<String>,
    pub generation_model: String,
    pub enhancer_url: Option<String>,
    pub enhancer_api_key: Option<String>,
    pub enhancer_model: Option<String>,
    pub embedding_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: Option<String>,
    pub embedding_dim: u32,
    pub llm_timeout_secs: u64,
    pub rag_top_k: usize,
}

impl AppConfig {
    /// Loads settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_address: env_or("API_ADDRESS", "0.0.0.0:8001"),
            database_url: env_opt("DATABASE_URL"),
            qdrant_url: env_opt("QDRANT_URL"),
            qdrant_api_key: env_opt("QDRANT_API_KEY"),
            qdrant_collection: env_or("QDRANT_COLLECTION", "textbook_chunks"),
            openrouter_url: env_or("OPENROUTER_URL", "https://openrouter.ai/api/v1"),
            openrouter_api_key: env_opt("OPENROUTER_API_KEY"),
            generation_model: env_or("GENERATION_MODEL", "google/gemini-2.5-flash"),
            enhancer_url: env_opt("ENHANCER_URL"),
            enhancer_api_key: env_opt("ENHANCER_API_KEY"),
            enhancer_model: env_opt("ENHANCER_MODEL"),
            embedding_url: env_opt("EMBEDDING_URL"),
            embedding_api_key: env_opt("EMBEDDING_API_KEY"),
            embedding_model: env_opt("EMBEDDING_MODEL"),
            embedding_dim: env_opt("EMBEDDING_DIM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(384),
            llm_timeout_secs: env_opt("LLM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
            rag_top_k: env_opt("RAG_TOP_K").and_then(|v| v.parse().ok()).unwrap_or(5),
        }
    }

    /// A config with every external service missing. Test-only convenience.
    pub fn unconfigured() -> Self {
        Self {
            api_address: "127.0.0.1:0".to_string(),
            database_url: None,
            qdrant_url: None,
            qdrant_api_key: None,
            qdrant_collection: "textbook_chunks".to_string(),
            openrouter_url: "https://openrouter.ai/api/v1".to_string(),
            openrouter_api_key: None,
            enhancer_url: None,
            enhancer_api_key: None,
            enhancer_model: None,
            embedding_url: None,
            embedding_api_key: None,
            embedding_model: None,
            embedding_dim: 384,
            generation_model: "google/gemini-2.5-flash".to_string(),
            llm_timeout_secs: 8,
            rag_top_k: 5,
        }
    }

    /// Generation model config, present only when an API key is set.
    pub fn generation_llm(&self) -> Option<LlmModelConfig> {
        let api_key = self.openrouter_api_key.clone()?;
        let mut cfg = LlmModelConfig::new(&self.generation_model, &self.openrouter_url);
        cfg.api_key = Some(api_key);
        cfg.temperature = Some(0.3);
        cfg.max_tokens = Some(800);
        cfg.timeout_secs = self.llm_timeout_secs;
        Some(cfg)
    }

    /// Enhancement model config, present only when both URL and model are set.
    pub fn enhancer_llm(&self) -> Option<LlmModelConfig> {
        let url = self.enhancer_url.clone()?;
        let model = self.enhancer_model.clone()?;
        let mut cfg = LlmModelConfig::new(model, url);
        cfg.api_key = self.enhancer_api_key.clone();
        cfg.temperature = Some(0.2);
        cfg.timeout_secs = self.llm_timeout_secs;
        Some(cfg)
    }

    /// Embedding model config, present only when both URL and model are set.
    pub fn embedding_llm(&self) -> Option<LlmModelConfig> {
        let url = self.embedding_url.clone()?;
        let model = self.embedding_model.clone()?;
        let mut cfg = LlmModelConfig::new(model, url);
        cfg.api_key = self.embedding_api_key.clone();
        cfg.timeout_secs = self.llm_timeout_secs;
        Some(cfg)
    }
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub assembler: Assembler,
    /// Generation endpoint config kept around for the health probe.
    pub generation_cfg: Option<LlmModelConfig>,
}

impl AppState {
    /// Wires every configured client into the assembler.
    ///
    /// Each client that fails to build, or is not configured at all, becomes
    /// `None` in its adapter; the assembler degrades per its fallback policy.
    pub fn new(config: AppConfig) -> Self {
        let store = config.database_url.as_ref().and_then(|url| {
            let mut cfg = ChunkStoreConfig::new(url);
            cfg.acquire_timeout = Duration::from_secs(config.llm_timeout_secs);
            ChunkStore::connect_lazy(&cfg)
                .map_err(|e| warn!(error = %e, "chunk store disabled"))
                .ok()
        });

        let vectors = config.qdrant_url.as_ref().and_then(|url| {
            let mut cfg = VectorStoreConfig::new(url.clone(), config.qdrant_collection.clone());
            cfg.api_key = config.qdrant_api_key.clone();
            cfg.timeout = Duration::from_secs(config.llm_timeout_secs);
            VectorStore::new(&cfg)
                .map_err(|e| warn!(error = %e, "vector store disabled"))
                .ok()
        });

        let build_client = |cfg: Option<LlmModelConfig>, role: &str| {
            cfg.and_then(|cfg| {
                ChatClient::new(cfg)
                    .map_err(|e| warn!(role, error = %e, "llm client disabled"))
                    .ok()
            })
        };
        let generation_cfg = config.generation_llm();
        let generator = build_client(generation_cfg.clone(), "generation");
        let enhancer = build_client(config.enhancer_llm(), "enhancement");
        let embedder = build_client(config.embedding_llm(), "embedding");

        let assembler = Assembler::new(
            Arc::new(StructuredStoreAdapter::new(store)),
            Arc::new(VectorIndexAdapter::new(embedder, vectors)),
            Arc::new(GenerationAdapter::new(generator)),
            Arc::new(EnhancementAdapter::new(enhancer)),
            AssembleOptions {
                top_k: config.rag_top_k,
                retrieval_timeout: Duration::from_secs(config.llm_timeout_secs),
            },
        );

        Self {
            config: Arc::new(config),
            assembler,
            generation_cfg,
        }
    }
}
