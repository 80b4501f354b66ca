//! Thin adapter around `qdrant-client` to isolate API usage.

use crate::config::VectorStoreConfig;
use crate::errors::VectorStoreError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{Filter, SearchPointsBuilder, Value as QValue};
use tracing::debug;

/// Facade over the Qdrant client so the rest of the code never sees the
/// builder pattern or raw payload maps.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Supports optional API key authentication for Qdrant Cloud.
    pub fn new(cfg: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url).timeout(cfg.timeout);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| VectorStoreError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Performs a similarity search and returns `(score, payload)` tuples
    /// sorted by score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<(f32, serde_json::Value)>, VectorStoreError> {
        debug!(
            "searching '{}' top_k={} filtered={}",
            self.collection,
            top_k,
            filter.is_some()
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| VectorStoreError::Qdrant(e.to_string()))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            let payload = qpayload_to_json(r.payload);
            out.push((r.score, payload));
        }

        debug!("search returned {} hits", out.len());
        Ok(out)
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
///
/// Unsupported nested objects/arrays map to `Null`.
fn qpayload_to_json(mut p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            None => serde_json::Value::Null,
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
