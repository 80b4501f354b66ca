//! Best-effort endpoint health probe.
//!
//! Probes `GET {endpoint}/models`, which every OpenAI-compatible service
//! exposes. The probe never fails: any error is folded into an
//! `ok = false` snapshot suitable for a `/health` endpoint.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::LlmModelConfig;
use crate::error::make_snippet;

/// Serializable health snapshot for one endpoint/model pair.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointHealth {
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

/// Probes the endpoint and reports the outcome.
pub async fn probe_endpoint(cfg: &LlmModelConfig) -> EndpointHealth {
    let endpoint = cfg.endpoint.trim();
    if endpoint.is_empty()
        || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return EndpointHealth {
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok: false,
            latency_ms: 0,
            message: "endpoint is empty or missing http/https".into(),
        };
    }

    let url = format!("{}/models", endpoint.trim_end_matches('/'));
    let started = Instant::now();

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return EndpointHealth {
                endpoint: cfg.endpoint.clone(),
                model: cfg.model.clone(),
                ok: false,
                latency_ms: 0,
                message: format!("client build failed: {e}"),
            };
        }
    };

    let mut req = client.get(&url);
    if let Some(key) = &cfg.api_key {
        req = req.bearer_auth(key);
    }

    let (ok, message) = match req.send().await {
        Ok(resp) if resp.status().is_success() => (true, "reachable".to_string()),
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            (false, format!("HTTP {status}: {}", make_snippet(&body)))
        }
        Err(e) => (false, format!("unreachable: {e}")),
    };

    let latency_ms = started.elapsed().as_millis();
    if ok {
        info!(endpoint = %cfg.endpoint, model = %cfg.model, latency_ms, "health probe ok");
    } else {
        warn!(endpoint = %cfg.endpoint, model = %cfg.model, latency_ms, %message, "health probe failed");
    }

    EndpointHealth {
        endpoint: cfg.endpoint.clone(),
        model: cfg.model.clone(),
        ok,
        latency_ms,
        message,
    }
}
