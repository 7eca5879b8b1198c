//! Local runtime provider: Ollama-style HTTP embedding endpoint (also
//! stands in for a transformer-pipeline CPU/GPU runtime — same wire shape).

use std::time::Duration;

use async_trait::async_trait;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::traits::EmbeddingProvider;
use reqwest::Client;

use crate::health::HealthTracker;

pub struct LocalProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
    health: HealthTracker,
}

impl LocalProvider {
    pub fn new(base_url: String, model: String, dimensions: usize, timeout_secs: u64) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
            dimensions,
            timeout: Duration::from_secs(timeout_secs),
            health: HealthTracker::new(),
        }
    }

    async fn embed_request(&self, text: &str) -> OmResult<Vec<f32>> {
        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .timeout(self.timeout)
            .json(&serde_json::json!({ "model": self.model, "prompt": text }))
            .send()
            .await
            .map_err(|e| {
                self.health.mark_unhealthy();
                OmError::Internal(format!("local provider unreachable: {e}"))
            })?;

        if !resp.status().is_success() {
            self.health.mark_unhealthy();
            return Err(OmError::Internal(format!("local provider http {}", resp.status())));
        }

        let body: serde_json::Value =
            resp.json().await.map_err(|e| OmError::Internal(format!("local provider bad json: {e}")))?;
        body.get("embedding")
            .and_then(|e| e.as_array())
            .map(|v| v.iter().filter_map(|x| x.as_f64()).map(|x| x as f32).collect())
            .ok_or_else(|| OmError::Internal("local provider response missing embedding".into()))
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    async fn embed_one(&self, text: &str) -> OmResult<Vec<f32>> {
        self.embed_request(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "local"
    }

    fn is_available(&self) -> bool {
        self.health.is_healthy()
    }
}
