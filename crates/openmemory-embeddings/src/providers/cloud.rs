//! Cloud embedding providers (OpenAI, Gemini): HTTP batch calls with
//! per-provider rate-limit handling — retry-after server hint, exponential
//! backoff, max 3 attempts, 429-triggered unhealthy mark for 5 minutes.

use std::time::Duration;

use async_trait::async_trait;
use openmemory_core::errors::{OmError, OmResult};
use openmemory_core::traits::EmbeddingProvider;
use reqwest::{Client, StatusCode};

use crate::health::HealthTracker;

const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudKind {
    OpenAi,
    Gemini,
}

/// A single cloud provider. `CloudKind` only changes the request/response
/// shape in `encode_request`/`decode_response`; the retry/backoff/health
/// machinery is shared.
pub struct CloudProvider {
    kind: CloudKind,
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    timeout: Duration,
    health: HealthTracker,
}

impl CloudProvider {
    pub fn new(kind: CloudKind, base_url: String, api_key: String, model: String, dimensions: usize, timeout_secs: u64) -> Self {
        Self {
            kind,
            client: Client::new(),
            base_url,
            api_key,
            model,
            dimensions,
            timeout: Duration::from_secs(timeout_secs),
            health: HealthTracker::new(),
        }
    }

    fn request_url(&self) -> String {
        match self.kind {
            CloudKind::OpenAi => format!("{}/embeddings", self.base_url),
            CloudKind::Gemini => format!("{}/models/{}:batchEmbedContents?key={}", self.base_url, self.model, self.api_key),
        }
    }

    fn build_request(&self, texts: &[String]) -> serde_json::Value {
        match self.kind {
            CloudKind::OpenAi => serde_json::json!({ "model": self.model, "input": texts }),
            CloudKind::Gemini => serde_json::json!({
                "requests": texts.iter().map(|t| serde_json::json!({
                    "model": format!("models/{}", self.model),
                    "content": { "parts": [{ "text": t }] }
                })).collect::<Vec<_>>()
            }),
        }
    }

    fn parse_response(&self, body: &serde_json::Value) -> OmResult<Vec<Vec<f32>>> {
        match self.kind {
            CloudKind::OpenAi => body
                .get("data")
                .and_then(|d| d.as_array())
                .map(|arr| {
                    arr.iter()
                        .map(|item| {
                            item.get("embedding")
                                .and_then(|e| e.as_array())
                                .map(|v| v.iter().filter_map(|x| x.as_f64()).map(|x| x as f32).collect())
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .ok_or_else(|| OmError::Internal("openai response missing data[].embedding".into())),
            CloudKind::Gemini => body
                .get("embeddings")
                .and_then(|d| d.as_array())
                .map(|arr| {
                    arr.iter()
                        .map(|item| {
                            item.get("values")
                                .and_then(|e| e.as_array())
                                .map(|v| v.iter().filter_map(|x| x.as_f64()).map(|x| x as f32).collect())
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .ok_or_else(|| OmError::Internal("gemini response missing embeddings[].values".into())),
        }
    }

    async fn call_with_retry(&self, texts: &[String]) -> OmResult<Vec<Vec<f32>>> {
        let mut backoff = Duration::from_secs(1);
        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let req = self
                .client
                .post(self.request_url())
                .timeout(self.timeout)
                .bearer_auth(&self.api_key)
                .json(&self.build_request(texts));

            match req.send().await {
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    self.health.mark_unhealthy();
                    let retry_after = resp
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(backoff);
                    tracing::warn!(provider = self.name(), attempt, "rate limited, backing off");
                    last_err = Some(OmError::Internal(format!("{} rate limited", self.name())));
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(retry_after).await;
                        backoff *= 2;
                    }
                }
                Ok(resp) if resp.status().is_success() => {
                    let body: serde_json::Value =
                        resp.json().await.map_err(|e| OmError::Internal(format!("{}: bad json: {e}", self.name())))?;
                    return self.parse_response(&body);
                }
                Ok(resp) => {
                    last_err = Some(OmError::Internal(format!("{} http {}", self.name(), resp.status())));
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
                Err(e) => {
                    last_err = Some(OmError::Internal(format!("{}: {e}", self.name())));
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| OmError::Internal(format!("{} exhausted retries", self.name()))))
    }
}

#[async_trait]
impl EmbeddingProvider for CloudProvider {
    async fn embed_one(&self, text: &str) -> OmResult<Vec<f32>> {
        let mut vecs = self.call_with_retry(std::slice::from_ref(&text.to_string())).await?;
        vecs.pop().ok_or_else(|| OmError::Internal(format!("{} returned no embedding", self.name())))
    }

    async fn embed_batch(&self, texts: &[String]) -> OmResult<Vec<Vec<f32>>> {
        self.call_with_retry(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        match self.kind {
            CloudKind::OpenAi => "openai",
            CloudKind::Gemini => "gemini",
        }
    }

    fn is_available(&self) -> bool {
        self.health.is_healthy()
    }
}
