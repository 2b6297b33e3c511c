//! Wraps an [`EmbeddingProvider`] with the circuit breaker and the
//! deterministic fallback (§4.8), so the rest of the pipeline can keep
//! calling `embed`/`embed_batch` during an outage without knowing about
//! either.

use super::circuit_breaker::CircuitBreaker;
use super::fallback::{pseudo_embed, FALLBACK_MODEL_NAME};
use crate::domain::error::Result;
use crate::domain::ports::{ChunkRequest, ChunkResponse, EmbeddingProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use tracing::Instrument;

/// Decorates an [`EmbeddingProvider`] with circuit-breaking and a
/// deterministic pseudo-embedding fallback while the circuit is open.
pub struct ResilientEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    breaker: CircuitBreaker,
}

impl ResilientEmbeddingProvider {
    /// Wrap `inner`, guarded by a fresh circuit breaker built from `config`.
    pub fn new(inner: Arc<dyn EmbeddingProvider>, config: crate::config::CircuitBreakerConfig) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(config),
        }
    }

    fn fallback_response(&self, text: &str) -> ChunkResponse {
        ChunkResponse {
            text: text.to_string(),
            vector: pseudo_embed(text, self.inner.dimensions()),
            model: FALLBACK_MODEL_NAME.to_string(),
            score: None,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for ResilientEmbeddingProvider {
    async fn embed(&self, request: &ChunkRequest) -> Result<Vec<ChunkResponse>> {
        if !self.breaker.is_call_permitted() {
            warn!(provider = self.inner.provider_name(), "circuit open, substituting pseudo-embedding");
            return Ok(vec![self.fallback_response(&request.text)]);
        }
        match self
            .inner
            .embed(request)
            .instrument(tracing::debug_span!("embedding_call", provider = self.inner.provider_name()))
            .await
        {
            Ok(responses) => {
                self.breaker.record_success();
                Ok(responses)
            }
            Err(err) => {
                self.breaker.record_failure();
                if self.breaker.is_call_permitted() {
                    Err(err)
                } else {
                    warn!(provider = self.inner.provider_name(), %err, "embedding call failed, substituting pseudo-embedding");
                    Ok(vec![self.fallback_response(&request.text)])
                }
            }
        }
    }

    async fn embed_batch(&self, requests: &[ChunkRequest]) -> Result<Vec<Vec<ChunkResponse>>> {
        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            out.push(self.embed(request).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
