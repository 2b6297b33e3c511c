//! `ResilientEmbeddingProvider`'s own behavior: a circuit that opens after
//! consecutive failures and substitutes the deterministic pseudo-embedding
//! fallback, so the rest of the pipeline never sees the outage.

use codeloom::config::CircuitBreakerConfig;
use codeloom::domain::error::{Error, Result};
use codeloom::domain::ports::{ChunkRequest, ChunkResponse, EmbeddingProvider};
use codeloom::worker::{ResilientEmbeddingProvider, FALLBACK_MODEL_NAME};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FlakyProvider {
    calls: AtomicUsize,
    fail_first: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyProvider {
    async fn embed(&self, request: &ChunkRequest) -> Result<Vec<ChunkResponse>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(Error::embedding("embedding service unavailable"));
        }
        Ok(vec![ChunkResponse {
            text: request.text.clone(),
            vector: vec![1.0, 0.0],
            model: "real-model".to_string(),
            score: None,
        }])
    }

    async fn embed_batch(&self, requests: &[ChunkRequest]) -> Result<Vec<Vec<ChunkResponse>>> {
        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            out.push(self.embed(request).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn provider_name(&self) -> &str {
        "flaky"
    }
}

fn breaker_config() -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 2,
        recovery_timeout: 999,
        success_threshold: 1,
        initial_backoff: 1.0,
        max_backoff: 60.0,
        backoff_multiplier: 2.0,
    }
}

#[tokio::test]
async fn failures_below_the_threshold_still_propagate_the_underlying_error() {
    let inner = Arc::new(FlakyProvider {
        calls: AtomicUsize::new(0),
        fail_first: 10,
    });
    let provider = ResilientEmbeddingProvider::new(inner, breaker_config());

    let err = provider.embed(&ChunkRequest { text: "x".to_string(), model: None }).await.unwrap_err();
    assert!(matches!(err, Error::Embedding { .. }));
}

#[tokio::test]
async fn the_circuit_opens_after_the_failure_threshold_and_substitutes_the_fallback() {
    let inner = Arc::new(FlakyProvider {
        calls: AtomicUsize::new(0),
        fail_first: 10,
    });
    let provider = ResilientEmbeddingProvider::new(inner, breaker_config());

    assert!(provider.embed(&ChunkRequest { text: "a".to_string(), model: None }).await.is_err());
    let responses = provider.embed(&ChunkRequest { text: "b".to_string(), model: None }).await.unwrap();
    assert_eq!(responses[0].model, FALLBACK_MODEL_NAME);

    let responses = provider.embed(&ChunkRequest { text: "c".to_string(), model: None }).await.unwrap();
    assert_eq!(responses[0].model, FALLBACK_MODEL_NAME);
}

#[tokio::test]
async fn a_recovered_provider_is_used_again_once_calls_succeed() {
    let inner = Arc::new(FlakyProvider {
        calls: AtomicUsize::new(0),
        fail_first: 2,
    });
    let mut config = breaker_config();
    // Recovery is immediate, so the failure that trips the breaker also
    // flips it straight to half-open and its own error still propagates.
    config.recovery_timeout = 0;
    let provider = ResilientEmbeddingProvider::new(inner, config);

    assert!(provider.embed(&ChunkRequest { text: "a".to_string(), model: None }).await.is_err());
    assert!(provider.embed(&ChunkRequest { text: "b".to_string(), model: None }).await.is_err());

    let recovered = provider.embed(&ChunkRequest { text: "c".to_string(), model: None }).await.unwrap();
    assert_eq!(recovered[0].model, "real-model");
}
