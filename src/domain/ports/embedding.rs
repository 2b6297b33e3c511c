use crate::domain::error::Result;
use async_trait::async_trait;

/// A unit of prose submitted to the external chunker/embedder.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    /// Raw text to chunk and/or embed.
    pub text: String,
    /// Embedding model requested, if the caller wants to pin one.
    pub model: Option<String>,
}

/// What the external chunker/embedder returned for one [`ChunkRequest`].
///
/// A provider may return more than one sub-chunk per request (a long
/// docstring split into paragraphs); each carries its own vector.
#[derive(Debug, Clone)]
pub struct ChunkResponse {
    /// Chunk text, possibly a sub-span of the request text.
    pub text: String,
    /// Embedding vector, unit scale left to the provider.
    pub vector: Vec<f32>,
    /// Model id that produced `vector`.
    pub model: String,
    /// Relevance score, only meaningful when returned from a search call.
    pub score: Option<f32>,
}

/// Business contract for the external embedding/chunking service.
///
/// This is the seam the circuit breaker in [`crate::worker`] wraps: callers
/// never talk to a concrete HTTP client directly, so a deterministic
/// fallback (see [`crate::worker::fallback`]) can stand in during an
/// outage without the rest of the pipeline knowing.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Chunk and embed a single text, returning one or more sub-chunks.
    async fn embed(&self, request: &ChunkRequest) -> Result<Vec<ChunkResponse>>;

    /// Batch form of [`EmbeddingProvider::embed`]; a provider with no native
    /// batch endpoint may implement this by looping.
    async fn embed_batch(&self, requests: &[ChunkRequest]) -> Result<Vec<Vec<ChunkResponse>>>;

    /// Fixed vector dimension this provider produces.
    fn dimensions(&self) -> usize;

    /// Provider name, for logging and `approximate` attribution.
    fn provider_name(&self) -> &str;

    /// Cheap liveness probe; default implementation performs a trivial embed.
    async fn health_check(&self) -> Result<()> {
        self.embed(&ChunkRequest {
            text: "health check".to_string(),
            model: None,
        })
        .await?;
        Ok(())
    }
}
