//! `HttpEmbeddingProvider`: the real implementation behind the external
//! chunker/embedder contract (§1: "modeled as an abstract
//! `EmbeddingProvider`... the external embedding/chunking service" is out
//! of core scope, but the HTTP seam itself still needs a concrete adapter
//! so the rest of the pipeline has something real to call in production).

use crate::domain::error::{Error, Result};
use crate::domain::ports::{ChunkRequest, ChunkResponse, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct EmbedRequestBody<'a> {
    text: &'a str,
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponseBody {
    chunks: Vec<ChunkResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ChunkResponseBody {
    text: String,
    vector: Vec<f32>,
    model: String,
    #[serde(default)]
    score: Option<f32>,
}

impl From<ChunkResponseBody> for ChunkResponse {
    fn from(body: ChunkResponseBody) -> Self {
        ChunkResponse {
            text: body.text,
            vector: body.vector,
            model: body.model,
            score: body.score,
        }
    }
}

/// Talks to an external chunker/embedder service over HTTP, per
/// [`crate::config::EmbeddingConfig`]'s `endpoint`/`timeout_seconds`.
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: String,
    dimensions: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, dimensions: usize) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|err| Error::embedding(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, request: &ChunkRequest) -> Result<Vec<ChunkResponse>> {
        let body = EmbedRequestBody {
            text: &request.text,
            model: request.model.as_deref(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| Error::embedding(format!("request to {} failed: {err}", self.endpoint)))?;
        if !response.status().is_success() {
            return Err(Error::embedding(format!("{} returned status {}", self.endpoint, response.status())));
        }
        let parsed: EmbedResponseBody = response.json().await.map_err(|err| Error::embedding(format!("malformed response body: {err}")))?;
        Ok(parsed.chunks.into_iter().map(ChunkResponse::from).collect())
    }

    async fn embed_batch(&self, requests: &[ChunkRequest]) -> Result<Vec<Vec<ChunkResponse>>> {
        let mut out = Vec::with_capacity(requests.len());
        for request in requests {
            out.push(self.embed(request).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}
