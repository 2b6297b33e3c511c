//! `semantic_search` (§4.10): embed the query, search the vector index,
//! re-hydrate hits via the store, and apply post-filters the index itself
//! has no notion of (distance ceiling, source type, path substring).

use super::errors::{ErrorCode, ErrorPayload, OrchestratorResult};
use crate::domain::ports::{AnnIndex, ChunkRequest, EmbeddingProvider, PersistentStore};
use crate::domain::types::{Chunk, SourceType};
use crate::worker::FALLBACK_MODEL_NAME;

/// Post-filters applied to raw vector-index hits before they are returned.
#[derive(Debug, Clone, Default)]
pub struct SemanticSearchOptions {
    pub max_distance: Option<f32>,
    pub source_type: Option<SourceType>,
    pub file_path_substring: Option<String>,
}

/// One re-hydrated semantic search result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SemanticHit {
    pub chunk: Chunk,
    pub file_relative_path: String,
    pub distance: f32,
    /// `true` when either the query or the matched chunk was embedded by
    /// the deterministic pseudo-embedding fallback rather than a real
    /// model (§9 open question 2) — the distance is not semantically
    /// meaningful in that case, only dense-enough to keep the index full.
    pub approximate: bool,
}

/// Embed `query`, search `index` for the `k` nearest chunks, re-hydrate
/// each hit via `store`, and drop anything `options` filters out.
pub async fn semantic_search(
    store: &dyn PersistentStore,
    index: &dyn AnnIndex,
    embedding: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
    options: &SemanticSearchOptions,
) -> OrchestratorResult<Vec<SemanticHit>> {
    let responses = embedding
        .embed(&ChunkRequest {
            text: query.to_string(),
            model: None,
        })
        .await
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))?;
    let Some(response) = responses.into_iter().next() else {
        return Ok(Vec::new());
    };
    let query_vector = response.vector;
    let query_is_approximate = response.model == FALLBACK_MODEL_NAME;

    let raw_hits = index.search(&query_vector, k).map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))?;

    let mut hits = Vec::with_capacity(raw_hits.len());
    for (vector_id, distance) in raw_hits {
        if let Some(max_distance) = options.max_distance {
            if distance > max_distance {
                continue;
            }
        }
        let Some(chunk) = store
            .get_chunk_by_vector_id(vector_id)
            .await
            .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))?
        else {
            continue;
        };
        if let Some(wanted) = options.source_type {
            if chunk.source_type != wanted {
                continue;
            }
        }
        let Some(file) = store.get_file(chunk.file_id).await.map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))?
        else {
            continue;
        };
        if let Some(substring) = &options.file_path_substring {
            if !file.relative_path.contains(substring.as_str()) {
                continue;
            }
        }
        let approximate = query_is_approximate || chunk.embedding_model.as_deref() == Some(FALLBACK_MODEL_NAME);
        hits.push(SemanticHit {
            chunk,
            file_relative_path: file.relative_path,
            distance,
            approximate,
        });
    }
    Ok(hits)
}
