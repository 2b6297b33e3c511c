//! Rebuild protocol (§4.7): regenerate a vector index from the authoritative
//! vectors held in the store, reassigning dense `vector_id`s as it goes.

use crate::domain::error::{Error, Result};
use crate::domain::ports::{AnnIndex, EmbeddingProvider, PersistentStore};
use crate::domain::types::ProjectId;
use tracing::{info, warn};

/// Outcome of [`rebuild`]: how many chunks were placed in the index, and
/// how many had no vector available (embedding provider also failed or is
/// disabled) and were skipped.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RebuildReport {
    /// Chunks successfully added to the fresh index.
    pub loaded: u64,
    /// Chunks skipped: no stored vector and the embedding provider could
    /// not produce one.
    pub missing: u64,
}

/// Run the five-step rebuild protocol for `project_id` (optionally scoped
/// further to `dataset_id`) against a freshly created, empty `index`.
///
/// `index` must already be an empty index of the right dimension; callers
/// create it with [`AnnIndex::create`] immediately before calling this.
pub async fn rebuild(
    store: &dyn PersistentStore,
    index: &mut dyn AnnIndex,
    embedding: Option<&dyn EmbeddingProvider>,
    project_id: ProjectId,
    dataset_id: Option<&str>,
) -> Result<RebuildReport> {
    let reassigned = store.reassign_dense_vector_ids(Some(project_id), dataset_id).await?;
    info!(reassigned, "reassigned dense vector ids ahead of rebuild");

    let chunks = store.get_all_chunks_for_rebuild(project_id, dataset_id).await?;
    let mut report = RebuildReport::default();

    for chunk in chunks {
        let Some(vector_id) = chunk.vector_id else {
            report.missing += 1;
            continue;
        };
        let vector = match chunk.embedding_vector {
            Some(vector) => vector,
            None => match embedding {
                Some(provider) => match provider
                    .embed(&crate::domain::ports::ChunkRequest {
                        text: chunk.text.clone(),
                        model: None,
                    })
                    .await
                {
                    Ok(mut responses) if !responses.is_empty() => {
                        let response = responses.remove(0);
                        store.update_chunk_vector_id(chunk.id, vector_id, &response.model).await?;
                        response.vector
                    }
                    Ok(_) => {
                        warn!(chunk_id = chunk.id, "embedding provider returned no sub-chunks during rebuild");
                        report.missing += 1;
                        continue;
                    }
                    Err(err) => {
                        warn!(chunk_id = chunk.id, %err, "embedding provider failed during rebuild");
                        report.missing += 1;
                        continue;
                    }
                },
                None => {
                    report.missing += 1;
                    continue;
                }
            },
        };
        index.add(&vector, vector_id)?;
        report.loaded += 1;
    }

    index.save().map_err(|err| Error::vector_index(format!("failed to persist rebuilt index: {err}")))?;
    info!(loaded = report.loaded, missing = report.missing, "vector index rebuild complete");
    Ok(report)
}
