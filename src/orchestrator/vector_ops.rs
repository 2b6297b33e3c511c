//! `rebuild_faiss` and `revectorize` (§4.10): the two operator-triggered
//! vector pipeline maintenance commands.

use super::errors::{ErrorCode, ErrorPayload, OrchestratorResult};
use crate::domain::ports::{AnnIndex, EmbeddingProvider, PersistentStore};
use crate::domain::types::ProjectId;
use crate::vectorindex::{rebuild, FlatIndex, RebuildReport};
use std::path::Path;

/// Rebuild the vector index for `project_id` (optionally further scoped to
/// `dataset_id`) from the vectors authoritative in the store.
pub async fn rebuild_faiss(
    store: &dyn PersistentStore,
    embedding: Option<&dyn EmbeddingProvider>,
    index_path: &str,
    vector_dim: usize,
    project_id: ProjectId,
    dataset_id: Option<&str>,
) -> OrchestratorResult<RebuildReport> {
    let mut index = FlatIndex::create(vector_dim, index_path).map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RebuildFaissError))?;
    rebuild(store, &mut index, embedding, project_id, dataset_id)
        .await
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RebuildFaissError))
}

/// Outcome of [`revectorize`].
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RevectorizeReport {
    pub processed: usize,
    pub errors: usize,
}

/// Force re-chunking (and re-embedding) of specific files, bypassing the
/// worker's normal `is_ast_outdated` gate — used to pick up a change in
/// chunking rules or embedding model.
pub async fn revectorize(
    store: &dyn PersistentStore,
    index: &mut dyn AnnIndex,
    embedding: Option<&dyn EmbeddingProvider>,
    project_id: ProjectId,
    paths: &[&Path],
    min_chunk_length: usize,
) -> OrchestratorResult<RevectorizeReport> {
    let mut report = RevectorizeReport::default();
    for path in paths {
        match revectorize_one(store, index, embedding, project_id, path, min_chunk_length).await {
            Ok(()) => report.processed += 1,
            Err(_) => report.errors += 1,
        }
    }
    index.save().map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?;
    Ok(report)
}

async fn revectorize_one(
    store: &dyn PersistentStore,
    index: &mut dyn AnnIndex,
    embedding: Option<&dyn EmbeddingProvider>,
    project_id: ProjectId,
    path: &Path,
    min_chunk_length: usize,
) -> OrchestratorResult<()> {
    let relative_path = path.to_string_lossy().to_string();
    let source = std::fs::read_to_string(path)
        .map_err(|err| ErrorPayload::new(ErrorCode::RevectorizeError, format!("failed to read {relative_path}: {err}")))?;
    let cst =
        codeloom_tree_sitter_analysis::Cst::parse(&source).map_err(|err| ErrorPayload::new(ErrorCode::RevectorizeError, err.to_string()))?;

    let file = store
        .get_file_by_path(project_id, &relative_path)
        .await
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?
        .ok_or_else(|| ErrorPayload::new(ErrorCode::FileNotFound, format!("{relative_path} has no file row; run analyze first")))?;

    let drafts = crate::domain::chunking::chunk_file(&cst, min_chunk_length, embedding)
        .await
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?;

    for draft in drafts {
        let owner_id = crate::worker::resolve_owner_id(store, project_id, file.id, &draft.owner)
            .await
            .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?;
        let chunk = crate::domain::types::Chunk {
            uuid: uuid::Uuid::new_v4(),
            id: 0,
            file_id: file.id,
            project_id,
            owner_id,
            line: draft.line,
            node_type: draft.node_type.to_string(),
            source_type: draft.source_type,
            ordinal: draft.ordinal,
            binding_level: draft.binding_level,
            text: draft.text,
            embedding_model: draft.embedding_model.clone(),
            embedding_vector: draft.embedding_vector.clone(),
            vector_id: None,
            score: draft.score,
        };
        let chunk_id = store.add_code_chunk(chunk).await.map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?;
        if let (Some(vector), Some(model)) = (draft.embedding_vector, draft.embedding_model) {
            let vector_id = index.ids().into_iter().max().map(|id| id + 1).unwrap_or(0);
            index.add(&vector, vector_id).map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?;
            store
                .update_chunk_vector_id(chunk_id, vector_id, &model)
                .await
                .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::RevectorizeError))?;
        }
    }
    Ok(())
}
