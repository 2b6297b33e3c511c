//! The vectorization worker's poll loop (§4.8): a long-running cooperative
//! task, not parallel, that chunks files and pushes pending chunks into
//! the vector index on a fixed interval until asked to stop.

use super::owner::resolve_owner_id;
use crate::config::WorkerConfig;
use crate::domain::chunking::chunk_file;
use crate::domain::error::Result;
use crate::domain::ports::{AnnIndex, EmbeddingProvider, PersistentStore};
use crate::domain::types::{Chunk, ProjectId};
use codeloom_tree_sitter_analysis::Cst;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Cooperative stop signal shared between a spawned worker task and
/// whatever holds its handle (the daemon's shutdown path).
#[derive(Clone, Default)]
pub struct StopFlag(CancellationToken);

impl StopFlag {
    /// A flag that has not been tripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the worker loop to exit after its current iteration.
    pub fn stop(&self) {
        self.0.cancel();
    }

    fn is_stopped(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Everything one iteration of the loop body needs.
pub struct WorkerContext {
    pub store: Arc<dyn PersistentStore>,
    pub index: Arc<Mutex<dyn AnnIndex>>,
    pub embedding: Option<Arc<dyn EmbeddingProvider>>,
    pub project_id: ProjectId,
    pub min_chunk_length: usize,
    pub config: WorkerConfig,
}

/// Run the loop body once: chunk files needing it, push pending chunks
/// into the vector index, persist the index. Returns the number of files
/// chunked and chunks vectorized, for logging/tests.
pub async fn run_once(ctx: &WorkerContext) -> Result<(usize, usize)> {
    let batch = ctx.config.batch_size;
    let files_chunked = chunk_pending_files(ctx, batch).await?;
    let chunks_vectorized = vectorize_pending_chunks(ctx, batch).await?;
    if chunks_vectorized > 0 {
        ctx.index.lock().await.save()?;
    }
    Ok((files_chunked, chunks_vectorized))
}

async fn chunk_pending_files(ctx: &WorkerContext, batch: u32) -> Result<usize> {
    let files = ctx.store.get_files_needing_chunking(ctx.project_id, batch).await?;
    let mut chunked = 0;
    for file in files {
        let source = match std::fs::read_to_string(&file.absolute_path) {
            Ok(source) => source,
            Err(err) => {
                warn!(file = %file.relative_path, %err, "skipping file for chunking: unreadable");
                continue;
            }
        };
        let cst = match Cst::parse(&source) {
            Ok(cst) => cst,
            Err(err) => {
                warn!(file = %file.relative_path, %err, "skipping file for chunking: parse error");
                continue;
            }
        };

        let drafts = chunk_file(&cst, ctx.min_chunk_length, ctx.embedding.as_deref()).await?;
        for draft in drafts {
            let owner_id = resolve_owner_id(ctx.store.as_ref(), ctx.project_id, file.id, &draft.owner).await?;
            let chunk = Chunk {
                uuid: Uuid::new_v4(),
                id: 0,
                file_id: file.id,
                project_id: ctx.project_id,
                owner_id,
                line: draft.line,
                node_type: draft.node_type.to_string(),
                source_type: draft.source_type,
                ordinal: draft.ordinal,
                binding_level: draft.binding_level,
                text: draft.text,
                embedding_model: draft.embedding_model,
                embedding_vector: draft.embedding_vector,
                vector_id: None,
                score: draft.score,
            };
            ctx.store.add_code_chunk(chunk).await?;
        }
        chunked += 1;
        debug!(file = %file.relative_path, "chunked");
    }
    Ok(chunked)
}

async fn vectorize_pending_chunks(ctx: &WorkerContext, batch: u32) -> Result<usize> {
    let chunks = ctx.store.get_non_vectorized_chunks(ctx.project_id, batch).await?;
    let mut vectorized = 0;
    let mut index = ctx.index.lock().await;
    for chunk in chunks {
        let (Some(vector), Some(model)) = (chunk.embedding_vector.as_ref(), chunk.embedding_model.as_ref()) else {
            continue;
        };
        let vector_id = next_vector_id(&index);
        index.add(vector, vector_id)?;
        ctx.store.update_chunk_vector_id(chunk.id, vector_id, model).await?;
        vectorized += 1;
    }
    Ok(vectorized)
}

fn next_vector_id(index: &dyn AnnIndex) -> i64 {
    index.ids().into_iter().max().map(|id| id + 1).unwrap_or(0)
}

/// Spawn the poll loop as a background task. Returns a [`StopFlag`] the
/// caller can trip to end it, and the `JoinHandle`.
pub fn spawn(ctx: WorkerContext) -> (StopFlag, tokio::task::JoinHandle<()>) {
    let stop = StopFlag::new();
    let loop_stop = stop.clone();
    let poll_interval = std::time::Duration::from_secs(ctx.config.poll_interval_seconds);
    let handle = tokio::spawn(async move {
        info!(poll_interval_seconds = ctx.config.poll_interval_seconds, "vectorization worker started");
        while !loop_stop.is_stopped() {
            match run_once(&ctx).await {
                Ok((files, chunks)) if files > 0 || chunks > 0 => {
                    info!(files, chunks, "vectorization worker iteration complete");
                }
                Ok(_) => {}
                Err(err) => warn!(%err, "vectorization worker iteration failed"),
            }
            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = loop_stop.0.cancelled() => {}
            }
        }
        info!("vectorization worker stopped");
    });
    (stop, handle)
}
