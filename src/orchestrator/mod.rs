//! Orchestrator / Command Facade (C10, §4.10): the stateless operations
//! the external transport (CLI, daemon, MCP) calls into. Each operation is
//! a free function taking the handles it needs explicitly; [`Context`]
//! bundles the process-wide singletons (store, vector index, embedding
//! provider, default project) so a transport layer only has to thread one
//! value through its handlers (§5: "a small context object bundles them
//! for handler functions").

pub mod admin;
pub mod analyze;
pub mod cst;
pub mod errors;
pub mod search;
pub mod semantic;
pub mod vector_ops;

pub use admin::{change_project_id, collapse_versions, restore_database};
pub use analyze::{analyze, AnalyzeOptions, AnalyzeStats};
pub use cst::{compose_cst_module, list_cst_blocks, query_cst};
pub use errors::{ErrorCode, ErrorPayload, OrchestratorResult};
pub use search::{find_usages, full_text_search, search_classes, search_methods};
pub use semantic::{semantic_search, SemanticHit, SemanticSearchOptions};
pub use vector_ops::{rebuild_faiss, revectorize, RevectorizeReport};

use crate::domain::ports::{AnnIndex, EmbeddingProvider, PersistentStore};
use crate::domain::types::{ProjectId, UsageKind};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-wide handles every handler function needs, created once at
/// startup and torn down at shutdown (§5: "global mutable state ...
/// model them as explicitly-passed handles").
pub struct Context {
    pub store: Arc<dyn PersistentStore>,
    pub index: Arc<Mutex<dyn AnnIndex>>,
    pub embedding: Option<Arc<dyn EmbeddingProvider>>,
    /// The project every facade call on this context is scoped to. A
    /// single process may hold several `Context`s, one per analyzed root.
    pub project_id: ProjectId,
    pub vector_dim: usize,
    pub index_path: String,
    pub min_chunk_length: usize,
}

impl Context {
    pub async fn analyze(&self, root_dir: &Path, options: &AnalyzeOptions) -> crate::domain::error::Result<AnalyzeStats> {
        analyze::analyze(self.store.as_ref(), root_dir, options).await
    }

    pub fn list_cst_blocks(&self, file_path: &Path, include_code: bool) -> OrchestratorResult<Vec<crate::domain::query::Match>> {
        cst::list_cst_blocks(file_path, include_code)
    }

    pub fn query_cst(
        &self,
        file_path: &Path,
        selector: &str,
        include_code: bool,
        max_results: Option<usize>,
    ) -> OrchestratorResult<Vec<crate::domain::query::Match>> {
        cst::query_cst(file_path, selector, include_code, max_results)
    }

    pub fn compose_cst_module(
        &self,
        file_path: &Path,
        ops: &[crate::domain::patch::PatchOp],
        apply: bool,
        create_backup: bool,
        return_source: bool,
        return_diff: bool,
    ) -> OrchestratorResult<crate::domain::patch::PatchResult> {
        cst::compose_cst_module(file_path, ops, apply, create_backup, return_source, return_diff)
    }

    pub async fn search_classes(&self, pattern: &str) -> OrchestratorResult<Vec<crate::domain::types::Class>> {
        search::search_classes(self.store.as_ref(), self.project_id, pattern).await
    }

    pub async fn search_methods(&self, class_name: Option<&str>) -> OrchestratorResult<Vec<crate::domain::types::Method>> {
        search::search_methods(self.store.as_ref(), self.project_id, class_name).await
    }

    pub async fn find_usages(
        &self,
        name: &str,
        target_type: Option<UsageKind>,
        target_class: Option<&str>,
    ) -> OrchestratorResult<Vec<crate::domain::types::Usage>> {
        search::find_usages(self.store.as_ref(), self.project_id, name, target_type, target_class).await
    }

    pub async fn full_text_search(
        &self,
        query: &str,
        entity_kind: Option<&str>,
        limit: u32,
    ) -> OrchestratorResult<Vec<crate::domain::types::CodeContent>> {
        search::full_text_search(self.store.as_ref(), self.project_id, query, entity_kind, limit).await
    }

    pub async fn semantic_search(&self, query: &str, k: usize, options: &SemanticSearchOptions) -> OrchestratorResult<Vec<SemanticHit>> {
        let Some(embedding) = &self.embedding else {
            return Err(ErrorPayload::new(ErrorCode::CstQueryError, "no embedding provider configured"));
        };
        let index = self.index.lock().await;
        semantic::semantic_search(self.store.as_ref(), &*index, embedding.as_ref(), query, k, options).await
    }

    /// Rebuild the index on disk at `self.index_path`. The live in-memory
    /// index this `Context` holds is a separate handle and is not swapped
    /// in place (an `Arc<Mutex<dyn AnnIndex>>` cannot be replaced by a
    /// differently-sized concrete type without reconstructing the
    /// `Context`); a caller that needs the rebuilt index live should build
    /// a fresh `Context` with `FlatIndex::load(&self.index_path)`.
    pub async fn rebuild_faiss(&self, dataset_id: Option<&str>) -> OrchestratorResult<crate::vectorindex::RebuildReport> {
        vector_ops::rebuild_faiss(
            self.store.as_ref(),
            self.embedding.as_deref(),
            &self.index_path,
            self.vector_dim,
            self.project_id,
            dataset_id,
        )
        .await
    }

    pub async fn revectorize(&self, paths: &[&Path]) -> OrchestratorResult<RevectorizeReport> {
        let mut index = self.index.lock().await;
        vector_ops::revectorize(self.store.as_ref(), &mut *index, self.embedding.as_deref(), self.project_id, paths, self.min_chunk_length).await
    }
}
