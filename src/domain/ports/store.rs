use crate::domain::error::Result;
use crate::domain::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Relational storage of projects, files, structural entities, chunks,
/// vectors, issues and AST snapshots.
///
/// All writes are serialized by a single writer (see
/// [`crate::store::Store`], which wraps a `rusqlite` connection behind a
/// process-level mutex); this trait only states the operations, not the
/// locking discipline.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Resolve `root_path` to a project, creating it (with `label`) if this
    /// is the first time it has been analyzed.
    async fn get_or_create_project(&self, root_path: &str, label: &str) -> Result<ProjectId>;

    /// Insert or update the file row for `relative_path`.
    async fn upsert_file(
        &self,
        project_id: ProjectId,
        relative_path: &str,
        absolute_path: &str,
        line_count: u32,
        mtime: DateTime<Utc>,
        has_docstring: bool,
        dataset: Option<&str>,
    ) -> Result<FileId>;

    /// Cascaded delete of every row that depends on `file_id` (classes,
    /// functions, methods, imports, usages, chunks, issues, code content).
    async fn clear_file_data(&self, file_id: FileId) -> Result<()>;

    /// Record a class definition.
    async fn add_class(&self, class: Class) -> Result<ClassId>;
    /// Record a top-level function definition.
    async fn add_function(&self, function: Function) -> Result<FunctionId>;
    /// Record a method definition.
    async fn add_method(&self, method: Method) -> Result<MethodId>;
    /// Record an import statement.
    async fn add_import(&self, import: Import) -> Result<i64>;
    /// Record a resolved usage site.
    async fn add_usage(&self, usage: Usage) -> Result<i64>;
    /// Record a quality issue.
    async fn add_issue(&self, issue: Issue) -> Result<i64>;
    /// Record a denormalized source segment for full-text search.
    async fn add_code_content(&self, content: CodeContent) -> Result<()>;

    /// Overwrite the AST snapshot for `file_id`.
    async fn overwrite_ast_tree(
        &self,
        file_id: FileId,
        project_id: ProjectId,
        serialized: &[u8],
        content_hash: &str,
        source_mtime: DateTime<Utc>,
    ) -> Result<()>;

    /// Whether the stored snapshot for `file_id` predates `mtime` (or does
    /// not exist).
    async fn is_ast_outdated(&self, file_id: FileId, mtime: DateTime<Utc>) -> Result<bool>;

    /// Record a chunk, returning its row id.
    async fn add_code_chunk(&self, chunk: Chunk) -> Result<ChunkId>;

    /// Assign `vector_id` and `embedding_model` to a chunk once it has been
    /// placed in the vector index.
    async fn update_chunk_vector_id(
        &self,
        chunk_id: ChunkId,
        vector_id: VectorId,
        embedding_model: &str,
    ) -> Result<()>;

    /// Chunks that carry an embedding vector but no `vector_id` yet.
    async fn get_non_vectorized_chunks(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<Chunk>>;

    /// Files with no AST snapshot, or a snapshot older than their on-disk
    /// mtime, that the vectorization worker should (re)chunk.
    async fn get_files_needing_chunking(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> Result<Vec<File>>;

    /// All chunks in `(project_id[, dataset_id])` scope with both an
    /// embedding model and vector, ordered by chunk id, for streaming into
    /// a freshly rebuilt index.
    async fn get_all_chunks_for_rebuild(
        &self,
        project_id: ProjectId,
        dataset_id: Option<&str>,
    ) -> Result<Vec<Chunk>>;

    /// Reassign `vector_id = row_number() - 1` over the given scope,
    /// ordered by chunk id, for every chunk with both an embedding model
    /// and vector. Returns the number of chunks reassigned.
    async fn reassign_dense_vector_ids(
        &self,
        project_id: Option<ProjectId>,
        dataset_id: Option<&str>,
    ) -> Result<u64>;

    /// Classes whose name matches `pattern` (substring, case-insensitive).
    async fn search_classes(&self, project_id: ProjectId, pattern: &str) -> Result<Vec<Class>>;

    /// Methods, optionally restricted to one class.
    async fn search_methods(
        &self,
        project_id: ProjectId,
        class_name: Option<&str>,
    ) -> Result<Vec<Method>>;

    /// Usage sites matching `name`, optionally filtered by usage kind and
    /// target class.
    async fn find_usages(
        &self,
        project_id: ProjectId,
        name: &str,
        target_type: Option<UsageKind>,
        target_class: Option<&str>,
    ) -> Result<Vec<Usage>>;

    /// Full-text search over `code_content`, optionally filtered by entity
    /// kind, limited to `limit` rows.
    async fn full_text_search(
        &self,
        project_id: ProjectId,
        query: &str,
        entity_kind: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CodeContent>>;

    /// Fetch a chunk by id, for re-hydrating semantic search hits.
    async fn get_chunk(&self, chunk_id: ChunkId) -> Result<Option<Chunk>>;

    /// Fetch a chunk by its vector index id, for re-hydrating raw
    /// `(vector_id, distance)` hits returned by the vector index.
    async fn get_chunk_by_vector_id(&self, vector_id: VectorId) -> Result<Option<Chunk>>;

    /// Fetch a file by id, for re-hydrating semantic search hits.
    async fn get_file(&self, file_id: FileId) -> Result<Option<File>>;

    /// Fetch a file by its project-relative path, for callers (e.g.
    /// `revectorize`) that only have a path to target.
    async fn get_file_by_path(&self, project_id: ProjectId, relative_path: &str) -> Result<Option<File>>;
}
