//! Persistent store (C5): a single SQLite file holding every relational
//! entity from §3, written through exactly one connection guarded by an
//! async mutex — the process-level single-writer discipline §5 requires.

mod mapping;
mod schema;

use crate::domain::error::{Error, Result};
use crate::domain::ports::PersistentStore;
use crate::domain::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// SQLite-backed implementation of [`PersistentStore`].
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if absent) the database file at `path`, applying the
    /// schema and checking its version stamp.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(schema::CREATE_TABLES)?;

        let stamped: Option<String> =
            conn.query_row("SELECT value FROM schema_meta WHERE key = 'schema_version'", [], |r| r.get(0))
                .optional()?;
        match stamped {
            None => {
                conn.execute(
                    "INSERT INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
                    params![schema::SCHEMA_VERSION.to_string()],
                )?;
            }
            Some(version) => {
                let version: i64 = version
                    .parse()
                    .map_err(|_| Error::internal("schema_meta.schema_version is not an integer"))?;
                if version != schema::SCHEMA_VERSION {
                    return Err(Error::internal(format!(
                        "on-disk schema version {version} is incompatible with this build (expects {}); \
                         schema migrations are out of scope, rebuild the database",
                        schema::SCHEMA_VERSION
                    )));
                }
            }
        }

        info!(path = %path.display(), "opened persistent store");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory store, for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::CREATE_TABLES)?;
        conn.execute(
            "INSERT INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
            params![schema::SCHEMA_VERSION.to_string()],
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn class_from_row(row: &rusqlite::Row) -> rusqlite::Result<Class> {
    let bases_json: String = row.get(4)?;
    Ok(Class {
        id: row.get(0)?,
        file_id: row.get(1)?,
        name: row.get(2)?,
        line: row.get::<_, i64>(3)? as u32,
        docstring: row.get(5)?,
        bases: mapping::strings_from_json(&bases_json),
    })
}

fn method_from_row(row: &rusqlite::Row) -> rusqlite::Result<Method> {
    let args_json: String = row.get(3)?;
    Ok(Method {
        id: row.get(0)?,
        class_id: row.get(1)?,
        name: row.get(2)?,
        line: row.get::<_, i64>(4)? as u32,
        args: mapping::strings_from_json(&args_json),
        docstring: row.get(5)?,
        is_abstract: row.get(6)?,
        body_is_only_no_op: row.get(7)?,
        raises_not_implemented: row.get(8)?,
    })
}

fn file_from_row(row: &rusqlite::Row) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        project_id: row.get(1)?,
        relative_path: row.get(2)?,
        absolute_path: row.get(3)?,
        line_count: row.get::<_, i64>(4)? as u32,
        mtime: row.get(5)?,
        has_docstring: row.get(6)?,
        deleted: row.get(7)?,
        dataset: row.get(8)?,
    })
}

fn code_content_from_row(row: &rusqlite::Row) -> rusqlite::Result<CodeContent> {
    Ok(CodeContent {
        file_id: row.get(0)?,
        entity_kind: row.get(1)?,
        entity_name: row.get(2)?,
        entity_id: row.get(3)?,
        raw_source: row.get(4)?,
        docstring: row.get(5)?,
    })
}

struct UsageRow {
    id: i64,
    file_id: FileId,
    line: i64,
    kind: String,
    target_name: String,
    target_class: Option<String>,
    context: Option<String>,
}

fn usage_row(row: &rusqlite::Row) -> rusqlite::Result<UsageRow> {
    Ok(UsageRow {
        id: row.get(0)?,
        file_id: row.get(1)?,
        line: row.get(2)?,
        kind: row.get(3)?,
        target_name: row.get(4)?,
        target_class: row.get(5)?,
        context: row.get(6)?,
    })
}

impl UsageRow {
    fn into_usage(self) -> Result<Usage> {
        Ok(Usage {
            id: self.id,
            file_id: self.file_id,
            line: self.line as u32,
            kind: mapping::usage_kind_from_str(&self.kind)?,
            target_name: self.target_name,
            target_class: self.target_class,
            context: self.context,
        })
    }
}

struct ChunkRow {
    uuid: Uuid,
    id: ChunkId,
    file_id: FileId,
    project_id: ProjectId,
    owner_id: Option<i64>,
    line: i64,
    node_type: String,
    source_type: String,
    ordinal: i64,
    binding_level: i64,
    text: String,
    embedding_model: Option<String>,
    embedding_vector_json: Option<String>,
    vector_id: Option<i64>,
}

fn chunk_row(row: &rusqlite::Row) -> rusqlite::Result<ChunkRow> {
    Ok(ChunkRow {
        uuid: row.get(0)?,
        id: row.get(1)?,
        file_id: row.get(2)?,
        project_id: row.get(3)?,
        owner_id: row.get(4)?,
        line: row.get(5)?,
        node_type: row.get(6)?,
        source_type: row.get(7)?,
        ordinal: row.get(8)?,
        binding_level: row.get(9)?,
        text: row.get(10)?,
        embedding_model: row.get(11)?,
        embedding_vector_json: row.get(12)?,
        vector_id: row.get(13)?,
    })
}

const CHUNK_COLUMNS: &str = "uuid, id, file_id, project_id, owner_id, line, node_type, source_type, ordinal, \
     binding_level, text, embedding_model, embedding_vector_json, vector_id";

impl ChunkRow {
    fn into_chunk(self) -> Result<Chunk> {
        Ok(Chunk {
            uuid: self.uuid,
            id: self.id,
            file_id: self.file_id,
            project_id: self.project_id,
            owner_id: self.owner_id,
            line: self.line as u32,
            node_type: self.node_type,
            source_type: mapping::source_type_from_str(&self.source_type)?,
            ordinal: self.ordinal as u32,
            binding_level: mapping::binding_level_from_i64(self.binding_level)?,
            text: self.text,
            embedding_model: self.embedding_model,
            embedding_vector: mapping::vector_from_json(self.embedding_vector_json),
            vector_id: self.vector_id,
            score: None,
        })
    }
}

#[async_trait]
impl PersistentStore for Store {
    async fn get_or_create_project(&self, root_path: &str, label: &str) -> Result<ProjectId> {
        let conn = self.conn.lock().await;
        let existing: Option<Uuid> = conn
            .query_row("SELECT id FROM projects WHERE root_path = ?1", params![root_path], |r| r.get(0))
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO projects (id, root_path, label, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, root_path, label, Utc::now()],
        )?;
        debug!(%id, root_path, "created project");
        Ok(id)
    }

    async fn upsert_file(
        &self,
        project_id: ProjectId,
        relative_path: &str,
        absolute_path: &str,
        line_count: u32,
        mtime: DateTime<Utc>,
        has_docstring: bool,
        dataset: Option<&str>,
    ) -> Result<FileId> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO files (project_id, relative_path, absolute_path, line_count, mtime, has_docstring, deleted, dataset)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
             ON CONFLICT(project_id, relative_path) DO UPDATE SET
                absolute_path = excluded.absolute_path,
                line_count = excluded.line_count,
                mtime = excluded.mtime,
                has_docstring = excluded.has_docstring,
                deleted = 0,
                dataset = excluded.dataset",
            params![project_id, relative_path, absolute_path, line_count, mtime, has_docstring, dataset],
        )?;
        let id: FileId = conn.query_row(
            "SELECT id FROM files WHERE project_id = ?1 AND relative_path = ?2",
            params![project_id, relative_path],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    async fn clear_file_data(&self, file_id: FileId) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM methods WHERE class_id IN (SELECT id FROM classes WHERE file_id = ?1)",
            params![file_id],
        )?;
        tx.execute("DELETE FROM classes WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM functions WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM imports WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM usages WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM issues WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM code_content WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM code_chunks WHERE file_id = ?1", params![file_id])?;
        tx.execute("DELETE FROM ast_snapshots WHERE file_id = ?1", params![file_id])?;
        tx.commit()?;
        debug!(file_id, "cleared per-file data");
        Ok(())
    }

    async fn add_class(&self, class: Class) -> Result<ClassId> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO classes (file_id, name, line, bases_json, docstring) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![class.file_id, class.name, class.line, mapping::strings_to_json(&class.bases), class.docstring],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_function(&self, function: Function) -> Result<FunctionId> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO functions (file_id, name, args_json, line, docstring) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                function.file_id,
                function.name,
                mapping::strings_to_json(&function.args),
                function.line,
                function.docstring
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_method(&self, method: Method) -> Result<MethodId> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO methods (class_id, name, args_json, line, docstring, is_abstract, body_is_only_no_op, raises_not_implemented)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                method.class_id,
                method.name,
                mapping::strings_to_json(&method.args),
                method.line,
                method.docstring,
                method.is_abstract,
                method.body_is_only_no_op,
                method.raises_not_implemented
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_import(&self, import: Import) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO imports (file_id, imported_name, module_prefix, kind, line) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                import.file_id,
                import.imported_name,
                import.module_prefix,
                mapping::import_kind_to_str(import.kind),
                import.line
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_usage(&self, usage: Usage) -> Result<i64> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO usages (file_id, line, kind, target_name, target_class, context) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                usage.file_id,
                usage.line,
                mapping::usage_kind_to_str(usage.kind),
                usage.target_name,
                usage.target_class,
                usage.context
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_issue(&self, issue: Issue) -> Result<i64> {
        let conn = self.conn.lock().await;
        let metadata_json = serde_json::to_string(&issue.metadata)?;
        conn.execute(
            "INSERT INTO issues (file_id, kind, message, line, class_id, method_id, function_id, metadata_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                issue.file_id,
                issue.kind,
                issue.message,
                issue.line,
                issue.class_id,
                issue.method_id,
                issue.function_id,
                metadata_json
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_code_content(&self, content: CodeContent) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO code_content (file_id, entity_kind, entity_name, entity_id, raw_source, docstring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                content.file_id,
                content.entity_kind,
                content.entity_name,
                content.entity_id,
                content.raw_source,
                content.docstring
            ],
        )?;
        Ok(())
    }

    async fn overwrite_ast_tree(
        &self,
        file_id: FileId,
        project_id: ProjectId,
        serialized: &[u8],
        content_hash: &str,
        source_mtime: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO ast_snapshots (file_id, project_id, serialized, content_hash, source_mtime)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(file_id) DO UPDATE SET
                project_id = excluded.project_id,
                serialized = excluded.serialized,
                content_hash = excluded.content_hash,
                source_mtime = excluded.source_mtime",
            params![file_id, project_id, serialized, content_hash, source_mtime],
        )?;
        Ok(())
    }

    async fn is_ast_outdated(&self, file_id: FileId, mtime: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn.lock().await;
        let stored: Option<DateTime<Utc>> = conn
            .query_row("SELECT source_mtime FROM ast_snapshots WHERE file_id = ?1", params![file_id], |r| r.get(0))
            .optional()?;
        Ok(stored.is_none_or(|stored| stored < mtime))
    }

    async fn add_code_chunk(&self, chunk: Chunk) -> Result<ChunkId> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO code_chunks (uuid, file_id, project_id, owner_id, line, node_type, source_type, ordinal,
                                       binding_level, text, embedding_model, embedding_vector_json, vector_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                chunk.uuid,
                chunk.file_id,
                chunk.project_id,
                chunk.owner_id,
                chunk.line,
                chunk.node_type,
                mapping::source_type_to_str(chunk.source_type),
                chunk.ordinal,
                mapping::binding_level_to_i64(chunk.binding_level),
                chunk.text,
                chunk.embedding_model,
                mapping::vector_to_json(&chunk.embedding_vector),
                chunk.vector_id
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update_chunk_vector_id(&self, chunk_id: ChunkId, vector_id: VectorId, embedding_model: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE code_chunks SET vector_id = ?1, embedding_model = ?2 WHERE id = ?3",
            params![vector_id, embedding_model, chunk_id],
        )?;
        Ok(())
    }

    async fn get_non_vectorized_chunks(&self, project_id: ProjectId, limit: u32) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {CHUNK_COLUMNS} FROM code_chunks
             WHERE project_id = ?1 AND embedding_vector_json IS NOT NULL AND vector_id IS NULL
             ORDER BY id LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![project_id, limit], chunk_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ChunkRow::into_chunk).collect()
    }

    async fn get_files_needing_chunking(&self, project_id: ProjectId, limit: u32) -> Result<Vec<File>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT f.id, f.project_id, f.relative_path, f.absolute_path, f.line_count, f.mtime, f.has_docstring, f.deleted, f.dataset
             FROM files f
             LEFT JOIN ast_snapshots a ON a.file_id = f.id
             WHERE f.project_id = ?1 AND f.deleted = 0 AND (a.file_id IS NULL OR a.source_mtime < f.mtime)
             ORDER BY f.id LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![project_id, limit], file_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn get_all_chunks_for_rebuild(&self, project_id: ProjectId, dataset_id: Option<&str>) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT c.uuid, c.id, c.file_id, c.project_id, c.owner_id, c.line, c.node_type, c.source_type, c.ordinal,
                    c.binding_level, c.text, c.embedding_model, c.embedding_vector_json, c.vector_id
             FROM code_chunks c
             JOIN files f ON f.id = c.file_id
             WHERE c.project_id = ?1 AND c.embedding_model IS NOT NULL AND c.embedding_vector_json IS NOT NULL
               AND (?2 IS NULL OR f.dataset = ?2)
             ORDER BY c.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![project_id, dataset_id], chunk_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ChunkRow::into_chunk).collect()
    }

    async fn reassign_dense_vector_ids(&self, project_id: Option<ProjectId>, dataset_id: Option<&str>) -> Result<u64> {
        let conn = self.conn.lock().await;
        let sql = "
            WITH scoped AS (
                SELECT c.id AS chunk_id,
                       ROW_NUMBER() OVER (ORDER BY c.id) - 1 AS dense_id
                FROM code_chunks c
                JOIN files f ON f.id = c.file_id
                WHERE c.embedding_model IS NOT NULL AND c.embedding_vector_json IS NOT NULL
                  AND (?1 IS NULL OR c.project_id = ?1)
                  AND (?2 IS NULL OR f.dataset = ?2)
            )
            UPDATE code_chunks
            SET vector_id = (SELECT dense_id FROM scoped WHERE scoped.chunk_id = code_chunks.id)
            WHERE id IN (SELECT chunk_id FROM scoped)";
        let updated = conn.execute(sql, params![project_id, dataset_id])?;
        info!(updated, ?project_id, dataset_id, "reassigned dense vector ids");
        Ok(updated as u64)
    }

    async fn search_classes(&self, project_id: ProjectId, pattern: &str) -> Result<Vec<Class>> {
        let conn = self.conn.lock().await;
        let needle = format!("%{pattern}%");
        let mut stmt = conn.prepare(
            "SELECT c.id, c.file_id, c.name, c.line, c.bases_json, c.docstring
             FROM classes c JOIN files f ON f.id = c.file_id
             WHERE f.project_id = ?1 AND f.deleted = 0 AND c.name LIKE ?2
             ORDER BY c.name",
        )?;
        let rows = stmt
            .query_map(params![project_id, needle], class_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn search_methods(&self, project_id: ProjectId, class_name: Option<&str>) -> Result<Vec<Method>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT m.id, m.class_id, m.name, m.args_json, m.line, m.docstring, m.is_abstract, m.body_is_only_no_op, m.raises_not_implemented
             FROM methods m
             JOIN classes c ON c.id = m.class_id
             JOIN files f ON f.id = c.file_id
             WHERE f.project_id = ?1 AND f.deleted = 0 AND (?2 IS NULL OR c.name = ?2)
             ORDER BY c.name, m.name",
        )?;
        let rows = stmt
            .query_map(params![project_id, class_name], method_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn find_usages(
        &self,
        project_id: ProjectId,
        name: &str,
        target_type: Option<UsageKind>,
        target_class: Option<&str>,
    ) -> Result<Vec<Usage>> {
        let conn = self.conn.lock().await;
        let kind_filter = target_type.map(mapping::usage_kind_to_str);
        let mut stmt = conn.prepare(
            "SELECT u.id, u.file_id, u.line, u.kind, u.target_name, u.target_class, u.context
             FROM usages u JOIN files f ON f.id = u.file_id
             WHERE f.project_id = ?1 AND f.deleted = 0 AND u.target_name = ?2
               AND (?3 IS NULL OR u.kind = ?3)
               AND (?4 IS NULL OR u.target_class = ?4)
             ORDER BY u.file_id, u.line",
        )?;
        let rows = stmt
            .query_map(params![project_id, name, kind_filter, target_class], usage_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(UsageRow::into_usage).collect()
    }

    async fn full_text_search(
        &self,
        project_id: ProjectId,
        query: &str,
        entity_kind: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CodeContent>> {
        let conn = self.conn.lock().await;
        let needle = format!("%{query}%");
        let mut stmt = conn.prepare(
            "SELECT cc.file_id, cc.entity_kind, cc.entity_name, cc.entity_id, cc.raw_source, cc.docstring
             FROM code_content cc JOIN files f ON f.id = cc.file_id
             WHERE f.project_id = ?1 AND f.deleted = 0 AND cc.raw_source LIKE ?2
               AND (?3 IS NULL OR cc.entity_kind = ?3)
             ORDER BY cc.file_id, cc.entity_id
             LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(params![project_id, needle, entity_kind, limit], code_content_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn get_chunk(&self, chunk_id: ChunkId) -> Result<Option<Chunk>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {CHUNK_COLUMNS} FROM code_chunks WHERE id = ?1");
        let row = conn.query_row(&sql, params![chunk_id], chunk_row).optional()?;
        row.map(ChunkRow::into_chunk).transpose()
    }

    async fn get_chunk_by_vector_id(&self, vector_id: VectorId) -> Result<Option<Chunk>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {CHUNK_COLUMNS} FROM code_chunks WHERE vector_id = ?1");
        let row = conn.query_row(&sql, params![vector_id], chunk_row).optional()?;
        row.map(ChunkRow::into_chunk).transpose()
    }

    async fn get_file(&self, file_id: FileId) -> Result<Option<File>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, project_id, relative_path, absolute_path, line_count, mtime, has_docstring, deleted, dataset
                 FROM files WHERE id = ?1",
                params![file_id],
                file_from_row,
            )
            .optional()?;
        Ok(row)
    }

    async fn get_file_by_path(&self, project_id: ProjectId, relative_path: &str) -> Result<Option<File>> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, project_id, relative_path, absolute_path, line_count, mtime, has_docstring, deleted, dataset
                 FROM files WHERE project_id = ?1 AND relative_path = ?2",
                params![project_id, relative_path],
                file_from_row,
            )
            .optional()?;
        Ok(row)
    }
}
