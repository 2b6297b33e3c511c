//! SQLite schema (§3, §4.5). One table per relational entity; `*_json`
//! columns hold `serde_json`-encoded `Vec<String>`/`Vec<f32>`/`Value`
//! fields that have no natural scalar SQLite type.

pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    root_path TEXT NOT NULL UNIQUE,
    label TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL REFERENCES projects(id),
    relative_path TEXT NOT NULL,
    absolute_path TEXT NOT NULL,
    line_count INTEGER NOT NULL,
    mtime TEXT NOT NULL,
    has_docstring INTEGER NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0,
    dataset TEXT,
    UNIQUE(project_id, relative_path)
);
CREATE INDEX IF NOT EXISTS idx_files_project ON files(project_id);

CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    name TEXT NOT NULL,
    line INTEGER NOT NULL,
    docstring TEXT,
    bases_json TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_classes_file ON classes(file_id);
CREATE INDEX IF NOT EXISTS idx_classes_name ON classes(name);

CREATE TABLE IF NOT EXISTS functions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    name TEXT NOT NULL,
    line INTEGER NOT NULL,
    args_json TEXT NOT NULL,
    docstring TEXT
);
CREATE INDEX IF NOT EXISTS idx_functions_file ON functions(file_id);

CREATE TABLE IF NOT EXISTS methods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    class_id INTEGER NOT NULL REFERENCES classes(id),
    name TEXT NOT NULL,
    line INTEGER NOT NULL,
    args_json TEXT NOT NULL,
    docstring TEXT,
    is_abstract INTEGER NOT NULL,
    body_is_only_no_op INTEGER NOT NULL,
    raises_not_implemented INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_methods_class ON methods(class_id);
CREATE INDEX IF NOT EXISTS idx_methods_name ON methods(name);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    imported_name TEXT NOT NULL,
    module_prefix TEXT,
    kind TEXT NOT NULL,
    line INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_imports_file ON imports(file_id);

CREATE TABLE IF NOT EXISTS usages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    line INTEGER NOT NULL,
    kind TEXT NOT NULL,
    target_name TEXT NOT NULL,
    target_class TEXT,
    context TEXT
);
CREATE INDEX IF NOT EXISTS idx_usages_file ON usages(file_id);
CREATE INDEX IF NOT EXISTS idx_usages_target_name ON usages(target_name);

CREATE TABLE IF NOT EXISTS issues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    kind TEXT NOT NULL,
    message TEXT NOT NULL,
    line INTEGER,
    class_id INTEGER,
    method_id INTEGER,
    function_id INTEGER,
    metadata_json TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_issues_file ON issues(file_id);

CREATE TABLE IF NOT EXISTS code_content (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id INTEGER NOT NULL REFERENCES files(id),
    entity_kind TEXT NOT NULL,
    entity_name TEXT NOT NULL,
    entity_id INTEGER NOT NULL,
    raw_source TEXT NOT NULL,
    docstring TEXT
);
CREATE INDEX IF NOT EXISTS idx_code_content_file ON code_content(file_id);

CREATE TABLE IF NOT EXISTS code_chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL,
    file_id INTEGER NOT NULL REFERENCES files(id),
    project_id TEXT NOT NULL REFERENCES projects(id),
    owner_id INTEGER,
    line INTEGER NOT NULL,
    node_type TEXT NOT NULL,
    source_type TEXT NOT NULL,
    ordinal INTEGER NOT NULL,
    binding_level INTEGER NOT NULL,
    text TEXT NOT NULL,
    embedding_model TEXT,
    embedding_vector_json TEXT,
    vector_id INTEGER
);
CREATE INDEX IF NOT EXISTS idx_code_chunks_file ON code_chunks(file_id);
CREATE INDEX IF NOT EXISTS idx_code_chunks_project ON code_chunks(project_id);
CREATE INDEX IF NOT EXISTS idx_code_chunks_vector_id ON code_chunks(vector_id);

CREATE TABLE IF NOT EXISTS ast_snapshots (
    file_id INTEGER PRIMARY KEY REFERENCES files(id),
    project_id TEXT NOT NULL REFERENCES projects(id),
    serialized BLOB NOT NULL,
    content_hash TEXT NOT NULL,
    source_mtime TEXT NOT NULL
);
"#;
