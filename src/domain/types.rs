//! Core domain entities.
//!
//! These types mirror the relational schema owned by [`crate::store`] one
//! for one. They carry no behavior beyond simple accessors — the business
//! logic that produces and consumes them lives in [`crate::domain::analysis`],
//! [`crate::domain::chunking`] and [`crate::domain::patch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stable identifier for a project (a root directory that has been analyzed
/// at least once).
pub type ProjectId = Uuid;
/// Primary key of a [`File`] row.
pub type FileId = i64;
/// Primary key of a [`Class`] row.
pub type ClassId = i64;
/// Primary key of a [`Function`] row.
pub type FunctionId = i64;
/// Primary key of a [`Method`] row.
pub type MethodId = i64;
/// Primary key of a [`Chunk`] row; also the value stored as `code_chunks.id`
/// for ordering during a vector-index rebuild.
pub type ChunkId = i64;
/// Dense external id assigned to a chunk's embedding inside the vector index.
pub type VectorId = i64;

/// A project root that has been analyzed at least once.
///
/// Created lazily on first analysis of a root; never mutated except for
/// `label`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Project {
    /// Stable identity, generated once on first analysis.
    pub id: ProjectId,
    /// Absolute root path of the project.
    #[validate(length(min = 1))]
    pub root_path: String,
    /// Human label for the project (defaults to the root directory name).
    #[validate(length(min = 1))]
    pub label: String,
    /// When this project was first analyzed.
    pub created_at: DateTime<Utc>,
}

/// A source file that has been analyzed.
///
/// Replaced in place on re-analysis; per-file dependent records (classes,
/// functions, methods, imports, usages, chunks, issues, code content) are
/// purged before re-ingest (see [`crate::store::Store::clear_file_data`]).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct File {
    /// Row id.
    pub id: FileId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Path relative to the project root.
    #[validate(length(min = 1))]
    pub relative_path: String,
    /// Absolute path on disk at last analysis time.
    #[validate(length(min = 1))]
    pub absolute_path: String,
    /// Number of lines in the file at last analysis.
    pub line_count: u32,
    /// Last-known modification time of the file on disk.
    pub mtime: DateTime<Utc>,
    /// Whether the module has a file-level docstring.
    pub has_docstring: bool,
    /// Soft-delete flag; a soft-deleted file keeps its row but no longer
    /// participates in analysis, search, or vector index scope.
    pub deleted: bool,
    /// Optional dataset partition label, used to scope the vector index.
    pub dataset: Option<String>,
}

/// A class definition.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Class {
    /// Row id.
    pub id: ClassId,
    /// Owning file.
    pub file_id: FileId,
    /// Class name.
    #[validate(length(min = 1))]
    pub name: String,
    /// 1-based line of the `class` keyword.
    pub line: u32,
    /// Docstring text, if present.
    pub docstring: Option<String>,
    /// Base class names, in source (string) form — no attempt is made to
    /// resolve them to definitions.
    pub bases: Vec<String>,
}

/// A top-level function definition (not nested in a class).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Function {
    /// Row id.
    pub id: FunctionId,
    /// Owning file.
    pub file_id: FileId,
    /// Function name.
    #[validate(length(min = 1))]
    pub name: String,
    /// 1-based line of the `def` keyword.
    pub line: u32,
    /// Argument names, in declaration order.
    pub args: Vec<String>,
    /// Docstring text, if present.
    pub docstring: Option<String>,
}

/// A method definition (a function nested directly in a class body).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Method {
    /// Row id.
    pub id: MethodId,
    /// Owning class.
    pub class_id: ClassId,
    /// Method name.
    #[validate(length(min = 1))]
    pub name: String,
    /// 1-based line of the `def` keyword.
    pub line: u32,
    /// Argument names, in declaration order.
    pub args: Vec<String>,
    /// Docstring text, if present.
    pub docstring: Option<String>,
    /// `@abstractmethod`-decorated.
    pub is_abstract: bool,
    /// Body is exactly a `pass` statement and/or a docstring, nothing else.
    pub body_is_only_no_op: bool,
    /// Body's only non-docstring statement is `raise NotImplementedError(...)`.
    pub raises_not_implemented: bool,
}

/// The kind of import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    /// `import foo` / `import foo.bar`.
    Direct,
    /// `from foo import bar`.
    FromModule,
}

/// An import statement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Import {
    /// Row id.
    pub id: i64,
    /// Owning file.
    pub file_id: FileId,
    /// The imported name (the module, for `Direct`; the imported symbol,
    /// for `FromModule`).
    #[validate(length(min = 1))]
    pub imported_name: String,
    /// Module prefix for `from <module> import <name>`; `None` for `Direct`.
    pub module_prefix: Option<String>,
    /// Statement kind.
    pub kind: ImportKind,
    /// 1-based source line.
    pub line: u32,
}

/// The kind of a resolved usage site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageKind {
    /// `obj.method(...)`.
    MethodCall,
    /// `obj.attr` (read, not called).
    AttributeAccess,
    /// `name(...)` where `name` is a bare identifier.
    FunctionCall,
}

/// A resolved usage site, produced by the second-pass usage analyzer
/// ([`crate::domain::analysis::usage`]).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Usage {
    /// Row id.
    pub id: i64,
    /// Owning file.
    pub file_id: FileId,
    /// 1-based source line.
    pub line: u32,
    /// What kind of syntactic usage this is.
    pub kind: UsageKind,
    /// The accessed/called name (rightmost segment of the chain).
    #[validate(length(min = 1))]
    pub target_name: String,
    /// The class the call is believed to target, by heuristic: set when the
    /// receiver is `self` (resolved to the enclosing class) or a bare
    /// capitalized name.
    pub target_class: Option<String>,
    /// Free-form context string (e.g. the enclosing function's qualified
    /// name), for display purposes only.
    pub context: Option<String>,
}

/// A denormalized source segment for a structural entity, feeding the
/// full-text index.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CodeContent {
    /// Owning file.
    pub file_id: FileId,
    /// Kind of entity this segment belongs to (`"class"`, `"function"`,
    /// `"method"`, `"file"`).
    pub entity_kind: String,
    /// Entity name (qualified for methods).
    pub entity_name: String,
    /// Row id of the owning entity (class/function/method id).
    pub entity_id: i64,
    /// Raw source segment, verbatim.
    pub raw_source: String,
    /// Docstring text, if any.
    pub docstring: Option<String>,
}

/// Binding level a chunk of prose is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BindingLevel {
    /// Attributed to the whole file.
    File = 1,
    /// Attributed to a class.
    Class = 2,
    /// Attributed to a function or method.
    FunctionOrMethod = 3,
    /// Attributed to a specific CST node (a grouped comment cluster).
    Node = 4,
    /// Attributed to a single line.
    Line = 5,
}

/// Provenance of a chunk's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// Module-level docstring.
    FileDocstring,
    /// Class docstring.
    ClassDocstring,
    /// Method docstring.
    MethodDocstring,
    /// Top-level function docstring.
    FunctionDocstring,
    /// An inline `#` comment with no enclosing def/class.
    Comment,
    /// An inline comment inside a method body.
    MethodComment,
    /// An inline comment inside a class body (outside any method).
    ClassComment,
    /// An inline comment inside a top-level function body.
    FunctionComment,
}

/// A unit of prose (docstring fragment or comment cluster), optionally
/// embedded.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Chunk {
    /// Stable identity, independent of the row id.
    pub uuid: Uuid,
    /// Row id (used for dense-id-reassignment ordering).
    pub id: ChunkId,
    /// Owning file.
    pub file_id: FileId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning class/function/method id, if the chunk is attributed to one.
    pub owner_id: Option<i64>,
    /// 1-based line the chunk starts at.
    pub line: u32,
    /// Concrete CST node type the chunk was extracted from (e.g. `"string"`,
    /// `"comment"`).
    pub node_type: String,
    /// Provenance.
    pub source_type: SourceType,
    /// Ordinal among sibling chunks produced from the same item (a long
    /// docstring may be split into several sub-chunks by the external
    /// chunker).
    pub ordinal: u32,
    /// Binding level.
    pub binding_level: BindingLevel,
    /// Raw chunk text.
    #[validate(length(min = 1))]
    pub text: String,
    /// Embedding model id, once embedded.
    pub embedding_model: Option<String>,
    /// Embedding vector, once embedded (unit-normalized on insertion into
    /// the vector index, but stored here in its original scale).
    pub embedding_vector: Option<Vec<f32>>,
    /// Foreign key into the vector index, once assigned.
    pub vector_id: Option<VectorId>,
    /// BM25-style relevance score, set only on search results (not persisted
    /// as part of the chunk's identity).
    pub score: Option<f32>,
}

/// A quality issue recorded during analysis.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Issue {
    /// Row id.
    pub id: i64,
    /// Owning file.
    pub file_id: FileId,
    /// Issue kind (stable string, e.g. `"missing_docstring"`).
    #[validate(length(min = 1))]
    pub kind: String,
    /// Human-readable message.
    #[validate(length(min = 1))]
    pub message: String,
    /// 1-based line, if applicable.
    pub line: Option<u32>,
    /// Owning class id, if the issue is about a class.
    pub class_id: Option<ClassId>,
    /// Owning method id, if the issue is about a method.
    pub method_id: Option<MethodId>,
    /// Owning function id, if the issue is about a function.
    pub function_id: Option<FunctionId>,
    /// Free-form structured metadata.
    pub metadata: serde_json::Value,
}

/// A serialized snapshot of a file's parsed tree, used to short-circuit
/// re-analysis of unchanged files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstSnapshot {
    /// Owning file.
    pub file_id: FileId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Serialized tree (currently: the exact source bytes; re-parsing is
    /// cheap enough that we do not persist a binary tree-sitter tree).
    pub serialized: Vec<u8>,
    /// Content hash of `serialized`, for quick equality checks.
    pub content_hash: String,
    /// Source mtime this snapshot was taken against.
    pub source_mtime: DateTime<Utc>,
}
