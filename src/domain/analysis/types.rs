//! Draft structural entities produced by [`super::structural::analyze_source`]
//! before they have been assigned store-generated row ids.

use crate::domain::types::{ImportKind, UsageKind};
use serde_json::Value;

/// A method definition found inside a class body.
#[derive(Debug, Clone)]
pub struct MethodDraft {
    pub name: String,
    pub line: u32,
    pub args: Vec<String>,
    pub docstring: Option<String>,
    pub is_abstract: bool,
    pub body_is_only_no_op: bool,
    pub raises_not_implemented: bool,
}

/// A class definition and its methods.
#[derive(Debug, Clone)]
pub struct ClassDraft {
    pub name: String,
    pub line: u32,
    pub docstring: Option<String>,
    pub bases: Vec<String>,
    pub methods: Vec<MethodDraft>,
}

/// A top-level function definition.
#[derive(Debug, Clone)]
pub struct FunctionDraft {
    pub name: String,
    pub line: u32,
    pub args: Vec<String>,
    pub docstring: Option<String>,
}

/// An import statement.
#[derive(Debug, Clone)]
pub struct ImportDraft {
    pub imported_name: String,
    pub module_prefix: Option<String>,
    pub kind: ImportKind,
    pub line: u32,
}

/// An owner reference for an [`IssueDraft`], by qualified name rather than
/// row id (the caller resolves these once rows have been inserted).
#[derive(Debug, Clone)]
pub enum IssueOwner {
    File,
    Class(String),
    Method { class: String, method: String },
    Function(String),
}

/// A quality issue, before its owning row ids are known.
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub kind: String,
    pub message: String,
    pub line: Option<u32>,
    pub owner: IssueOwner,
    pub metadata: Value,
}

/// A denormalized source segment, before its owning row id is known.
#[derive(Debug, Clone)]
pub struct CodeContentDraft {
    pub entity_kind: &'static str,
    pub entity_name: String,
    pub raw_source: String,
    pub docstring: Option<String>,
}

/// A resolved usage site, before its file row id is known.
#[derive(Debug, Clone)]
pub struct UsageDraft {
    pub line: u32,
    pub kind: UsageKind,
    pub target_name: String,
    pub target_class: Option<String>,
    pub context: Option<String>,
}

/// Full result of analyzing one file's source (steps 1, 4, 5, 6 of
/// `analyze_file`; steps 2/3/7 — parsing, the store transaction, and the
/// AST snapshot write — are the caller's responsibility since they touch
/// I/O and the store).
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub line_count: u32,
    pub has_docstring: bool,
    pub classes: Vec<ClassDraft>,
    pub functions: Vec<FunctionDraft>,
    pub imports: Vec<ImportDraft>,
    pub issues: Vec<IssueDraft>,
    pub code_contents: Vec<CodeContentDraft>,
}
