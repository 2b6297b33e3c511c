//! Structural analyzer (C4): walks a parsed module and emits entities and
//! quality issues (`structural`), then resolves call/attribute usage sites
//! in a second pass (`usage`).

pub mod structural;
pub mod types;
pub mod usage;

pub use structural::{analyze_source, DEFAULT_MAX_FILE_LINES};
pub use types::{
    ClassDraft, CodeContentDraft, FileAnalysis, FunctionDraft, ImportDraft, IssueDraft, IssueOwner,
    MethodDraft, UsageDraft,
};
pub use usage::analyze_usages;
