//! Patch operation and selector types (§4.9). These are the non-surface
//! selector form — the CSS-like selector *string* of §4.2 is translated
//! into a `PatchSelector { kind: CstQuery, query: Some(string), .. }`
//! before reaching the engine.

use serde::{Deserialize, Serialize};

/// The kind of entity a [`PatchSelector`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Module,
    Function,
    Class,
    Method,
    Range,
    BlockId,
    NodeId,
    CstQuery,
}

/// Identifies the node(s) a patch operation applies to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchSelector {
    pub kind: Option<SelectorKind>,
    pub name: Option<String>,
    pub start_line: Option<u32>,
    pub start_col: Option<u32>,
    pub end_line: Option<u32>,
    pub end_col: Option<u32>,
    pub block_id: Option<String>,
    pub node_id: Option<String>,
    pub query: Option<String>,
    pub match_index: Option<usize>,
}

impl PatchSelector {
    /// Build a selector of the given kind with everything else defaulted.
    pub fn of_kind(kind: SelectorKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Set `name` (the function/class name, or `Class.method` qualname for
    /// a method selector) and return `self` for chaining.
    pub fn also_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Where an [`InsertOp`] places its statements relative to its selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    After,
}

/// Where a [`CreateOp`] places its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePosition {
    EndOfModule,
    AfterSelector,
    BeforeSelector,
    EndOfClass,
    EndOfFunction,
}

/// Replace the node(s) matched by `selector` with `new_code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceOp {
    pub selector: PatchSelector,
    pub new_code: String,
    /// Required, and only meaningful, for `selector.kind == Module`.
    pub file_docstring: Option<String>,
}

/// Insert `new_code` before/after the matched node, or at the end of the
/// module when `selector` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertOp {
    pub selector: Option<PatchSelector>,
    pub position: InsertPosition,
    pub new_code: String,
}

/// Insert `source` at a structural position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOp {
    pub position: CreatePosition,
    pub selector: Option<PatchSelector>,
    pub source: String,
}

/// One operation in a `compose_cst_module` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOp {
    Replace(ReplaceOp),
    Insert(InsertOp),
    Create(CreateOp),
}

/// Counts returned after applying a batch of ops.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchStats {
    pub replaced: u32,
    pub removed: u32,
    pub created: u32,
    pub inserted: u32,
    pub unmatched: Vec<PatchSelector>,
}

/// Result of `compose_cst_module`.
#[derive(Debug, Clone, Serialize)]
pub struct PatchResult {
    pub stats: PatchStats,
    /// Present when `return_source` was requested and the patch succeeded.
    pub source: Option<String>,
    /// Present when `return_diff` was requested and the patch succeeded.
    pub diff: Option<String>,
}
