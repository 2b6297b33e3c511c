//! CST-preserving patch engine (C9).

mod engine;
mod imports;
mod splice;
mod types;

pub use engine::{apply, compose};
pub use imports::normalize as normalize_imports;
pub use types::{
    CreateOp, CreatePosition, InsertOp, InsertPosition, PatchOp, PatchResult, PatchSelector, PatchStats,
    ReplaceOp, SelectorKind,
};
