//! Administrative operations (§4.10): "contracts only, out of core scope".
//!
//! These exist so the command surface is complete, but none of them have a
//! supporting implementation in the store or vector index layers — calling
//! any of them returns a typed error rather than silently doing nothing.

use super::errors::{ErrorCode, ErrorPayload, OrchestratorResult};

/// Restore the store from a prior snapshot. Not implemented: the store has
/// no snapshot/backup format of its own (only the patcher's per-file
/// backups exist).
pub async fn restore_database(_snapshot_path: &str) -> OrchestratorResult<()> {
    Err(ErrorPayload::new(
        ErrorCode::InvalidConfig,
        "restore_database is a contract-only administrative operation and is not implemented",
    ))
}

/// Reassign every row owned by one project to a different project id. Not
/// implemented: would require a cross-table renumbering pass with no
/// corresponding store method.
pub async fn change_project_id(_from: i64, _to: i64) -> OrchestratorResult<()> {
    Err(ErrorPayload::new(
        ErrorCode::InvalidConfig,
        "change_project_id is a contract-only administrative operation and is not implemented",
    ))
}

/// Collapse redundant AST/chunk versions accumulated across re-analyses.
/// Not implemented: the store keeps only the latest snapshot per file, so
/// there is nothing to collapse yet.
pub async fn collapse_versions(_project_id: i64) -> OrchestratorResult<()> {
    Err(ErrorPayload::new(
        ErrorCode::InvalidConfig,
        "collapse_versions is a contract-only administrative operation and is not implemented",
    ))
}
