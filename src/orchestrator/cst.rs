//! `list_cst_blocks`, `query_cst`, `compose_cst_module` (§4.10): the
//! read-only query surface and the patch-application surface over a
//! single file's CST.

use super::errors::{ErrorCode, ErrorPayload, OrchestratorResult};
use crate::domain::patch::{self, PatchOp, PatchResult};
use crate::domain::query::{self, Match, Selector};
use codeloom_tree_sitter_analysis::Cst;
use std::path::Path;

fn read_and_parse(file_path: &Path) -> Result<(String, Cst), ErrorPayload> {
    if !file_path.exists() {
        return Err(ErrorPayload::new(ErrorCode::FileNotFound, format!("{} does not exist", file_path.display())));
    }
    if file_path.extension().and_then(|e| e.to_str()) != Some(super::analyze::SOURCE_EXTENSION) {
        return Err(ErrorPayload::new(ErrorCode::InvalidFile, format!("{} is not a recognized source file", file_path.display())));
    }
    let source = std::fs::read_to_string(file_path)
        .map_err(|err| ErrorPayload::new(ErrorCode::CstListError, format!("failed to read {}: {err}", file_path.display())))?;
    let cst = Cst::parse(&source).map_err(|err| ErrorPayload::new(ErrorCode::CstListError, err.to_string()))?;
    Ok((source, cst))
}

/// Selectors matching every class, function, and method, for `list_cst_blocks`.
const BLOCK_SELECTORS: &[&str] = &["class", "function", "method"];

/// List every class/function/method block in `file_path`, in document order.
pub fn list_cst_blocks(file_path: &Path, include_code: bool) -> OrchestratorResult<Vec<Match>> {
    let (_, cst) = read_and_parse(file_path)?;
    let mut blocks = Vec::new();
    for selector_str in BLOCK_SELECTORS {
        let selector = query::parse(selector_str).map_err(|err| ErrorPayload::new(ErrorCode::CstListError, err.to_string()))?;
        let matches =
            query::execute(&cst, &selector, include_code, None).map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstListError))?;
        blocks.extend(matches);
    }
    blocks.sort_by_key(|m| (m.start_line, m.start_col));
    Ok(blocks)
}

/// Evaluate a selector string against `file_path`.
pub fn query_cst(file_path: &Path, selector: &str, include_code: bool, max_results: Option<usize>) -> OrchestratorResult<Vec<Match>> {
    let (_, cst) = read_and_parse(file_path)?;
    let selector: Selector = query::parse(selector).map_err(|err| ErrorPayload::new(ErrorCode::CstQueryParseError, err.to_string()))?;
    query::execute(&cst, &selector, include_code, max_results).map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))
}

/// Apply a batch of patch ops to `file_path`, optionally writing the
/// result back (with an optional pre-edit backup) and/or returning the
/// new source and a unified diff.
pub fn compose_cst_module(
    file_path: &Path,
    ops: &[PatchOp],
    apply: bool,
    create_backup: bool,
    return_source: bool,
    return_diff: bool,
) -> OrchestratorResult<PatchResult> {
    let (source, _) = read_and_parse(file_path)?;

    let result = patch::compose(&source, ops, return_source || apply, return_diff)
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstModulePatchError))?;

    if apply {
        let patched = result
            .source
            .as_deref()
            .expect("compose was asked to apply, so return_source was forced true above");
        if create_backup {
            write_backup(file_path, &source)
                .map_err(|err| ErrorPayload::new(ErrorCode::CstModulePatchError, format!("failed to write backup: {err}")))?;
        }
        std::fs::write(file_path, patched)
            .map_err(|err| ErrorPayload::new(ErrorCode::CstModulePatchError, format!("failed to write {}: {err}", file_path.display())))?;
    }

    Ok(result)
}

fn write_backup(file_path: &Path, original: &str) -> std::io::Result<()> {
    let parent = file_path.parent().unwrap_or_else(|| Path::new("."));
    let backup_dir = parent.join(".code_mapper_backups");
    std::fs::create_dir_all(&backup_dir)?;
    let file_name = file_path.file_name().unwrap_or_default();
    let backup_path = backup_dir.join(file_name);
    std::fs::write(backup_path, original)
}
