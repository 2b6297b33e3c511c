//! End-to-end coverage of the orchestrator's file-based CST surface:
//! `list_cst_blocks`, `query_cst`, `compose_cst_module`, exercised against
//! real files on disk rather than in-memory source strings.

use codeloom::domain::patch::{CreateOp, CreatePosition, PatchOp};
use codeloom::orchestrator::{cst, ErrorCode};
use std::fs;
use tempfile::tempdir;

fn write_source(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// List the blocks in a small module, then replace a method body by
/// `node_id`, and confirm the edit landed and the stats are right.
#[test]
fn lists_blocks_then_replaces_a_method_body_by_node_id() {
    let dir = tempdir().unwrap();
    let source = "class A:\n    def m(self) -> int:\n        return 1\n\ndef f() -> int:\n    return 1\n";
    let path = write_source(dir.path(), "module.py", source);

    let blocks = cst::list_cst_blocks(&path, false).unwrap();
    assert_eq!(blocks.len(), 3);
    let method = blocks.iter().find(|b| b.kind == "method").expect("method block present");
    assert_eq!(method.block_id.as_deref(), Some("method:A.m:2-3"));

    let node_id = method.node_id.clone();
    let op = PatchOp::Replace(codeloom::domain::patch::ReplaceOp {
        selector: codeloom::domain::patch::PatchSelector {
            kind: Some(codeloom::domain::patch::SelectorKind::NodeId),
            node_id: Some(node_id),
            ..Default::default()
        },
        new_code: "def m(self) -> int:\n    return 2\n".to_string(),
        file_docstring: None,
    });

    let result = cst::compose_cst_module(&path, &[op], true, false, true, false).unwrap();
    assert_eq!(result.stats.replaced, 1);
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("return 2"));
}

/// Replace the first `return` statement via a `cst_query` selector
/// string, applied through the file-based surface.
#[test]
fn replaces_the_first_return_via_cst_query_selector() {
    let dir = tempdir().unwrap();
    let source = "def f(x):\n    y = x + 1\n    return y\n";
    let path = write_source(dir.path(), "module.py", source);

    let op = PatchOp::Replace(codeloom::domain::patch::ReplaceOp {
        selector: codeloom::domain::patch::PatchSelector {
            kind: Some(codeloom::domain::patch::SelectorKind::CstQuery),
            query: Some("smallstmt[type=\"return_statement\"]:first".to_string()),
            ..Default::default()
        },
        new_code: "return 123".to_string(),
        file_docstring: None,
    });

    let result = cst::compose_cst_module(&path, &[op], false, false, true, false).unwrap();
    assert_eq!(result.stats.replaced, 1);
    let source = result.source.unwrap();
    assert!(source.contains("return 123"));
    assert!(codeloom_tree_sitter_analysis::Cst::parse(&source).is_ok());
}

/// A replacement whose `new_code` does not parse must fail atomically: the
/// file on disk is untouched and no backup is written.
#[test]
fn an_invalid_replacement_leaves_the_file_and_disk_state_untouched() {
    let dir = tempdir().unwrap();
    let source = "def f():\n    return 1\n";
    let path = write_source(dir.path(), "module.py", source);

    let op = PatchOp::Replace(codeloom::domain::patch::ReplaceOp {
        selector: codeloom::domain::patch::PatchSelector {
            kind: Some(codeloom::domain::patch::SelectorKind::Function),
            name: Some("f".to_string()),
            ..Default::default()
        },
        new_code: "def f(:\n    return 1\n".to_string(),
        file_docstring: None,
    });

    let err = cst::compose_cst_module(&path, &[op], true, true, false, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::CstModulePatchError);

    assert_eq!(fs::read_to_string(&path).unwrap(), source);
    let backup_dir = dir.path().join(".code_mapper_backups");
    assert!(!backup_dir.exists(), "no backup should be written when the patch itself fails");
}

/// Boundary: a `create` op at a non-`end_of_module` position requires a
/// selector; omitting one is a `CST_MODULE_PATCH_ERROR`, not a silent
/// no-op or an unmatched-selector record.
#[test]
fn create_at_a_non_end_of_module_position_without_a_selector_is_an_error() {
    let dir = tempdir().unwrap();
    let path = write_source(dir.path(), "module.py", "");

    let op = PatchOp::Create(CreateOp {
        position: CreatePosition::AfterSelector,
        selector: None,
        source: "def g():\n    return 1\n".to_string(),
    });

    let err = cst::compose_cst_module(&path, &[op], false, false, false, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::CstModulePatchError);
}

/// Boundary: `:nth()` with no argument is a selector parse error, surfaced
/// through `query_cst` as `CST_QUERY_PARSE_ERROR`.
#[test]
fn nth_pseudo_without_an_argument_is_a_query_parse_error() {
    let dir = tempdir().unwrap();
    let path = write_source(dir.path(), "module.py", "def f():\n    pass\n");

    let err = cst::query_cst(&path, "function:nth()", false, None).unwrap_err();
    assert_eq!(err.code, ErrorCode::CstQueryParseError);
}

/// An empty op list is a no-op on both bytes and stats.
#[test]
fn compose_with_no_ops_is_a_no_op() {
    let dir = tempdir().unwrap();
    let source = "def f():\n    return 1\n";
    let path = write_source(dir.path(), "module.py", source);

    let result = cst::compose_cst_module(&path, &[], false, false, true, false).unwrap();
    assert_eq!(result.source.as_deref(), Some(source));
    assert_eq!(result.stats.replaced, 0);
    assert_eq!(result.stats.created, 0);
    assert_eq!(result.stats.inserted, 0);
    assert_eq!(result.stats.removed, 0);
}
