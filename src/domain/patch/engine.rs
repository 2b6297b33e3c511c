//! The patch engine (C9): resolves each operation's selector against the
//! current module text, splices source bytes, and validates the result
//! re-parses cleanly before handing it back. Nothing here touches the
//! filesystem — that is the orchestrator's job, once a [`PatchResult`]
//! comes back clean.

use super::splice::{apply_edits, Edit};
use super::types::{
    CreateOp, CreatePosition, InsertOp, InsertPosition, PatchOp, PatchResult, PatchSelector, PatchStats,
    ReplaceOp, SelectorKind,
};
use super::imports;
use crate::domain::error::{Error, Result};
use crate::domain::query::{self, Match};
use codeloom_tree_sitter_analysis::Cst;

/// Apply every op in order against `original`, normalize imports, and
/// confirm the result parses. Returns the final source and per-op counts.
pub fn apply(original: &str, ops: &[PatchOp]) -> Result<(String, PatchStats)> {
    let mut source = original.to_string();
    let mut stats = PatchStats::default();

    for op in ops {
        match op {
            PatchOp::Replace(replace) => apply_replace(&mut source, replace, &mut stats)?,
            PatchOp::Insert(insert) => apply_insert(&mut source, insert, &mut stats)?,
            PatchOp::Create(create) => apply_create(&mut source, create, &mut stats)?,
        }
    }

    source = imports::normalize(&source)?;

    let cst = Cst::parse(&source).map_err(Error::Syntax)?;
    if cst.has_errors() {
        return Err(Error::patch("patched module no longer parses; no changes were written"));
    }

    Ok((source, stats))
}

/// `apply` plus the `return_source`/`return_diff` packaging `compose_cst_module`
/// hands back to callers.
pub fn compose(original: &str, ops: &[PatchOp], return_source: bool, return_diff: bool) -> Result<PatchResult> {
    let (patched, stats) = apply(original, ops)?;
    let diff = return_diff.then(|| unified_diff(original, &patched));
    let source = return_source.then(|| patched);
    Ok(PatchResult { stats, source, diff })
}

fn unified_diff(before: &str, after: &str) -> String {
    similar::TextDiff::from_lines(before, after)
        .unified_diff()
        .header("before", "after")
        .to_string()
}

fn apply_replace(source: &mut String, op: &ReplaceOp, stats: &mut PatchStats) -> Result<()> {
    if op.selector.kind == Some(SelectorKind::Module) {
        let docstring = op
            .file_docstring
            .as_deref()
            .ok_or_else(|| Error::invalid_argument("replacing the whole module requires file_docstring"))?;
        let mut rebuilt = format!("\"\"\"{docstring}\"\"\"\n\n{}", op.new_code.trim_end());
        rebuilt.push('\n');
        *source = rebuilt;
        stats.replaced += 1;
        return Ok(());
    }

    let cst = Cst::parse(source).map_err(Error::Syntax)?;
    // Replace has no silent-miss case: spec.md §4.9/§7 make a zero-match
    // `cst_query` (`CST_QUERY_NO_MATCH`) and an ambiguous/out-of-range
    // `match_index` (`CST_QUERY_MATCH_INDEX`) both fatal for the op, never
    // mere bookkeeping.
    let m = resolve_selector(&cst, &op.selector)?;

    let is_removal = op.new_code.trim().is_empty();
    if !is_removal
        && m.kind == "smallstmt"
        && matches!(op.selector.kind, Some(SelectorKind::NodeId) | Some(SelectorKind::CstQuery))
    {
        validate_single_statement(&op.new_code)?;
    }

    let replacement = if is_removal { String::new() } else { op.new_code.clone() };
    *source = apply_edits(source, vec![Edit { start: m.start_byte, end: m.end_byte, replacement }]);

    if is_removal {
        stats.removed += 1;
    } else {
        stats.replaced += 1;
    }
    Ok(())
}

fn apply_insert(source: &mut String, op: &InsertOp, stats: &mut PatchStats) -> Result<()> {
    let byte_pos = match &op.selector {
        None => source.len(),
        Some(selector) => {
            let cst = Cst::parse(source).map_err(Error::Syntax)?;
            let m = match resolve_selector(&cst, selector) {
                Ok(m) => m,
                Err(err) if is_zero_match(&err) => {
                    stats.unmatched.push(selector.clone());
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            match op.position {
                InsertPosition::Before => m.start_byte,
                InsertPosition::After => m.end_byte,
            }
        }
    };

    let replacement = ensure_trailing_newline(&op.new_code);
    *source = apply_edits(source, vec![Edit { start: byte_pos, end: byte_pos, replacement }]);
    stats.inserted += 1;
    Ok(())
}

fn apply_create(source: &mut String, op: &CreateOp, stats: &mut PatchStats) -> Result<()> {
    match op.position {
        CreatePosition::EndOfModule => {
            if source.trim().is_empty() {
                *source = ensure_trailing_newline(&op.source);
            } else {
                let addition = format!("\n\n{}\n", op.source.trim_end());
                source.push_str(&addition);
            }
            stats.created += 1;
            Ok(())
        }
        CreatePosition::AfterSelector | CreatePosition::BeforeSelector => {
            let selector = op
                .selector
                .as_ref()
                .ok_or_else(|| Error::invalid_argument("after_selector/before_selector require a selector"))?;
            let cst = Cst::parse(source).map_err(Error::Syntax)?;
            let m = match resolve_selector(&cst, selector) {
                Ok(m) => m,
                Err(err) if is_zero_match(&err) => {
                    stats.unmatched.push(selector.clone());
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            let byte_pos = match op.position {
                CreatePosition::AfterSelector => m.end_byte,
                CreatePosition::BeforeSelector => m.start_byte,
                _ => unreachable!(),
            };
            let replacement = format!("\n\n{}\n", op.source.trim_end());
            *source = apply_edits(source, vec![Edit { start: byte_pos, end: byte_pos, replacement }]);
            stats.created += 1;
            Ok(())
        }
        CreatePosition::EndOfClass | CreatePosition::EndOfFunction => {
            let selector = op
                .selector
                .as_ref()
                .ok_or_else(|| Error::invalid_argument("end_of_class/end_of_function require a selector"))?;
            let cst = Cst::parse(source).map_err(Error::Syntax)?;
            let m = match resolve_selector(&cst, selector) {
                Ok(m) => m,
                Err(err) if is_zero_match(&err) => {
                    stats.unmatched.push(selector.clone());
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            let indent = indent_of_line_containing(source, m.end_byte);
            let replacement = format!("\n{}\n", indented_block(&op.source, &indent));
            *source = apply_edits(source, vec![Edit { start: m.end_byte, end: m.end_byte, replacement }]);
            stats.created += 1;
            Ok(())
        }
    }
}

/// Resolve `selector` to the single node it names, erroring if it is
/// ambiguous (more than one match with no `match_index` to disambiguate)
/// or empty.
fn resolve_selector(cst: &Cst, selector: &PatchSelector) -> Result<Match> {
    let mut matches = resolve_selector_matches(cst, selector)?;
    if matches.is_empty() {
        return Err(Error::query("selector had no match"));
    }
    if let Some(idx) = selector.match_index {
        if idx >= matches.len() {
            return Err(Error::query(format!(
                "match_index {idx} out of range ({} matches)",
                matches.len()
            )));
        }
        return Ok(matches.remove(idx));
    }
    if matches.len() > 1 {
        return Err(Error::query(format!(
            "selector is ambiguous ({} matches); set match_index",
            matches.len()
        )));
    }
    Ok(matches.remove(0))
}

/// True for the genuine "selector matched nothing" failure — the only
/// `resolve_selector` outcome Insert/Create record as `unmatched` rather
/// than propagating. An ambiguous match or an out-of-range `match_index`
/// is always a hard failure (`CST_QUERY_MATCH_INDEX`), never bookkeeping.
fn is_zero_match(err: &Error) -> bool {
    matches!(err, Error::Query { message } if message.contains("no match"))
}

fn resolve_selector_matches(cst: &Cst, selector: &PatchSelector) -> Result<Vec<Match>> {
    match selector.kind {
        Some(SelectorKind::NodeId) => {
            let id = selector
                .node_id
                .as_deref()
                .ok_or_else(|| Error::invalid_argument("node_id selector requires node_id"))?;
            Ok(vec![query::resolve_node_id(cst, id)?])
        }
        Some(SelectorKind::BlockId) => {
            let id = selector
                .block_id
                .as_deref()
                .ok_or_else(|| Error::invalid_argument("block_id selector requires block_id"))?;
            Ok(vec![query::resolve_block_id(cst, id)?])
        }
        Some(SelectorKind::CstQuery) => {
            let raw = selector
                .query
                .as_deref()
                .ok_or_else(|| Error::invalid_argument("cst_query selector requires query"))?;
            query::execute(cst, &query::parse(raw)?, false, None)
        }
        Some(SelectorKind::Function) => named_query(cst, "function", "name", &selector.name),
        Some(SelectorKind::Class) => named_query(cst, "class", "name", &selector.name),
        Some(SelectorKind::Method) => named_query(cst, "method", "qualname", &selector.name),
        Some(SelectorKind::Range) => Ok(vec![range_match(cst, selector)?]),
        Some(SelectorKind::Module) | None => Err(Error::invalid_argument("selector has no resolvable kind")),
    }
}

fn named_query(cst: &Cst, type_token: &str, attr: &str, name: &Option<String>) -> Result<Vec<Match>> {
    let name = name
        .as_deref()
        .ok_or_else(|| Error::invalid_argument(format!("{type_token} selector requires name")))?;
    let raw = format!("{type_token}[{attr}='{}']", escape_selector_value(name));
    query::execute(cst, &query::parse(&raw)?, false, None)
}

fn escape_selector_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn range_match(cst: &Cst, selector: &PatchSelector) -> Result<Match> {
    let start_line = selector
        .start_line
        .ok_or_else(|| Error::invalid_argument("range selector requires start_line"))?;
    let end_line = selector
        .end_line
        .ok_or_else(|| Error::invalid_argument("range selector requires end_line"))?;
    let start_col = selector.start_col.unwrap_or(0);
    let end_col = selector.end_col.unwrap_or(0);

    let start_byte = line_col_to_byte(cst.source(), start_line, start_col)?;
    let end_byte = line_col_to_byte(cst.source(), end_line, end_col)?;
    if end_byte < start_byte {
        return Err(Error::invalid_argument("range selector end precedes start"));
    }

    Ok(Match {
        node_id: format!("range::{start_line}:{start_col}-{end_line}:{end_col}"),
        block_id: None,
        kind: "range".to_string(),
        concrete_type: "range".to_string(),
        name: None,
        qualname: None,
        start_line,
        start_col,
        end_line,
        end_col,
        start_byte,
        end_byte,
        source: None,
    })
}

/// Convert a 1-based line / 0-based column into a byte offset.
fn line_col_to_byte(source: &str, line: u32, col: u32) -> Result<usize> {
    let mut offset = 0usize;
    for (idx, text) in source.split_inclusive('\n').enumerate() {
        if idx as u32 + 1 == line {
            let col = col as usize;
            if col > text.len() {
                return Err(Error::invalid_argument("column out of range for line"));
            }
            return Ok(offset + col);
        }
        offset += text.len();
    }
    Err(Error::invalid_argument(format!("line {line} out of range")))
}

fn validate_single_statement(code: &str) -> Result<()> {
    let wrapped = Cst::parse(code).map_err(|_| Error::patch("replacement is not valid statement syntax"))?;
    let root = wrapped.root_node();
    let mut cursor = root.walk();
    let count = root.children(&mut cursor).count();
    if count != 1 {
        return Err(Error::patch("a small-statement replacement must be exactly one statement"));
    }
    Ok(())
}

fn ensure_trailing_newline(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    out.push('\n');
    out
}

fn indent_of_line_containing(source: &str, byte_offset: usize) -> String {
    let before = &source[..byte_offset];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..byte_offset]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

fn indented_block(text: &str, indent: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| if line.is_empty() { line.to_string() } else { format!("{indent}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::{PatchSelector as Sel, ReplaceOp as Replace};

    #[test]
    fn replaces_a_function_by_name() {
        let source = "def f():\n    return 1\n";
        let op = PatchOp::Replace(Replace {
            selector: Sel::of_kind(SelectorKind::Function).also_name("f"),
            new_code: "def f():\n    return 2\n".to_string(),
            file_docstring: None,
        });
        let (patched, stats) = apply(source, &[op]).unwrap();
        assert_eq!(stats.replaced, 1);
        assert!(patched.contains("return 2"));
    }

    #[test]
    fn removing_a_method_via_empty_new_code_counts_as_removed() {
        let source = "class A:\n    def m(self):\n        return 1\n\n    def n(self):\n        return 2\n";
        let op = PatchOp::Replace(Replace {
            selector: Sel::of_kind(SelectorKind::Method).also_name("A.m"),
            new_code: String::new(),
            file_docstring: None,
        });
        let (patched, stats) = apply(source, &[op]).unwrap();
        assert_eq!(stats.removed, 1);
        assert!(!patched.contains("def m"));
        assert!(patched.contains("def n"));
    }

    #[test]
    fn inserting_after_a_class_is_followed_by_import_normalization() {
        let source = "\"\"\"doc.\"\"\"\nclass A:\n    pass\n";
        let insert = PatchOp::Insert(InsertOp {
            selector: Some(Sel::of_kind(SelectorKind::Class).also_name("A")),
            position: InsertPosition::After,
            new_code: "import os\n\n\ndef f():\n    return os.getcwd()\n".to_string(),
        });
        let (patched, stats) = apply(source, &[insert]).unwrap();
        assert_eq!(stats.inserted, 1);
        assert!(patched.find("import os").unwrap() < patched.find("class A").unwrap());
    }

    #[test]
    fn a_replace_whose_selector_matches_nothing_is_a_hard_error() {
        let source = "def f():\n    return 1\n";
        let op = PatchOp::Replace(Replace {
            selector: Sel::of_kind(SelectorKind::Function).also_name("missing"),
            new_code: "def missing():\n    return 1\n".to_string(),
            file_docstring: None,
        });
        assert!(apply(source, &[op]).is_err());
    }

    #[test]
    fn a_replace_whose_cst_query_is_ambiguous_without_match_index_is_a_hard_error() {
        let source = "class A:\n    def m(self):\n        return 1\n\n    def n(self):\n        return 2\n";
        let op = PatchOp::Replace(Replace {
            selector: PatchSelector {
                kind: Some(SelectorKind::CstQuery),
                query: Some("method".to_string()),
                ..Default::default()
            },
            new_code: "def x(self):\n    return 3\n".to_string(),
            file_docstring: None,
        });
        let err = apply(source, &[op]).unwrap_err();
        assert!(matches!(err, Error::Query { .. }));
    }

    #[test]
    fn an_insert_whose_selector_matches_nothing_is_recorded_rather_than_erroring() {
        let source = "def f():\n    return 1\n";
        let insert = PatchOp::Insert(InsertOp {
            selector: Some(Sel::of_kind(SelectorKind::Function).also_name("missing")),
            position: InsertPosition::After,
            new_code: "def g():\n    return 2\n".to_string(),
        });
        let (patched, stats) = apply(source, &[insert]).unwrap();
        assert_eq!(stats.inserted, 0);
        assert_eq!(stats.unmatched.len(), 1);
        assert_eq!(patched, source);
    }

    #[test]
    fn end_of_function_insert_indents_to_match_the_body() {
        let source = "def f():\n    x = 1\n    return x\n";
        let create = PatchOp::Create(CreateOp {
            position: CreatePosition::EndOfFunction,
            selector: Some(Sel::of_kind(SelectorKind::Function).also_name("f")),
            source: "y = 2\nreturn x + y".to_string(),
        });
        let (patched, stats) = apply(source, &[create]).unwrap();
        assert_eq!(stats.created, 1);
        assert!(patched.contains("\n    y = 2\n    return x + y\n"));
    }

    #[test]
    fn a_patch_that_would_break_parsing_is_rejected() {
        let source = "def f():\n    return 1\n";
        let op = PatchOp::Replace(Replace {
            selector: Sel::of_kind(SelectorKind::Function).also_name("f"),
            new_code: "def f(:\n    return 1\n".to_string(),
            file_docstring: None,
        });
        assert!(apply(source, &[op]).is_err());
    }
}
