//! Query executor (C3): evaluates a parsed selector against a [`Cst`].

use super::ast::{Combinator, Op, Pseudo, Selector, TypeToken};
use crate::domain::error::{Error, Result};
use codeloom_tree_sitter_analysis::Cst;
use std::collections::HashSet;
use tree_sitter::Node;

/// Abstract classification of a concrete tree node, independent of the
/// exact grammar node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Class,
    Function,
    Method,
    Import,
    SmallStmt,
    Stmt,
    Node,
}

impl NodeKind {
    fn as_str(self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Import => "import",
            NodeKind::SmallStmt => "smallstmt",
            NodeKind::Stmt => "stmt",
            NodeKind::Node => "node",
        }
    }
}

const SMALL_STMT_TYPES: &[&str] = &[
    "expression_statement",
    "return_statement",
    "pass_statement",
    "break_statement",
    "continue_statement",
    "raise_statement",
    "global_statement",
    "nonlocal_statement",
    "delete_statement",
    "assert_statement",
    "import_statement",
    "import_from_statement",
    "future_import_statement",
    "exec_statement",
    "print_statement",
];

const COMPOUND_STMT_TYPES: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
];

const IMPORT_TYPES: &[&str] = &["import_statement", "import_from_statement", "future_import_statement"];

/// One indexed node produced by the depth-first traversal, with everything
/// the predicate/combinator logic needs.
struct IndexedNode<'tree> {
    node: Node<'tree>,
    parent_idx: Option<usize>,
    kind: NodeKind,
    name: Option<String>,
    qualname: Option<String>,
}

/// A match returned by [`execute`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct Match {
    /// Span-based stable identifier (§4.3).
    pub node_id: String,
    /// Coarser identifier, only populated for class/function/method kinds.
    pub block_id: Option<String>,
    /// Abstract classification.
    pub kind: String,
    /// Concrete grammar node type.
    pub concrete_type: String,
    /// Name, if the node is a named entity.
    pub name: Option<String>,
    /// Dotted qualified name, if applicable.
    pub qualname: Option<String>,
    /// 1-based start line.
    pub start_line: u32,
    /// 0-based start column.
    pub start_col: u32,
    /// 1-based end line.
    pub end_line: u32,
    /// 0-based end column.
    pub end_col: u32,
    /// Start byte offset, for patch engines splicing source text.
    pub start_byte: usize,
    /// End byte offset, for patch engines splicing source text.
    pub end_byte: usize,
    /// Exact source slice, present only when `include_code` was requested.
    pub source: Option<String>,
}

/// Evaluate `selector` against `cst`, returning ordered matches.
///
/// `max_results` truncates the final result set; it does not affect
/// intermediate steps (a step with no `max_results` applied upstream must
/// still see every candidate so pseudos like `:last` are correct).
pub fn execute(
    cst: &Cst,
    selector: &Selector,
    include_code: bool,
    max_results: Option<usize>,
) -> Result<Vec<Match>> {
    let index = build_index(cst);

    let mut current: Vec<usize> = Vec::new();
    for (step_idx, group) in selector.steps.iter().enumerate() {
        let candidates: Vec<usize> = if step_idx == 0 {
            (0..index.len()).collect()
        } else {
            let combinator = group
                .combinator
                .expect("every step after the first carries a combinator");
            let previous: HashSet<usize> = current.iter().copied().collect();
            (0..index.len())
                .filter(|&i| matches_combinator(&index, i, combinator, &previous))
                .collect()
        };

        let mut matched: Vec<usize> = candidates
            .into_iter()
            .filter(|&i| matches_step(&index, i, &group.step))
            .collect();

        apply_pseudos(&mut matched, &group.step.pseudos);
        current = matched;
    }

    let mut matches: Vec<Match> = current
        .into_iter()
        .map(|i| to_match(cst, &index, i, include_code))
        .collect();

    if let Some(limit) = max_results {
        matches.truncate(limit);
    }
    Ok(matches)
}

fn build_index(cst: &Cst) -> Vec<IndexedNode<'_>> {
    let mut out = Vec::new();
    let mut class_stack: Vec<String> = Vec::new();
    let mut func_stack: Vec<String> = Vec::new();
    visit(cst, cst.root_node(), None, &mut class_stack, &mut func_stack, &mut out);
    out
}

fn visit<'tree>(
    cst: &Cst,
    node: Node<'tree>,
    parent_idx: Option<usize>,
    class_stack: &mut Vec<String>,
    func_stack: &mut Vec<String>,
    out: &mut Vec<IndexedNode<'tree>>,
) {
    let kind = classify(node, parent_idx.map(|i| out[i].kind));
    let name = entity_name(cst, node, kind);

    let qualname = match kind {
        NodeKind::Method => name.as_ref().map(|n| {
            let mut parts = class_stack.clone();
            parts.push(n.clone());
            parts.join(".")
        }),
        NodeKind::Function if !func_stack.is_empty() => name.as_ref().map(|n| {
            let mut parts = func_stack.clone();
            parts.push(n.clone());
            parts.join(".")
        }),
        NodeKind::Function | NodeKind::Class => name.clone(),
        _ => None,
    };

    let my_idx = out.len();
    out.push(IndexedNode {
        node,
        parent_idx,
        kind,
        name,
        qualname,
    });

    let pushed_class = if kind == NodeKind::Class {
        class_stack.push(out[my_idx].name.clone().unwrap_or_default());
        true
    } else {
        false
    };
    let pushed_func = if matches!(kind, NodeKind::Function | NodeKind::Method) {
        func_stack.push(out[my_idx].name.clone().unwrap_or_default());
        true
    } else {
        false
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(cst, child, Some(my_idx), class_stack, func_stack, out);
    }

    if pushed_class {
        class_stack.pop();
    }
    if pushed_func {
        func_stack.pop();
    }
}

fn classify(node: Node<'_>, parent_kind: Option<NodeKind>) -> NodeKind {
    let t = node.kind();
    if t == "module" {
        return NodeKind::Module;
    }
    if t == "class_definition" {
        return NodeKind::Class;
    }
    if t == "function_definition" {
        return match parent_kind {
            Some(NodeKind::Class) => NodeKind::Method,
            _ => NodeKind::Function,
        };
    }
    if IMPORT_TYPES.contains(&t) {
        return NodeKind::Import;
    }
    if COMPOUND_STMT_TYPES.contains(&t) {
        return NodeKind::Stmt;
    }
    if SMALL_STMT_TYPES.contains(&t) {
        return NodeKind::SmallStmt;
    }
    NodeKind::Node
}

fn entity_name(cst: &Cst, node: Node<'_>, kind: NodeKind) -> Option<String> {
    match kind {
        NodeKind::Class | NodeKind::Function | NodeKind::Method => node
            .child_by_field_name("name")
            .map(|n| cst.text_of(n).to_string()),
        NodeKind::Import => import_name(cst, node),
        _ => None,
    }
}

fn import_name(cst: &Cst, node: Node<'_>) -> Option<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| c.kind() == "dotted_name" || c.kind() == "identifier" || c.kind() == "aliased_import")
        .map(|n| cst.text_of(n).to_string())
}

fn matches_combinator(
    index: &[IndexedNode<'_>],
    i: usize,
    combinator: Combinator,
    previous: &HashSet<usize>,
) -> bool {
    match combinator {
        Combinator::Child => index[i].parent_idx.is_some_and(|p| previous.contains(&p)),
        Combinator::Descendant => {
            let mut cur = index[i].parent_idx;
            while let Some(p) = cur {
                if previous.contains(&p) {
                    return true;
                }
                cur = index[p].parent_idx;
            }
            false
        }
    }
}

fn matches_step(index: &[IndexedNode<'_>], i: usize, step: &super::ast::Step) -> bool {
    if !matches_type_token(index, i, &step.type_token) {
        return false;
    }
    step.predicates.iter().all(|p| matches_predicate(index, i, p))
}

const KIND_NAMES: &[&str] = &[
    "module", "class", "function", "method", "stmt", "smallstmt", "import", "node",
];

fn matches_type_token(index: &[IndexedNode<'_>], i: usize, token: &TypeToken) -> bool {
    match token {
        TypeToken::Any => true,
        TypeToken::Named(name) => {
            let lower = name.to_ascii_lowercase();
            if KIND_NAMES.contains(&lower.as_str()) {
                index[i].kind.as_str() == lower
            } else {
                index[i].node.kind().eq_ignore_ascii_case(name)
            }
        }
    }
}

fn matches_predicate(index: &[IndexedNode<'_>], i: usize, predicate: &super::ast::Predicate) -> bool {
    let entry = &index[i];
    let actual: String = match predicate.attr.as_str() {
        "type" => entry.node.kind().to_string(),
        "kind" => entry.kind.as_str().to_string(),
        "name" => entry.name.clone().unwrap_or_default(),
        "qualname" => entry.qualname.clone().unwrap_or_default(),
        "start_line" => (entry.node.start_position().row + 1).to_string(),
        "end_line" => (entry.node.end_position().row + 1).to_string(),
        _ => return false,
    };
    compare(&actual, predicate.op, &predicate.value)
}

fn compare(actual: &str, op: Op, expected: &str) -> bool {
    match op {
        Op::Eq => actual == expected,
        Op::Ne => actual != expected,
        Op::Contains => actual.contains(expected),
        Op::StartsWith => actual.starts_with(expected),
        Op::EndsWith => actual.ends_with(expected),
    }
}

fn apply_pseudos(matched: &mut Vec<usize>, pseudos: &[Pseudo]) {
    for pseudo in pseudos {
        match pseudo {
            Pseudo::First => {
                if let Some(&first) = matched.first() {
                    *matched = vec![first];
                } else {
                    matched.clear();
                }
            }
            Pseudo::Last => {
                if let Some(&last) = matched.last() {
                    *matched = vec![last];
                } else {
                    matched.clear();
                }
            }
            Pseudo::Nth(n) => {
                *matched = matched.get(*n).copied().into_iter().collect();
            }
        }
    }
}

fn to_match(cst: &Cst, index: &[IndexedNode<'_>], i: usize, include_code: bool) -> Match {
    let entry = &index[i];
    let start = entry.node.start_position();
    let end = entry.node.end_position();
    let start_line = start.row as u32 + 1;
    let start_col = start.column as u32;
    let end_line = end.row as u32 + 1;
    let end_col = end.column as u32;

    let node_id = format!(
        "{}:{}:{}:{}:{}-{}:{}",
        entry.kind.as_str(),
        entry.qualname.clone().unwrap_or_default(),
        entry.node.kind(),
        start_line,
        start_col,
        end_line,
        end_col
    );
    let block_id = matches!(entry.kind, NodeKind::Class | NodeKind::Function | NodeKind::Method).then(|| {
        format!(
            "{}:{}:{}-{}",
            entry.kind.as_str(),
            entry.qualname.clone().unwrap_or_default(),
            start_line,
            end_line
        )
    });

    Match {
        node_id,
        block_id,
        kind: entry.kind.as_str().to_string(),
        concrete_type: entry.node.kind().to_string(),
        name: entry.name.clone(),
        qualname: entry.qualname.clone(),
        start_line,
        start_col,
        end_line,
        end_col,
        start_byte: entry.node.start_byte(),
        end_byte: entry.node.end_byte(),
        source: include_code.then(|| cst.text_of(entry.node).to_string()),
    }
}

/// Resolve a previously issued `block_id` back to its match.
pub fn resolve_block_id(cst: &Cst, block_id: &str) -> Result<Match> {
    let index = build_index(cst);
    for i in 0..index.len() {
        let m = to_match(cst, &index, i, false);
        if m.block_id.as_deref() == Some(block_id) {
            return Ok(m);
        }
    }
    Err(Error::query(format!("no block matches block_id '{block_id}'")))
}

/// Resolve a previously issued `node_id` back to the node it names, by
/// re-running the traversal and matching the formatted id.
///
/// Per the spec's own open question, this is only reliable "within one
/// process lifetime on unchanged source bytes" — callers must refresh ids
/// after any edit.
pub fn resolve_node_id(cst: &Cst, node_id: &str) -> Result<Match> {
    let index = build_index(cst);
    for i in 0..index.len() {
        let m = to_match(cst, &index, i, false);
        if m.node_id == node_id {
            return Ok(m);
        }
    }
    Err(Error::query(format!("no node matches node_id '{node_id}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::parser;

    #[test]
    fn lists_class_function_and_method_blocks() {
        let src = "class A:\n    def m(self) -> int:\n        return 1\n\ndef f() -> int:\n    return 1\n";
        let cst = Cst::parse(src).unwrap();
        let classes = execute(&cst, &parser::parse("class").unwrap(), false, None).unwrap();
        let functions = execute(&cst, &parser::parse("function").unwrap(), false, None).unwrap();
        let methods = execute(&cst, &parser::parse("method").unwrap(), false, None).unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(functions.len(), 1);
        assert_eq!(methods.len(), 1);
        assert_eq!(classes[0].block_id.as_deref(), Some("class:A:1-3"));
        assert_eq!(methods[0].block_id.as_deref(), Some("method:A.m:2-3"));
        assert_eq!(functions[0].block_id.as_deref(), Some("function:f:5-6"));
    }

    #[test]
    fn first_pseudo_selects_first_return_statement() {
        let src = "def f(x):\n    y = x + 1\n    return y\n";
        let cst = Cst::parse(src).unwrap();
        let selector = parser::parse("smallstmt[type='return_statement']:first").unwrap();
        let matches = execute(&cst, &selector, false, None).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].concrete_type, "return_statement");
    }

    #[test]
    fn predicate_on_unicode_name_round_trips() {
        let src = "def тест():\n    pass\n";
        let cst = Cst::parse(src).unwrap();
        let selector = parser::parse("function[name='тест']").unwrap();
        let matches = execute(&cst, &selector, false, None).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name.as_deref(), Some("тест"));
    }

    #[test]
    fn child_combinator_restricts_to_immediate_children() {
        let src = "class A:\n    def m(self):\n        if True:\n            return 1\n";
        let cst = Cst::parse(src).unwrap();
        let selector = parser::parse("method > stmt").unwrap();
        let matches = execute(&cst, &selector, false, None).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].concrete_type, "if_statement");
    }
}
