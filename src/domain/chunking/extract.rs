//! Prose extraction: walks a parsed module with parent context
//! `(parent_class, parent_function)` and emits one item per docstring and
//! inline comment.

use crate::domain::types::{BindingLevel, SourceType};
use codeloom_tree_sitter_analysis::Cst;
use tree_sitter::Node;

/// What a [`ProseItem`] is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    File,
    Class(String),
    Method { class: String, method: String },
    Function(String),
}

/// One unit of prose found during the walk, before grouping.
#[derive(Debug, Clone)]
pub struct ProseItem {
    pub text: String,
    pub source_type: SourceType,
    pub binding_level: BindingLevel,
    pub line: u32,
    pub node_type: &'static str,
    pub owner: Owner,
}

/// Walk `cst` and return every docstring/comment item, in document order.
pub fn extract(cst: &Cst) -> Vec<ProseItem> {
    let mut out = Vec::new();
    if let Some(first) = cst.root_node().child(0) {
        if let Some(text) = first_statement_docstring(cst, first) {
            out.push(ProseItem {
                text,
                source_type: SourceType::FileDocstring,
                binding_level: BindingLevel::File,
                line: first.start_position().row as u32 + 1,
                node_type: "string",
                owner: Owner::File,
            });
        }
    }

    let mut class_stack: Vec<String> = Vec::new();
    let mut func_stack: Vec<String> = Vec::new();
    walk(cst, cst.root_node(), &mut class_stack, &mut func_stack, &mut out);
    out
}

fn walk(
    cst: &Cst,
    node: Node<'_>,
    class_stack: &mut Vec<String>,
    func_stack: &mut Vec<String>,
    out: &mut Vec<ProseItem>,
) {
    if node.kind() == "comment" {
        let owner = current_owner(class_stack, func_stack);
        out.push(ProseItem {
            text: node
                .utf8_text(cst.source().as_bytes())
                .unwrap_or_default()
                .trim_start_matches('#')
                .trim()
                .to_string(),
            source_type: comment_source_type(&owner),
            binding_level: owner_binding_level(&owner),
            line: node.start_position().row as u32 + 1,
            node_type: "comment",
            owner,
        });
    }

    let mut pushed_class = false;
    let mut pushed_func = false;

    if node.kind() == "class_definition" {
        let name = node
            .child_by_field_name("name")
            .map(|n| cst.text_of(n).to_string())
            .unwrap_or_default();
        if let Some(doc) = node
            .child_by_field_name("body")
            .and_then(|b| b.child(0))
            .and_then(|first| first_statement_docstring(cst, first))
        {
            out.push(ProseItem {
                text: doc,
                source_type: SourceType::ClassDocstring,
                binding_level: BindingLevel::Class,
                line: node.start_position().row as u32 + 1,
                node_type: "string",
                owner: Owner::Class(name.clone()),
            });
        }
        class_stack.push(name);
        pushed_class = true;
    } else if node.kind() == "function_definition" {
        let name = node
            .child_by_field_name("name")
            .map(|n| cst.text_of(n).to_string())
            .unwrap_or_default();
        let is_method = is_method_node(node);
        let owner = if is_method {
            Owner::Method {
                class: class_stack.last().cloned().unwrap_or_default(),
                method: name.clone(),
            }
        } else {
            Owner::Function(name.clone())
        };
        if let Some(doc) = node
            .child_by_field_name("body")
            .and_then(|b| b.child(0))
            .and_then(|first| first_statement_docstring(cst, first))
        {
            let source_type = if is_method {
                SourceType::MethodDocstring
            } else {
                SourceType::FunctionDocstring
            };
            out.push(ProseItem {
                text: doc,
                source_type,
                binding_level: BindingLevel::FunctionOrMethod,
                line: node.start_position().row as u32 + 1,
                node_type: "string",
                owner,
            });
        }
        func_stack.push(name);
        pushed_func = true;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(cst, child, class_stack, func_stack, out);
    }

    if pushed_class {
        class_stack.pop();
    }
    if pushed_func {
        func_stack.pop();
    }
}

fn is_method_node(node: Node<'_>) -> bool {
    node.parent()
        .and_then(|p| p.parent())
        .map(|gp| gp.kind() == "class_definition")
        .unwrap_or(false)
}

fn first_statement_docstring(cst: &Cst, first_stmt: Node<'_>) -> Option<String> {
    if first_stmt.kind() != "expression_statement" {
        return None;
    }
    let expr = first_stmt.child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(strip_string_literal(cst.text_of(expr)))
}

fn strip_string_literal(raw: &str) -> String {
    const PREFIX_CHARS: &[char] = &['r', 'R', 'u', 'U', 'b', 'B', 'f', 'F'];
    let mut s = raw;
    while let Some(stripped) = s.strip_prefix(PREFIX_CHARS) {
        s = stripped;
    }
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim().to_string();
        }
    }
    s.trim().to_string()
}

fn current_owner(class_stack: &[String], func_stack: &[String]) -> Owner {
    match (class_stack.last(), func_stack.last()) {
        (Some(class), Some(method)) => Owner::Method {
            class: class.clone(),
            method: method.clone(),
        },
        (None, Some(function)) => Owner::Function(function.clone()),
        (Some(class), None) => Owner::Class(class.clone()),
        (None, None) => Owner::File,
    }
}

fn comment_source_type(owner: &Owner) -> SourceType {
    match owner {
        Owner::Method { .. } => SourceType::MethodComment,
        Owner::Class(_) => SourceType::ClassComment,
        Owner::Function(_) => SourceType::FunctionComment,
        Owner::File => SourceType::Comment,
    }
}

fn owner_binding_level(owner: &Owner) -> BindingLevel {
    match owner {
        Owner::File => BindingLevel::File,
        Owner::Class(_) => BindingLevel::Class,
        Owner::Method { .. } | Owner::Function(_) => BindingLevel::FunctionOrMethod,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_file_and_class_and_method_docstrings() {
        let src = "\"\"\"file doc\"\"\"\nclass A:\n    \"\"\"class doc\"\"\"\n    def m(self):\n        \"\"\"method doc\"\"\"\n        pass\n";
        let cst = Cst::parse(src).unwrap();
        let items = extract(&cst);
        assert!(items.iter().any(|i| i.source_type == SourceType::FileDocstring && i.text == "file doc"));
        assert!(items.iter().any(|i| i.source_type == SourceType::ClassDocstring && i.text == "class doc"));
        assert!(items.iter().any(|i| i.source_type == SourceType::MethodDocstring && i.text == "method doc"));
    }

    #[test]
    fn attributes_comment_to_enclosing_method() {
        let src = "class A:\n    def m(self):\n        # note\n        pass\n";
        let cst = Cst::parse(src).unwrap();
        let items = extract(&cst);
        let comment = items.iter().find(|i| i.node_type == "comment").unwrap();
        assert_eq!(comment.text, "note");
        assert_eq!(comment.source_type, SourceType::MethodComment);
        assert_eq!(comment.owner, Owner::Method { class: "A".to_string(), method: "m".to_string() });
    }
}
