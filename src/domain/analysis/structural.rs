//! Structural analyzer (C4): single-pass walk of a parsed module producing
//! structural entities and quality issues.
//!
//! Parsing (step 2), the store transaction and snapshot write (steps 3, 7)
//! and the usage pass (step 8, see [`super::usage`]) live outside this
//! module, which only performs the pure tree walk (steps 1, 4, 5, 6).

use super::types::{
    ClassDraft, CodeContentDraft, FunctionDraft, ImportDraft, IssueDraft, IssueOwner, MethodDraft,
};
use crate::domain::types::ImportKind;
use codeloom_tree_sitter_analysis::Cst;
use serde_json::json;
use tree_sitter::Node;

/// Default `code_analysis.max_file_lines` threshold when not configured.
pub const DEFAULT_MAX_FILE_LINES: u32 = 400;

/// Walk `cst` and produce every structural entity and quality issue that
/// depends only on the parsed tree (not on store or filesystem state).
pub fn analyze_source(cst: &Cst, max_file_lines: u32) -> FileAnalysis {
    let line_count = cst.source().lines().count() as u32;
    let root = cst.root_node();
    let has_docstring = module_docstring(cst, root).is_some();

    let mut classes = Vec::new();
    let mut functions = Vec::new();
    let mut imports = Vec::new();
    let mut issues = Vec::new();
    let mut code_contents = Vec::new();

    if line_count > max_file_lines {
        issues.push(IssueDraft {
            kind: "file_too_long".to_string(),
            message: format!("file has {line_count} lines, exceeding the configured limit of {max_file_lines}"),
            line: None,
            owner: IssueOwner::File,
            metadata: json!({ "line_count": line_count, "limit": max_file_lines }),
        });
    }
    if !has_docstring {
        issues.push(IssueDraft {
            kind: "missing_docstring".to_string(),
            message: "module has no file-level docstring".to_string(),
            line: Some(1),
            owner: IssueOwner::File,
            metadata: json!({}),
        });
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if let Some(import) = import_draft(cst, child) {
            imports.push(import);
        }
    }

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "class_definition" => {
                let class = class_draft(cst, child, &mut issues, &mut code_contents);
                classes.push(class);
            }
            "function_definition" => {
                let function = function_draft(cst, child);
                if function.docstring.is_none() {
                    issues.push(IssueDraft {
                        kind: "missing_docstring".to_string(),
                        message: format!("function '{}' has no docstring", function.name),
                        line: Some(function.line),
                        owner: IssueOwner::Function(function.name.clone()),
                        metadata: json!({}),
                    });
                }
                code_contents.push(CodeContentDraft {
                    entity_kind: "function",
                    entity_name: function.name.clone(),
                    raw_source: cst.text_of(child).to_string(),
                    docstring: function.docstring.clone(),
                });
                functions.push(function);
            }
            "decorated_definition" => {
                if let Some(inner) = decorated_inner(child) {
                    if inner.kind() == "function_definition" {
                        let function = function_draft(cst, inner);
                        code_contents.push(CodeContentDraft {
                            entity_kind: "function",
                            entity_name: function.name.clone(),
                            raw_source: cst.text_of(child).to_string(),
                            docstring: function.docstring.clone(),
                        });
                        functions.push(function);
                    } else if inner.kind() == "class_definition" {
                        let class = class_draft(cst, inner, &mut issues, &mut code_contents);
                        classes.push(class);
                    }
                }
            }
            _ => {}
        }
    }

    FileAnalysis {
        line_count,
        has_docstring,
        classes,
        functions,
        imports,
        issues,
        code_contents,
    }
}

fn decorated_inner(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("definition")
}

fn module_docstring<'a>(cst: &Cst, root: Node<'a>) -> Option<String> {
    let first = root.child(0)?;
    first_statement_docstring(cst, first)
}

/// First-statement docstring convention: a block's docstring is the string
/// literal of its first statement, if that statement is a bare string
/// expression (mirrors Python's `ast.get_docstring`).
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
    let mut s = raw;
    while let Some(stripped) = s
        .strip_prefix('r')
        .or_else(|| s.strip_prefix('R'))
        .or_else(|| s.strip_prefix('u'))
        .or_else(|| s.strip_prefix('U'))
        .or_else(|| s.strip_prefix('b'))
        .or_else(|| s.strip_prefix('B'))
        .or_else(|| s.strip_prefix('f'))
        .or_else(|| s.strip_prefix('F'))
    {
        s = stripped;
    }
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner.trim().to_string();
        }
    }
    s.trim().to_string()
}

fn import_draft(cst: &Cst, node: Node<'_>) -> Option<ImportDraft> {
    let line = node.start_position().row as u32 + 1;
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            let name = node
                .children(&mut cursor)
                .find(|c| c.kind() == "dotted_name" || c.kind() == "aliased_import")
                .map(|c| cst.text_of(c).to_string())?;
            Some(ImportDraft {
                imported_name: name,
                module_prefix: None,
                kind: ImportKind::Direct,
                line,
            })
        }
        "import_from_statement" => {
            let module_prefix = node
                .child_by_field_name("module_name")
                .map(|c| cst.text_of(c).to_string());
            let mut cursor = node.walk();
            let imported_name = node
                .children(&mut cursor)
                .filter(|c| c.kind() == "dotted_name" || c.kind() == "aliased_import" || c.kind() == "wildcard_import")
                .nth(if module_prefix.is_some() { 1 } else { 0 })
                .map(|c| cst.text_of(c).to_string())
                .unwrap_or_else(|| "*".to_string());
            Some(ImportDraft {
                imported_name,
                module_prefix,
                kind: ImportKind::FromModule,
                line,
            })
        }
        _ => None,
    }
}

fn function_args(cst: &Cst, node: Node<'_>) -> Vec<String> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "identifier" => Some(cst.text_of(p).to_string()),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                p.child(0).map(|n| cst.text_of(n).to_string())
            }
            _ => None,
        })
        .collect()
}

fn function_draft(cst: &Cst, node: Node<'_>) -> FunctionDraft {
    let name = node
        .child_by_field_name("name")
        .map(|n| cst.text_of(n).to_string())
        .unwrap_or_default();
    let line = node.start_position().row as u32 + 1;
    let args = function_args(cst, node);
    let docstring = node
        .child_by_field_name("body")
        .and_then(|body| body.child(0))
        .and_then(|first| first_statement_docstring(cst, first));
    FunctionDraft {
        name,
        line,
        args,
        docstring,
    }
}

fn class_draft(
    cst: &Cst,
    node: Node<'_>,
    issues: &mut Vec<IssueDraft>,
    code_contents: &mut Vec<CodeContentDraft>,
) -> ClassDraft {
    let name = node
        .child_by_field_name("name")
        .map(|n| cst.text_of(n).to_string())
        .unwrap_or_default();
    let line = node.start_position().row as u32 + 1;
    let bases = node
        .child_by_field_name("superclasses")
        .map(|args| {
            let mut cursor = args.walk();
            args.children(&mut cursor)
                .filter(|c| c.kind() == "identifier" || c.kind() == "attribute")
                .map(|c| cst.text_of(c).to_string())
                .collect()
        })
        .unwrap_or_default();
    let body = node.child_by_field_name("body");
    let docstring = body
        .and_then(|b| b.child(0))
        .and_then(|first| first_statement_docstring(cst, first));

    if docstring.is_none() {
        issues.push(IssueDraft {
            kind: "missing_docstring".to_string(),
            message: format!("class '{name}' has no docstring"),
            line: Some(line),
            owner: IssueOwner::Class(name.clone()),
            metadata: json!({}),
        });
    }
    code_contents.push(CodeContentDraft {
        entity_kind: "class",
        entity_name: name.clone(),
        raw_source: cst.text_of(node).to_string(),
        docstring: docstring.clone(),
    });

    let mut methods = Vec::new();
    if let Some(body) = body {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            let method_node = match child.kind() {
                "function_definition" => Some(child),
                "decorated_definition" => decorated_inner(child).filter(|n| n.kind() == "function_definition"),
                _ => None,
            };
            if let Some(method_node) = method_node {
                let method = method_draft(cst, method_node, child);
                if method.docstring.is_none() {
                    issues.push(IssueDraft {
                        kind: "missing_docstring".to_string(),
                        message: format!("method '{name}.{}' has no docstring", method.name),
                        line: Some(method.line),
                        owner: IssueOwner::Method {
                            class: name.clone(),
                            method: method.name.clone(),
                        },
                        metadata: json!({}),
                    });
                }
                if method.raises_not_implemented && !method.is_abstract {
                    issues.push(IssueDraft {
                        kind: "raises_not_implemented".to_string(),
                        message: format!(
                            "method '{name}.{}' raises NotImplementedError without being marked abstract",
                            method.name
                        ),
                        line: Some(method.line),
                        owner: IssueOwner::Method {
                            class: name.clone(),
                            method: method.name.clone(),
                        },
                        metadata: json!({}),
                    });
                }
                code_contents.push(CodeContentDraft {
                    entity_kind: "method",
                    entity_name: format!("{name}.{}", method.name),
                    raw_source: cst.text_of(child).to_string(),
                    docstring: method.docstring.clone(),
                });
                methods.push(method);
            }
        }
    }

    ClassDraft {
        name,
        line,
        docstring,
        bases,
        methods,
    }
}

fn method_draft(cst: &Cst, node: Node<'_>, decorated_or_self: Node<'_>) -> MethodDraft {
    let name = node
        .child_by_field_name("name")
        .map(|n| cst.text_of(n).to_string())
        .unwrap_or_default();
    let line = node.start_position().row as u32 + 1;
    let args = function_args(cst, node);
    let is_abstract = has_abstractmethod_decorator(cst, decorated_or_self);

    let body = node.child_by_field_name("body");
    let (docstring, non_docstring_stmts) = classify_body(cst, body);

    // A docstring counts as a body statement here: `len(node.body) == 1 and
    // isinstance(node.body[0], ast.Pass)` — a docstring followed by `pass`
    // has two statements and does not qualify, even though the method is
    // still a no-op in spirit.
    let body_is_only_no_op = body_is_single_bare_pass(body);
    let raises_not_implemented = non_docstring_stmts.len() == 1
        && non_docstring_stmts[0].kind() == "raise_statement"
        && raises_not_implemented_error(cst, non_docstring_stmts[0]);

    MethodDraft {
        name,
        line,
        args,
        docstring,
        is_abstract,
        body_is_only_no_op,
        raises_not_implemented,
    }
}

fn classify_body<'a>(cst: &Cst, body: Option<Node<'a>>) -> (Option<String>, Vec<Node<'a>>) {
    let Some(body) = body else {
        return (None, Vec::new());
    };
    let mut cursor = body.walk();
    let mut stmts: Vec<Node<'_>> = body.children(&mut cursor).collect();
    if stmts.is_empty() {
        return (None, Vec::new());
    }
    let docstring = first_statement_docstring(cst, stmts[0]);
    if docstring.is_some() {
        stmts.remove(0);
    }
    (docstring, stmts)
}

fn body_is_single_bare_pass(body: Option<Node<'_>>) -> bool {
    let Some(body) = body else {
        return false;
    };
    let mut cursor = body.walk();
    let mut stmts = body.children(&mut cursor);
    match (stmts.next(), stmts.next()) {
        (Some(only), None) => only.kind() == "pass_statement",
        _ => false,
    }
}

fn has_abstractmethod_decorator(cst: &Cst, decorated_or_self: Node<'_>) -> bool {
    if decorated_or_self.kind() != "decorated_definition" {
        return false;
    }
    let mut cursor = decorated_or_self.walk();
    decorated_or_self
        .children(&mut cursor)
        .filter(|c| c.kind() == "decorator")
        .any(|d| {
            // Matches only the bare-name decorator form (`@abstractmethod`),
            // same as the original's `isinstance(decorator, ast.Name)`
            // check — a dotted `@abc.abstractmethod` is not recognized.
            let text = cst.text_of(d).trim_start_matches('@').trim();
            text == "abstractmethod"
        })
}

fn raises_not_implemented_error(cst: &Cst, raise_stmt: Node<'_>) -> bool {
    // Only the call form counts (`raise NotImplementedError(...)`), matching
    // the original's `isinstance(stmt.exc, ast.Call)` check — a bare `raise
    // NotImplementedError` with no call parens does not.
    let mut cursor = raise_stmt.walk();
    raise_stmt.children(&mut cursor).any(|c| {
        c.kind() == "call"
            && c.child_by_field_name("function")
                .is_some_and(|f| cst.text_of(f) == "NotImplementedError")
    })
}

use super::types::FileAnalysis;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_missing_module_docstring() {
        let cst = Cst::parse("def f():\n    pass\n").unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        assert!(!analysis.has_docstring);
        assert!(analysis.issues.iter().any(|i| i.kind == "missing_docstring" && matches!(i.owner, IssueOwner::File)));
    }

    #[test]
    fn extracts_class_bases_and_method() {
        let src = "class A(Base):\n    \"\"\"doc\"\"\"\n    def m(self, x):\n        return x\n";
        let cst = Cst::parse(src).unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        assert_eq!(analysis.classes.len(), 1);
        let class = &analysis.classes[0];
        assert_eq!(class.name, "A");
        assert_eq!(class.bases, vec!["Base".to_string()]);
        assert_eq!(class.docstring.as_deref(), Some("doc"));
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].args, vec!["self".to_string(), "x".to_string()]);
    }

    #[test]
    fn detects_abstract_and_raises_not_implemented() {
        let src = "from abc import abstractmethod\n\nclass A:\n    \"\"\"doc\"\"\"\n    @abstractmethod\n    def m(self):\n        raise NotImplementedError()\n\n    def n(self):\n        raise NotImplementedError()\n";
        let cst = Cst::parse(src).unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        let methods = &analysis.classes[0].methods;
        let m = methods.iter().find(|m| m.name == "m").unwrap();
        let n = methods.iter().find(|m| m.name == "n").unwrap();
        assert!(m.is_abstract && m.raises_not_implemented);
        assert!(!n.is_abstract && n.raises_not_implemented);
        assert!(analysis
            .issues
            .iter()
            .any(|i| i.kind == "raises_not_implemented" && matches!(&i.owner, IssueOwner::Method { method, .. } if method == "n")));
    }

    #[test]
    fn detects_body_is_only_no_op() {
        let src = "class A:\n    \"\"\"doc\"\"\"\n    def m(self):\n        pass\n";
        let cst = Cst::parse(src).unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        assert!(analysis.classes[0].methods[0].body_is_only_no_op);
    }

    #[test]
    fn a_docstring_before_pass_does_not_count_as_no_op() {
        let src = "class A:\n    \"\"\"doc\"\"\"\n    def m(self):\n        \"\"\"m doc\"\"\"\n        pass\n";
        let cst = Cst::parse(src).unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        assert!(!analysis.classes[0].methods[0].body_is_only_no_op);
    }

    #[test]
    fn a_dotted_abstractmethod_decorator_is_not_recognized() {
        let src = "import abc\n\nclass A:\n    \"\"\"doc\"\"\"\n    @abc.abstractmethod\n    def m(self):\n        pass\n";
        let cst = Cst::parse(src).unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        assert!(!analysis.classes[0].methods[0].is_abstract);
    }

    #[test]
    fn a_bare_raise_not_implemented_error_without_call_parens_does_not_count() {
        let src = "class A:\n    \"\"\"doc\"\"\"\n    def m(self):\n        raise NotImplementedError\n";
        let cst = Cst::parse(src).unwrap();
        let analysis = analyze_source(&cst, DEFAULT_MAX_FILE_LINES);
        assert!(!analysis.classes[0].methods[0].raises_not_implemented);
    }
}
