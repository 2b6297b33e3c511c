//! Import normalization (§4.9): after every `compose_cst_module` batch,
//! module-top-level imports must sit contiguously at the top of the
//! module body — after an optional module docstring, before the first
//! non-import statement — in their original relative order. Imports
//! nested inside a function or class body are never touched.

use super::splice::{apply_edits, Edit};
use crate::domain::error::{Error, Result};
use codeloom_tree_sitter_analysis::Cst;
use tree_sitter::Node;

const IMPORT_KINDS: &[&str] = &["import_statement", "import_from_statement", "future_import_statement"];

/// Re-parse `source` and, if its top-level imports are out of position,
/// splice them back to the top. Returns `source` unchanged (same String
/// contents) when it is already normalized.
pub fn normalize(source: &str) -> Result<String> {
    let cst = Cst::parse(source).map_err(Error::Syntax)?;
    let root = cst.root_node();
    let mut cursor = root.walk();
    let children: Vec<Node> = root.children(&mut cursor).collect();
    if children.is_empty() {
        return Ok(source.to_string());
    }

    let mut idx = 0;
    let docstring_end = if is_docstring_statement(children[0]) {
        idx = 1;
        Some(children[0].end_byte())
    } else {
        None
    };

    let import_nodes: Vec<Node> = children[idx..]
        .iter()
        .filter(|c| IMPORT_KINDS.contains(&c.kind()))
        .copied()
        .collect();
    if import_nodes.is_empty() {
        return Ok(source.to_string());
    }

    let already_normalized = children.len() - idx >= import_nodes.len()
        && children[idx..idx + import_nodes.len()]
            .iter()
            .zip(&import_nodes)
            .all(|(a, b)| a.id() == b.id());
    if already_normalized {
        return Ok(source.to_string());
    }

    let insertion_point = docstring_end.unwrap_or_else(|| root.start_byte());
    let import_block = {
        let joined = import_nodes
            .iter()
            .map(|n| cst.text_of(*n))
            .collect::<Vec<_>>()
            .join("\n");
        if docstring_end.is_some() {
            format!("\n{joined}\n\n")
        } else {
            format!("{joined}\n\n")
        }
    };

    let mut edits: Vec<Edit> = import_nodes
        .iter()
        .map(|n| {
            let (start, end) = expand_removal_span(source, n.start_byte(), n.end_byte());
            Edit {
                start,
                end,
                replacement: String::new(),
            }
        })
        .collect();
    edits.push(Edit {
        start: insertion_point,
        end: insertion_point,
        replacement: import_block,
    });

    Ok(apply_edits(source, edits))
}

fn is_docstring_statement(node: Node) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    node.child(0).map(|c| c.kind() == "string").unwrap_or(false)
}

/// Extend an import node's span to swallow its own trailing newline so
/// removing it doesn't leave a blank line behind.
fn expand_removal_span(source: &str, start: usize, end: usize) -> (usize, usize) {
    let end = if source.as_bytes().get(end) == Some(&b'\n') {
        end + 1
    } else {
        end
    };
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_already_normalized_source_untouched() {
        let source = "\"\"\"doc.\"\"\"\nimport os\nimport sys\n\n\ndef f():\n    pass\n";
        let out = normalize(source).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn hoists_scattered_top_level_imports_to_the_top() {
        let source = "\"\"\"doc.\"\"\"\ndef f():\n    pass\n\n\nimport os\n\n\nimport sys\n";
        let out = normalize(source).unwrap();
        let doc_pos = out.find("\"\"\"doc.\"\"\"").unwrap();
        let os_pos = out.find("import os").unwrap();
        let sys_pos = out.find("import sys").unwrap();
        let def_pos = out.find("def f").unwrap();
        assert!(doc_pos < os_pos && os_pos < sys_pos && sys_pos < def_pos);

        let reparsed = Cst::parse(&out).unwrap();
        assert!(!reparsed.has_errors());
    }

    #[test]
    fn never_moves_imports_nested_in_a_function_body() {
        let source = "def f():\n    import os\n    return os.getcwd()\n\n\nimport sys\n";
        let out = normalize(source).unwrap();
        assert!(out.contains("def f():\n    import os\n"));
        assert!(out.starts_with("import sys"));
    }

    #[test]
    fn preserves_original_relative_order_of_hoisted_imports() {
        let source = "import sys\ndef f():\n    pass\n\n\nimport os\n";
        let out = normalize(source).unwrap();
        assert!(out.find("import sys").unwrap() < out.find("import os").unwrap());
    }
}
