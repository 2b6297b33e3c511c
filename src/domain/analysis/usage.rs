//! Usage analyzer: the second traversal of `analyze_file` (step 8). Walks
//! the tree resolving call and attribute-access expressions to usage sites.

use super::types::UsageDraft;
use crate::domain::types::UsageKind;
use codeloom_tree_sitter_analysis::Cst;
use tree_sitter::Node;

/// Produce one [`UsageDraft`] per call expression and non-called attribute
/// access in `cst`.
pub fn analyze_usages(cst: &Cst) -> Vec<UsageDraft> {
    let mut out = Vec::new();
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
    out: &mut Vec<UsageDraft>,
) {
    let pushed_class = if node.kind() == "class_definition" {
        let name = node
            .child_by_field_name("name")
            .map(|n| cst.text_of(n).to_string())
            .unwrap_or_default();
        class_stack.push(name);
        true
    } else {
        false
    };
    let pushed_func = if node.kind() == "function_definition" {
        let name = node
            .child_by_field_name("name")
            .map(|n| cst.text_of(n).to_string())
            .unwrap_or_default();
        func_stack.push(name);
        true
    } else {
        false
    };

    if node.kind() == "call" {
        if let Some(usage) = classify_call(cst, node, class_stack, func_stack) {
            out.push(usage);
        }
    } else if node.kind() == "attribute" && node.parent().map(|p| p.kind()) != Some("call") {
        if let Some(usage) = classify_attribute(cst, node, func_stack) {
            out.push(usage);
        }
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

fn context_of(func_stack: &[String]) -> Option<String> {
    (!func_stack.is_empty()).then(|| func_stack.join("."))
}

fn classify_call(
    cst: &Cst,
    call: Node<'_>,
    class_stack: &[String],
    func_stack: &[String],
) -> Option<UsageDraft> {
    let function = call.child_by_field_name("function")?;
    let line = call.start_position().row as u32 + 1;
    let context = context_of(func_stack);

    match function.kind() {
        "attribute" => {
            let target_name = function
                .child_by_field_name("attribute")
                .map(|n| cst.text_of(n).to_string())?;
            let receiver = function.child_by_field_name("object")?;
            let target_class = resolve_receiver_class(cst, receiver, class_stack);
            Some(UsageDraft {
                line,
                kind: UsageKind::MethodCall,
                target_name,
                target_class,
                context,
            })
        }
        "identifier" => Some(UsageDraft {
            line,
            kind: UsageKind::FunctionCall,
            target_name: cst.text_of(function).to_string(),
            target_class: None,
            context,
        }),
        _ => None,
    }
}

fn classify_attribute(cst: &Cst, node: Node<'_>, func_stack: &[String]) -> Option<UsageDraft> {
    let target_name = node
        .child_by_field_name("attribute")
        .map(|n| cst.text_of(n).to_string())?;
    let line = node.start_position().row as u32 + 1;
    Some(UsageDraft {
        line,
        kind: UsageKind::AttributeAccess,
        target_name,
        target_class: None,
        context: context_of(func_stack),
    })
}

/// Heuristic: `self.<name>` resolves to the innermost enclosing class;
/// a bare capitalized identifier is taken at face value as a class name.
fn resolve_receiver_class(cst: &Cst, receiver: Node<'_>, class_stack: &[String]) -> Option<String> {
    if receiver.kind() != "identifier" {
        return None;
    }
    let text = cst.text_of(receiver);
    if text == "self" {
        return class_stack.last().cloned();
    }
    if text.chars().next().is_some_and(|c| c.is_uppercase()) {
        return Some(text.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_self_method_call_to_enclosing_class() {
        let src = "class A:\n    def m(self):\n        self.helper()\n";
        let cst = Cst::parse(src).unwrap();
        let usages = analyze_usages(&cst);
        let helper = usages.iter().find(|u| u.target_name == "helper").unwrap();
        assert_eq!(helper.kind, UsageKind::MethodCall);
        assert_eq!(helper.target_class.as_deref(), Some("A"));
        assert_eq!(helper.context.as_deref(), Some("m"));
    }

    #[test]
    fn resolves_bare_function_call() {
        let src = "def f():\n    g()\n";
        let cst = Cst::parse(src).unwrap();
        let usages = analyze_usages(&cst);
        let g = usages.iter().find(|u| u.target_name == "g").unwrap();
        assert_eq!(g.kind, UsageKind::FunctionCall);
        assert!(g.target_class.is_none());
    }

    #[test]
    fn resolves_capitalized_receiver_as_class() {
        let src = "def f():\n    Foo.bar()\n";
        let cst = Cst::parse(src).unwrap();
        let usages = analyze_usages(&cst);
        let bar = usages.iter().find(|u| u.target_name == "bar").unwrap();
        assert_eq!(bar.target_class.as_deref(), Some("Foo"));
    }
}
