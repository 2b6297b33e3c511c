//! Level-adaptive grouping (§4.6): items at or above `L_min` characters are
//! sent to the embedder individually; shorter items are grouped, promoted
//! up the owner chain `(class, method) → (class,) → (file,)` until the
//! group reaches `L_min` or collapses into the file scope and is dropped.

use super::extract::{Owner, ProseItem};
use crate::domain::types::BindingLevel;
use std::collections::HashMap;

/// Default `code_analysis.min_chunk_length`.
pub const DEFAULT_MIN_CHUNK_LENGTH: usize = 30;

/// A unit of text ready to hand to the external chunker/embedder: either a
/// single item (already long enough) or several short items concatenated.
#[derive(Debug, Clone)]
pub struct ChunkGroup {
    /// Concatenated text (`"\n\n"`-joined when more than one item).
    pub text: String,
    /// The first item's source type.
    pub source_type: crate::domain::types::SourceType,
    /// The group's binding level, after any promotion.
    pub binding_level: BindingLevel,
    /// The owner after promotion.
    pub owner: Owner,
    /// The first item's line.
    pub line: u32,
    /// The first item's concrete node type.
    pub node_type: &'static str,
}

/// Apply level-adaptive grouping to `items`.
pub fn group(items: Vec<ProseItem>, l_min: usize) -> Vec<ChunkGroup> {
    let mut groups = Vec::new();
    let mut buckets: HashMap<Owner, Vec<ProseItem>> = HashMap::new();

    for item in items {
        if item.text.len() >= l_min {
            groups.push(single_group(item));
        } else {
            buckets.entry(item.owner.clone()).or_default().push(item);
        }
    }

    // Promote deepest-first so a bucket merges into whatever its parent
    // bucket already holds before that parent is itself evaluated. Buckets
    // at different original depths (e.g. a method body vs. its enclosing
    // class) need a different number of hops to reach a common ancestor;
    // resolving strictly by depth, one bucket at a time, keeps them in sync
    // instead of promoting everything by one hop per round and letting a
    // shallower item's bucket get judged (and dropped) before a deeper
    // item's promotion has had a chance to reach it.
    while let Some(owner) = buckets
        .keys()
        .filter(|o| **o != Owner::File)
        .max_by_key(|o| owner_depth(o))
        .cloned()
    {
        let items = buckets.remove(&owner).expect("key was just read from the map");
        let total_len: usize = items.iter().map(|i| i.text.len()).sum();
        if total_len >= l_min {
            groups.push(merged_group(owner, items));
        } else {
            buckets.entry(parent_owner(&owner)).or_default().extend(items);
        }
    }

    // Everything left is owned by File; every non-File bucket has already
    // been merged down into it (or emitted earlier at a shallower scope).
    if let Some(items) = buckets.remove(&Owner::File) {
        let total_len: usize = items.iter().map(|i| i.text.len()).sum();
        if total_len >= l_min {
            groups.push(merged_group(Owner::File, items));
        }
        // Still short even pooled at file scope: dropped.
    }

    groups
}

fn owner_depth(owner: &Owner) -> u8 {
    match owner {
        Owner::Method { .. } => 2,
        Owner::Class(_) | Owner::Function(_) => 1,
        Owner::File => 0,
    }
}

fn parent_owner(owner: &Owner) -> Owner {
    match owner {
        Owner::Method { class, .. } => Owner::Class(class.clone()),
        Owner::Class(_) | Owner::Function(_) => Owner::File,
        Owner::File => Owner::File,
    }
}

fn owner_binding_level(owner: &Owner) -> BindingLevel {
    match owner {
        Owner::File => BindingLevel::File,
        Owner::Class(_) => BindingLevel::Class,
        Owner::Method { .. } | Owner::Function(_) => BindingLevel::FunctionOrMethod,
    }
}

fn single_group(item: ProseItem) -> ChunkGroup {
    ChunkGroup {
        text: item.text,
        source_type: item.source_type,
        binding_level: item.binding_level,
        owner: item.owner,
        line: item.line,
        node_type: item.node_type,
    }
}

fn merged_group(owner: Owner, items: Vec<ProseItem>) -> ChunkGroup {
    let first = items.first().expect("bucket is never empty");
    let source_type = first.source_type;
    let line = first.line;
    let node_type = first.node_type;
    let text = items
        .iter()
        .map(|i| i.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let binding_level = owner_binding_level(&owner);
    ChunkGroup {
        text,
        source_type,
        binding_level,
        owner,
        line,
        node_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SourceType;

    fn item(text: &str, owner: Owner, source_type: SourceType) -> ProseItem {
        ProseItem {
            text: text.to_string(),
            source_type,
            binding_level: BindingLevel::FunctionOrMethod,
            line: 1,
            node_type: "comment",
            owner,
        }
    }

    #[test]
    fn long_items_pass_through_individually() {
        let long_text = "x".repeat(40);
        let items = vec![item(&long_text, Owner::File, SourceType::Comment)];
        let groups = group(items, 30);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text, long_text);
    }

    #[test]
    fn a_method_item_merges_with_its_own_class_item_before_either_is_judged() {
        // Neither item alone reaches l_min, and their combined length
        // (10) doesn't either, but the method item must still merge into
        // its enclosing class's bucket rather than being judged (and
        // dropped) on its own first.
        let items = vec![
            item("aaaaa", Owner::Method { class: "A".into(), method: "m".into() }, SourceType::MethodComment),
            item("bbbbb", Owner::Class("A".into()), SourceType::ClassComment),
        ];
        let groups = group(items, 30);
        assert!(groups.is_empty());
    }

    #[test]
    fn short_items_promote_to_class_then_file() {
        let items = vec![
            item("aaaaa", Owner::Method { class: "A".into(), method: "m".into() }, SourceType::MethodComment),
            item("bbbbb", Owner::Class("A".into()), SourceType::ClassComment),
            item(&"c".repeat(25), Owner::File, SourceType::Comment),
        ];
        let groups = group(items, 30);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].owner, Owner::File);
        assert_eq!(groups[0].binding_level, BindingLevel::File);
        assert!(groups[0].text.contains('a') && groups[0].text.contains('b') && groups[0].text.contains('c'));
    }

    #[test]
    fn file_scope_still_short_is_dropped() {
        let items = vec![item("x", Owner::File, SourceType::Comment)];
        let groups = group(items, 30);
        assert!(groups.is_empty());
    }
}
