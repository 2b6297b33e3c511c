//! The shared text-splicing primitive every patch operation and the import
//! normalization pass build on: collect non-overlapping byte-range edits,
//! then apply them back-to-front so earlier offsets stay valid.

/// Replace `source[start..end]` with `replacement`.
#[derive(Debug, Clone)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// Apply every edit to `source`, returning the spliced result.
///
/// Edits must not overlap; they are applied in descending `start` order so
/// that edits earlier in the source never need their offsets adjusted.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut out = source.to_string();
    for edit in edits {
        out.replace_range(edit.start..edit.end, &edit.replacement);
    }
    out
}
