use tree_sitter::Node;

/// A 1-based line, 0-based column position (lines are 1-based to match
/// editor/CLI conventions; columns stay 0-based, matching tree-sitter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub line: u32,
    pub column: u32,
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self {
            line: p.row as u32 + 1,
            column: p.column as u32,
        }
    }
}

/// A node's byte-accurate span in the source, in line/column form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Point,
    pub end: Point,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    pub fn of(node: Node<'_>) -> Self {
        Self {
            start: node.start_position().into(),
            end: node.end_position().into(),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        }
    }
}
