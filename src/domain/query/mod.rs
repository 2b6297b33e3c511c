//! CSS-like selector query language over a [`codeloom_tree_sitter_analysis::Cst`]
//! (C2 + C3).

pub mod ast;
pub mod executor;
pub mod parser;

pub use ast::Selector;
pub use executor::{execute, resolve_block_id, resolve_node_id, Match, NodeKind};
pub use parser::parse;
