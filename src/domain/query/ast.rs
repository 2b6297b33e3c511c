//! The selector AST produced by [`crate::domain::query::parser::parse`].

/// A parsed selector: one or more steps joined by combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The first step has no combinator; every following step does.
    pub steps: Vec<StepGroup>,
}

/// One step and the combinator that connects it to the previous step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGroup {
    /// `None` only for the first step in the selector.
    pub combinator: Option<Combinator>,
    /// The step itself.
    pub step: Step,
}

/// How a step's candidate set relates to the previous step's matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `>` — immediate parent must be a previous match.
    Child,
    /// whitespace — any ancestor must be a previous match.
    Descendant,
}

/// A single selector step: a type test plus zero or more predicates and
/// pseudo-selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// The type test.
    pub type_token: TypeToken,
    /// Attribute predicates, all of which must hold.
    pub predicates: Vec<Predicate>,
    /// Pseudo-selectors, applied in order after predicates.
    pub pseudos: Vec<Pseudo>,
}

/// The type test of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeToken {
    /// `*` — matches any node.
    Any,
    /// A bare name — matches `kind` if it is one of the abstract kind
    /// names, otherwise matches the concrete node type case-insensitively.
    Named(String),
}

/// An attribute predicate: `[attr OP value]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Attribute name (`type`, `kind`, `name`, `qualname`, `start_line`,
    /// `end_line`).
    pub attr: String,
    /// Comparison operator.
    pub op: Op,
    /// Already-unescaped comparison value.
    pub value: String,
}

/// Predicate comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `~=` substring
    Contains,
    /// `^=` prefix
    StartsWith,
    /// `$=` suffix
    EndsWith,
}

/// A pseudo-selector applied to a step's match set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    /// Keep only the first match.
    First,
    /// Keep only the last match.
    Last,
    /// Keep only the match at this 0-based index, if any.
    Nth(usize),
}
