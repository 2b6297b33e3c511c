use crate::Span;

/// The source could not be parsed into a valid concrete syntax tree.
#[derive(Debug, thiserror::Error)]
#[error("syntax error: {message}")]
pub struct SyntaxError {
    message: String,
    span: Option<Span>,
}

impl SyntaxError {
    pub(crate) fn new(message: String, span: Option<Span>) -> Self {
        Self { message, span }
    }

    /// Human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Span of the first unrecoverable node, if one could be located.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}
