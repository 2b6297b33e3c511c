//! Wire-level error contract (§7). The orchestrator is the only boundary
//! that converts an internal [`crate::domain::error::Error`] into one of
//! these stable codes — everything inside the domain stays on
//! [`crate::domain::error::Error`].

use crate::domain::error::Error as DomainError;
use serde::{Deserialize, Serialize};

/// Stable error code, safe to match on across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidFile,
    FileNotFound,
    ProjectNotFound,
    InvalidConfig,
    CstListError,
    CstQueryError,
    CstQueryParseError,
    CstQueryNoMatch,
    CstQueryMatchIndex,
    CstModulePatchError,
    RebuildFaissError,
    RevectorizeError,
}

/// The error payload half of every orchestrator operation's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Classify a domain error for a given operation family. The same
    /// [`DomainError`] variant maps to different codes depending on which
    /// operation raised it (a `Query` error is `CstListError` from
    /// `list_cst_blocks` but `CstQueryError` from `query_cst`), so callers
    /// pass the code to use for the "generic failure in this op" case.
    pub fn from_domain(err: DomainError, default_code: ErrorCode) -> Self {
        match err {
            DomainError::QueryParse { message } => Self::new(ErrorCode::CstQueryParseError, message),
            DomainError::Query { message } if message.contains("no match") => Self::new(ErrorCode::CstQueryNoMatch, message),
            DomainError::Query { message } if message.contains("match_index") => {
                Self::new(ErrorCode::CstQueryMatchIndex, message)
            }
            DomainError::Query { message } => Self::new(default_code, message),
            DomainError::Patch { message } => Self::new(ErrorCode::CstModulePatchError, message),
            DomainError::Syntax(source) => Self::new(default_code, source.to_string()),
            DomainError::NotFound { resource } => Self::new(ErrorCode::FileNotFound, resource),
            DomainError::VectorIndex { message } => Self::new(ErrorCode::RebuildFaissError, message),
            DomainError::Config { message } => Self::new(ErrorCode::InvalidConfig, message),
            other => Self::new(default_code, other.to_string()),
        }
    }
}

/// Result alias every orchestrator operation returns: a typed success
/// payload, or a typed error payload — never a bare domain error.
pub type OrchestratorResult<T> = Result<T, ErrorPayload>;
