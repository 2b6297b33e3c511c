//! Error handling types.

use thiserror::Error;

/// Result type alias for operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error.
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Persistent store error.
    #[error("store error: {source}")]
    Store {
        /// The underlying rusqlite error.
        #[from]
        source: rusqlite::Error,
    },

    /// Source could not be parsed into a valid concrete syntax tree.
    #[error("syntax error: {0}")]
    Syntax(#[from] codeloom_tree_sitter_analysis::SyntaxError),

    /// Selector string failed to parse.
    #[error("selector parse error: {message}")]
    QueryParse {
        /// Description of the parse failure.
        message: String,
    },

    /// A query executed fine but is being used somewhere that requires a match.
    #[error("query error: {message}")]
    Query {
        /// Description of the failure.
        message: String,
    },

    /// A patch operation could not be applied.
    #[error("patch error: {message}")]
    Patch {
        /// Description of the failure.
        message: String,
    },

    /// Generic error from external sources.
    #[error("generic error: {0}")]
    Generic(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Resource not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Invalid argument provided to an operation.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Vector index operation error.
    #[error("vector index error: {message}")]
    VectorIndex {
        /// Description of the vector index error.
        message: String,
    },

    /// Embedding provider operation error.
    #[error("embedding provider error: {message}")]
    Embedding {
        /// Description of the embedding provider error.
        message: String,
    },

    /// Configuration-related error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Internal invariant violation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Create a generic error.
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into().into())
    }

    /// Create a not-found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a query-parse error.
    pub fn query_parse<S: Into<String>>(message: S) -> Self {
        Self::QueryParse {
            message: message.into(),
        }
    }

    /// Create a query error.
    pub fn query<S: Into<String>>(message: S) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a patch error.
    pub fn patch<S: Into<String>>(message: S) -> Self {
        Self::Patch {
            message: message.into(),
        }
    }

    /// Create a vector-index error.
    pub fn vector_index<S: Into<String>>(message: S) -> Self {
        Self::VectorIndex {
            message: message.into(),
        }
    }

    /// Create an embedding-provider error.
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Internal {
            message: s.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Internal { message: s }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}
