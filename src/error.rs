//! Error types for range queries.

use std::path::PathBuf;

use crate::parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("syntax error in `{expression}`: {source}")]
    Syntax {
        expression: String,
        #[source]
        source: ParseError,
    },

    #[error("undefined cluster: {0}")]
    UndefinedCluster(String),

    #[error("unknown function: {0}()")]
    UnknownFunction(String),

    #[error("{name}() takes {expected} argument(s), {found} given")]
    FunctionArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("invalid range {range}: {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("unsupported expression: {0}")]
    Unsupported(String),

    #[error("expansion of cluster {cluster} exceeded the maximum depth of {max_depth}")]
    RecursionLimit { cluster: String, max_depth: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn syntax(expression: &str, source: ParseError) -> Self {
        Error::Syntax {
            expression: expression.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_range(range: impl ToString, reason: impl Into<String>) -> Self {
        Error::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
