use std::io;

use thiserror::Error;

/// Why a single upstream row could not be turned into a course.
///
/// Row-scoped: the caller logs it and moves on to the next row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("row is not an array (got {0})")]
    NotARow(&'static str),

    #[error("row has {found} cells, expected at least {expected}")]
    TooFewCells { found: usize, expected: usize },

    #[error("cell {cell} is not a markup string (got {kind})")]
    NotMarkup { cell: usize, kind: &'static str },
}

/// Errors raised while loading or validating an institution registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid registry: {0}")]
    Invalid(String),
}

/// Short name of a JSON value's kind, used in error messages.
pub(crate) const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
