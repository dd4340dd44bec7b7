//! Error types for query construction.

/// Malformed caller input, detected before any query is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A date parameter is not an RFC 3339 timestamp.
    #[error("invalid timestamp for {param}: {value}")]
    InvalidTimestamp { param: &'static str, value: String },

    /// A numeric parameter could not be parsed.
    #[error("invalid value for {param}: {value}")]
    InvalidNumber { param: &'static str, value: String },

    /// A label or field selector term could not be parsed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// A selector or sort references a field that is not indexed.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A sort term is malformed or targets a non-sortable field.
    #[error("invalid sort: {0}")]
    InvalidSort(String),

    /// A finder parameter map does not match the expected shape.
    #[error("invalid query parameters: {0}")]
    InvalidParams(String),
}
