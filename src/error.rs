//! Error types for filter expressions and filter sets

use thiserror::Error;

/// Main error type for building filters
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Empty filter expression")]
    EmptyExpression,

    #[error("Unbalanced parentheses at offset {0}")]
    UnbalancedParentheses(usize),

    #[error("Empty parenthesized group")]
    EmptyGroup,

    #[error("Missing operand: {0}")]
    MissingOperand(String),

    #[error("Expected '&&' or '||' between operands: {0}")]
    MissingConnective(String),

    #[error("Invalid event name qualifier in: {0}")]
    InvalidQualifier(String),

    #[error("Missing property name in: {0}")]
    MissingProperty(String),

    #[error("Expected a comparison operator in: {0}")]
    InvalidOperator(String),

    #[error("Missing value after operator in: {0}")]
    MissingLiteral(String),

    #[error("Invalid value in: {0}")]
    InvalidLiteral(String),

    #[error("Unterminated quoted value at offset {0}")]
    UnterminatedQuote(usize),

    #[error("Invalid filter '{name}': {source}")]
    InvalidFilter {
        name: String,
        #[source]
        source: Box<FilterError>,
    },

    #[error("Duplicate filter name: {0}")]
    DuplicateFilter(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<FilterError> for pyo3::PyErr {
    fn from(err: FilterError) -> pyo3::PyErr {
        use pyo3::exceptions::PyValueError;

        match err {
            FilterError::Config(e) => PyValueError::new_err(format!("Configuration error: {}", e)),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the filter engine
pub type Result<T> = std::result::Result<T, FilterError>;
