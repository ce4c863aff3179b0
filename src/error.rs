//! Error types for omnicalc

use thiserror::Error;

/// Coarse failure category, the granularity a display layer cares about.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Parse,
    Domain,
    Name,
}

/// Evaluation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Unexpected character '{ch}' at position {position}")]
    Lex { ch: char, position: usize },

    #[error("Expected {expected} at position {position}")]
    Parse { expected: String, position: usize },

    #[error("Function '{function}' expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("Math error: {0}")]
    Domain(String),

    #[error("Unknown identifier: {0}")]
    Name(String),
}

impl CalcError {
    pub fn lex(ch: char, position: usize) -> Self {
        Self::Lex { ch, position }
    }

    pub fn parse(expected: impl Into<String>, position: usize) -> Self {
        Self::Parse {
            expected: expected.into(),
            position,
        }
    }

    pub fn arity(function: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::Arity {
            function: function.into(),
            expected,
            found,
        }
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn name(identifier: impl Into<String>) -> Self {
        Self::Name(identifier.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Lex { .. } => ErrorKind::Lex,
            CalcError::Parse { .. } | CalcError::Arity { .. } => ErrorKind::Parse,
            CalcError::Domain(_) => ErrorKind::Domain,
            CalcError::Name(_) => ErrorKind::Name,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

/// History persistence errors
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl HistoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_is_a_parse_failure() {
        assert_eq!(CalcError::arity("sin", 1, 2).kind(), ErrorKind::Parse);
        assert_eq!(CalcError::parse("')'", 3).kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_messages_name_the_offender() {
        assert_eq!(
            CalcError::lex('@', 4).to_string(),
            "Unexpected character '@' at position 4"
        );
        assert_eq!(
            CalcError::name("foo").to_string(),
            "Unknown identifier: foo"
        );
    }
}
