//! Domain errors.
//!
//! The domain crate performs no I/O; the only failure it reports is text that
//! names none of an enumeration's variants.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Configuration or wire text that does not name a known variant.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_input() {
        let err = DomainError::parse("Unknown difficulty: heroic");
        assert_eq!(err.to_string(), "Parse error: Unknown difficulty: heroic");
    }
}
