//! Error types for reflective access.

use super::types::BoxError;
use thiserror::Error;

/// Errors raised by the reflective accessor.
#[derive(Error, Debug)]
pub enum ReflectError {
    /// A required input was missing or of the wrong type.
    #[error("Illegal argument: {0}")]
    Argument(String),

    /// The named constructor, field or method is not declared on the type.
    #[error("No such member: {0}")]
    Lookup(String),

    /// Accessibility could not be overridden.
    #[error("Illegal access: {0}")]
    Access(String),

    /// The constructor or method body itself failed.
    #[error("Invocation of {member} failed: {source}")]
    Invocation {
        member: String,
        #[source]
        source: BoxError,
    },
}

impl ReflectError {
    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create a lookup error
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    /// Create an access error
    pub fn access(message: impl Into<String>) -> Self {
        Self::Access(message.into())
    }

    /// Wrap an error raised by an invoked member
    pub fn invocation(member: impl Into<String>, source: BoxError) -> Self {
        Self::Invocation {
            member: member.into(),
            source,
        }
    }
}

/// Result alias for reflective operations.
pub type ReflectResult<T> = Result<T, ReflectError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invocation_keeps_source() {
        let cause: BoxError = "division by zero".into();
        let err = ReflectError::invocation("Calc::div(i64)", cause);
        assert_eq!(
            err.to_string(),
            "Invocation of Calc::div(i64) failed: division by zero"
        );
        assert_eq!(err.source().unwrap().to_string(), "division by zero");
    }

    #[test]
    fn test_constructors() {
        assert!(matches!(ReflectError::argument("x"), ReflectError::Argument(m) if m == "x"));
        assert!(matches!(ReflectError::lookup("y"), ReflectError::Lookup(_)));
        assert!(matches!(ReflectError::access("z"), ReflectError::Access(_)));
    }
}
