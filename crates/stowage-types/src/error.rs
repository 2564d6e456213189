use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid component name {name:?}: {reason}")]
    InvalidComponentName { name: String, reason: &'static str },

    #[error("expected {expected} literal, got {actual}")]
    LiteralKind {
        expected: &'static str,
        actual: String,
    },
}
