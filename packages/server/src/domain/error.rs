//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// ChatId validation error
    #[error("ChatId cannot be empty")]
    ChatIdEmpty,

    /// ChatId too long error
    #[error("ChatId cannot exceed {max} characters (got {actual})")]
    ChatIdTooLong { max: usize, actual: usize },
}
