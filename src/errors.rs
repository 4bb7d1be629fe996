//! Unified error types and result handling.
//!
//! `Error` covers infrastructure failures (database, I/O, configuration) and
//! domain rejections. Voting-rule violations are collected into
//! [`Error::Validation`] as the full list of field-level
//! [`ValidationError`](crate::core::allocation::ValidationError)s rather than
//! failing on the first one, so callers can report every problem at once.

use crate::core::allocation::ValidationError;
use thiserror::Error;

/// Unified error type for all fallible operations in the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Budget not found: {id}")]
    BudgetNotFound { id: i64 },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: i64 },

    #[error("Order not found: {id}")]
    OrderNotFound { id: i64 },

    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    #[error("Order {id} is already checked out")]
    AlreadyCheckedOut { id: i64 },

    #[error("Order validation failed: {}", format_validation_errors(.errors))]
    Validation { errors: Vec<ValidationError> },
}

impl Error {
    /// Wraps a single voting-rule violation in the collection shape callers expect.
    #[must_use]
    pub fn validation(error: ValidationError) -> Self {
        Self::Validation {
            errors: vec![error],
        }
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
