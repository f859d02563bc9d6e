//! Error types for momentum
//!
//! Exit codes:
//! - 0: Success
//! - 2: Invalid input (bad args, malformed ids, structurally bad references)
//! - 3: Unauthorized (no caller identity)
//! - 4: Not found (missing record, or a record owned by someone else)
//! - 5: Operation failed (storage error, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the momentum CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const INVALID_INPUT: i32 = 2;
    pub const UNAUTHORIZED: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const OPERATION_FAILED: i32 = 5;
}

/// Main error type for momentum operations
#[derive(Error, Debug)]
pub enum Error {
    // Invalid input (exit code 2)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Identity (exit code 3)
    #[error("No user identity; pass --user, set MOMENTUM_USER, or run `momentum user set`")]
    Unauthorized,

    // Not found (exit code 4)
    //
    // A record that exists but belongs to another user reports the same
    // error as a record that does not exist at all.
    #[error("{0} not found")]
    NotFound(Entity),

    // Operation failures (exit code 5)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Record kinds referenced by [`Error::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Board,
    Column,
    Task,
    Goal,
    CheckIn,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Board => "Board",
            Entity::Column => "Column",
            Entity::Task => "Task",
            Entity::Goal => "Goal",
            Entity::CheckIn => "Check-in",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::InvalidConfig(_) => exit_codes::INVALID_INPUT,

            Error::Unauthorized => exit_codes::UNAUTHORIZED,

            Error::NotFound(_) => exit_codes::NOT_FOUND,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output, when the variant has any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound(entity) => Some(serde_json::json!({
                "entity": entity.to_string(),
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for momentum operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_never_names_an_owner() {
        let err = Error::NotFound(Entity::Task);
        assert_eq!(err.to_string(), "Task not found");
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn exit_codes_by_class() {
        assert_eq!(
            Error::InvalidInput("title cannot be empty".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(Error::Unauthorized.exit_code(), exit_codes::UNAUTHORIZED);
        assert_eq!(
            Error::OperationFailed("write failed".into()).exit_code(),
            exit_codes::OPERATION_FAILED
        );
    }
}
