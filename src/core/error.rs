//! Domain errors for machine registry operations

use thiserror::Error;

/// Errors reported by the machine registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A live machine with this name already exists
    #[error("machine with name '{0}' already exists")]
    DuplicateName(String),
    /// No live machine with this name
    #[error("machine with name '{0}' does not exist")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
