use thiserror::Error;
use serde::Serialize;

#[derive(Error, Debug, Clone, Serialize)]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

// redb splits its failures across one type per operation
impl From<redb::Error> for AppError {
    fn from(err: redb::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(err: redb::DatabaseError) -> Self {
        AppError::Storage(format!("Failed to open database: {}", err))
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(err: redb::TransactionError) -> Self {
        AppError::Storage(format!("Failed to begin transaction: {}", err))
    }
}

impl From<redb::TableError> for AppError {
    fn from(err: redb::TableError) -> Self {
        AppError::Storage(format!("Failed to open table: {}", err))
    }
}

impl From<redb::StorageError> for AppError {
    fn from(err: redb::StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(err: redb::CommitError) -> Self {
        AppError::Storage(format!("Failed to commit: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
