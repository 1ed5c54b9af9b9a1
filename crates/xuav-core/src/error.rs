use thiserror::Error;

#[derive(Error, Debug)]
pub enum XuavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl XuavError {
    /// True for errors a caller can surface as "record does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, XuavError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, XuavError>;
