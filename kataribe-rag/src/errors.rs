#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("external service error: {0}")]
    ExternalService(String),
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("{0}")]
    Generation(String),
}

impl From<sqlx::Error> for RagError {
    fn from(error: sqlx::Error) -> Self {
        RagError::StoreUnavailable(error.to_string())
    }
}

pub type RagResult<T> = Result<T, RagError>;
