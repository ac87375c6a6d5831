use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A schema mutation failed and was rolled back.
    #[error("{message}")]
    Transaction { message: String },

    #[error("corrupt registry value: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn transaction(e: impl std::fmt::Display) -> Self {
        StoreError::Transaction {
            message: e.to_string(),
        }
    }
}
