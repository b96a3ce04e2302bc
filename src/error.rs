use thiserror::Error;
use tonic::Status;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt image: {0}")]
    CorruptImage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Client-caused failures; everything else is a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_)
                | AppError::InvalidInput(_)
                | AppError::AlreadyExists(_)
                | AppError::UnsupportedFormat(_)
        )
    }

    /// Logs the error against the operation that produced it and converts it
    /// into the caller-facing status.
    pub fn into_status(self, operation: &str) -> Status {
        if self.is_client_error() {
            tracing::warn!(operation, error = %self, "request rejected");
        } else {
            tracing::error!(operation, error = %self, "request failed");
        }
        self.into()
    }
}

// Messages are fixed per kind so internal detail never reaches the caller.
impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(_) => Status::not_found("No such item"),
            AppError::InvalidInput(_) => Status::invalid_argument("Malformed request"),
            AppError::AlreadyExists(_) => Status::already_exists("Item already exists"),
            AppError::UnsupportedFormat(_) => Status::invalid_argument("Bad image MIME type"),
            AppError::CorruptImage(_) => Status::internal("Image processing failed"),
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => Status::internal("Internal server error"),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
