use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Permanent rejection on the message-acceptance path. Callers map
    /// this to a permanent protocol reply (552 / 5.2.2 for SMTP), never
    /// a transient one.
    #[error("mailbox quota exceeded: {current} of {limit} bytes used")]
    QuotaExceeded { current: i64, limit: i64 },

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdminError>;
