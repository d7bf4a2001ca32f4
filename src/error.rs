use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SentinelError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("camera inventory error: {0}")]
    Inventory(String),

    #[error("signal source error: {0}")]
    Signal(String),

    #[error("http client error: {0}")]
    Http(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SentinelError>;
