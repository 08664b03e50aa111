use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Malformed(err.to_string())
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
