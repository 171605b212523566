use thiserror::Error;

/// Process exit codes, one per failure class.
pub mod exit_code {
    pub const FAILURE: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NO_MATCH: i32 = 3;
    pub const UNSUPPORTED_CONTENT_TYPE: i32 = 4;
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository name not specified")]
    Usage,

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] dotenvy::Error),

    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unsupported ContentType ({0})")]
    UnsupportedContentType(String),

    #[error("No matching tag found: {reason}")]
    NoMatchFound { reason: String },
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage => exit_code::USAGE,
            AppError::NoMatchFound { .. } => exit_code::NO_MATCH,
            AppError::UnsupportedContentType(_) => exit_code::UNSUPPORTED_CONTENT_TYPE,
            AppError::ConfigLoad(_)
            | AppError::InvalidPattern(_)
            | AppError::Transport(_)
            | AppError::Decode(_) => exit_code::FAILURE,
        }
    }
}
