use thiserror::Error;

use crate::result_parser::ParseError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upload of {file} failed: {reason}")]
    Upload { file: String, reason: String },

    #[error("File {name} failed to process (state: {state})")]
    FileProcessing { name: String, state: String },

    #[error("Checking status of file {name} failed: {reason}")]
    Poll { name: String, reason: String },

    #[error("File {name} was still processing after {attempts} checks")]
    PollTimeout { name: String, attempts: u32 },

    #[error("Waiting for file {0} was cancelled")]
    Cancelled(String),

    #[error("LLM Gateway error: {0}")]
    LLM(String),

    #[error("Failed to parse result: {0}")]
    Parse(#[from] ParseError),

    #[error("Chart error: {0}")]
    Chart(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::LLM(e.to_string())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
