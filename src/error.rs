// src/error.rs
use thiserror::Error;

use crate::wizard::Step;

pub type Result<T> = std::result::Result<T, EnhancerError>;

/// Broad classification used by the front end to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Timeout,
    Backend,
    Local,
}

#[derive(Debug, Error)]
pub enum EnhancerError {
    #[error("Please select a resume file first")]
    NoFileSelected,

    #[error("Unsupported file format: {0}. Only PDF and DOCX files are supported")]
    UnsupportedFileType(String),

    #[error("File size exceeds {limit} bytes limit ({size} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Please enter a job description")]
    EmptyJobDescription,

    #[error("Resume text is too short ({len} characters, minimum {min})")]
    ResumeTooShort { len: usize, min: usize },

    #[error("Resume text is too long ({len} characters, maximum {max})")]
    ResumeTooLong { len: usize, max: usize },

    #[error("No bullet improvements available to generate an enhanced resume")]
    NoImprovementsAvailable,

    #[error("Cannot {action} while on the {from} step")]
    InvalidTransition { from: Step, action: &'static str },

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Upload timed out after {0} seconds")]
    UploadTimeout(u64),

    #[error("Processing timed out after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    #[error("Failed to check task status: {0}")]
    PollRequestFailed(String),

    #[error("Processing failed: {}", .0.as_deref().unwrap_or("unknown error"))]
    BackendJobFailed(Option<String>),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Server error {status}: {detail}")]
    Backend { status: u16, detail: String },

    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnhancerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnhancerError::NoFileSelected
            | EnhancerError::UnsupportedFileType(_)
            | EnhancerError::FileTooLarge { .. }
            | EnhancerError::EmptyJobDescription
            | EnhancerError::ResumeTooShort { .. }
            | EnhancerError::ResumeTooLong { .. }
            | EnhancerError::NoImprovementsAvailable
            | EnhancerError::InvalidTransition { .. }
            | EnhancerError::Busy => ErrorKind::Validation,
            EnhancerError::Transport(_) | EnhancerError::PollRequestFailed(_) => {
                ErrorKind::Transport
            }
            EnhancerError::UploadTimeout(_) | EnhancerError::PollTimeout { .. } => {
                ErrorKind::Timeout
            }
            EnhancerError::Backend { .. }
            | EnhancerError::BackendJobFailed(_)
            | EnhancerError::InvalidResponse(_) => ErrorKind::Backend,
            EnhancerError::Io(_) => ErrorKind::Local,
        }
    }
}

impl From<reqwest::Error> for EnhancerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EnhancerError::InvalidResponse(err.to_string())
        } else {
            EnhancerError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EnhancerError {
    fn from(err: serde_json::Error) -> Self {
        EnhancerError::InvalidResponse(err.to_string())
    }
}
