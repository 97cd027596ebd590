// src/types/resume_file.rs
use std::fmt;
use std::path::Path;

use crate::error::{EnhancerError, Result};
use crate::utils;

/// Largest file the backend accepts
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

/// A resume selected by the user, held in memory until it is uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl fmt::Debug for ResumeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeFile")
            .field("file_name", &self.file_name)
            .field("size", &self.content.len())
            .finish()
    }
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Read a resume from disk, keeping only the file name component
    pub async fn load(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EnhancerError::UnsupportedFileType(path.display().to_string()))?
            .to_string();

        let content = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, content))
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Check extension and size the same way the backend does, before any request
    pub fn validate(&self) -> Result<()> {
        utils::validate_file_extension(&self.file_name, ALLOWED_EXTENSIONS)?;

        if self.size() > MAX_FILE_SIZE {
            return Err(EnhancerError::FileTooLarge {
                size: self.size(),
                limit: MAX_FILE_SIZE,
            });
        }
        Ok(())
    }

    /// Get content type for the multipart part
    pub fn content_type(&self) -> Result<&'static str> {
        match utils::get_file_extension(&self.file_name).as_deref() {
            Some("pdf") => Ok("application/pdf"),
            Some("docx") => {
                Ok("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            }
            Some("doc") => Ok("application/msword"),
            _ => Err(EnhancerError::UnsupportedFileType(self.file_name.clone())),
        }
    }
}
