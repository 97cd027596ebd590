// src/core/backend.rs
//! The resume backend as seen by the flows. `ServiceClient` talks HTTP; tests script a fake.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    AnalysisResult, BulletImprovement, HealthStatus, ResumeFile, TaskAccepted, TaskStatusResponse,
    UploadResult,
};

/// Outcome of the synchronous analysis endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAnalysis {
    Ready(AnalysisResult),
    /// Backend answered 408 or the request timed out; the caller should use the async path
    Deferred,
}

#[async_trait]
pub trait ResumeBackend: Send + Sync {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<TaskAccepted>;

    async fn upload_status(&self, task_id: &str) -> Result<TaskStatusResponse<UploadResult>>;

    async fn analyze_resume(&self, resume_text: &str, job_description: &str)
        -> Result<SyncAnalysis>;

    async fn analyze_resume_async(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<TaskAccepted>;

    async fn analysis_status(&self, task_id: &str)
        -> Result<TaskStatusResponse<AnalysisResult>>;

    /// Returns the enhanced resume as plain text
    async fn generate_enhanced_resume(
        &self,
        original_text: &str,
        improvements: &[BulletImprovement],
    ) -> Result<String>;

    async fn health(&self) -> Result<HealthStatus>;
}
