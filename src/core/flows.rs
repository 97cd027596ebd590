// src/core/flows.rs
//! Upload, analysis and generation flows. Each returns its result; the wizard decides
//! what that means for the session.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::core::backend::{ResumeBackend, SyncAnalysis};
use crate::core::poller::Poller;
use crate::error::{EnhancerError, Result};
use crate::types::{AnalysisResult, BulletImprovement, ResumeFile};

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(15);
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(10);

pub const MIN_RESUME_CHARS: usize = 50;
pub const MAX_RESUME_CHARS: usize = 10_000;

const NO_BULLETS_MATCHED: &str = "no bullet points could be replaced";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTimeouts {
    pub upload: Duration,
    pub analysis: Duration,
}

impl Default for FlowTimeouts {
    fn default() -> Self {
        Self {
            upload: UPLOAD_TIMEOUT,
            analysis: ANALYSIS_TIMEOUT,
        }
    }
}

/// Everything a flow needs besides its inputs
pub struct FlowContext<'a> {
    pub backend: &'a dyn ResumeBackend,
    pub poller: &'a Poller,
    pub timeouts: FlowTimeouts,
}

/// Submit the file, then poll the upload status until the extracted text is available
pub async fn upload_resume(
    ctx: &FlowContext<'_>,
    file: Option<&ResumeFile>,
    progress: &mut dyn FnMut(String),
) -> Result<String> {
    let file = file.ok_or(EnhancerError::NoFileSelected)?;
    file.validate()?;

    progress(format!("Uploading {}...", file.file_name));
    info!("Uploading resume {} ({} bytes)", file.file_name, file.size());

    let accepted = tokio::time::timeout(ctx.timeouts.upload, ctx.backend.upload_resume(file))
        .await
        .map_err(|_| {
            error!("Upload of {} timed out", file.file_name);
            EnhancerError::UploadTimeout(ctx.timeouts.upload.as_secs())
        })??;

    progress("Processing resume...".to_string());
    let task_id = accepted.task_id;
    let result = ctx
        .poller
        .poll(
            &task_id,
            "Resume processing",
            || ctx.backend.upload_status(&task_id),
            progress,
        )
        .await?;

    info!(
        "Extracted {} characters from {}",
        result.text.chars().count(),
        result.filename.as_deref().unwrap_or(&file.file_name)
    );
    Ok(result.text)
}

/// Check analysis preconditions; no request is made when these fail
pub fn validate_analysis_input(resume_text: &str, job_description: &str) -> Result<()> {
    if job_description.trim().is_empty() {
        return Err(EnhancerError::EmptyJobDescription);
    }

    let len = resume_text.chars().count();
    if len < MIN_RESUME_CHARS {
        return Err(EnhancerError::ResumeTooShort {
            len,
            min: MIN_RESUME_CHARS,
        });
    }
    if len > MAX_RESUME_CHARS {
        return Err(EnhancerError::ResumeTooLong {
            len,
            max: MAX_RESUME_CHARS,
        });
    }
    Ok(())
}

/// Synchronous analysis, falling back to the background job when the backend is too slow
pub async fn analyze_resume(
    ctx: &FlowContext<'_>,
    resume_text: &str,
    job_description: &str,
    progress: &mut dyn FnMut(String),
) -> Result<AnalysisResult> {
    validate_analysis_input(resume_text, job_description)?;

    progress("Analyzing resume...".to_string());
    let outcome = tokio::time::timeout(
        ctx.timeouts.analysis,
        ctx.backend.analyze_resume(resume_text, job_description),
    )
    .await
    .unwrap_or_else(|_| {
        warn!(
            "Synchronous analysis exceeded {}s",
            ctx.timeouts.analysis.as_secs()
        );
        Ok(SyncAnalysis::Deferred)
    })?;

    match outcome {
        SyncAnalysis::Ready(analysis) => {
            info!("Analysis completed, match score {}", analysis.match_score);
            Ok(analysis)
        }
        SyncAnalysis::Deferred => {
            info!("Falling back to background analysis");
            progress("Analysis is taking longer, continuing in the background...".to_string());

            let accepted = ctx
                .backend
                .analyze_resume_async(resume_text, job_description)
                .await?;
            let task_id = accepted.task_id;

            ctx.poller
                .poll(
                    &task_id,
                    "Analysis",
                    || ctx.backend.analysis_status(&task_id),
                    progress,
                )
                .await
        }
    }
}

/// Send normalized improvements with the original text, get back the enhanced resume
pub async fn generate_enhanced_resume(
    ctx: &FlowContext<'_>,
    original_text: &str,
    improvements: &[BulletImprovement],
    progress: &mut dyn FnMut(String),
) -> Result<String> {
    if improvements.is_empty() {
        return Err(EnhancerError::NoImprovementsAvailable);
    }

    let normalized: Vec<BulletImprovement> =
        improvements.iter().map(BulletImprovement::normalized).collect();

    progress("Generating enhanced resume...".to_string());
    info!("Generating enhanced resume with {} improvements", normalized.len());

    ctx.backend
        .generate_enhanced_resume(original_text, &normalized)
        .await
        .map_err(explain_generation_failure)
}

/// Add guidance when the backend could not line any bullet up with the resume text
pub fn explain_generation_failure(err: EnhancerError) -> EnhancerError {
    match err {
        EnhancerError::Backend { status, detail }
            if detail.to_lowercase().contains(NO_BULLETS_MATCHED) =>
        {
            EnhancerError::Backend {
                status,
                detail: format!(
                    "{} Make sure the uploaded resume and the analysis refer to the same bullet points.",
                    detail
                ),
            }
        }
        other => other,
    }
}
