// src/core/service_client.rs
//! HTTP client for the resume backend - multipart upload, form posts and status polling

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info, trace};

use crate::core::backend::{ResumeBackend, SyncAnalysis};
use crate::error::{EnhancerError, Result};
use crate::types::response::ErrorDetail;
use crate::types::{
    AnalysisResult, BulletImprovement, HealthStatus, ResumeFile, TaskAccepted, TaskStatusResponse,
    UploadResult,
};
use crate::utils::join_url;

const UPLOAD_RESUME_ENDPOINT: &str = "/api/upload-resume";
const UPLOAD_STATUS_ENDPOINT: &str = "/api/upload-status";
const ANALYZE_RESUME_ENDPOINT: &str = "/api/analyze-resume";
const ANALYZE_RESUME_ASYNC_ENDPOINT: &str = "/api/analyze-resume-async";
const ANALYSIS_STATUS_ENDPOINT: &str = "/api/analysis-status";
const GENERATE_ENDPOINT: &str = "/api/generate-enhanced-resume";
const HEALTH_ENDPOINT: &str = "/api/health";

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create new service client. `timeout` bounds every request; flows apply tighter ones.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }

    fn status_url(&self, endpoint: &str, task_id: &str) -> String {
        format!("{}/{}", self.url(endpoint), task_id)
    }

    /// Generic GET request returning JSON
    async fn get_json<R>(&self, url: &str) -> Result<R>
    where
        R: serde::de::DeserializeOwned,
    {
        trace!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<R>().await?)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// POST a form and decode a `{ task_id }` acknowledgement
    async fn post_form_for_task(&self, url: &str, form: &[(&str, &str)]) -> Result<TaskAccepted> {
        trace!("POST {}", url);
        let response = self.client.post(url).form(form).send().await?;

        if response.status().is_success() {
            Ok(response.json::<TaskAccepted>().await?)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Turn a non-success response into a backend error, preferring the `detail` field
    async fn error_from_response(response: Response) -> EnhancerError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        error!("Backend error response {}: {}", status, body);
        EnhancerError::Backend {
            status: status.as_u16(),
            detail: extract_detail(&body),
        }
    }
}

/// Pull `detail` out of an error body, falling back to the raw text
pub(crate) fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorDetail>(body) {
        Ok(parsed) => parsed.message(),
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl ResumeBackend for ServiceClient {
    async fn upload_resume(&self, file: &ResumeFile) -> Result<TaskAccepted> {
        let url = self.url(UPLOAD_RESUME_ENDPOINT);
        let part = Part::bytes(file.content.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type()?)?;
        let form = Form::new().part("file", part);

        info!("Calling resume upload service: {}", url);

        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        debug!("Upload response status: {}", status);

        if status.is_success() {
            let accepted: TaskAccepted = response.json().await?;
            info!("Upload accepted as task {}", accepted.task_id);
            Ok(accepted)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn upload_status(&self, task_id: &str) -> Result<TaskStatusResponse<UploadResult>> {
        self.get_json(&self.status_url(UPLOAD_STATUS_ENDPOINT, task_id))
            .await
    }

    async fn analyze_resume(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<SyncAnalysis> {
        let url = self.url(ANALYZE_RESUME_ENDPOINT);
        info!("Calling resume analysis service: {}", url);

        let sent = self
            .client
            .post(&url)
            .form(&[
                ("resume_text", resume_text),
                ("job_description", job_description),
            ])
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                info!("Analysis request timed out on the client");
                return Ok(SyncAnalysis::Deferred);
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        debug!("Analysis response status: {}", status);

        if status == StatusCode::REQUEST_TIMEOUT {
            info!("Backend reported analysis too slow");
            Ok(SyncAnalysis::Deferred)
        } else if status.is_success() {
            Ok(SyncAnalysis::Ready(response.json().await?))
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn analyze_resume_async(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<TaskAccepted> {
        let url = self.url(ANALYZE_RESUME_ASYNC_ENDPOINT);
        info!("Submitting background analysis: {}", url);

        self.post_form_for_task(
            &url,
            &[
                ("resume_text", resume_text),
                ("job_description", job_description),
            ],
        )
        .await
    }

    async fn analysis_status(&self, task_id: &str) -> Result<TaskStatusResponse<AnalysisResult>> {
        self.get_json(&self.status_url(ANALYSIS_STATUS_ENDPOINT, task_id))
            .await
    }

    async fn generate_enhanced_resume(
        &self,
        original_text: &str,
        improvements: &[BulletImprovement],
    ) -> Result<String> {
        let url = self.url(GENERATE_ENDPOINT);
        let improvements_json = serde_json::to_string(improvements)?;

        info!("Calling resume generation service: {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("original_text", original_text),
                ("improvements", improvements_json.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!("Generation response status: {}", status);

        if status.is_success() {
            Ok(response.text().await?)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get_json(&self.url(HEALTH_ENDPOINT)).await
    }
}
