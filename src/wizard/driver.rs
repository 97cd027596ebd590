// src/wizard/driver.rs
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use super::{save_enhanced_resume, Session, Step, Transition, WizardState};
use crate::core::backend::ResumeBackend;
use crate::core::flows::{self, FlowContext, FlowTimeouts};
use crate::core::poller::Poller;
use crate::error::{EnhancerError, Result};
use crate::types::ResumeFile;

/// Called with every progress message while a flow runs
pub type ProgressListener = dyn Fn(&str) + Send + Sync;

/// Runs flows against a backend and feeds their outcomes into the owned `Session`
pub struct Wizard {
    backend: Arc<dyn ResumeBackend>,
    poller: Poller,
    timeouts: FlowTimeouts,
    session: Session,
    on_progress: Option<Box<ProgressListener>>,
}

fn progress_sink<'a>(
    session: &'a mut Session,
    listener: Option<&'a ProgressListener>,
) -> impl FnMut(String) + 'a {
    move |message| {
        if let Some(listener) = listener {
            listener(&message);
        }
        let _ = session.apply(Transition::Progress(message));
    }
}

impl Wizard {
    pub fn new(backend: Arc<dyn ResumeBackend>, poller: Poller, timeouts: FlowTimeouts) -> Self {
        Self {
            backend,
            poller,
            timeouts,
            session: Session::new(),
            on_progress: None,
        }
    }

    pub fn with_progress_listener(
        mut self,
        listener: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_progress = Some(Box::new(listener));
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn select_file(&mut self, file: ResumeFile) -> Result<()> {
        self.session.apply(Transition::SelectFile(file))
    }

    pub fn set_job_description(&mut self, job_description: impl Into<String>) -> Result<()> {
        self.session
            .apply(Transition::EditJobDescription(job_description.into()))
    }

    pub fn back(&mut self) -> Result<Step> {
        self.session.apply(Transition::Back)?;
        Ok(self.step())
    }

    pub fn restart(&mut self) -> Result<Step> {
        self.session.apply(Transition::Restart)?;
        Ok(self.step())
    }

    /// Step 1: upload the selected file and wait for the extracted text
    pub async fn upload(&mut self) -> Result<Step> {
        let file = match &self.session.state {
            WizardState::Upload { file } => file.clone(),
            _ => return Err(self.invalid("upload a resume")),
        };

        self.begin("Uploading resume...")?;
        let span = info_span!("upload", session = %self.session.id);
        let outcome = {
            let ctx = FlowContext {
                backend: self.backend.as_ref(),
                poller: &self.poller,
                timeouts: self.timeouts,
            };
            let mut sink = progress_sink(&mut self.session, self.on_progress.as_deref());
            flows::upload_resume(&ctx, file.as_ref(), &mut sink)
                .instrument(span)
                .await
        };

        self.finish(outcome.map(|resume_text| Transition::UploadCompleted { resume_text }))
    }

    /// Step 2: analyze the resume against the job description
    pub async fn analyze(&mut self) -> Result<Step> {
        let (resume_text, job_description) = match &self.session.state {
            WizardState::JobDescription {
                resume_text,
                job_description,
                ..
            } => (resume_text.clone(), job_description.clone()),
            _ => return Err(self.invalid("analyze the resume")),
        };

        self.begin("Analyzing resume...")?;
        let span = info_span!("analyze", session = %self.session.id);
        let outcome = {
            let ctx = FlowContext {
                backend: self.backend.as_ref(),
                poller: &self.poller,
                timeouts: self.timeouts,
            };
            let mut sink = progress_sink(&mut self.session, self.on_progress.as_deref());
            flows::analyze_resume(&ctx, &resume_text, &job_description, &mut sink)
                .instrument(span)
                .await
        };

        self.finish(outcome.map(Transition::AnalysisCompleted))
    }

    /// Step 3: generate the enhanced resume from the reviewed improvements
    pub async fn generate(&mut self) -> Result<Step> {
        let (resume_text, improvements) = match &self.session.state {
            WizardState::Review {
                resume_text,
                analysis,
                ..
            } => (resume_text.clone(), analysis.improved_bullets.clone()),
            _ => return Err(self.invalid("generate the enhanced resume")),
        };

        self.begin("Generating enhanced resume...")?;
        let span = info_span!("generate", session = %self.session.id);
        let outcome = {
            let ctx = FlowContext {
                backend: self.backend.as_ref(),
                poller: &self.poller,
                timeouts: self.timeouts,
            };
            let mut sink = progress_sink(&mut self.session, self.on_progress.as_deref());
            flows::generate_enhanced_resume(&ctx, &resume_text, &improvements, &mut sink)
                .instrument(span)
                .await
        };

        self.finish(outcome.map(|enhanced_resume| Transition::GenerationCompleted {
            enhanced_resume,
        }))
    }

    /// Step 4: write `enhanced_resume.txt` into `dir`
    pub async fn download(&self, dir: &Path) -> Result<PathBuf> {
        save_enhanced_resume(&self.session, dir).await
    }

    fn begin(&mut self, message: &str) -> Result<()> {
        self.session.apply(Transition::Started(message.to_string()))
    }

    /// Apply the flow outcome; failures are recorded on the session and returned
    fn finish(&mut self, outcome: Result<Transition>) -> Result<Step> {
        match outcome {
            Ok(transition) => {
                self.session.apply(transition)?;
                info!("Session {} now on {} step", self.session.id, self.step());
                Ok(self.step())
            }
            Err(err) => {
                warn!("Session {} flow failed on {} step: {}", self.session.id, self.step(), err);
                self.session.apply(Transition::Failed(err.to_string()))?;
                Err(err)
            }
        }
    }

    fn invalid(&self, action: &'static str) -> EnhancerError {
        EnhancerError::InvalidTransition {
            from: self.step(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::fake::{upload_result, FakeBackend};
    use crate::core::backend::SyncAnalysis;
    use crate::types::{AnalysisResult, BulletImprovement, MissingKeyword, TaskStatusResponse};
    use std::time::Duration;

    fn wizard(backend: Arc<FakeBackend>) -> Wizard {
        Wizard::new(backend, Poller::default(), FlowTimeouts::default())
    }

    fn resume_text() -> String {
        "John Doe, Software Engineer. Experience: - Built REST APIs for payments \
         - Led migration to Kubernetes"
            .to_string()
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            match_score: 72.0,
            missing_keywords: vec![MissingKeyword {
                keyword: "Go".to_string(),
                importance: "high".to_string(),
                frequency: Some(1),
                context: Some("Required skill".to_string()),
            }],
            improved_bullets: vec![BulletImprovement {
                original: "- Built REST APIs for payments".to_string(),
                improved: "Built Go REST APIs for payments".to_string(),
                reason: "Added missing keyword".to_string(),
                impact_score: Some(8),
            }],
            suggestions: vec!["Include quantifiable achievements".to_string()],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_and_restart() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_upload_statuses(vec![Ok(TaskStatusResponse::completed(upload_result(
                    &resume_text(),
                )))])
                .with_analyze_response(Ok(SyncAnalysis::Ready(analysis())))
                .with_generate_response(Ok("Enhanced Resume\nBuilt Go REST APIs".to_string())),
        );
        let mut wizard = wizard(backend.clone());

        wizard
            .select_file(ResumeFile::new("resume.pdf", b"%PDF".to_vec()))
            .unwrap();
        assert_eq!(wizard.upload().await.unwrap(), Step::JobDescription);
        assert_eq!(wizard.session().resume_text(), Some(resume_text().as_str()));

        wizard
            .set_job_description("Seeking a backend engineer with Go experience")
            .unwrap();
        assert_eq!(wizard.analyze().await.unwrap(), Step::Review);
        let stored = wizard.session().analysis().unwrap();
        assert_eq!(stored.match_score, 72.0);
        assert_eq!(stored.missing_keywords.len(), 1);
        assert_eq!(stored.missing_keywords[0].keyword, "Go");

        assert_eq!(wizard.generate().await.unwrap(), Step::Download);
        assert_eq!(
            wizard.session().enhanced_resume(),
            Some("Enhanced Resume\nBuilt Go REST APIs")
        );
        assert!(!wizard.session().loading);

        let dir = tempfile::tempdir().unwrap();
        let path = wizard.download(dir.path()).await.unwrap();
        assert!(path.ends_with("enhanced_resume.txt"));

        assert_eq!(wizard.restart().unwrap(), Step::Upload);
        let session = wizard.session();
        assert_eq!(session.state, WizardState::Upload { file: None });
        assert!(session.error.is_none());
        assert!(session.progress.is_none());
        assert!(!session.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_without_file_records_error() {
        let backend = Arc::new(FakeBackend::new());
        let mut wizard = wizard(backend.clone());

        let err = wizard.upload().await.unwrap_err();

        assert!(matches!(err, EnhancerError::NoFileSelected));
        assert_eq!(wizard.step(), Step::Upload);
        assert!(!wizard.session().loading);
        assert_eq!(
            wizard.session().error.as_deref(),
            Some("Please select a resume file first")
        );
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_timeout_falls_back_without_error() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_upload_statuses(vec![Ok(TaskStatusResponse::completed(upload_result(
                    &resume_text(),
                )))])
                .with_analyze_delay(Duration::from_secs(60))
                .with_analysis_statuses(vec![
                    Ok(TaskStatusResponse::pending()),
                    Ok(TaskStatusResponse::completed(analysis())),
                ]),
        );
        let mut wizard = wizard(backend.clone());

        wizard
            .select_file(ResumeFile::new("resume.docx", b"PK".to_vec()))
            .unwrap();
        wizard.upload().await.unwrap();
        wizard.set_job_description("Go backend engineer").unwrap();

        assert_eq!(wizard.analyze().await.unwrap(), Step::Review);
        assert!(wizard.session().error.is_none());
        assert_eq!(backend.calls("analyze_resume_async"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_timeout_keeps_step_for_retry() {
        let backend = Arc::new(FakeBackend::new());
        let mut wizard = wizard(backend.clone());

        wizard
            .select_file(ResumeFile::new("resume.pdf", b"%PDF".to_vec()))
            .unwrap();
        let err = wizard.upload().await.unwrap_err();

        assert!(matches!(err, EnhancerError::PollTimeout { attempts: 20 }));
        assert_eq!(backend.calls("upload_status"), 20);
        assert_eq!(wizard.step(), Step::Upload);
        assert!(!wizard.session().loading);
        assert!(wizard.session().progress.is_none());
        assert!(wizard.session().error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_without_improvements() {
        let mut empty = analysis();
        empty.improved_bullets.clear();
        let backend = Arc::new(
            FakeBackend::new()
                .with_upload_statuses(vec![Ok(TaskStatusResponse::completed(upload_result(
                    &resume_text(),
                )))])
                .with_analyze_response(Ok(SyncAnalysis::Ready(empty))),
        );
        let mut wizard = wizard(backend.clone());

        wizard
            .select_file(ResumeFile::new("resume.pdf", b"%PDF".to_vec()))
            .unwrap();
        wizard.upload().await.unwrap();
        wizard.set_job_description("Go backend engineer").unwrap();
        wizard.analyze().await.unwrap();

        let err = wizard.generate().await.unwrap_err();
        assert!(matches!(err, EnhancerError::NoImprovementsAvailable));
        assert_eq!(wizard.step(), Step::Review);
        assert_eq!(backend.calls("generate_enhanced_resume"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flow_for_wrong_step_is_rejected() {
        let backend = Arc::new(FakeBackend::new());
        let mut wizard = wizard(backend.clone());

        assert!(matches!(
            wizard.analyze().await,
            Err(EnhancerError::InvalidTransition {
                from: Step::Upload,
                ..
            })
        ));
        assert!(wizard.generate().await.is_err());
        assert!(wizard.session().error.is_none());
        assert_eq!(backend.total_calls(), 0);
    }
}
