// src/wizard/mod.rs
//! Four-step wizard: Upload -> Job Description -> Review -> Download.
//!
//! `Session` is the single owned state container. Flows never touch it directly; their
//! outcomes are turned into `Transition`s and applied through `Session::apply`, which
//! rejects anything the current step does not allow.

pub mod driver;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::error::{EnhancerError, Result};
use crate::types::{AnalysisResult, ResumeFile};
use crate::utils;

pub use driver::Wizard;

pub const ENHANCED_RESUME_FILE: &str = "enhanced_resume.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Upload = 1,
    JobDescription = 2,
    Review = 3,
    Download = 4,
}

impl Step {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Upload => "upload",
            Step::JobDescription => "job description",
            Step::Review => "review",
            Step::Download => "download",
        };
        f.write_str(name)
    }
}

/// Step-specific data; a step only carries what is valid in it
#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    Upload {
        file: Option<ResumeFile>,
    },
    JobDescription {
        file: ResumeFile,
        resume_text: String,
        job_description: String,
    },
    Review {
        file: ResumeFile,
        resume_text: String,
        job_description: String,
        analysis: AnalysisResult,
    },
    Download {
        resume_text: String,
        analysis: AnalysisResult,
        enhanced_resume: String,
    },
}

impl Default for WizardState {
    fn default() -> Self {
        WizardState::Upload { file: None }
    }
}

impl WizardState {
    pub fn step(&self) -> Step {
        match self {
            WizardState::Upload { .. } => Step::Upload,
            WizardState::JobDescription { .. } => Step::JobDescription,
            WizardState::Review { .. } => Step::Review,
            WizardState::Download { .. } => Step::Download,
        }
    }
}

/// A requested change to the session
#[derive(Debug, Clone)]
pub enum Transition {
    SelectFile(ResumeFile),
    EditJobDescription(String),
    /// A flow started; sets loading and clears any previous error
    Started(String),
    Progress(String),
    UploadCompleted { resume_text: String },
    AnalysisCompleted(AnalysisResult),
    GenerationCompleted { enhanced_resume: String },
    /// Terminal failure of the in-flight flow (or a validation failure before it began)
    Failed(String),
    Back,
    Restart,
}

impl Transition {
    fn name(&self) -> &'static str {
        match self {
            Transition::SelectFile(_) => "select a file",
            Transition::EditJobDescription(_) => "edit the job description",
            Transition::Started(_) => "start an operation",
            Transition::Progress(_) => "report progress",
            Transition::UploadCompleted { .. } => "complete an upload",
            Transition::AnalysisCompleted(_) => "complete an analysis",
            Transition::GenerationCompleted { .. } => "complete generation",
            Transition::Failed(_) => "record a failure",
            Transition::Back => "go back",
            Transition::Restart => "restart",
        }
    }

    /// Allowed while a flow is in flight
    fn resolves_flow(&self) -> bool {
        matches!(
            self,
            Transition::Progress(_)
                | Transition::UploadCompleted { .. }
                | Transition::AnalysisCompleted(_)
                | Transition::GenerationCompleted { .. }
                | Transition::Failed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub state: WizardState,
    pub error: Option<String>,
    pub progress: Option<String>,
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: WizardState::default(),
            error: None,
            progress: None,
            loading: false,
        }
    }

    pub fn step(&self) -> Step {
        self.state.step()
    }

    pub fn resume_text(&self) -> Option<&str> {
        match &self.state {
            WizardState::Upload { .. } => None,
            WizardState::JobDescription { resume_text, .. }
            | WizardState::Review { resume_text, .. }
            | WizardState::Download { resume_text, .. } => Some(resume_text),
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.state {
            WizardState::Review { analysis, .. } | WizardState::Download { analysis, .. } => {
                Some(analysis)
            }
            _ => None,
        }
    }

    pub fn enhanced_resume(&self) -> Option<&str> {
        match &self.state {
            WizardState::Download {
                enhanced_resume, ..
            } => Some(enhanced_resume),
            _ => None,
        }
    }

    /// Apply a transition. Rejected transitions leave the session untouched.
    pub fn apply(&mut self, transition: Transition) -> Result<()> {
        if self.loading && !transition.resolves_flow() {
            return Err(EnhancerError::Busy);
        }

        match transition {
            Transition::Started(message) => {
                self.loading = true;
                self.error = None;
                self.progress = Some(message);
                return Ok(());
            }
            Transition::Progress(message) => {
                if self.loading {
                    self.progress = Some(message);
                }
                return Ok(());
            }
            Transition::Failed(message) => {
                self.loading = false;
                self.progress = None;
                self.error = Some(message);
                return Ok(());
            }
            Transition::Restart => {
                if self.step() != Step::Download {
                    return Err(EnhancerError::InvalidTransition {
                        from: self.step(),
                        action: "restart",
                    });
                }
                info!("Session {} restarted", self.id);
                *self = Session::new();
                return Ok(());
            }
            _ => {}
        }

        let from = self.step();
        let current = std::mem::take(&mut self.state);
        match Self::next_state(current, transition) {
            Ok(next) => {
                self.state = next;
                if self.step() != from {
                    self.loading = false;
                    self.progress = None;
                    self.error = None;
                    info!("Session {} moved from {} to {}", self.id, from, self.step());
                }
                Ok(())
            }
            Err((restored, action)) => {
                self.state = restored;
                Err(EnhancerError::InvalidTransition { from, action })
            }
        }
    }

    fn next_state(
        state: WizardState,
        transition: Transition,
    ) -> std::result::Result<WizardState, (WizardState, &'static str)> {
        let next = match (state, transition) {
            (WizardState::Upload { .. }, Transition::SelectFile(file)) => {
                WizardState::Upload { file: Some(file) }
            }
            (
                WizardState::Upload { file: Some(file) },
                Transition::UploadCompleted { resume_text },
            ) => WizardState::JobDescription {
                file,
                resume_text,
                job_description: String::new(),
            },
            (
                WizardState::JobDescription {
                    file, resume_text, ..
                },
                Transition::EditJobDescription(job_description),
            ) => WizardState::JobDescription {
                file,
                resume_text,
                job_description,
            },
            (
                WizardState::JobDescription {
                    file,
                    resume_text,
                    job_description,
                },
                Transition::AnalysisCompleted(analysis),
            ) => WizardState::Review {
                file,
                resume_text,
                job_description,
                analysis,
            },
            (WizardState::JobDescription { file, .. }, Transition::Back) => {
                WizardState::Upload { file: Some(file) }
            }
            (
                WizardState::Review {
                    resume_text,
                    analysis,
                    ..
                },
                Transition::GenerationCompleted { enhanced_resume },
            ) => WizardState::Download {
                resume_text,
                analysis,
                enhanced_resume,
            },
            (
                WizardState::Review {
                    file,
                    resume_text,
                    job_description,
                    ..
                },
                Transition::Back,
            ) => WizardState::JobDescription {
                file,
                resume_text,
                job_description,
            },
            (state, transition) => return Err((state, transition.name())),
        };
        Ok(next)
    }
}

/// Write the enhanced resume to `dir/enhanced_resume.txt`
pub async fn save_enhanced_resume(session: &Session, dir: &Path) -> Result<PathBuf> {
    let enhanced = session
        .enhanced_resume()
        .ok_or(EnhancerError::InvalidTransition {
            from: session.step(),
            action: "download",
        })?;

    let path = dir.join(ENHANCED_RESUME_FILE);
    utils::write_file_content(&path, enhanced).await?;
    info!("Saved enhanced resume to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BulletImprovement;

    fn file() -> ResumeFile {
        ResumeFile::new("resume.pdf", b"%PDF".to_vec())
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            match_score: 72.0,
            missing_keywords: vec![],
            improved_bullets: vec![BulletImprovement {
                original: "Built APIs".to_string(),
                improved: "Built Go APIs".to_string(),
                reason: "Keyword".to_string(),
                impact_score: Some(8),
            }],
            suggestions: vec![],
        }
    }

    fn session_at_review() -> Session {
        let mut session = Session::new();
        session.apply(Transition::SelectFile(file())).unwrap();
        session
            .apply(Transition::UploadCompleted {
                resume_text: "John Doe".to_string(),
            })
            .unwrap();
        session
            .apply(Transition::EditJobDescription("Go engineer".to_string()))
            .unwrap();
        session
            .apply(Transition::AnalysisCompleted(analysis()))
            .unwrap();
        session
    }

    #[test]
    fn test_starts_on_upload() {
        let session = Session::new();
        assert_eq!(session.step(), Step::Upload);
        assert_eq!(session.step().number(), 1);
        assert!(!session.loading);
        assert!(session.resume_text().is_none());
    }

    #[test]
    fn test_upload_requires_selected_file() {
        let mut session = Session::new();
        let result = session.apply(Transition::UploadCompleted {
            resume_text: "text".to_string(),
        });

        assert!(matches!(
            result,
            Err(EnhancerError::InvalidTransition {
                from: Step::Upload,
                ..
            })
        ));
        assert_eq!(session.step(), Step::Upload);
    }

    #[test]
    fn test_forward_path() {
        let session = session_at_review();
        assert_eq!(session.step(), Step::Review);
        assert_eq!(session.resume_text(), Some("John Doe"));
        assert_eq!(session.analysis().unwrap().match_score, 72.0);
    }

    #[test]
    fn test_back_from_review_keeps_job_description() {
        let mut session = session_at_review();
        session.apply(Transition::Back).unwrap();

        match &session.state {
            WizardState::JobDescription {
                job_description, ..
            } => assert_eq!(job_description, "Go engineer"),
            other => panic!("unexpected state: {:?}", other),
        }

        session.apply(Transition::Back).unwrap();
        assert_eq!(session.state, WizardState::Upload { file: Some(file()) });
    }

    #[test]
    fn test_no_back_from_upload_or_download() {
        let mut session = Session::new();
        assert!(session.apply(Transition::Back).is_err());

        let mut session = session_at_review();
        session
            .apply(Transition::GenerationCompleted {
                enhanced_resume: "Enhanced".to_string(),
            })
            .unwrap();
        assert!(session.apply(Transition::Back).is_err());
        assert_eq!(session.step(), Step::Download);
    }

    #[test]
    fn test_busy_session_rejects_user_actions() {
        let mut session = session_at_review();
        session
            .apply(Transition::Started("Generating...".to_string()))
            .unwrap();
        let before = session.clone();

        assert!(matches!(
            session.apply(Transition::Back),
            Err(EnhancerError::Busy)
        ));
        assert!(matches!(
            session.apply(Transition::Started("again".to_string())),
            Err(EnhancerError::Busy)
        ));
        assert_eq!(session, before);

        session
            .apply(Transition::Progress("Still going".to_string()))
            .unwrap();
        assert_eq!(session.progress.as_deref(), Some("Still going"));
    }

    #[test]
    fn test_failure_keeps_step_and_clears_loading() {
        let mut session = session_at_review();
        session
            .apply(Transition::Started("Generating...".to_string()))
            .unwrap();
        session
            .apply(Transition::Failed("Server error 500: boom".to_string()))
            .unwrap();

        assert_eq!(session.step(), Step::Review);
        assert!(!session.loading);
        assert!(session.progress.is_none());
        assert_eq!(session.error.as_deref(), Some("Server error 500: boom"));

        // retry from the same step clears the error
        session
            .apply(Transition::Started("Generating...".to_string()))
            .unwrap();
        assert!(session.error.is_none());
    }

    #[test]
    fn test_restart_only_from_download() {
        let mut session = session_at_review();
        assert!(session.apply(Transition::Restart).is_err());

        session
            .apply(Transition::GenerationCompleted {
                enhanced_resume: "Enhanced".to_string(),
            })
            .unwrap();
        let old_id = session.id;
        session.apply(Transition::Restart).unwrap();

        assert_eq!(session.state, WizardState::Upload { file: None });
        assert!(session.error.is_none());
        assert!(session.progress.is_none());
        assert!(!session.loading);
        assert_ne!(session.id, old_id);
    }

    #[tokio::test]
    async fn test_save_enhanced_resume() {
        let mut session = session_at_review();
        session
            .apply(Transition::GenerationCompleted {
                enhanced_resume: "Enhanced Resume\n=====\n".to_string(),
            })
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let path = save_enhanced_resume(&session, &out).await.unwrap();

        assert_eq!(path, out.join("enhanced_resume.txt"));
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "Enhanced Resume\n=====\n");
    }

    #[tokio::test]
    async fn test_save_requires_download_step() {
        let session = session_at_review();
        let dir = tempfile::tempdir().unwrap();

        assert!(save_enhanced_resume(&session, dir.path()).await.is_err());
    }
}
