// src/types/mod.rs
pub mod analysis;
pub mod response;
pub mod resume_file;

pub use analysis::{AnalysisResult, BulletImprovement, MissingKeyword};
pub use response::{HealthStatus, TaskAccepted, TaskStatus, TaskStatusResponse, UploadResult};
pub use resume_file::ResumeFile;
