// src/lib.rs
//! Client for the resume enhancement backend: upload a resume, analyze it against a job
//! description, and download the rewritten version through a four-step wizard.

pub mod cli;
pub mod core;
pub mod error;
pub mod normalize;
pub mod types;
pub mod utils;
pub mod wizard;

pub use error::{EnhancerError, ErrorKind, Result};
pub use normalize::normalize_bullet;
pub use wizard::{Session, Step, Transition, Wizard, WizardState};
