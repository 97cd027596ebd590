// src/core/mod.rs
//! Backend access, polling and the wizard flows

pub mod backend;
pub mod config_manager;
pub mod flows;
pub mod poller;
pub mod service_client;

pub use backend::{ResumeBackend, SyncAnalysis};
pub use config_manager::{ConfigManager, EnhancerConfig};
pub use flows::{FlowContext, FlowTimeouts};
pub use poller::{PollConfig, Poller};
pub use service_client::ServiceClient;
