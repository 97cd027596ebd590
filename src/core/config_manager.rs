// src/core/config_manager.rs
//! Configuration: defaults, then an optional `enhancer.toml`, then environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::flows::FlowTimeouts;
use crate::core::poller::PollConfig;

pub const DEFAULT_CONFIG_FILE: &str = "enhancer.toml";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const ENV_API_URL: &str = "RESUME_ENHANCER_API_URL";
const ENV_LOG_FILE: &str = "RESUME_ENHANCER_LOG_FILE";
const ENV_LOG_LEVEL: &str = "RESUME_ENHANCER_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq)]
pub struct EnhancerConfig {
    pub service: ServiceConfig,
    pub polling: PollConfig,
    pub timeouts: FlowTimeouts,
    pub logging: LoggingConfig,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                api_url: DEFAULT_API_URL.to_string(),
                request_timeout: Duration::from_secs(120),
            },
            polling: PollConfig::default(),
            timeouts: FlowTimeouts::default(),
            logging: LoggingConfig {
                file: std::env::temp_dir().join("resume-enhancer.log"),
                level: "info".to_string(),
            },
            output_dir: PathBuf::from("."),
        }
    }
}

/// On-disk shape; every field is optional and overrides the default when present
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
    upload_timeout_secs: Option<u64>,
    analysis_timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    poll_initial_delay_secs: Option<u64>,
    poll_max_attempts: Option<u32>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
    output_dir: Option<PathBuf>,
}

pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from `path` (or `enhancer.toml` if it exists) and the environment
    pub fn load(path: Option<&Path>) -> Result<EnhancerConfig> {
        let mut config = EnhancerConfig::default();

        let file_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if file_path.exists() {
            let content = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read {}", file_path.display()))?;
            Self::apply_file(&mut config, &content)
                .with_context(|| format!("Failed to parse {}", file_path.display()))?;
        } else if path.is_some() {
            anyhow::bail!("Config file not found: {}", file_path.display());
        }

        Self::apply_env(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply_file(config: &mut EnhancerConfig, content: &str) -> Result<()> {
        let file: ConfigFile = toml::from_str(content)?;

        if let Some(url) = file.api_url {
            config.service.api_url = url;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.service.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.upload_timeout_secs {
            config.timeouts.upload = Duration::from_secs(secs);
        }
        if let Some(secs) = file.analysis_timeout_secs {
            config.timeouts.analysis = Duration::from_secs(secs);
        }
        if let Some(secs) = file.poll_interval_secs {
            config.polling.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.poll_initial_delay_secs {
            config.polling.initial_delay = Duration::from_secs(secs);
        }
        if let Some(attempts) = file.poll_max_attempts {
            if attempts == 0 {
                anyhow::bail!("poll_max_attempts must be at least 1");
            }
            config.polling.max_attempts = attempts;
        }
        if let Some(file_path) = file.log_file {
            config.logging.file = file_path;
        }
        if let Some(level) = file.log_level {
            config.logging.level = level;
        }
        if let Some(dir) = file.output_dir {
            config.output_dir = dir;
        }
        Ok(())
    }

    fn apply_env(config: &mut EnhancerConfig, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(ENV_API_URL) {
            config.service.api_url = url;
        }
        if let Some(file) = var(ENV_LOG_FILE) {
            config.logging.file = PathBuf::from(file);
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
    }
}
