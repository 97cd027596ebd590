// src/core/poller.rs
//! Status polling for backend background jobs, shared by the upload and analysis flows

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{EnhancerError, Result};
use crate::types::{TaskStatus, TaskStatusResponse};
use crate::utils::format_elapsed;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub initial_delay: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Poll `fetch` until the task leaves the pending state or attempts run out.
    ///
    /// Transport failures are terminal, only an explicit non-terminal status is re-polled.
    /// Each poll is awaited before the next one is scheduled.
    pub async fn poll<T, F, Fut>(
        &self,
        task_id: &str,
        label: &str,
        mut fetch: F,
        progress: &mut dyn FnMut(String),
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<TaskStatusResponse<T>>>,
    {
        info!("Polling {} task {}", label, task_id);
        tokio::time::sleep(self.config.initial_delay).await;

        for attempt in 1..=self.config.max_attempts {
            let response = fetch().await.map_err(|e| {
                warn!("{} status request failed for task {}: {}", label, task_id, e);
                EnhancerError::PollRequestFailed(e.to_string())
            })?;

            debug!(
                "{} task {} attempt {}/{}: {:?}",
                label, task_id, attempt, self.config.max_attempts, response.status
            );

            if response.status.is_terminal() {
                return Self::resolve(label, task_id, attempt, response);
            }

            if attempt == self.config.max_attempts {
                break;
            }

            progress(format!(
                "{} still in progress... ({} elapsed)",
                label,
                format_elapsed(self.elapsed_after(attempt))
            ));
            tokio::time::sleep(self.config.interval).await;
        }

        warn!(
            "{} task {} still pending after {} attempts",
            label, task_id, self.config.max_attempts
        );
        Err(EnhancerError::PollTimeout {
            attempts: self.config.max_attempts,
        })
    }

    /// Polling time spent once `attempt` polls have been scheduled
    fn elapsed_after(&self, attempt: u32) -> Duration {
        self.config.interval.saturating_mul(attempt)
    }

    fn resolve<T>(
        label: &str,
        task_id: &str,
        attempt: u32,
        response: TaskStatusResponse<T>,
    ) -> Result<T> {
        if response.status == TaskStatus::Completed {
            info!("{} task {} completed after {} polls", label, task_id, attempt);
            return response.result.ok_or_else(|| {
                EnhancerError::PollRequestFailed(format!(
                    "{} task {} completed without a result",
                    label, task_id
                ))
            });
        }

        warn!(
            "{} task {} failed: {}",
            label,
            task_id,
            response.error.as_deref().unwrap_or("no error message")
        );
        Err(EnhancerError::BackendJobFailed(response.error))
    }
}
