//! Readiness polling for uploaded files.
//!
//! The remote service processes an upload asynchronously. A file moves from
//! `PROCESSING` to `ACTIVE` (usable) or to a failure state. The poller waits
//! with a fixed interval, bounded by `PollPolicy::max_attempts`, and can be
//! cancelled from another task through a `CancellationToken`.

use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::llm_gateway::AnalysisService;
use crate::schema::{ActiveFile, FileState, RemoteFile};

#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Maximum number of state re-fetches before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

/// Waits until `file` leaves the `PROCESSING` state.
pub async fn wait_for_file_active(
    service: &dyn AnalysisService,
    mut file: RemoteFile,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> AppResult<ActiveFile> {
    let mut attempts = 0u32;

    while file.state == FileState::Processing {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled(file.name));
        }
        if attempts >= policy.max_attempts {
            tracing::warn!(file = %file.name, attempts, "file still processing, giving up");
            return Err(AppError::PollTimeout {
                name: file.name,
                attempts,
            });
        }

        tracing::debug!(file = %file.name, attempt = attempts + 1, "file processing, waiting {:?}", policy.interval);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled(file.name)),
            _ = sleep(policy.interval) => {}
        }

        attempts += 1;
        file = service.get_file(&file.name).await?;
    }

    if file.state != FileState::Active {
        return Err(AppError::FileProcessing {
            state: file.state.to_string(),
            name: file.name,
        });
    }

    tracing::info!(file = %file.name, attempts, "file is active");
    Ok(ActiveFile::new(file))
}
