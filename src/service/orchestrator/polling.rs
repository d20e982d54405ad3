//! Polling loop for asynchronous structured analysis jobs
//!
//! Polls on a fixed interval up to a hard wait cap. The staleness token is
//! checked around every sleep so a superseded request stops promptly
//! instead of finishing a poll cycle it no longer owns.

use std::time::Duration;

use crate::client::VisionClient;
use crate::model::backend::BackendReport;
use crate::model::{JobStatus, PollConfig};

use super::{ProgressHandle, TierError};

/// Poll `job_id` until it reaches a terminal state or the wait cap expires
pub async fn poll_job(
    client: &VisionClient,
    job_id: &str,
    cfg: &PollConfig,
    progress: &ProgressHandle,
) -> Result<BackendReport, TierError> {
    let interval = Duration::from_millis(cfg.interval_ms);
    let deadline = tokio::time::Instant::now() + Duration::from_millis(cfg.max_wait_ms);

    loop {
        if !progress.is_current() {
            return Err(TierError::Stale);
        }

        let status = client.job_status(job_id).await?;
        progress.update(status.progress);

        match status.status {
            JobStatus::Completed => {
                progress.update(100);
                tracing::info!(job_id = %job_id, "Analysis job completed");
                return Ok(client.fetch_result(job_id).await?);
            }
            JobStatus::Failed => {
                return Err(TierError::JobFailed(job_id.to_string()));
            }
            JobStatus::Queued | JobStatus::Processing => {}
        }

        if tokio::time::Instant::now() + interval > deadline {
            tracing::warn!(job_id = %job_id, max_wait_ms = cfg.max_wait_ms, "Polling wait cap reached");
            return Err(TierError::Timeout);
        }

        tokio::time::sleep(interval).await;

        if !progress.is_current() {
            return Err(TierError::Stale);
        }
    }
}
