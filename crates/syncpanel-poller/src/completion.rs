//! Completion watch for a newly created job
//!
//! After the first save the agent indexes and transfers the whole folder.
//! [`watch_until_drained`] polls that single job until its queue is drained,
//! reporting each snapshot on the way.

use std::sync::Arc;

use syncpanel_core::{domain::Job, ports::IAgentApi};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::poller::{PollSchedule, Poller};

/// Polls `job_id` until `queue_length > 0` and `queue_done == queue_length`.
///
/// `on_progress` sees every snapshot, with [`Job::progress`] filled in when
/// the queue is not empty. Returns the final snapshot, or `None` if `token`
/// was cancelled first. Failed polls are retried with the schedule's delays.
pub async fn watch_until_drained<F>(
    api: Arc<dyn IAgentApi>,
    job_id: &str,
    schedule: PollSchedule,
    token: CancellationToken,
    mut on_progress: F,
) -> Option<Job>
where
    F: FnMut(&Job),
{
    info!(job_id, "Watching job until its first run completes");
    let poller = Poller::new("job-watch", schedule).with_token(token.child_token());
    let done = poller.token().clone();
    let api = api.as_ref();
    let mut finished = None;

    poller
        .run(
            move || api.get_job(job_id),
            |mut job: Job| {
                job.progress = job.progress_percent();
                on_progress(&job);
                if job.state.as_ref().is_some_and(|s| s.global.is_drained()) {
                    info!(job_id, "Job run completed");
                    finished = Some(job);
                    done.cancel();
                }
            },
            |err| debug!(job_id, error = %err, "Job not available yet"),
        )
        .await;

    if finished.is_none() {
        info!(job_id, "Completion watch cancelled");
    }
    finished
}
