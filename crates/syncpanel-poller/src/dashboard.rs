//! Dashboard session
//!
//! A [`Dashboard`] runs up to three poll streams against one shared
//! [`DashboardState`]:
//!
//! - jobs, for as long as the session lives
//! - logs and conflicts of the selected job, restarted on every selection
//!
//! Each stream reconciles into its own view, so their results may land in
//! any order. A job listing that no longer contains the selected job clears
//! the selection and stops that job's streams. Every state change bumps a revision counter that renderers can
//! wait on with [`Dashboard::subscribe`].

use std::sync::{Arc, Mutex, MutexGuard};

use syncpanel_core::{
    config::PollingConfig,
    domain::JobList,
    ports::{AgentResult, IAgentApi},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    poller::{PollHandle, PollSchedule, Poller},
    reconcile::{ConflictsView, JobsView, LogsView},
};

/// Everything a dashboard displays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub jobs: JobsView,
    pub logs: LogsView,
    pub conflicts: ConflictsView,
}

type SharedState = Arc<Mutex<DashboardState>>;

/// Token of the selected job's streams. Only replaced or cancelled while the
/// state lock is held.
type SelectionSlot = Arc<Mutex<CancellationToken>>;

fn lock(state: &Mutex<DashboardState>) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock_slot(slot: &Mutex<CancellationToken>) -> MutexGuard<'_, CancellationToken> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Applies a job listing, dropping the per-job views and streams when the
/// selected job is gone. Returns true when the state changed.
fn apply_listing(
    state: &Mutex<DashboardState>,
    selection: &Mutex<CancellationToken>,
    listing: JobList,
) -> bool {
    let mut state = lock(state);
    let before = state.jobs.selected_id().map(str::to_string);
    let mut changed = state.jobs.apply(listing);

    if let (Some(job_id), None) = (before, state.jobs.selected_id()) {
        info!(job_id = %job_id, "Selected job removed, stopping its streams");
        lock_slot(selection).cancel();
        state.logs.select(None);
        state.conflicts.select(None);
        changed = true;
    }
    changed
}

fn bump(revision: &watch::Sender<u64>) {
    revision.send_modify(|r| *r = r.wrapping_add(1));
}

/// Live view of the agent's jobs and of the selected job's activity
pub struct Dashboard {
    api: Arc<dyn IAgentApi>,
    polling: PollingConfig,
    state: SharedState,
    revision: Arc<watch::Sender<u64>>,
    session: CancellationToken,
    selection: SelectionSlot,
    jobs_stream: Option<PollHandle>,
    job_streams: Vec<PollHandle>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn IAgentApi>, polling: PollingConfig) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            polling,
            state: SharedState::default(),
            revision: Arc::new(revision),
            session: CancellationToken::new(),
            selection: SelectionSlot::default(),
            jobs_stream: None,
            job_streams: Vec::new(),
        }
    }

    /// A copy of the current state.
    pub fn state(&self) -> DashboardState {
        lock(&self.state).clone()
    }

    /// Applies a local change to the state, e.g. editing the selected job.
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let result = f(&mut lock(&self.state));
        bump(&self.revision);
        result
    }

    /// Receiver whose value changes every time the state does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn schedule(&self, interval: std::time::Duration) -> PollSchedule {
        PollSchedule::new(interval, self.polling.backoff())
    }

    /// Starts the jobs stream. Calling it again has no effect.
    pub fn start(&mut self) {
        if self.jobs_stream.is_some() {
            return;
        }
        let api = self.api.clone();
        let selection = self.selection.clone();
        let (ok_state, err_state) = (self.state.clone(), self.state.clone());
        let (ok_rev, err_rev) = (self.revision.clone(), self.revision.clone());

        let handle = Poller::new("jobs", self.schedule(self.polling.jobs_interval()))
            .with_token(self.session.child_token())
            .spawn(
                move || {
                    let api = api.clone();
                    async move { api.list_jobs().await }
                },
                move |listing| {
                    if apply_listing(&ok_state, &selection, listing) {
                        bump(&ok_rev);
                    }
                },
                move |err| {
                    lock(&err_state).jobs.apply_failure(&err);
                    bump(&err_rev);
                },
            );
        self.jobs_stream = Some(handle);
        info!("Dashboard started");
    }

    /// Selects a job, or clears the selection.
    ///
    /// Logs and conflicts shown for the previous job are cleared before this
    /// returns; streams for the new job start right away.
    pub fn select_job(&mut self, job_id: Option<&str>) {
        for handle in self.job_streams.drain(..) {
            handle.cancel();
        }
        let token = self.session.child_token();
        self.update(|state| {
            lock_slot(&self.selection).cancel();
            *lock_slot(&self.selection) = token.clone();
            state.jobs.select(job_id);
            state.logs.select(job_id);
            state.conflicts.select(job_id);
        });

        let Some(job_id) = job_id else {
            debug!("Job selection cleared");
            return;
        };
        debug!(job_id, "Job selected");
        let logs = self.spawn_logs(job_id.to_string(), token.child_token());
        let conflicts = self.spawn_conflicts(job_id.to_string(), token.child_token());
        self.job_streams = vec![logs, conflicts];
    }

    fn spawn_logs(&self, job_id: String, token: CancellationToken) -> PollHandle {
        let api = self.api.clone();
        let fetch_id = job_id.clone();
        let (ok_id, err_id) = (job_id.clone(), job_id);
        let (ok_state, err_state) = (self.state.clone(), self.state.clone());
        let (ok_rev, err_rev) = (self.revision.clone(), self.revision.clone());

        Poller::new("logs", self.schedule(self.polling.logs_interval()))
            .with_token(token)
            .spawn(
                move || {
                    let (api, job_id) = (api.clone(), fetch_id.clone());
                    async move { api.job_logs(&job_id, None).await }
                },
                move |snapshot| {
                    if lock(&ok_state).logs.apply(&ok_id, snapshot) {
                        bump(&ok_rev);
                    }
                },
                move |err| {
                    lock(&err_state).logs.apply_failure(&err_id, &err);
                    bump(&err_rev);
                },
            )
    }

    fn spawn_conflicts(&self, job_id: String, token: CancellationToken) -> PollHandle {
        let api = self.api.clone();
        let fetch_id = job_id.clone();
        let (ok_id, err_id) = (job_id.clone(), job_id);
        let (ok_state, err_state) = (self.state.clone(), self.state.clone());
        let (ok_rev, err_rev) = (self.revision.clone(), self.revision.clone());

        Poller::new("conflicts", self.schedule(self.polling.conflicts_interval()))
            .with_token(token)
            .spawn(
                move || {
                    let (api, job_id) = (api.clone(), fetch_id.clone());
                    async move { api.job_conflicts(&job_id).await }
                },
                move |conflicts| {
                    if lock(&ok_state).conflicts.apply(&ok_id, conflicts) {
                        bump(&ok_rev);
                    }
                },
                move |err| {
                    lock(&err_state).conflicts.apply_failure(&err_id, &err);
                    bump(&err_rev);
                },
            )
    }

    /// Fetches the job list once, outside the regular cadence.
    pub async fn refresh_jobs(&self) -> AgentResult<()> {
        let listing = self.api.list_jobs().await?;
        if apply_listing(&self.state, &self.selection, listing) {
            bump(&self.revision);
        }
        Ok(())
    }

    /// Cancels every stream and waits for them to exit.
    pub async fn shutdown(mut self) {
        self.session.cancel();
        if let Some(handle) = self.jobs_stream.take() {
            handle.stop().await;
        }
        for handle in self.job_streams.drain(..) {
            handle.stop().await;
        }
        info!("Dashboard stopped");
    }
}
