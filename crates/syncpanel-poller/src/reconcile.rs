//! Reconciliation of polled state into view state
//!
//! Each view owns the last data it displayed and folds every poll result
//! into it instead of replacing it wholesale:
//!
//! - [`JobsView`] merges jobs by id. The selected job only takes the
//!   server-authoritative status fields so that an edit in progress survives
//!   every poll; the other jobs are merged field by field.
//! - [`LogsView`] and [`ConflictsView`] belong to one selected job. A result
//!   fetched for another job is discarded, and switching jobs clears the
//!   displayed data at once.
//!
//! A failed poll never clears what is displayed; it only sets the view's
//! error message.

use syncpanel_core::{
    domain::{Conflict, ConflictSet, Job, JobList, LogEntry, LogsSnapshot, RunningState},
    ports::AgentError,
    usecases::is_modified,
};
use tracing::debug;

// ============================================================================
// Jobs
// ============================================================================

/// Folds a server job listing into `local`.
///
/// The result follows the server's order and membership. A job present on
/// both sides keeps its local value and is updated in place: with
/// [`Job::absorb_status`] when its id is `selected`, with
/// [`Job::merge_from`] otherwise. Returns true when anything changed.
pub fn reconcile_jobs(local: &mut Vec<Job>, server: &[Job], selected: Option<&str>) -> bool {
    let mut remaining = std::mem::take(local);
    let mut changed = remaining.len() != server.len();

    for incoming in server {
        let existing = remaining.iter().position(|job| job.id == incoming.id);
        let job = match existing {
            Some(pos) => {
                changed |= pos != 0;
                let mut job = remaining.remove(pos);
                changed |= if selected == Some(incoming.id.as_str()) {
                    job.absorb_status(incoming)
                } else {
                    job.merge_from(incoming)
                };
                job
            }
            None => {
                changed = true;
                let mut job = incoming.clone();
                if selected == Some(incoming.id.as_str()) {
                    job.absorb_status(incoming);
                }
                job
            }
        };
        local.push(job);
    }

    changed || !remaining.is_empty()
}

/// The job list and the job selected for viewing or editing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobsView {
    jobs: Vec<Job>,
    selected: Option<String>,
    /// Server copy of the selected job, for edit detection
    snapshot: Option<Job>,
    internet_ok: Option<bool>,
    error: Option<String>,
}

impl JobsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == job_id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Job> {
        self.job(self.selected.as_deref()?)
    }

    /// The selected job, for local edits.
    pub fn selected_mut(&mut self) -> Option<&mut Job> {
        let id = self.selected.as_deref()?;
        self.jobs.iter_mut().find(|job| job.id == id)
    }

    /// Selects `job_id`, or clears the selection.
    pub fn select(&mut self, job_id: Option<&str>) {
        self.selected = job_id.map(str::to_string);
        self.snapshot = self.selected().cloned();
    }

    /// True when the selected job has unsaved edits.
    pub fn is_selected_modified(&self) -> bool {
        match (self.selected(), &self.snapshot) {
            (Some(job), Some(snapshot)) => is_modified(job, snapshot),
            _ => false,
        }
    }

    /// Discards local edits of the selected job.
    pub fn revert_selected(&mut self) {
        let Some(snapshot) = self.snapshot.clone() else {
            return;
        };
        if let Some(job) = self.selected_mut() {
            job.apply_editable(snapshot.editable());
        }
    }

    /// Last connectivity marker reported with the job listing.
    pub fn internet_ok(&self) -> Option<bool> {
        self.internet_ok
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Folds a successful listing in. Returns true when any job changed or a
    /// previous failure was cleared.
    pub fn apply(&mut self, listing: JobList) -> bool {
        let recovered = self.error.take().is_some();
        if listing.internet_ok.is_some() {
            self.internet_ok = listing.internet_ok;
        }

        let changed = reconcile_jobs(&mut self.jobs, &listing.jobs, self.selected.as_deref());

        if let Some(id) = self.selected.clone() {
            match listing.jobs.iter().find(|job| job.id == id) {
                Some(server) => {
                    let snapshot = self.snapshot.get_or_insert_with(|| server.clone());
                    snapshot.merge_from(server);
                }
                None => {
                    debug!(job_id = %id, "Selected job no longer listed");
                    self.selected = None;
                    self.snapshot = None;
                }
            }
        }
        changed || recovered
    }

    /// Records a failed poll; the displayed jobs are kept.
    pub fn apply_failure(&mut self, err: &AgentError) {
        self.error = Some(err.user_message());
    }
}

// ============================================================================
// Logs
// ============================================================================

/// History and running task of the selected job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogsView {
    job_id: Option<String>,
    /// `None` until the first result for `job_id` arrives
    logs: Option<Vec<LogEntry>>,
    running: Option<RunningState>,
    error: Option<String>,
}

impl LogsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn logs(&self) -> Option<&[LogEntry]> {
        self.logs.as_deref()
    }

    pub fn running(&self) -> Option<&RunningState> {
        self.running.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switches to another job, clearing what was shown for the previous one.
    pub fn select(&mut self, job_id: Option<&str>) {
        if self.job_id.as_deref() == job_id {
            return;
        }
        self.job_id = job_id.map(str::to_string);
        self.logs = None;
        self.running = None;
        self.error = None;
    }

    fn is_current(&self, job_id: &str) -> bool {
        let current = self.job_id.as_deref() == Some(job_id);
        if !current {
            debug!(job_id, "Discarding logs for a job that is no longer selected");
        }
        current
    }

    /// Replaces the displayed logs with `snapshot` if `job_id` is still selected.
    pub fn apply(&mut self, job_id: &str, snapshot: LogsSnapshot) -> bool {
        if !self.is_current(job_id) {
            return false;
        }
        let recovered = self.error.take().is_some();
        let logs = Some(snapshot.logs);
        let changed = self.logs != logs || self.running != snapshot.running;
        self.logs = logs;
        self.running = snapshot.running;
        changed || recovered
    }

    pub fn apply_failure(&mut self, job_id: &str, err: &AgentError) {
        if self.is_current(job_id) {
            self.error = Some(err.user_message());
        }
    }
}

// ============================================================================
// Conflicts
// ============================================================================

/// Conflicts of the selected job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictsView {
    job_id: Option<String>,
    set: Option<ConflictSet>,
    error: Option<String>,
}

impl ConflictsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn set(&self) -> Option<&ConflictSet> {
        self.set.as_ref()
    }

    pub fn set_mut(&mut self) -> Option<&mut ConflictSet> {
        self.set.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn select(&mut self, job_id: Option<&str>) {
        if self.job_id.as_deref() == job_id {
            return;
        }
        self.job_id = job_id.map(str::to_string);
        self.set = None;
        self.error = None;
    }

    pub fn apply(&mut self, job_id: &str, conflicts: Vec<Conflict>) -> bool {
        if self.job_id.as_deref() != Some(job_id) {
            debug!(job_id, "Discarding conflicts for a job that is no longer selected");
            return false;
        }
        let recovered = self.error.take().is_some();
        let set = ConflictSet::new(job_id, conflicts);
        let changed = self.set.as_ref() != Some(&set);
        self.set = Some(set);
        changed || recovered
    }

    pub fn apply_failure(&mut self, job_id: &str, err: &AgentError) {
        if self.job_id.as_deref() == Some(job_id) {
            self.error = Some(err.user_message());
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
