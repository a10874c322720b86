//! Conflict resolution use case

use std::sync::Arc;

use tracing::info;

use crate::{
    domain::{ConflictSet, ConflictStatus, ResolveTarget},
    ports::{AgentResult, IAgentApi},
};

/// Records the user's decision on one or all conflicts of a job
pub struct ResolveConflictsUseCase {
    api: Arc<dyn IAgentApi>,
}

impl ResolveConflictsUseCase {
    pub fn new(api: Arc<dyn IAgentApi>) -> Self {
        Self { api }
    }

    /// Fetches the current conflicts of a job.
    pub async fn list(&self, job_id: &str) -> AgentResult<ConflictSet> {
        let conflicts = self.api.job_conflicts(job_id).await?;
        Ok(ConflictSet::new(job_id, conflicts))
    }

    /// Applies `status` to the targeted conflicts and saves each of them.
    ///
    /// Returns the number of records saved. Stops at the first failed save;
    /// the set already reflects the new statuses locally.
    pub async fn resolve(
        &self,
        set: &mut ConflictSet,
        target: &ResolveTarget,
        status: &ConflictStatus,
    ) -> AgentResult<usize> {
        let changed = set.resolve(target, status);
        for conflict in &changed {
            self.api.save_conflict(conflict).await?;
        }
        info!(
            job_id = %set.job_id(),
            count = changed.len(),
            status = %status,
            "Conflicts resolved"
        );
        Ok(changed.len())
    }
}
