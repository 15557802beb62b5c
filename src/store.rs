// src/store.rs
use crate::types::{JobId, JobResult, JobStatus, JobType, ReconError, ScanJob};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Persistence seam for jobs and their results.
///
/// Implementations must make `start_job` and `finish_job` atomic per job:
/// they are how a single runner claims and closes a job.
pub trait JobStore: Send + Sync {
    fn create_job(&self, job_type: JobType, target: String) -> ScanJob;

    fn job(&self, id: JobId) -> Option<ScanJob>;

    /// All jobs, newest first.
    fn jobs(&self) -> Vec<ScanJob>;

    /// Moves a queued job to running and stamps `started_at`.
    fn start_job(&self, id: JobId, at: DateTime<Utc>) -> Result<ScanJob, ReconError>;

    /// Moves a running job to `status`, stamps `finished_at` and stores its
    /// single result.
    fn finish_job(&self, id: JobId, status: JobStatus, at: DateTime<Utc>, result: JobResult) -> Result<(), ReconError>;

    fn result(&self, id: JobId) -> Option<JobResult>;

    fn remove_job(&self, id: JobId) -> Option<ScanJob>;
}

/// In-process store backed by concurrent maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: AtomicU64,
    jobs: DashMap<JobId, ScanJob>,
    results: DashMap<JobId, JobResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryStore {
    fn create_job(&self, job_type: JobType, target: String) -> ScanJob {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let job = ScanJob {
            id,
            job_type,
            target,
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        };
        self.jobs.insert(id, job.clone());
        job
    }

    fn job(&self, id: JobId) -> Option<ScanJob> {
        self.jobs.get(&id).map(|job| job.clone())
    }

    fn jobs(&self) -> Vec<ScanJob> {
        let mut jobs: Vec<ScanJob> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs
    }

    fn start_job(&self, id: JobId, at: DateTime<Utc>) -> Result<ScanJob, ReconError> {
        let mut job = self.jobs.get_mut(&id).ok_or(ReconError::JobNotFound(id))?;
        if !job.status.can_transition_to(JobStatus::Running) {
            return Err(ReconError::InvalidTransition {
                id,
                from: job.status,
                to: JobStatus::Running,
            });
        }
        job.status = JobStatus::Running;
        job.started_at = Some(at);
        Ok(job.clone())
    }

    fn finish_job(&self, id: JobId, status: JobStatus, at: DateTime<Utc>, result: JobResult) -> Result<(), ReconError> {
        // Job entry stays locked until the result is in place.
        let mut job = self.jobs.get_mut(&id).ok_or(ReconError::JobNotFound(id))?;
        if !status.is_terminal() || !job.status.can_transition_to(status) {
            return Err(ReconError::InvalidTransition {
                id,
                from: job.status,
                to: status,
            });
        }
        match self.results.entry(id) {
            Entry::Occupied(_) => return Err(ReconError::DuplicateResult(id)),
            Entry::Vacant(slot) => {
                slot.insert(result);
            }
        }
        job.status = status;
        job.finished_at = Some(at);
        Ok(())
    }

    fn result(&self, id: JobId) -> Option<JobResult> {
        self.results.get(&id).map(|result| result.clone())
    }

    fn remove_job(&self, id: JobId) -> Option<ScanJob> {
        self.results.remove(&id);
        self.jobs.remove(&id).map(|(_, job)| job)
    }
}
