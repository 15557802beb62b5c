// src/engine.rs
use crate::probes::{ProbeRegistry, UsernameDiscovery};
use crate::runner::JobRunner;
use crate::store::{JobStore, MemoryStore};
use crate::types::{Config, JobId, JobReport, JobResult, JobType, PlatformOutcome, ReconError, ScanJob};
use crate::validator::validate_target;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Entry point for callers: submits jobs, answers status queries and runs
/// username discovery directly.
pub struct ReconEngine {
    store: Arc<dyn JobStore>,
    runner: JobRunner,
    job_slots: Arc<Semaphore>,
    username: UsernameDiscovery,
    poll_interval: Duration,
}

impl ReconEngine {
    pub fn new(config: &Config) -> Result<Self, ReconError> {
        let registry = ProbeRegistry::from_config(config)?;
        Self::with_parts(config, Arc::new(MemoryStore::new()), registry)
    }

    /// Builds an engine over a caller supplied store and registry.
    pub fn with_parts(config: &Config, store: Arc<dyn JobStore>, registry: ProbeRegistry) -> Result<Self, ReconError> {
        if config.engine.max_concurrent_jobs == 0 {
            return Err(ReconError::ConfigError(
                "max_concurrent_jobs must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            runner: JobRunner::new(store.clone(), Arc::new(registry)),
            store,
            job_slots: Arc::new(Semaphore::new(config.engine.max_concurrent_jobs)),
            username: UsernameDiscovery::new(config.http.clone(), config.username.clone()),
            poll_interval: config.engine.poll_interval,
        })
    }

    /// Validates the target, records a queued job and schedules it. Returns
    /// as soon as the job exists; the probe runs in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, job_type: &str, target: &str) -> Result<JobId, ReconError> {
        validate_target(target)?;

        let job = self.store.create_job(JobType::from(job_type), target.to_string());
        let id = job.id;
        info!("Job {} queued: {} {}", id, job.job_type, job.target);

        let runner = self.runner.clone();
        let job_slots = self.job_slots.clone();
        tokio::spawn(async move {
            // Slots are never closed, so a failed acquire cannot happen.
            let _slot = job_slots.acquire_owned().await;
            runner.run(id).await;
        });

        Ok(id)
    }

    pub fn job(&self, id: JobId) -> Option<ScanJob> {
        self.store.job(id)
    }

    pub fn result(&self, id: JobId) -> Option<JobResult> {
        self.store.result(id)
    }

    /// All jobs, newest first.
    pub fn jobs(&self) -> Vec<ScanJob> {
        self.store.jobs()
    }

    /// Polls until the job is terminal and returns it with its result.
    pub async fn wait_for(&self, id: JobId) -> Result<JobReport, ReconError> {
        loop {
            let job = self.store.job(id).ok_or(ReconError::JobNotFound(id))?;
            if job.status.is_terminal() {
                let result = self.store.result(id);
                return Ok(JobReport { job, result });
            }
            debug!("Job {} is {}", id, job.status);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Runs username discovery immediately; not routed through the job
    /// pipeline.
    pub async fn discover_username(&self, username: &str, use_tor: bool) -> Result<Vec<PlatformOutcome>, ReconError> {
        self.username.discover(username, use_tor).await
    }
}
