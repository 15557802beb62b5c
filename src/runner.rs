// src/runner.rs
use crate::aggregator::ResultAggregator;
use crate::probes::ProbeRegistry;
use crate::store::JobStore;
use crate::types::{JobId, ProbeOutput, ReconError, ScanJob};
use chrono::Utc;
use log::{error, info, warn};
use std::any::Any;
use std::sync::Arc;

/// Drives one job from `queued` to a terminal status.
///
/// The runner is the only writer of a job while it runs: claiming the job
/// is an atomic queued -> running transition in the store, so a second
/// runner for the same id backs off without touching it.
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<dyn JobStore>,
    registry: Arc<ProbeRegistry>,
    aggregator: ResultAggregator,
}

impl JobRunner {
    pub fn new(store: Arc<dyn JobStore>, registry: Arc<ProbeRegistry>) -> Self {
        Self {
            store,
            registry,
            aggregator: ResultAggregator::new(),
        }
    }

    /// Runs the job to completion. Never fails and never panics: every
    /// probe fault ends up as an `error` status with its description.
    pub async fn run(&self, job_id: JobId) {
        let job = match self.store.start_job(job_id, Utc::now()) {
            Ok(job) => job,
            Err(e) => {
                warn!("Job {} not started: {}", job_id, e);
                return;
            }
        };
        info!("Job {} ({}) started against {}", job.id, job.job_type, job.target);

        let outcome = self.execute(&job).await;
        let (status, result) = self.aggregator.package(job.id, outcome);

        match self.store.finish_job(job.id, status, Utc::now(), result) {
            Ok(()) => info!("Job {} finished: {}", job.id, status),
            Err(ReconError::JobNotFound(id)) => {
                warn!("Job {} disappeared while running, result discarded", id)
            }
            Err(e) => error!("Job {} could not be finalized: {}", job.id, e),
        }
    }

    async fn execute(&self, job: &ScanJob) -> Result<ProbeOutput, ReconError> {
        let probe = self
            .registry
            .get(&job.job_type)
            .ok_or_else(|| ReconError::UnknownJobType(job.job_type.tag().to_string()))?;

        let request = probe.request(&job.target);
        let name = probe.name().to_string();

        // Child task so a panicking probe surfaces as a JoinError.
        let handle = tokio::spawn(async move { probe.execute(request).await });
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(ReconError::ProbeFailure(format!(
                "{} probe panicked: {}",
                name,
                panic_message(e.into_panic())
            ))),
            Err(e) => Err(ReconError::ProbeFailure(format!("{} probe was cancelled: {}", name, e))),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
