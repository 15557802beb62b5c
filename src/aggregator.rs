// src/aggregator.rs
use crate::types::{JobId, JobResult, JobStatus, Meta, ProbeOutput, ReconError};
use chrono::Utc;

/// Packages whatever a probe produced into the uniform result envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Success keeps output and metadata untouched; failures become an
    /// `error` status with a readable explanation as output.
    pub fn package(&self, job_id: JobId, outcome: Result<ProbeOutput, ReconError>) -> (JobStatus, JobResult) {
        let (status, output, meta) = match outcome {
            Ok(probe_output) => (JobStatus::Done, probe_output.text, probe_output.meta),
            Err(ReconError::UnknownJobType(tag)) => {
                let mut meta = Meta::new();
                meta.insert("error_kind".to_string(), "unknown_job_type".into());
                (JobStatus::Error, format!("Unknown job type: {}", tag), meta)
            }
            Err(e) => {
                let mut meta = Meta::new();
                meta.insert("error_kind".to_string(), e.kind().into());
                (JobStatus::Error, format!("Error during job: {}", e), meta)
            }
        };

        let result = JobResult {
            job_id,
            output,
            meta,
            created_at: Utc::now(),
        };
        (status, result)
    }
}
