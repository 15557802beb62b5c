// src/output.rs
use crate::types::{JobReport, OutputConfig, OutputFormat, PlatformOutcome, ReconError};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn write_reports(&self, reports: &[JobReport]) -> Result<(), ReconError> {
        self.write_with(|writer| self.write_job_reports(writer, reports))
    }

    pub fn write_profiles(&self, username: &str, outcomes: &[PlatformOutcome]) -> Result<(), ReconError> {
        self.write_with(|writer| self.write_platform_outcomes(writer, username, outcomes))
    }

    fn write_with<F>(&self, render: F) -> Result<(), ReconError>
    where
        F: Fn(&mut dyn Write) -> Result<(), ReconError>,
    {
        if let Some(file_path) = &self.config.file {
            if let Some(parent) = Path::new(file_path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ReconError::OutputError(format!("Failed to create directory: {}", e)))?;
            }
            let mut file = File::create(file_path)
                .map_err(|e| ReconError::OutputError(format!("Failed to create file: {}", e)))?;
            render(&mut file)?;
            info!("Results written to: {}", file_path);
            Ok(())
        } else {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            render(&mut handle)
        }
    }

    pub fn write_job_reports(&self, writer: &mut dyn Write, reports: &[JobReport]) -> Result<(), ReconError> {
        match self.config.format {
            OutputFormat::Json => write_json(writer, &reports),
            // Job output is free text; there is no meaningful CSV shape for it.
            OutputFormat::Text | OutputFormat::Csv => {
                for report in reports {
                    write_job_text(writer, report)?;
                }
                Ok(())
            }
        }
    }

    pub fn write_platform_outcomes(
        &self,
        writer: &mut dyn Write,
        username: &str,
        outcomes: &[PlatformOutcome],
    ) -> Result<(), ReconError> {
        match self.config.format {
            OutputFormat::Text => write_platform_text(writer, username, outcomes),
            OutputFormat::Json => write_json(writer, &outcomes),
            OutputFormat::Csv => write_platform_csv(writer, outcomes),
        }
    }
}

fn io_err(e: std::io::Error) -> ReconError {
    ReconError::OutputError(e.to_string())
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), ReconError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ReconError::OutputError(format!("Failed to serialize JSON: {}", e)))?;
    writeln!(writer, "{}", json).map_err(io_err)
}

fn write_job_text(writer: &mut dyn Write, report: &JobReport) -> Result<(), ReconError> {
    let job = &report.job;
    writeln!(writer, "\n[*] Job {}: {} {}", job.id, job.job_type, job.target).map_err(io_err)?;
    writeln!(writer, "[*] Status: {}", job.status).map_err(io_err)?;
    if let (Some(started), Some(finished)) = (job.started_at, job.finished_at) {
        let elapsed = finished - started;
        writeln!(writer, "[*] Duration: {:.2}s", elapsed.num_milliseconds() as f64 / 1000.0).map_err(io_err)?;
    }

    match &report.result {
        Some(result) => {
            for (key, value) in &result.meta {
                let value = serde_json::to_string(value).map_err(|e| ReconError::OutputError(e.to_string()))?;
                writeln!(writer, "[*] {}: {}", key, value).map_err(io_err)?;
            }
            writeln!(writer, "\n{}", result.output).map_err(io_err)?;
        }
        None => writeln!(writer, "\n(no result)").map_err(io_err)?,
    }
    Ok(())
}

fn write_platform_text(writer: &mut dyn Write, username: &str, outcomes: &[PlatformOutcome]) -> Result<(), ReconError> {
    let found = outcomes.iter().filter(|o| o.found).count();
    writeln!(writer, "\n[*] Username: {}", username).map_err(io_err)?;
    writeln!(writer, "[*] Found on {}/{} platforms\n", found, outcomes.len()).map_err(io_err)?;

    for outcome in outcomes {
        let marker = if outcome.found { "+" } else { "-" };
        let status = outcome
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "---".to_string());
        let line = match &outcome.error {
            Some(error) => writeln!(writer, "[{}] {:<12} {} {} ({})", marker, outcome.platform, status, outcome.url, error),
            None => writeln!(writer, "[{}] {:<12} {} {}", marker, outcome.platform, status, outcome.url),
        };
        line.map_err(io_err)?;
    }
    Ok(())
}

fn write_platform_csv(writer: &mut dyn Write, outcomes: &[PlatformOutcome]) -> Result<(), ReconError> {
    writeln!(writer, "platform,url,status,found,error").map_err(io_err)?;
    for outcome in outcomes {
        writeln!(
            writer,
            "{},{},{},{},\"{}\"",
            outcome.platform,
            outcome.url,
            outcome.status.map(|s| s.to_string()).unwrap_or_default(),
            outcome.found,
            outcome.error.as_deref().unwrap_or("").replace('"', "\"\"")
        )
        .map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobResult, JobStatus, JobType, Meta, ScanJob};
    use chrono::Utc;

    fn manager(format: OutputFormat) -> OutputManager {
        OutputManager::new(OutputConfig { format, file: None })
    }

    fn report() -> JobReport {
        let now = Utc::now();
        let mut meta = Meta::new();
        meta.insert("ports_scanned".to_string(), 3usize.into());
        JobReport {
            job: ScanJob {
                id: 1,
                job_type: JobType::TcpScan,
                target: "example.com".to_string(),
                status: JobStatus::Done,
                created_at: now,
                started_at: Some(now),
                finished_at: Some(now),
            },
            result: Some(JobResult {
                job_id: 1,
                output: "22: closed\n80: open".to_string(),
                meta,
                created_at: now,
            }),
        }
    }

    fn outcomes() -> Vec<PlatformOutcome> {
        vec![
            PlatformOutcome {
                platform: "GitHub".to_string(),
                url: "https://github.com/alice".to_string(),
                status: Some(200),
                found: true,
                error: None,
            },
            PlatformOutcome {
                platform: "Tumblr".to_string(),
                url: "https://alice.tumblr.com".to_string(),
                status: None,
                found: false,
                error: Some("timed out".to_string()),
            },
        ]
    }

    #[test]
    fn test_job_text() {
        let mut buf = Vec::new();
        manager(OutputFormat::Text).write_job_reports(&mut buf, &[report()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("[*] Job 1: tcp_scan example.com"));
        assert!(text.contains("[*] Status: done"));
        assert!(text.contains("[*] ports_scanned: 3"));
        assert!(text.ends_with("22: closed\n80: open\n"));
    }

    #[test]
    fn test_job_json() {
        let mut buf = Vec::new();
        manager(OutputFormat::Json).write_job_reports(&mut buf, &[report()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["job"]["job_type"], "tcp_scan");
        assert_eq!(value[0]["job"]["status"], "done");
        assert_eq!(value[0]["result"]["meta"]["ports_scanned"], 3);
    }

    #[test]
    fn test_platform_renderings() {
        let mut text = Vec::new();
        manager(OutputFormat::Text)
            .write_platform_outcomes(&mut text, "alice", &outcomes())
            .unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("Found on 1/2 platforms"));
        assert!(text.contains("(timed out)"));

        let mut csv = Vec::new();
        manager(OutputFormat::Csv)
            .write_platform_outcomes(&mut csv, "alice", &outcomes())
            .unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "platform,url,status,found,error");
        assert_eq!(lines[1], "GitHub,https://github.com/alice,200,true,\"\"");
        assert_eq!(lines[2], "Tumblr,https://alice.tumblr.com,,false,\"timed out\"");

        let mut json = Vec::new();
        manager(OutputFormat::Json)
            .write_platform_outcomes(&mut json, "alice", &outcomes())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value[1]["error"], "timed out");
        assert!(value[0].get("error").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.json");
        let manager = OutputManager::new(OutputConfig {
            format: OutputFormat::Json,
            file: Some(path.to_string_lossy().into_owned()),
        });
        manager.write_reports(&[report()]).unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"target\": \"example.com\""));
    }
}
