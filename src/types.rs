// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type JobId = u64;

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub http: HttpConfig,
    pub tcp_scan: TcpScanConfig,
    pub whois: WhoisConfig,
    pub http_enum: HttpEnumConfig,
    pub sub_bruteforce: SubdomainConfig,
    pub username: UsernameConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            http: HttpConfig::default(),
            tcp_scan: TcpScanConfig::default(),
            whois: WhoisConfig::default(),
            http_enum: HttpEnumConfig::default(),
            sub_bruteforce: SubdomainConfig::default(),
            username: UsernameConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on jobs executing at the same time.
    pub max_concurrent_jobs: usize,
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Client settings shared by the HTTP based probes.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub proxy: Option<String>,
    pub max_redirects: usize,
    pub requests_per_second: Option<u32>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("reconjob/{}", env!("CARGO_PKG_VERSION")),
            proxy: None,
            max_redirects: 10,
            requests_per_second: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TcpScanConfig {
    pub ports: Vec<u16>,
    pub timeout: Duration,
    pub max_workers: usize,
}

impl Default for TcpScanConfig {
    fn default() -> Self {
        Self {
            ports: (1..512).collect(),
            timeout: Duration::from_millis(800),
            max_workers: 80,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhoisConfig {
    /// Tried in order; `host` or `host:port`.
    pub servers: Vec<String>,
    pub timeout: Duration,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            servers: vec![
                "whois.iana.org".to_string(),
                "whois.verisign-grs.com".to_string(),
                "whois.crsnic.net".to_string(),
                "whois.arin.net".to_string(),
            ],
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpEnumConfig {
    pub timeout: Duration,
}

impl Default for HttpEnumConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(6),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubdomainConfig {
    pub wordlist: PathBuf,
    pub timeout: Duration,
    pub max_workers: usize,
    pub nameservers: Vec<String>,
    pub use_system_resolver: bool,
}

impl Default for SubdomainConfig {
    fn default() -> Self {
        Self {
            wordlist: PathBuf::from("data/subs.txt"),
            timeout: Duration::from_secs(2),
            max_workers: 40,
            nameservers: vec![
                "8.8.8.8:53".to_string(),
                "8.8.4.4:53".to_string(),
                "1.1.1.1:53".to_string(),
                "1.0.0.1:53".to_string(),
            ],
            use_system_resolver: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    /// Profile URL with `{u}` standing in for the username.
    pub template: String,
}

impl Platform {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsernameConfig {
    pub platforms: Vec<Platform>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub tor_proxy: String,
}

impl Default for UsernameConfig {
    fn default() -> Self {
        Self {
            platforms: vec![
                Platform::new("GitHub", "https://github.com/{u}"),
                Platform::new("Twitter", "https://twitter.com/{u}"),
                Platform::new("Instagram", "https://www.instagram.com/{u}/"),
                Platform::new("Reddit", "https://www.reddit.com/user/{u}"),
                Platform::new("LinkedIn", "https://www.linkedin.com/in/{u}"),
                Platform::new("Facebook", "https://www.facebook.com/{u}"),
                Platform::new("YouTube", "https://www.youtube.com/{u}"),
                Platform::new("GitLab", "https://gitlab.com/{u}"),
                Platform::new("Medium", "https://medium.com/@{u}"),
                Platform::new("Tumblr", "https://{u}.tumblr.com"),
            ],
            concurrency: 6,
            timeout: Duration::from_secs(8),
            tor_proxy: "socks5h://127.0.0.1:9050".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            file: None,
        }
    }
}

/// Kind of probe a job runs. Tags that name no known probe are kept as
/// `Unrecognized` so the job can still be recorded and failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobType {
    TcpScan,
    Whois,
    HttpEnum,
    SubBruteforce,
    UsernameDiscovery,
    Unrecognized(String),
}

impl JobType {
    pub fn tag(&self) -> &str {
        match self {
            JobType::TcpScan => "tcp_scan",
            JobType::Whois => "whois",
            JobType::HttpEnum => "http_enum",
            JobType::SubBruteforce => "sub_bruteforce",
            JobType::UsernameDiscovery => "username_discovery",
            JobType::Unrecognized(tag) => tag,
        }
    }
}

impl From<&str> for JobType {
    fn from(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "tcp_scan" => JobType::TcpScan,
            "whois" => JobType::Whois,
            "http_enum" => JobType::HttpEnum,
            "sub_bruteforce" => JobType::SubBruteforce,
            "username_discovery" => JobType::UsernameDiscovery,
            _ => JobType::Unrecognized(tag.to_string()),
        }
    }
}

impl From<String> for JobType {
    fn from(tag: String) -> Self {
        JobType::from(tag.as_str())
    }
}

impl From<JobType> for String {
    fn from(job_type: JobType) -> Self {
        job_type.tag().to_string()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// Only queued -> running -> {done, error} is allowed.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Done)
                | (JobStatus::Running, JobStatus::Error)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: JobId,
    pub job_type: JobType,
    pub target: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        MetaValue::Int(value as i64)
    }
}

impl From<u16> for MetaValue {
    fn from(value: u16) -> Self {
        MetaValue::Int(i64::from(value))
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

pub type Meta = BTreeMap<String, MetaValue>;

/// Terminal envelope of a job, handed to reporting as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: JobId,
    pub output: String,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub job: ScanJob,
    pub result: Option<JobResult>,
}

#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub target: String,
    pub timeout: Duration,
    pub concurrency_limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProbeOutput {
    pub text: String,
    pub meta: Meta,
}

impl ProbeOutput {
    pub fn new(text: String) -> Self {
        Self {
            text,
            meta: Meta::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortOutcome {
    pub port: u16,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainOutcome {
    pub hostname: String,
    pub address: IpAddr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub platform: String,
    pub url: String,
    pub status: Option<u16>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ReconError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    #[error("WHOIS failed (no server answered for {0})")]
    WhoisUnavailable(String),

    #[error("Probe failure: {0}")]
    ProbeFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Resolution error: {0}")]
    ResolutionError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Job {0} not found")]
    JobNotFound(JobId),

    #[error("Job {id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Job {0} already has a result")]
    DuplicateResult(JobId),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl ReconError {
    /// Short machine-readable name, recorded in result metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            ReconError::InvalidTarget(_) => "invalid_target",
            ReconError::UnknownJobType(_) => "unknown_job_type",
            ReconError::WhoisUnavailable(_) => "whois_unavailable",
            ReconError::ProbeFailure(_) => "probe_failure",
            ReconError::ConfigError(_) => "config",
            ReconError::NetworkError(_) | ReconError::HttpError(_) => "network",
            ReconError::ResolutionError(_) => "resolution",
            ReconError::OutputError(_) => "output",
            ReconError::JobNotFound(_) => "job_not_found",
            ReconError::InvalidTransition { .. } => "invalid_transition",
            ReconError::DuplicateResult(_) => "duplicate_result",
            ReconError::Unknown(_) => "unknown",
        }
    }
}
