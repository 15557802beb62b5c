// src/probes/mod.rs
use crate::resolver::{HostLookup, Resolver};
use crate::types::{Config, JobType, ProbeOutput, ProbeRequest, ReconError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

mod http_enum;
mod subdomain;
mod tcp_scan;
mod username;
mod whois;

pub use http_enum::{http_enumeration, normalize_url, HttpEnumProbe};
pub use subdomain::{render_subdomains, subdomain_bruteforce, SubdomainProbe, Wordlist, NO_SUBDOMAINS_FOUND};
pub use tcp_scan::{render_ports, tcp_port_scan, TcpScanProbe};
pub use username::{discover_username, profile_url, UsernameDiscovery, FOUND_STATUSES};
pub use whois::{whois_query, WhoisProbe};

/// One network reconnaissance operation that can back a job.
#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;

    /// Per-call parameters for `target`, taken from the probe's own settings.
    fn request(&self, target: &str) -> ProbeRequest;

    async fn execute(&self, request: ProbeRequest) -> Result<ProbeOutput, ReconError>;
}

/// Maps job types to the probe that runs them.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
    probes: HashMap<JobType, Arc<dyn Probe>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the four job-pipeline probes. Username discovery is served
    /// directly by [`UsernameDiscovery`] and is not a registered job type.
    pub fn from_config(config: &Config) -> Result<Self, ReconError> {
        let lookup: Arc<dyn HostLookup> = Arc::new(Resolver::new(&config.sub_bruteforce)?);

        let mut registry = Self::new();
        registry
            .register(JobType::TcpScan, Arc::new(TcpScanProbe::new(config.tcp_scan.clone())))
            .register(JobType::Whois, Arc::new(WhoisProbe::new(config.whois.clone())))
            .register(
                JobType::HttpEnum,
                Arc::new(HttpEnumProbe::new(config.http.clone(), config.http_enum.clone())),
            )
            .register(
                JobType::SubBruteforce,
                Arc::new(SubdomainProbe::new(
                    config.sub_bruteforce.clone(),
                    Wordlist::File(config.sub_bruteforce.wordlist.clone()),
                    lookup,
                )),
            );
        Ok(registry)
    }

    pub fn register(&mut self, job_type: JobType, probe: Arc<dyn Probe>) -> &mut Self {
        self.probes.insert(job_type, probe);
        self
    }

    pub fn get(&self, job_type: &JobType) -> Option<Arc<dyn Probe>> {
        self.probes.get(job_type).cloned()
    }

    pub fn job_types(&self) -> Vec<JobType> {
        let mut types: Vec<JobType> = self.probes.keys().cloned().collect();
        types.sort_by(|a, b| a.tag().cmp(b.tag()));
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_from_config() {
        let mut config = Config::default();
        config.sub_bruteforce.use_system_resolver = false;
        let registry = ProbeRegistry::from_config(&config).unwrap();

        let tags: Vec<String> = registry.job_types().iter().map(|t| t.tag().to_string()).collect();
        assert_eq!(tags, vec!["http_enum", "sub_bruteforce", "tcp_scan", "whois"]);

        assert!(registry.get(&JobType::UsernameDiscovery).is_none());
        assert!(registry.get(&JobType::from("nmap")).is_none());
        assert_eq!(registry.get(&JobType::Whois).unwrap().name(), "whois");
    }
}
