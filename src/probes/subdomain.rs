// src/probes/subdomain.rs
use crate::pool::WorkerPool;
use crate::probes::Probe;
use crate::resolver::HostLookup;
use crate::types::{ProbeOutput, ProbeRequest, ReconError, SubdomainConfig, SubdomainOutcome};
use crate::utils::{load_wordlist, parse_wordlist_entry};
use crate::validator::validate_target;
use async_trait::async_trait;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

pub const NO_SUBDOMAINS_FOUND: &str = "No subdomains found (or DNS blocked)";

/// Where the brute force labels come from.
#[derive(Debug, Clone)]
pub enum Wordlist {
    /// Read on every run; falls back to the built-in list when unreadable.
    File(PathBuf),
    Words(Vec<String>),
}

impl Wordlist {
    pub fn entries(&self) -> Vec<String> {
        match self {
            Wordlist::File(path) => load_wordlist(path),
            Wordlist::Words(words) => words.clone(),
        }
    }
}

pub struct SubdomainProbe {
    config: SubdomainConfig,
    wordlist: Wordlist,
    lookup: Arc<dyn HostLookup>,
}

impl SubdomainProbe {
    pub fn new(config: SubdomainConfig, wordlist: Wordlist, lookup: Arc<dyn HostLookup>) -> Self {
        Self {
            config,
            wordlist,
            lookup,
        }
    }
}

#[async_trait]
impl Probe for SubdomainProbe {
    fn name(&self) -> &str {
        "sub_bruteforce"
    }

    fn request(&self, target: &str) -> ProbeRequest {
        ProbeRequest {
            target: target.to_string(),
            timeout: self.config.timeout,
            concurrency_limit: self.config.max_workers,
        }
    }

    async fn execute(&self, request: ProbeRequest) -> Result<ProbeOutput, ReconError> {
        let words = self.wordlist.entries();
        let wordlist_count = words.iter().filter_map(|w| parse_wordlist_entry(w)).count();
        let found = subdomain_bruteforce(
            self.lookup.as_ref(),
            &request.target,
            &words,
            request.timeout,
            request.concurrency_limit,
        )
        .await?;

        Ok(ProbeOutput::new(render_subdomains(&found))
            .with_meta("wordlist_count", wordlist_count)
            .with_meta("subdomains_found", found.len()))
    }
}

/// Resolves `<label>.<domain>` for every usable label and returns the hits
/// sorted by hostname. Lookups that fail or time out are simply left out.
pub async fn subdomain_bruteforce(
    lookup: &dyn HostLookup,
    domain: &str,
    words: &[String],
    lookup_timeout: Duration,
    max_workers: usize,
) -> Result<Vec<SubdomainOutcome>, ReconError> {
    validate_target(domain)?;

    let hostnames: Vec<String> = words
        .iter()
        .filter_map(|word| parse_wordlist_entry(word))
        .map(|label| format!("{}.{}", label, domain))
        .filter(|host| match validate_target(host) {
            Ok(()) => true,
            Err(e) => {
                debug!("Skipping {}: {}", host, e);
                false
            }
        })
        .collect();

    let pool = WorkerPool::new(max_workers);
    info!(
        "Brute forcing {} names under {} with {} workers",
        hostnames.len(),
        domain,
        pool.limit()
    );

    let mut found: Vec<SubdomainOutcome> = pool
        .run(hostnames, |hostname| async move {
            let address = timeout(lookup_timeout, lookup.lookup(&hostname)).await.ok().flatten()?;
            debug!("{} -> {}", hostname, address);
            Some(SubdomainOutcome { hostname, address })
        })
        .await
        .into_iter()
        .flatten()
        .collect();

    found.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    Ok(found)
}

/// `"<host> -> <address>"` lines, or the fixed no-result message.
pub fn render_subdomains(found: &[SubdomainOutcome]) -> String {
    if found.is_empty() {
        return NO_SUBDOMAINS_FOUND.to_string();
    }
    let mut sorted = found.to_vec();
    sorted.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    sorted
        .iter()
        .map(|o| format!("{} -> {}", o.hostname, o.address))
        .collect::<Vec<_>>()
        .join("\n")
}
