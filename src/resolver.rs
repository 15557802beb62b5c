// src/resolver.rs
use crate::types::{ReconError, SubdomainConfig};
use async_trait::async_trait;
use log::{debug, warn};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig as DnsResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Name resolution seam used by the subdomain brute force.
#[async_trait]
pub trait HostLookup: Send + Sync {
    /// First address for `hostname`, or `None` when it does not resolve.
    async fn lookup(&self, hostname: &str) -> Option<IpAddr>;
}

pub struct Resolver {
    resolver: TokioAsyncResolver,
}

impl Resolver {
    pub fn new(config: &SubdomainConfig) -> Result<Self, ReconError> {
        if config.use_system_resolver {
            match TokioAsyncResolver::tokio_from_system_conf() {
                Ok(resolver) => return Ok(Self { resolver }),
                Err(e) => warn!("System resolver unavailable ({}), using configured nameservers", e),
            }
        }

        let mut resolver_config = DnsResolverConfig::new();
        for ns in &config.nameservers {
            let socket_addr = SocketAddr::from_str(ns)
                .map_err(|e| ReconError::ConfigError(format!("Invalid nameserver address {}: {}", ns, e)))?;
            resolver_config.add_name_server(NameServerConfig {
                socket_addr,
                protocol: Protocol::Udp,
                tls_dns_name: None,
                trust_negative_responses: false,
                bind_addr: None,
            });
        }

        let mut opts = ResolverOpts::default();
        opts.timeout = config.timeout;
        opts.attempts = 2;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }
}

#[async_trait]
impl HostLookup for Resolver {
    async fn lookup(&self, hostname: &str) -> Option<IpAddr> {
        match self.resolver.lookup_ip(hostname).await {
            Ok(lookup) => lookup.iter().next(),
            Err(e) => {
                debug!("{} did not resolve: {}", hostname, e);
                None
            }
        }
    }
}
