// src/probes/whois.rs
use crate::probes::Probe;
use crate::types::{ProbeOutput, ProbeRequest, ReconError, WhoisConfig};
use crate::validator::validate_target;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const WHOIS_PORT: u16 = 43;

#[derive(Debug, Clone)]
pub struct WhoisProbe {
    config: WhoisConfig,
}

impl WhoisProbe {
    pub fn new(config: WhoisConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Probe for WhoisProbe {
    fn name(&self) -> &str {
        "whois"
    }

    fn request(&self, target: &str) -> ProbeRequest {
        ProbeRequest {
            target: target.to_string(),
            timeout: self.config.timeout,
            concurrency_limit: 1,
        }
    }

    async fn execute(&self, request: ProbeRequest) -> Result<ProbeOutput, ReconError> {
        let (server, response) = whois_query(&request.target, &self.config.servers, request.timeout).await?;
        Ok(ProbeOutput::new(format!("WHOIS from {}:\n\n{}", server, response)).with_meta("whois_server", server))
    }
}

/// Asks each server in turn and returns the first non-empty answer together
/// with the server that gave it.
pub async fn whois_query(
    domain: &str,
    servers: &[String],
    io_timeout: Duration,
) -> Result<(String, String), ReconError> {
    validate_target(domain)?;
    let query = format!("{}\r\n", domain);

    for server in servers {
        match query_server(server, &query, io_timeout).await {
            Ok(response) if !response.trim().is_empty() => {
                info!("WHOIS answer for {} from {}", domain, server);
                return Ok((server.clone(), response));
            }
            Ok(_) => debug!("{} returned an empty WHOIS response", server),
            Err(e) => warn!("WHOIS server {} failed: {}", server, e),
        }
    }

    Err(ReconError::WhoisUnavailable(domain.to_string()))
}

async fn query_server(server: &str, query: &str, io_timeout: Duration) -> Result<String, ReconError> {
    let (host, port) = split_server(server);

    let mut stream = timeout(io_timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| ReconError::NetworkError(format!("connect to {} timed out", server)))?
        .map_err(|e| ReconError::NetworkError(e.to_string()))?;

    stream
        .write_all(query.as_bytes())
        .await
        .map_err(|e| ReconError::NetworkError(e.to_string()))?;

    let mut buf = Vec::new();
    timeout(io_timeout, stream.read_to_end(&mut buf))
        .await
        .map_err(|_| ReconError::NetworkError(format!("read from {} timed out", server)))?
        .map_err(|e| ReconError::NetworkError(e.to_string()))?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `whois.example.net` or `whois.example.net:4343`.
fn split_server(server: &str) -> (&str, u16) {
    match server.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (server, WHOIS_PORT),
        },
        None => (server, WHOIS_PORT),
    }
}
