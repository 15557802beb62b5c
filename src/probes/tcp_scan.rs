// src/probes/tcp_scan.rs
use crate::pool::WorkerPool;
use crate::probes::Probe;
use crate::types::{PortOutcome, ProbeOutput, ProbeRequest, ReconError, TcpScanConfig};
use crate::validator::validate_target;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect sweep over a fixed port list.
#[derive(Debug, Clone)]
pub struct TcpScanProbe {
    config: TcpScanConfig,
}

impl TcpScanProbe {
    pub fn new(config: TcpScanConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Probe for TcpScanProbe {
    fn name(&self) -> &str {
        "tcp_scan"
    }

    fn request(&self, target: &str) -> ProbeRequest {
        ProbeRequest {
            target: target.to_string(),
            timeout: self.config.timeout,
            concurrency_limit: self.config.max_workers,
        }
    }

    async fn execute(&self, request: ProbeRequest) -> Result<ProbeOutput, ReconError> {
        let outcomes = tcp_port_scan(
            &request.target,
            &self.config.ports,
            request.timeout,
            request.concurrency_limit,
        )
        .await?;

        let open_ports = outcomes.iter().filter(|o| o.open).count();
        Ok(ProbeOutput::new(render_ports(&outcomes))
            .with_meta("ports_scanned", self.config.ports.len())
            .with_meta("open_ports", open_ports))
    }
}

/// Connects to every port of `target` and returns the outcomes sorted by port.
///
/// A refused or timed-out connect is reported as closed, never as an error.
/// The target is resolved once up front; a name that does not resolve makes
/// every port closed.
pub async fn tcp_port_scan(
    target: &str,
    ports: &[u16],
    connect_timeout: Duration,
    max_workers: usize,
) -> Result<Vec<PortOutcome>, ReconError> {
    validate_target(target)?;
    let ip = match resolve_target(target).await {
        Ok(ip) => ip,
        Err(e) => {
            warn!("{}; reporting all {} ports closed", e, ports.len());
            let mut outcomes: Vec<PortOutcome> = ports.iter().map(|&port| PortOutcome { port, open: false }).collect();
            outcomes.sort_by_key(|o| o.port);
            return Ok(outcomes);
        }
    };

    let pool = WorkerPool::new(max_workers);
    info!(
        "Scanning {} ports on {} ({}) with {} workers",
        ports.len(),
        target,
        ip,
        pool.limit()
    );

    let mut outcomes = pool
        .run(ports.iter().copied(), |port| probe_port(ip, port, connect_timeout))
        .await;
    outcomes.sort_by_key(|o| o.port);
    Ok(outcomes)
}

async fn resolve_target(target: &str) -> Result<IpAddr, ReconError> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = tokio::net::lookup_host((target, 0))
        .await
        .map_err(|e| ReconError::ResolutionError(format!("Failed to resolve {}: {}", target, e)))?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| ReconError::ResolutionError(format!("No address found for {}", target)))
}

async fn probe_port(ip: IpAddr, port: u16, connect_timeout: Duration) -> PortOutcome {
    let addr = SocketAddr::new(ip, port);
    let open = matches!(timeout(connect_timeout, TcpStream::connect(addr)).await, Ok(Ok(_)));
    if open {
        debug!("{} open", addr);
    }
    PortOutcome { port, open }
}

/// One `"<port>: open|closed"` line per outcome, ascending by port.
pub fn render_ports(outcomes: &[PortOutcome]) -> String {
    let mut sorted = outcomes.to_vec();
    sorted.sort_by_key(|o| o.port);
    sorted
        .iter()
        .map(|o| format!("{}: {}", o.port, if o.open { "open" } else { "closed" }))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetaValue;
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_render_sorts_numerically() {
        let outcomes = vec![
            PortOutcome { port: 80, open: false },
            PortOutcome { port: 22, open: false },
            PortOutcome { port: 443, open: false },
        ];
        assert_eq!(render_ports(&outcomes), "22: closed\n80: closed\n443: closed");
    }

    #[tokio::test]
    async fn test_scan_reports_open_and_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed = closed_port().await;

        let outcomes = tcp_port_scan("127.0.0.1", &[closed, open], Duration::from_millis(500), 10)
            .await
            .unwrap();

        let mut expected = vec![
            PortOutcome { port: open, open: true },
            PortOutcome { port: closed, open: false },
        ];
        expected.sort_by_key(|o| o.port);
        assert_eq!(outcomes, expected);
        drop(listener);
    }

    #[tokio::test]
    async fn test_worker_request_is_clamped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let mut ports = vec![open];
        for _ in 0..5 {
            ports.push(closed_port().await);
        }

        let huge = tcp_port_scan("127.0.0.1", &ports, Duration::from_millis(500), 5000)
            .await
            .unwrap();
        let capped = tcp_port_scan("127.0.0.1", &ports, Duration::from_millis(500), 200)
            .await
            .unwrap();
        assert_eq!(huge, capped);
        assert_eq!(huge.iter().filter(|o| o.open).count(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_target_reports_all_closed() {
        let outcomes = tcp_port_scan("nonexistent-host.invalid", &[80, 22, 443], Duration::from_millis(200), 10)
            .await
            .unwrap();
        assert_eq!(render_ports(&outcomes), "22: closed\n80: closed\n443: closed");

        let probe = TcpScanProbe::new(TcpScanConfig {
            ports: vec![443, 22],
            timeout: Duration::from_millis(200),
            max_workers: 4,
        });
        let output = probe.execute(probe.request("nonexistent-host.invalid")).await.unwrap();
        assert_eq!(output.text, "22: closed\n443: closed");
        assert_eq!(output.meta["open_ports"], MetaValue::Int(0));
    }

    #[tokio::test]
    async fn test_invalid_target_is_rejected() {
        let result = tcp_port_scan("127.0.0.1;id", &[80], Duration::from_millis(100), 1).await;
        assert!(matches!(result, Err(ReconError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn test_probe_meta() {
        let probe = TcpScanProbe::new(TcpScanConfig {
            ports: vec![closed_port().await],
            timeout: Duration::from_millis(300),
            max_workers: 4,
        });
        let output = probe.execute(probe.request("127.0.0.1")).await.unwrap();
        assert!(output.text.ends_with(": closed"));
        assert_eq!(output.meta["ports_scanned"], MetaValue::Int(1));
        assert_eq!(output.meta["open_ports"], MetaValue::Int(0));
    }
}
