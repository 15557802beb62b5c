// src/probes/username.rs
use crate::pool::WorkerPool;
use crate::session::Session;
use crate::types::{HttpConfig, Platform, PlatformOutcome, ReconError, UsernameConfig};
use crate::validator::validate_username;
use log::{debug, info};

/// Statuses that count as "profile exists".
pub const FOUND_STATUSES: [u16; 3] = [200, 301, 302];

/// Checks public profile URLs for a username across a fixed platform table.
#[derive(Debug, Clone)]
pub struct UsernameDiscovery {
    http: HttpConfig,
    config: UsernameConfig,
}

impl UsernameDiscovery {
    pub fn new(http: HttpConfig, config: UsernameConfig) -> Self {
        Self { http, config }
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.config.platforms
    }

    /// One outcome per configured platform, in table order. With `use_tor`
    /// every request goes through the configured SOCKS proxy.
    pub async fn discover(&self, username: &str, use_tor: bool) -> Result<Vec<PlatformOutcome>, ReconError> {
        validate_username(username)?;
        let session = if use_tor {
            Session::with_proxy(&self.http, self.config.timeout, &self.config.tor_proxy)?
        } else {
            Session::new(&self.http, self.config.timeout)?
        };
        Ok(discover_username(&session, username, &self.config.platforms, self.config.concurrency).await)
    }
}

pub fn profile_url(template: &str, username: &str) -> String {
    template.replace("{u}", &urlencoding::encode(username))
}

/// Runs every platform check, waits for all of them, and returns the outcomes
/// in the order of `platforms` regardless of completion order.
pub async fn discover_username(
    session: &Session,
    username: &str,
    platforms: &[Platform],
    concurrency: usize,
) -> Vec<PlatformOutcome> {
    let pool = WorkerPool::new(concurrency);
    info!(
        "Checking {} platforms for {} with {} workers",
        platforms.len(),
        username,
        pool.limit()
    );

    let mut outcomes = pool
        .run(platforms.iter().enumerate(), |(idx, platform)| async move {
            let url = profile_url(&platform.template, username);
            (idx, check_platform(session, &platform.name, url).await)
        })
        .await;

    outcomes.sort_by_key(|(idx, _)| *idx);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

async fn check_platform(session: &Session, platform: &str, url: String) -> PlatformOutcome {
    match session.get(&url).await {
        Ok(response) => {
            let status = response.status().as_u16();
            let found = FOUND_STATUSES.contains(&status);
            debug!("{}: {} -> {}", platform, url, status);
            PlatformOutcome {
                platform: platform.to_string(),
                url,
                status: Some(status),
                found,
                error: None,
            }
        }
        Err(e) => {
            debug!("{}: {} failed: {}", platform, url, e);
            PlatformOutcome {
                platform: platform.to_string(),
                url,
                status: None,
                found: false,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> Session {
        Session::new(&HttpConfig::default(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_profile_url_encodes_username() {
        assert_eq!(profile_url("https://github.com/{u}", "octocat"), "https://github.com/octocat");
        assert_eq!(profile_url("https://medium.com/@{u}", "a b"), "https://medium.com/@a%20b");
        assert_eq!(profile_url("https://{u}.tumblr.com", "alice"), "https://alice.tumblr.com");
    }

    #[tokio::test]
    async fn test_one_outcome_per_platform_in_table_order() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/gh/alice").with_status(200).create_async().await;
        server.mock("GET", "/gl/alice").with_status(404).create_async().await;
        server.mock("GET", "/md/alice").with_status(500).create_async().await;

        let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead_url = format!("http://{}/{{u}}", dead.local_addr().unwrap());
        drop(dead);

        let platforms = vec![
            Platform::new("GitHub", &format!("{}/gh/{{u}}", server.url())),
            Platform::new("Offline", &dead_url),
            Platform::new("GitLab", &format!("{}/gl/{{u}}", server.url())),
            Platform::new("Medium", &format!("{}/md/{{u}}", server.url())),
        ];

        let outcomes = discover_username(&session(), "alice", &platforms, 2).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.platform.as_str()).collect();
        assert_eq!(names, vec!["GitHub", "Offline", "GitLab", "Medium"]);

        assert!(outcomes[0].found);
        assert_eq!(outcomes[0].status, Some(200));
        assert_eq!(outcomes[0].url, format!("{}/gh/alice", server.url()));

        assert!(!outcomes[1].found);
        assert_eq!(outcomes[1].status, None);
        assert!(outcomes[1].error.is_some());

        assert!(!outcomes[2].found);
        assert_eq!(outcomes[2].status, Some(404));
        assert!(outcomes[2].error.is_none());

        assert!(!outcomes[3].found);
        assert_eq!(outcomes[3].status, Some(500));
    }

    #[tokio::test]
    async fn test_redirect_to_profile_counts_as_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/u/bob")
            .with_status(301)
            .with_header("location", "/profile/bob")
            .create_async()
            .await;
        server.mock("GET", "/profile/bob").with_status(200).create_async().await;

        let platforms = vec![Platform::new("Site", &format!("{}/u/{{u}}", server.url()))];
        let outcomes = discover_username(&session(), "bob", &platforms, 6).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].found);
        assert_eq!(outcomes[0].status, Some(200));
    }

    #[tokio::test]
    async fn test_concurrency_request_is_clamped() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/a/carol").with_status(200).create_async().await;
        server.mock("GET", "/b/carol").with_status(302).with_header("location", "/a/carol").create_async().await;
        server.mock("GET", "/c/carol").with_status(404).create_async().await;

        let platforms: Vec<Platform> = ["a", "b", "c", "a", "c", "b"]
            .iter()
            .enumerate()
            .map(|(i, path)| Platform::new(&format!("Site{}", i), &format!("{}/{}/{{u}}", server.url(), path)))
            .collect();

        let huge = discover_username(&session(), "carol", &platforms, 5000).await;
        let capped = discover_username(&session(), "carol", &platforms, 200).await;
        assert_eq!(huge, capped);
        assert_eq!(huge.len(), platforms.len());
        let found: Vec<bool> = huge.iter().map(|o| o.found).collect();
        assert_eq!(found, vec![true, true, false, true, false, true]);
    }

    #[tokio::test]
    async fn test_discover_rejects_bad_username() {
        let discovery = UsernameDiscovery::new(HttpConfig::default(), UsernameConfig::default());
        let result = discovery.discover("../etc/passwd", false).await;
        assert!(matches!(result, Err(ReconError::InvalidTarget(_))));
    }

    #[test]
    fn test_default_platform_table() {
        let discovery = UsernameDiscovery::new(HttpConfig::default(), UsernameConfig::default());
        assert_eq!(discovery.platforms().len(), 10);
        assert_eq!(discovery.platforms()[0].name, "GitHub");
        assert!(discovery.platforms().iter().all(|p| p.template.contains("{u}")));
    }
}
