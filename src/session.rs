// src/session.rs
use crate::types::{HttpConfig, ReconError};
use governor::{Jitter, Quota};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Session {
    pub client: Client,
    rate_limiter: Option<Arc<governor::DefaultDirectRateLimiter>>,
}

impl Session {
    /// Builds a client that follows redirects and gives up on each request
    /// after `timeout`.
    pub fn new(config: &HttpConfig, timeout: Duration) -> Result<Self, ReconError> {
        Self::build(config, timeout, config.proxy.as_deref())
    }

    /// Same as [`Session::new`] but routes every request through `proxy_url`.
    pub fn with_proxy(config: &HttpConfig, timeout: Duration, proxy_url: &str) -> Result<Self, ReconError> {
        Self::build(config, timeout, Some(proxy_url))
    }

    fn build(config: &HttpConfig, timeout: Duration, proxy: Option<&str>) -> Result<Self, ReconError> {
        let mut client_builder = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .redirect(Policy::limited(config.max_redirects))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ReconError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|e| ReconError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = config
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|limit| Arc::new(governor::RateLimiter::direct(Quota::per_second(limit))));

        Ok(Session { client, rate_limiter })
    }

    pub async fn get(&self, url: &str) -> Result<reqwest::Response, ReconError> {
        self.wait_for_rate_limit().await;
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| ReconError::NetworkError(e.to_string()))
    }

    pub async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let result = Session::with_proxy(&HttpConfig::default(), Duration::from_secs(1), "ftp://127.0.0.1:21");
        assert!(matches!(result, Err(ReconError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_socks_proxy_accepted() {
        let result = Session::with_proxy(
            &HttpConfig::default(),
            Duration::from_secs(1),
            "socks5h://127.0.0.1:9050",
        );
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_rate_limited_get() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let config = HttpConfig {
            requests_per_second: Some(50),
            ..HttpConfig::default()
        };
        let session = Session::new(&config, Duration::from_secs(5)).unwrap();
        for _ in 0..2 {
            let response = session.get(&server.url()).await.unwrap();
            assert_eq!(response.status().as_u16(), 204);
        }
        mock.assert_async().await;
    }
}
