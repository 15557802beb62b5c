// src/probes/http_enum.rs
use crate::probes::Probe;
use crate::session::Session;
use crate::types::{HttpConfig, HttpEnumConfig, ProbeOutput, ProbeRequest, ReconError};
use crate::utils::dedup_first_seen;
use crate::validator::validate_target;
use async_trait::async_trait;
use log::{debug, info, warn};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

const MAX_BODY_CHARS: usize = 200_000;
const MAX_ROBOTS_CHARS: usize = 4_000;
const MAX_LINK_SAMPLE: usize = 50;

/// Single-page HTTP fingerprint: headers, title, robots.txt, sitemap hint, links.
#[derive(Debug, Clone)]
pub struct HttpEnumProbe {
    http: HttpConfig,
    config: HttpEnumConfig,
}

impl HttpEnumProbe {
    pub fn new(http: HttpConfig, config: HttpEnumConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Probe for HttpEnumProbe {
    fn name(&self) -> &str {
        "http_enum"
    }

    fn request(&self, target: &str) -> ProbeRequest {
        ProbeRequest {
            target: target.to_string(),
            timeout: self.config.timeout,
            concurrency_limit: 1,
        }
    }

    async fn execute(&self, request: ProbeRequest) -> Result<ProbeOutput, ReconError> {
        validate_target(&request.target)?;
        let session = Session::new(&self.http, request.timeout)?;
        Ok(http_enumeration(&session, &request.target).await)
    }
}

/// Prefixes `http://` unless `target` already carries an http(s) scheme.
pub fn normalize_url(target: &str) -> String {
    match Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => target.to_string(),
        _ => format!("http://{}", target),
    }
}

/// Fetches the target page and describes it line by line.
///
/// Network failures never fail the probe: the error is appended as an
/// `HTTP error:` line and whatever was gathered before it is returned.
pub async fn http_enumeration(session: &Session, target: &str) -> ProbeOutput {
    let url = normalize_url(target);
    let mut lines = Vec::new();
    let mut output = ProbeOutput::default();

    info!("HTTP enumeration of {}", url);
    let response = match session.get(&url).await {
        Ok(response) => response,
        Err(e) => {
            warn!("HTTP enumeration of {} failed: {}", url, e);
            lines.push(format!("HTTP error: {}", e));
            output.text = lines.join("\n");
            return output;
        }
    };

    let final_url = response.url().clone();
    let status = response.status().as_u16();
    lines.push(format!("URL: {}", final_url));
    lines.push(format!("Status: {}", status));
    lines.push("---- HEADERS ----".to_string());
    for (name, value) in response.headers() {
        lines.push(format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes())));
    }
    output = output
        .with_meta("status_code", status)
        .with_meta("final_url", final_url.to_string());

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            lines.push(format!("HTTP error: {}", e));
            output.text = lines.join("\n");
            return output;
        }
    };
    let content: String = body.chars().take(MAX_BODY_CHARS).collect();

    if let Some(title) = extract_title(&content) {
        lines.push(format!("Title: {}", title));
    }

    if let Some(robots_url) = robots_url(&final_url) {
        if let Some(robots) = fetch_robots(session, robots_url.as_str()).await {
            lines.push("robots.txt:".to_string());
            lines.push(robots);
        }
    }

    if let Some(sitemap) = sitemap_suggestion(&content) {
        lines.push(format!("Sitemap suggestion: {}", sitemap));
    }

    let links = extract_links(&content);
    lines.push(format!("Links found (sample up to {}): {}", MAX_LINK_SAMPLE, links.len()));
    let sample: Vec<String> = dedup_first_seen(links.iter().cloned())
        .into_iter()
        .take(MAX_LINK_SAMPLE)
        .collect();
    lines.push(sample.join(", "));

    output.text = lines.join("\n");
    output.with_meta("links_found", links.len())
}

/// robots.txt sits at the root of whatever host the page finally came from.
fn robots_url(page: &Url) -> Option<Url> {
    page.join("/robots.txt").ok()
}

async fn fetch_robots(session: &Session, url: &str) -> Option<String> {
    let response = match session.get(url).await {
        Ok(response) => response,
        Err(e) => {
            debug!("robots.txt fetch failed: {}", e);
            return None;
        }
    };
    if response.status().as_u16() != 200 {
        return None;
    }
    let text = response.text().await.ok()?;
    Some(text.chars().take(MAX_ROBOTS_CHARS).collect())
}

/// Text of the first `<title>`, entities decoded.
fn extract_title(content: &str) -> Option<String> {
    let document = Html::parse_document(content);
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn sitemap_suggestion(content: &str) -> Option<String> {
    let re = Regex::new(r"<loc>(https?://[^<]+)</loc>").ok()?;
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Every `href` value in document order, duplicates included.
fn extract_links(content: &str) -> Vec<String> {
    match Regex::new(r#"(?i)href=["'](.*?)["']"#) {
        Ok(re) => re
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect(),
        Err(_) => Vec::new(),
    }
}
