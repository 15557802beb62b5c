// src/config.rs
use crate::error::{ErrorContext, Result};
use crate::types::{Config, Platform, ReconError};
use crate::utils::parse_ports;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use toml::value::Table;

/// Reads the TOML file at `config_path` (if it exists) over the defaults,
/// then applies environment overrides and validates the result.
pub fn load_config(config_path: &str) -> Result<Config> {
    let mut config = Config::default();

    if Path::new(config_path).exists() {
        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file {}", config_path))?;
        apply_toml(&mut config, &contents)?;
    }

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Defaults plus environment overrides, no file.
pub fn from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn apply_toml(config: &mut Config, contents: &str) -> Result<()> {
    let value: toml::Value = toml::from_str(contents).with_context(|| "Failed to parse configuration file".to_string())?;
    let root = value
        .as_table()
        .ok_or_else(|| ReconError::ConfigError("Configuration root must be a table".to_string()))?;

    if let Some(engine) = section(root, "engine")? {
        if let Some(jobs) = get_usize(engine, "max_concurrent_jobs")? {
            config.engine.max_concurrent_jobs = jobs;
        }
        if let Some(poll) = get_millis(engine, "poll_interval_ms")? {
            config.engine.poll_interval = poll;
        }
    }

    if let Some(http) = section(root, "http")? {
        if let Some(user_agent) = get_str(http, "user_agent")? {
            config.http.user_agent = user_agent;
        }
        if let Some(proxy) = get_str(http, "proxy")? {
            config.http.proxy = Some(proxy);
        }
        if let Some(redirects) = get_usize(http, "max_redirects")? {
            config.http.max_redirects = redirects;
        }
        if let Some(rps) = get_usize(http, "requests_per_second")? {
            let rps = u32::try_from(rps)
                .map_err(|_| ReconError::ConfigError("http.requests_per_second is too large".to_string()))?;
            config.http.requests_per_second = Some(rps);
        }
    }

    if let Some(tcp) = section(root, "tcp_scan")? {
        if let Some(ports) = get_ports(tcp, "ports")? {
            config.tcp_scan.ports = ports;
        }
        if let Some(timeout) = get_millis(tcp, "timeout_ms")? {
            config.tcp_scan.timeout = timeout;
        }
        if let Some(workers) = get_usize(tcp, "max_workers")? {
            config.tcp_scan.max_workers = workers;
        }
    }

    if let Some(whois) = section(root, "whois")? {
        if let Some(servers) = get_str_list(whois, "servers")? {
            config.whois.servers = servers;
        }
        if let Some(timeout) = get_millis(whois, "timeout_ms")? {
            config.whois.timeout = timeout;
        }
    }

    if let Some(http_enum) = section(root, "http_enum")? {
        if let Some(timeout) = get_millis(http_enum, "timeout_ms")? {
            config.http_enum.timeout = timeout;
        }
    }

    if let Some(subs) = section(root, "sub_bruteforce")? {
        if let Some(wordlist) = get_str(subs, "wordlist")? {
            config.sub_bruteforce.wordlist = PathBuf::from(wordlist);
        }
        if let Some(timeout) = get_millis(subs, "timeout_ms")? {
            config.sub_bruteforce.timeout = timeout;
        }
        if let Some(workers) = get_usize(subs, "max_workers")? {
            config.sub_bruteforce.max_workers = workers;
        }
        if let Some(nameservers) = get_str_list(subs, "nameservers")? {
            config.sub_bruteforce.nameservers = nameservers;
        }
        if let Some(system) = subs.get("use_system_resolver") {
            config.sub_bruteforce.use_system_resolver = system.as_bool().ok_or_else(|| {
                ReconError::ConfigError("sub_bruteforce.use_system_resolver must be a boolean".to_string())
            })?;
        }
    }

    if let Some(username) = section(root, "username")? {
        if let Some(concurrency) = get_usize(username, "concurrency")? {
            config.username.concurrency = concurrency;
        }
        if let Some(timeout) = get_millis(username, "timeout_ms")? {
            config.username.timeout = timeout;
        }
        if let Some(proxy) = get_str(username, "tor_proxy")? {
            config.username.tor_proxy = proxy;
        }
        // `toml` keeps keys sorted, so a table cannot carry the platform
        // order; platforms are an array of { name, template } tables.
        if let Some(platforms) = username.get("platforms") {
            config.username.platforms = parse_platforms(platforms)?;
        }
    }

    Ok(())
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(proxy) = env::var("RECON_TOR_PROXY") {
        config.username.tor_proxy = proxy;
    }
    if let Ok(wordlist) = env::var("RECON_WORDLIST") {
        config.sub_bruteforce.wordlist = PathBuf::from(wordlist);
    }
    if let Ok(jobs) = env::var("RECON_MAX_JOBS") {
        config.engine.max_concurrent_jobs = jobs
            .trim()
            .parse()
            .with_context(|| format!("Invalid RECON_MAX_JOBS value {:?}", jobs))?;
    }
    if let Ok(user_agent) = env::var("RECON_USER_AGENT") {
        config.http.user_agent = user_agent;
    }
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.engine.max_concurrent_jobs == 0 {
        return Err(ReconError::ConfigError("max_concurrent_jobs must be greater than 0".to_string()));
    }
    let timeouts = [
        ("tcp_scan", config.tcp_scan.timeout),
        ("whois", config.whois.timeout),
        ("http_enum", config.http_enum.timeout),
        ("sub_bruteforce", config.sub_bruteforce.timeout),
        ("username", config.username.timeout),
    ];
    for (name, timeout) in timeouts {
        if timeout.is_zero() {
            return Err(ReconError::ConfigError(format!("{} timeout must be greater than 0", name)));
        }
    }
    if config.tcp_scan.ports.is_empty() {
        return Err(ReconError::ConfigError("tcp_scan.ports must not be empty".to_string()));
    }
    if config.whois.servers.is_empty() {
        return Err(ReconError::ConfigError("whois.servers must not be empty".to_string()));
    }
    if let Some(platform) = config
        .username
        .platforms
        .iter()
        .find(|p| !p.template.contains("{u}"))
    {
        return Err(ReconError::ConfigError(format!(
            "Platform {} template has no {{u}} placeholder",
            platform.name
        )));
    }
    Ok(())
}

fn section<'a>(root: &'a Table, name: &str) -> Result<Option<&'a Table>> {
    match root.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_table()
            .map(Some)
            .ok_or_else(|| ReconError::ConfigError(format!("[{}] must be a table", name))),
    }
}

fn get_str(table: &Table, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ReconError::ConfigError(format!("{} must be a string", key))),
    }
}

fn get_usize(table: &Table, key: &str) -> Result<Option<usize>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_integer()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ReconError::ConfigError(format!("{} must be a non-negative integer", key))),
    }
}

fn get_millis(table: &Table, key: &str) -> Result<Option<Duration>> {
    Ok(get_usize(table, key)?.map(|ms| Duration::from_millis(ms as u64)))
}

fn get_str_list(table: &Table, key: &str) -> Result<Option<Vec<String>>> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => {
            let array = value
                .as_array()
                .ok_or_else(|| ReconError::ConfigError(format!("{} must be an array of strings", key)))?;
            array
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ReconError::ConfigError(format!("{} must be an array of strings", key)))
                })
                .collect::<Result<Vec<_>>>()
                .map(Some)
        }
    }
}

/// `ports = "1-1024"` or `ports = [22, 80, 443]`.
fn get_ports(table: &Table, key: &str) -> Result<Option<Vec<u16>>> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::String(list)) => parse_ports(list).map(Some),
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_integer()
                    .and_then(|n| u16::try_from(n).ok())
                    .filter(|port| *port != 0)
                    .ok_or_else(|| ReconError::ConfigError(format!("Invalid port in {}: {}", key, item)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(_) => Err(ReconError::ConfigError(format!("{} must be a string or an array", key))),
    }
}

fn parse_platforms(value: &toml::Value) -> Result<Vec<Platform>> {
    let items = value
        .as_array()
        .ok_or_else(|| ReconError::ConfigError("username.platforms must be an array of tables".to_string()))?;

    items
        .iter()
        .map(|item| {
            let table = item
                .as_table()
                .ok_or_else(|| ReconError::ConfigError("username.platforms entries must be tables".to_string()))?;
            let name = get_str(table, "name")?
                .ok_or_else(|| ReconError::ConfigError("platform entry is missing name".to_string()))?;
            let template = get_str(table, "template")?
                .ok_or_else(|| ReconError::ConfigError(format!("platform {} is missing template", name)))?;
            Ok(Platform { name, template })
        })
        .collect()
}
