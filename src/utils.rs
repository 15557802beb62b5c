// src/utils.rs
use crate::types::ReconError;
use log::warn;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Used when the wordlist file cannot be read.
pub const DEFAULT_WORDLIST: [&str; 5] = ["www", "api", "mail", "dev", "test"];

/// Reads lines from a file into a vector of strings.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader.lines().collect()
}

/// Trimmed label, or `None` for blank lines and `#` comments.
pub fn parse_wordlist_entry(line: &str) -> Option<&str> {
    let entry = line.trim();
    if entry.is_empty() || entry.starts_with('#') {
        None
    } else {
        Some(entry)
    }
}

/// Loads a line-delimited wordlist, falling back to [`DEFAULT_WORDLIST`].
pub fn load_wordlist(path: &Path) -> Vec<String> {
    match read_lines(path) {
        Ok(lines) => {
            let words: Vec<String> = lines
                .iter()
                .filter_map(|line| parse_wordlist_entry(line))
                .map(str::to_string)
                .collect();
            if words.is_empty() {
                warn!("Wordlist {} has no entries, using built-in list", path.display());
                default_wordlist()
            } else {
                words
            }
        }
        Err(e) => {
            warn!("Failed to read wordlist {}: {}, using built-in list", path.display(), e);
            default_wordlist()
        }
    }
}

pub fn default_wordlist() -> Vec<String> {
    DEFAULT_WORDLIST.iter().map(|w| w.to_string()).collect()
}

/// Removes duplicates while keeping the first occurrence of each value.
pub fn dedup_first_seen<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }

    unique
}

/// Parses a port list such as `"22,80,8000-8010"`.
pub fn parse_ports(list: &str) -> Result<Vec<u16>, ReconError> {
    let mut ports = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(ReconError::ConfigError(format!("Invalid port range: {}", part)));
                }
                ports.extend(start..=end);
            }
            None => ports.push(parse_port(part)?),
        }
    }
    Ok(dedup_ports(ports))
}

fn parse_port(value: &str) -> Result<u16, ReconError> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ReconError::ConfigError(format!("Invalid port: {}", value.trim()))),
        Ok(port) => Ok(port),
    }
}

fn dedup_ports(ports: Vec<u16>) -> Vec<u16> {
    let mut seen = HashSet::new();
    ports.into_iter().filter(|p| seen.insert(*p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_wordlist_entry() {
        assert_eq!(parse_wordlist_entry("  www "), Some("www"));
        assert_eq!(parse_wordlist_entry("# comment"), None);
        assert_eq!(parse_wordlist_entry("   "), None);
    }

    #[test]
    fn test_load_wordlist_skips_comments_and_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# subdomains").unwrap();
        writeln!(file, "www").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  vpn  ").unwrap();
        writeln!(file, "#staging").unwrap();

        assert_eq!(load_wordlist(file.path()), vec!["www", "vpn"]);
    }

    #[test]
    fn test_load_wordlist_fallback() {
        let missing = Path::new("/nonexistent/reconjob/subs.txt");
        assert_eq!(load_wordlist(missing), vec!["www", "api", "mail", "dev", "test"]);

        let mut only_comments = NamedTempFile::new().unwrap();
        writeln!(only_comments, "# nothing here").unwrap();
        assert_eq!(load_wordlist(only_comments.path()), default_wordlist());
    }

    #[test]
    fn test_dedup_first_seen() {
        let items = vec!["/b".to_string(), "/a".to_string(), "/b".to_string(), "/c".to_string()];
        assert_eq!(dedup_first_seen(items), vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn test_parse_ports() {
        assert_eq!(parse_ports("22, 80,443").unwrap(), vec![22, 80, 443]);
        assert_eq!(parse_ports("20-23,22").unwrap(), vec![20, 21, 22, 23]);
        assert!(parse_ports("0").is_err());
        assert!(parse_ports("90-80").is_err());
        assert!(parse_ports("http").is_err());
    }
}
