use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "reconjob",
    version,
    long_version = crate::LONG_VERSION,
    about = "Asynchronous reconnaissance job runner",
    long_about = "reconjob runs TCP port sweeps, WHOIS lookups, HTTP enumeration and subdomain brute force\nas background jobs with bounded concurrency, and checks usernames across public platforms."
)]
pub struct Args {
    /// Job type to run (tcp_scan, whois, http_enum, sub_bruteforce)
    #[arg(short = 'j', long = "job-type", value_name = "TYPE")]
    pub job_type: Option<String>,

    /// Target host, IP or domain (repeatable)
    #[arg(short = 't', long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Check a username across public platforms instead of running a job
    #[arg(short = 'u', long = "username", value_name = "NAME", conflicts_with = "job_type")]
    pub username: Option<String>,

    /// Route username checks through the Tor SOCKS proxy
    #[arg(long = "tor", requires = "username")]
    pub tor: bool,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,

    /// Output in CSV format (username checks only)
    #[arg(long = "csv")]
    pub csv: bool,

    /// Wordlist for sub_bruteforce
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: Option<String>,

    /// Silent mode (no progress, results only)
    #[arg(long = "silent")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// List the registered job types
    #[arg(long = "list-probes")]
    pub list_probes: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

impl Args {
    /// Targets are read from stdin when none are given and input is piped.
    pub fn use_stdin(&self) -> bool {
        self.targets.is_empty() && !atty::is(atty::Stream::Stdin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_args() {
        let args = Args::try_parse_from(["reconjob", "-j", "tcp_scan", "-t", "a.example", "-t", "b.example", "--json"])
            .unwrap();
        assert_eq!(args.job_type.as_deref(), Some("tcp_scan"));
        assert_eq!(args.targets, vec!["a.example", "b.example"]);
        assert!(args.json);
    }

    #[test]
    fn test_username_conflicts_with_job() {
        assert!(Args::try_parse_from(["reconjob", "-j", "whois", "-u", "alice"]).is_err());
        assert!(Args::try_parse_from(["reconjob", "--tor"]).is_err());
        let args = Args::try_parse_from(["reconjob", "-u", "alice", "--tor", "--csv"]).unwrap();
        assert!(args.tor && args.csv);
    }
}
