use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use reconjob::config;
use reconjob::output::OutputManager;
use reconjob::types::{JobReport, OutputConfig, OutputFormat};
use reconjob::{Args, Config, ProbeRegistry, ReconEngine};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

const BANNER: &str = r#"
                              _       _
   _ __ ___  ___ ___  _ __   (_) ___ | |__
  | '__/ _ \/ __/ _ \| '_ \  | |/ _ \| '_ \
  | | |  __/ (_| (_) | | | | | | (_) | |_) |
  |_|  \___|\___\___/|_| |_|_/ |\___/|_.__/
                           |__/
        Asynchronous reconnaissance jobs
"#;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else if args.silent {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if !args.silent {
        eprintln!("{}", BANNER);
    }

    let mut config = load_config(&args)?;
    if let Some(wordlist) = &args.wordlist {
        config.sub_bruteforce.wordlist = PathBuf::from(wordlist);
    }

    if args.list_probes {
        list_probes(&config)?;
        return Ok(());
    }

    let output = OutputManager::new(output_config(&args));

    if let Some(username) = &args.username {
        let engine = ReconEngine::new(&config)?;
        let outcomes = engine
            .discover_username(username, args.tor)
            .await
            .context("Username discovery failed")?;
        output.write_profiles(username, &outcomes)?;
        return Ok(());
    }

    let Some(job_type) = args.job_type.clone() else {
        error!("No job type provided. Use -j <type> with -t <target>, or -u <username>");
        process::exit(1);
    };
    let targets = collect_targets(&args);
    if targets.is_empty() {
        error!("No input provided. Use -t <target> or pipe targets to stdin");
        process::exit(1);
    }

    let engine = ReconEngine::new(&config)?;
    let mut ids = Vec::new();
    for target in &targets {
        match engine.submit(&job_type, target) {
            Ok(id) => ids.push(id),
            Err(e) => error!("Rejected {}: {}", target, e),
        }
    }
    if ids.is_empty() {
        bail!("No valid targets to scan");
    }

    let progress = progress_bar(args.silent || args.json, ids.len());
    let mut reports: Vec<JobReport> = Vec::with_capacity(ids.len());
    for id in ids {
        let report = engine.wait_for(id).await?;
        progress.inc(1);
        reports.push(report);
    }
    progress.finish_and_clear();

    output.write_reports(&reports)?;

    let failed = reports.iter().filter(|r| r.job.status == reconjob::JobStatus::Error).count();
    if failed > 0 {
        warn!("{} of {} jobs ended in error", failed, reports.len());
    } else {
        info!("{} jobs completed", reports.len());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match args.config_path.as_deref() {
        Some(path) => config::load_config(path)?,
        None => config::from_env()?,
    };
    Ok(config)
}

fn output_config(args: &Args) -> OutputConfig {
    let format = if args.json {
        OutputFormat::Json
    } else if args.csv {
        OutputFormat::Csv
    } else {
        OutputFormat::Text
    };
    OutputConfig {
        format,
        file: args.output_file.clone(),
    }
}

fn collect_targets(args: &Args) -> Vec<String> {
    let mut targets: Vec<String> = args.targets.iter().map(|t| t.trim().to_string()).collect();

    if args.use_stdin() {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(|line| line.ok()) {
            let target = line.trim();
            if !target.is_empty() {
                targets.push(target.to_string());
            }
        }
    }

    targets
}

fn list_probes(config: &Config) -> Result<()> {
    let registry = ProbeRegistry::from_config(config)?;
    println!("Registered job types:\n");
    for job_type in registry.job_types() {
        println!("  {}", job_type);
    }
    println!("\nUsername discovery (-u) platforms:\n");
    for platform in &config.username.platforms {
        println!("  {:<12} {}", platform.name, platform.template);
    }
    Ok(())
}

fn progress_bar(hidden: bool, total: usize) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} jobs finished") {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
