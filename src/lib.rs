// src/lib.rs
pub mod aggregator;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pool;
pub mod probes;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod store;
pub mod types;
pub mod utils;
pub mod validator;

pub use cli::Args;
pub use engine::ReconEngine;
pub use probes::{Probe, ProbeRegistry};
pub use store::{JobStore, MemoryStore};
pub use types::{Config, JobResult, JobStatus, JobType, PlatformOutcome, ReconError, ScanJob};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);
