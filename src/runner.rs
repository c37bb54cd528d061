//! Run controller: load, partition, dispatch, join and report

use crate::error::SetupError;
use crate::proxy::{
    partition, CheckerConfig, ProxyChecker, ProxyParser, ProxyRecord, VerifyMode, WorkingSet,
};
use crate::Result;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Default destination for the working-proxy list
pub const DEFAULT_OUTPUT_FILE: &str = "good_proxies.txt";

/// Everything a run needs, passed explicitly to each stage
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input list, one host:port per line
    pub proxy_file: PathBuf,
    /// Output list, overwritten each run
    pub output_file: PathBuf,
    /// Requested worker count
    pub threads: usize,
    pub checker: CheckerConfig,
}

impl RunConfig {
    pub fn new(proxy_file: impl Into<PathBuf>, threads: usize) -> Self {
        Self {
            proxy_file: proxy_file.into(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            threads,
            checker: CheckerConfig::default(),
        }
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = path.into();
        self
    }

    pub fn with_checker(mut self, checker: CheckerConfig) -> Self {
        self.checker = checker;
        self
    }

    /// Check the settings that can be rejected before any I/O happens
    pub fn validate(&self) -> std::result::Result<NonZeroUsize, SetupError> {
        if self.checker.timeout.is_zero() {
            return Err(SetupError::InvalidTimeout);
        }
        if self.checker.mode == VerifyMode::Http {
            reqwest::Url::parse(&self.checker.echo_url).map_err(|e| SetupError::InvalidEchoUrl {
                url: self.checker.echo_url.clone(),
                reason: e.to_string(),
            })?;
        }
        NonZeroUsize::new(self.threads).ok_or(SetupError::InvalidThreadCount(self.threads))
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of proxies loaded and handed to workers
    pub checked: usize,
    /// Working proxies, in worker order
    pub working: Vec<ProxyRecord>,
    pub elapsed: Duration,
}

/// Check every proxy in `config.proxy_file` and write the working ones to
/// `config.output_file`.
///
/// Only setup problems (bad configuration, unreadable input, unwritable
/// output) are returned as errors; per-proxy failures are logged by the
/// workers and simply left out of the result.
pub async fn run(config: &RunConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let threads = config.validate()?;

    let proxies =
        ProxyParser::parse_file(&config.proxy_file).map_err(|source| SetupError::ReadInput {
            path: config.proxy_file.clone(),
            source,
        })?;
    let checked = proxies.len();
    info!("Loaded {} proxies from {:?}", checked, config.proxy_file);
    warn_scheme_mismatches(&proxies, config.checker.mode);

    let chunks = partition(proxies, threads);
    let checker = ProxyChecker::with_config(config.checker.clone());
    info!(
        "Checking {} proxies in {} mode with {} workers, timeout: {:?}",
        checked,
        checker.config().mode,
        chunks.len(),
        checker.config().timeout
    );

    let working = WorkingSet::new();
    checker.check_chunks(chunks, &working).await;

    let working = working.records().await;
    let tokens: Vec<&str> = working.iter().map(|r| r.token.as_str()).collect();
    println!("Working Proxies: {:?}", tokens);

    ProxyParser::save_to_file(&working, &config.output_file).map_err(|source| {
        SetupError::WriteOutput {
            path: config.output_file.clone(),
            source,
        }
    })?;
    info!("Saved {} working proxies to {:?}", working.len(), config.output_file);

    let elapsed = start.elapsed();
    println!("Completed in {:.3} seconds.", elapsed.as_secs_f64());

    Ok(RunSummary {
        checked,
        working,
        elapsed,
    })
}

/// Warn about lines whose scheme names a different protocol than the run mode.
/// The mode always wins; returns how many lines disagreed.
fn warn_scheme_mismatches(proxies: &[ProxyRecord], mode: VerifyMode) -> usize {
    let mut mismatched = 0;
    for proxy in proxies {
        if let Some(scheme) = proxy.scheme() {
            if !mode.accepts_scheme(scheme) {
                warn!(
                    "[Loader] {} names a {} proxy, checking it in {} mode",
                    proxy, scheme, mode
                );
                mismatched += 1;
            }
        }
    }
    mismatched
}
