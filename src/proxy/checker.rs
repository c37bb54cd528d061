//! Proxy checker module: verifier selection and the per-chunk worker pool

use crate::proxy::http::HttpVerifier;
use crate::proxy::models::{ProxyRecord, VerificationOutcome, VerifyMode};
use crate::proxy::partition::ThreadChunk;
use crate::proxy::socks::SocksVerifier;
use crate::proxy::working_set::WorkingSet;
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default timeout for each network step of a proxy check, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Default IP-echo endpoint requested through HTTP proxies
pub const DEFAULT_ECHO_URL: &str = "http://ipinfo.io/json";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Which verifier the run uses
    pub mode: VerifyMode,
    /// Timeout for each connect, handshake or request
    pub timeout: Duration,
    /// URL returning `{"ip": "..."}`, used in HTTP mode
    pub echo_url: String,
    /// Treat an echoed IP that differs from the proxy host as a failure
    pub require_ip_match: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            mode: VerifyMode::Http,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            echo_url: DEFAULT_ECHO_URL.to_string(),
            require_ip_match: false,
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: VerifyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_echo_url(mut self, url: String) -> Self {
        self.echo_url = url;
        self
    }

    pub fn with_require_ip_match(mut self, require: bool) -> Self {
        self.require_ip_match = require;
        self
    }
}

/// A protocol-specific check of a single proxy.
///
/// Implementations never fail: every problem is reported through the returned
/// [`VerificationOutcome`] and logged, tagged with the worker index.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, record: &ProxyRecord, worker: usize) -> VerificationOutcome;
}

/// Runs one worker per chunk against the configured verifier
pub struct ProxyChecker {
    config: CheckerConfig,
    verifier: Arc<dyn Verifier>,
}

impl ProxyChecker {
    /// Create a new proxy checker, selecting the verifier from `config.mode`
    pub fn with_config(config: CheckerConfig) -> Self {
        let verifier: Arc<dyn Verifier> = match config.mode {
            VerifyMode::Http => Arc::new(HttpVerifier::new(config.clone())),
            VerifyMode::Socks => Arc::new(SocksVerifier::new(config.clone())),
        };

        Self::with_verifier(config, verifier)
    }

    /// Create a proxy checker around a custom verifier
    pub fn with_verifier(config: CheckerConfig, verifier: Arc<dyn Verifier>) -> Self {
        Self { config, verifier }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Check every chunk concurrently, one task per chunk, and wait for all of
    /// them. Each worker appends its working proxies to `working` once its
    /// chunk is done. Returns the number of workers that ran to completion.
    pub async fn check_chunks(&self, chunks: Vec<ThreadChunk>, working: &WorkingSet) -> usize {
        let (indices, handles): (Vec<_>, Vec<_>) = chunks
            .into_iter()
            .map(|chunk| {
                let index = chunk.index;
                let verifier = Arc::clone(&self.verifier);
                let working = working.clone();
                let handle = tokio::spawn(async move {
                    let good = check_chunk(verifier.as_ref(), chunk).await;
                    working.append(index, good).await;
                });
                (index, handle)
            })
            .unzip();

        let mut completed = 0;
        for (index, result) in indices.into_iter().zip(join_all(handles).await) {
            match result {
                Ok(()) => completed += 1,
                Err(e) => error!("[Thread: {}] Worker aborted: {}", index, e),
            }
        }
        completed
    }
}

/// Verify a chunk's records one after another, returning the working ones in order.
/// A record whose check panics is logged and skipped; the rest of the chunk still runs.
async fn check_chunk(verifier: &dyn Verifier, chunk: ThreadChunk) -> Vec<ProxyRecord> {
    debug!("[Thread: {}] Checking {} proxies", chunk.index, chunk.len());
    let mut good = Vec::new();

    for record in chunk.records {
        let outcome = AssertUnwindSafe(verifier.verify(&record, chunk.index))
            .catch_unwind()
            .await;
        match outcome {
            Ok(outcome) if outcome.is_working() => good.push(record),
            Ok(_) => {}
            Err(panic) => error!(
                "[Thread: {}] Proxy Failed: {} (check panicked: {})",
                chunk.index,
                record,
                panic_message(panic.as_ref())
            ),
        }
    }

    info!("[Thread: {}] Working Proxies: {}", chunk.index, good.len());
    good
}

fn panic_message<'a>(panic: &'a (dyn Any + Send + 'static)) -> &'a str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
