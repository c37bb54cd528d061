//! Proxy Check - HTTP and SOCKS proxy list checker
//!
//! Splits a proxy list across concurrent workers, verifies each proxy with
//! an HTTP request through it or a SOCKS4/SOCKS5 handshake, and writes the
//! working ones back out.

pub mod error;
pub mod logging;
pub mod proxy;
pub mod runner;

pub use error::SetupError;
pub use proxy::*;
pub use runner::{run, RunConfig, RunSummary};

/// Application result type
pub type Result<T> = anyhow::Result<T>;
