//! Proxy module for parsing and checking proxies
//!
//! This module provides functionality for:
//! - Parsing proxies from `host:port` lists
//! - Splitting a list into per-worker chunks
//! - Verifying HTTP proxies through an IP-echo service
//! - Verifying SOCKS4/SOCKS5 proxies with a raw handshake
//! - Collecting working proxies from concurrent workers

pub mod checker;
pub mod http;
pub mod models;
pub mod parser;
pub mod partition;
pub mod socks;
pub mod working_set;

#[cfg(test)]
pub(crate) mod test_support;

pub use checker::{CheckerConfig, ProxyChecker, Verifier};
pub use http::HttpVerifier;
pub use models::{FailureReason, ProxyAddress, ProxyRecord, VerificationOutcome, VerifyMode};
pub use parser::ProxyParser;
pub use partition::{partition, ThreadChunk};
pub use socks::SocksVerifier;
pub use working_set::WorkingSet;
