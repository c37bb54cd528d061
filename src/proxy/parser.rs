//! Proxy parser module for reading and writing proxy lists

use crate::proxy::models::{FailureReason, ProxyAddress, ProxyRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// host:port with an optional scheme prefix
static PROXY_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:https?|socks[45])://)?([^\s:/@]+):([^\s:/@]+)/?$")
        .expect("Invalid proxy line regex")
});

/// Proxy parser for parsing proxies from strings and files
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments. Supports:
    /// - IP:PORT
    /// - scheme://IP:PORT (http, https, socks4, socks5)
    ///
    /// The scheme is kept in the token but does not pick the protocol; the
    /// run's [`VerifyMode`](crate::proxy::VerifyMode) always does.
    pub fn parse_line(line: &str) -> Result<Option<ProxyRecord>, FailureReason> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let caps = PROXY_LINE_REGEX
            .captures(line)
            .ok_or_else(|| FailureReason::MalformedAddress(line.to_string()))?;

        let host = caps[1].to_string();
        let port = match caps[2].parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => return Err(FailureReason::MalformedPort(caps[2].to_string())),
        };

        Ok(Some(ProxyRecord::new(
            line.to_string(),
            ProxyAddress::new(host, port),
        )))
    }

    /// Parse proxies from a string (multiple lines)
    ///
    /// Invalid lines are logged and skipped.
    pub fn parse_string(content: &str) -> Vec<ProxyRecord> {
        content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| match Self::parse_line(line) {
                Ok(record) => record,
                Err(reason) => {
                    warn!("[Loader] Invalid proxy on line {}: {}", i + 1, reason);
                    None
                }
            })
            .collect()
    }

    /// Parse proxies from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<ProxyRecord>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_string(&content))
    }

    /// Save proxies to a file, one token per line, replacing any previous content
    pub fn save_to_file<P: AsRef<Path>>(proxies: &[ProxyRecord], path: P) -> io::Result<()> {
        let content: String = proxies
            .iter()
            .map(|p| format!("{}\n", p.token))
            .collect();

        fs::write(path, content)?;
        Ok(())
    }
}
