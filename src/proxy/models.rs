//! Proxy data models

use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Verification protocol, selected once for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    #[default]
    Http,
    Socks,
}

impl VerifyMode {
    /// Whether a URL scheme from the input list names a protocol this mode checks
    pub fn accepts_scheme(&self, scheme: &str) -> bool {
        let scheme = scheme.to_ascii_lowercase();
        match self {
            VerifyMode::Http => matches!(scheme.as_str(), "http" | "https"),
            VerifyMode::Socks => matches!(scheme.as_str(), "socks4" | "socks5"),
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyMode::Http => write!(f, "http"),
            VerifyMode::Socks => write!(f, "socks4/5"),
        }
    }
}

/// Parsed proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    pub host: String,
    pub port: u16,
}

impl ProxyAddress {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// The host as an IPv4 literal, if it is one
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.host.parse().ok()
    }

    /// Proxy URL used to route HTTP and HTTPS traffic through this endpoint
    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A proxy line from the input list together with its parsed address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRecord {
    /// Trimmed input token, written back verbatim to the output list
    pub token: String,
    pub address: ProxyAddress,
}

impl ProxyRecord {
    pub fn new(token: String, address: ProxyAddress) -> Self {
        Self { token, address }
    }

    /// Scheme prefix of the input token, e.g. `socks5` for `socks5://host:port`
    pub fn scheme(&self) -> Option<&str> {
        self.token.split_once("://").map(|(scheme, _)| scheme)
    }
}

impl fmt::Display for ProxyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)
    }
}

/// Why a proxy was not classified as working
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("malformed port: {0}")]
    MalformedPort(String),
    #[error("expected host:port, got '{0}'")]
    MalformedAddress(String),
    #[error("host is not an IPv4 address: {0}")]
    MalformedHost(String),
    #[error("timed out")]
    Timeout,
    #[error("connection refused")]
    ConnectionRefused,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("neither SOCKS4 nor SOCKS5 handshake succeeded")]
    ProtocolMismatch,
    #[error("SOCKS5 proxy requires authentication (method 0x{0:02x})")]
    AuthRequired(u8),
    #[error("request failed: {0}")]
    Http(String),
    #[error("echoed IP {0} does not match proxy host")]
    IpMismatch(String),
}

impl From<std::io::Error> for FailureReason {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => FailureReason::Timeout,
            std::io::ErrorKind::ConnectionRefused => FailureReason::ConnectionRefused,
            _ => FailureReason::Transport(err.to_string()),
        }
    }
}

/// Result of verifying a single proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Working,
    Failed(FailureReason),
    Invalid(FailureReason),
}

impl VerificationOutcome {
    pub fn is_working(&self) -> bool {
        matches!(self, VerificationOutcome::Working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(token: &str, host: &str, port: u16) -> ProxyRecord {
        ProxyRecord::new(token.to_string(), ProxyAddress::new(host.to_string(), port))
    }

    #[test]
    fn test_address_display_and_url() {
        let address = ProxyAddress::new("127.0.0.1".to_string(), 8080);
        assert_eq!(address.to_string(), "127.0.0.1:8080");
        assert_eq!(address.http_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_address_ipv4() {
        let address = ProxyAddress::new("10.0.0.1".to_string(), 1080);
        assert_eq!(address.ipv4(), Some(Ipv4Addr::new(10, 0, 0, 1)));

        let address = ProxyAddress::new("proxy.local".to_string(), 1080);
        assert!(address.ipv4().is_none());
    }

    #[test]
    fn test_record_displays_input_token() {
        let proxy = record("socks5://10.0.0.1:1080", "10.0.0.1", 1080);
        assert_eq!(proxy.to_string(), "socks5://10.0.0.1:1080");
    }

    #[test]
    fn test_record_scheme() {
        assert_eq!(record("socks5://10.0.0.1:1080", "10.0.0.1", 1080).scheme(), Some("socks5"));
        assert_eq!(record("10.0.0.1:1080", "10.0.0.1", 1080).scheme(), None);
    }

    #[test]
    fn test_mode_accepts_scheme() {
        assert!(VerifyMode::Http.accepts_scheme("http"));
        assert!(VerifyMode::Http.accepts_scheme("HTTPS"));
        assert!(!VerifyMode::Http.accepts_scheme("socks5"));
        assert!(VerifyMode::Socks.accepts_scheme("socks4"));
        assert!(VerifyMode::Socks.accepts_scheme("socks5"));
        assert!(!VerifyMode::Socks.accepts_scheme("http"));
    }

    #[test]
    fn test_outcome() {
        assert!(VerificationOutcome::Working.is_working());

        let failed = VerificationOutcome::Failed(FailureReason::Timeout);
        assert!(!failed.is_working());

        let invalid = VerificationOutcome::Invalid(FailureReason::MalformedHost("x".into()));
        assert!(!invalid.is_working());
    }

    #[test]
    fn test_io_error_classification() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert_eq!(FailureReason::from(refused), FailureReason::ConnectionRefused);

        let timed_out = std::io::Error::from(std::io::ErrorKind::TimedOut);
        assert_eq!(FailureReason::from(timed_out), FailureReason::Timeout);

        let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        assert!(matches!(FailureReason::from(reset), FailureReason::Transport(_)));
    }
}
