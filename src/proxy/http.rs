//! HTTP/HTTPS proxy verification through an IP-echo endpoint

use crate::proxy::checker::{CheckerConfig, Verifier};
use crate::proxy::models::{FailureReason, ProxyAddress, ProxyRecord, VerificationOutcome};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy};
use serde::Deserialize;
use tracing::{info, warn};

/// Body returned by the IP-echo endpoint
#[derive(Debug, Deserialize)]
struct IpEcho {
    ip: String,
}

/// Sends a GET through the proxy and reads back the caller IP the echo
/// service saw. Any successful, decodable response counts as working; the IP
/// comparison only affects the outcome when `require_ip_match` is set.
pub struct HttpVerifier {
    config: CheckerConfig,
}

impl HttpVerifier {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    async fn fetch_ip(&self, address: &ProxyAddress) -> Result<String, FailureReason> {
        let client = self.create_client(address)?;

        let request = async {
            client
                .get(&self.config.echo_url)
                .send()
                .await?
                .json::<IpEcho>()
                .await
        };

        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(Ok(echo)) => Ok(echo.ip),
            Ok(Err(e)) => Err(classify(e)),
            Err(_) => Err(FailureReason::Timeout),
        }
    }

    /// Create a reqwest client routing both HTTP and HTTPS through the proxy
    fn create_client(&self, address: &ProxyAddress) -> Result<Client, FailureReason> {
        let proxy = ReqwestProxy::all(address.http_url()).map_err(classify)?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()
            .map_err(classify)
    }
}

fn classify(err: reqwest::Error) -> FailureReason {
    if err.is_timeout() {
        FailureReason::Timeout
    } else {
        FailureReason::Http(err.to_string())
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify(&self, record: &ProxyRecord, worker: usize) -> VerificationOutcome {
        match self.fetch_ip(&record.address).await {
            Ok(ip) => {
                let works = ip == record.address.host;
                info!(
                    "[Thread: {}] Current IP: {} | Proxy Active: {} | Proxy Works: {}",
                    worker, ip, record, works
                );
                if !works && self.config.require_ip_match {
                    return VerificationOutcome::Failed(FailureReason::IpMismatch(ip));
                }
                VerificationOutcome::Working
            }
            Err(reason) => {
                warn!("[Thread: {}] Proxy Failed: {} ({})", worker, record, reason);
                VerificationOutcome::Failed(reason)
            }
        }
    }
}
