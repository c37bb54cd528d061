//! SOCKS4/SOCKS5 proxy verification over a raw TCP socket

use crate::proxy::checker::{CheckerConfig, Verifier};
use crate::proxy::models::{FailureReason, ProxyRecord, VerificationOutcome};
use async_trait::async_trait;
use std::net::SocketAddrV4;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const SOCKS4_VERSION: u8 = 0x04;
const SOCKS4_CMD_CONNECT: u8 = 0x01;
const SOCKS4_REPLY_VERSION: u8 = 0x00;
const SOCKS4_GRANTED: u8 = 0x5A;
const SOCKS4_REPLY_LEN: usize = 8;

const SOCKS5_VERSION: u8 = 0x05;
const SOCKS5_NO_AUTH: u8 = 0x00;
const SOCKS5_GREETING: [u8; 3] = [SOCKS5_VERSION, 0x01, SOCKS5_NO_AUTH];

/// SOCKS4 CONNECT request targeting `target`, with an empty user id
pub fn socks4_request(target: SocketAddrV4) -> [u8; 9] {
    let [p0, p1] = target.port().to_be_bytes();
    let [a, b, c, d] = target.ip().octets();
    [SOCKS4_VERSION, SOCKS4_CMD_CONNECT, p0, p1, a, b, c, d, 0x00]
}

/// Whether a SOCKS4 reply grants the request
pub fn socks4_granted(reply: &[u8]) -> bool {
    matches!(reply, [SOCKS4_REPLY_VERSION, SOCKS4_GRANTED, ..])
}

/// Classification of a SOCKS5 method-selection reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socks5Reply {
    NoAuth,
    AuthRequired(u8),
    NotSocks5,
}

impl Socks5Reply {
    pub fn parse(reply: &[u8]) -> Self {
        match reply {
            [SOCKS5_VERSION, SOCKS5_NO_AUTH, ..] => Socks5Reply::NoAuth,
            [SOCKS5_VERSION, method, ..] => Socks5Reply::AuthRequired(*method),
            _ => Socks5Reply::NotSocks5,
        }
    }
}

/// Probes a proxy with a SOCKS4 CONNECT and, failing that, a SOCKS5
/// no-auth greeting on a fresh connection. Every connect and exchange is
/// bounded by the configured timeout.
pub struct SocksVerifier {
    config: CheckerConfig,
}

impl SocksVerifier {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    async fn connect(&self, addr: SocketAddrV4) -> Result<TcpStream, FailureReason> {
        match timeout(self.config.timeout, TcpStream::connect(addr)).await {
            Ok(stream) => Ok(stream?),
            Err(_) => Err(FailureReason::Timeout),
        }
    }

    /// Write `request`, then read into `buf` until `min` bytes arrived, the
    /// buffer is full or the peer closed. Returns the number of bytes read.
    async fn exchange(
        &self,
        stream: &mut TcpStream,
        request: &[u8],
        buf: &mut [u8],
        min: usize,
    ) -> Result<usize, FailureReason> {
        let io = async {
            stream.write_all(request).await?;
            let mut filled = 0;
            while filled < min {
                let n = stream.read(&mut buf[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            Ok::<_, std::io::Error>(filled)
        };

        match timeout(self.config.timeout, io).await {
            Ok(filled) => Ok(filled?),
            Err(_) => Err(FailureReason::Timeout),
        }
    }

    async fn probe_socks4(&self, stream: &mut TcpStream, addr: SocketAddrV4) -> Result<bool, FailureReason> {
        let mut reply = [0u8; SOCKS4_REPLY_LEN];
        let n = self.exchange(stream, &socks4_request(addr), &mut reply, 2).await?;
        Ok(socks4_granted(&reply[..n]))
    }

    async fn probe_socks5(&self, stream: &mut TcpStream) -> Result<Socks5Reply, FailureReason> {
        let mut reply = [0u8; 2];
        let n = self.exchange(stream, &SOCKS5_GREETING, &mut reply, 2).await?;
        Ok(Socks5Reply::parse(&reply[..n]))
    }

    async fn handshake(&self, addr: SocketAddrV4, worker: usize) -> Result<(), FailureReason> {
        let mut stream = self.connect(addr).await?;
        match self.probe_socks4(&mut stream, addr).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(FailureReason::Timeout) => return Err(FailureReason::Timeout),
            // SOCKS5-only servers often reset on a SOCKS4 frame
            Err(reason) => debug!("[Thread: {}] SOCKS4 probe of {} failed: {}", worker, addr, reason),
        }
        drop(stream);

        let mut stream = self.connect(addr).await?;
        match self.probe_socks5(&mut stream).await? {
            Socks5Reply::NoAuth => Ok(()),
            Socks5Reply::AuthRequired(method) => Err(FailureReason::AuthRequired(method)),
            Socks5Reply::NotSocks5 => Err(FailureReason::ProtocolMismatch),
        }
    }
}

#[async_trait]
impl Verifier for SocksVerifier {
    async fn verify(&self, record: &ProxyRecord, worker: usize) -> VerificationOutcome {
        let Some(ip) = record.address.ipv4() else {
            let reason = FailureReason::MalformedHost(record.address.host.clone());
            warn!("[Thread: {}] Invalid proxy {}: {}", worker, record, reason);
            return VerificationOutcome::Invalid(reason);
        };

        match self.handshake(SocketAddrV4::new(ip, record.address.port), worker).await {
            Ok(()) => {
                info!("[Thread: {}] Current IP: {} | Proxy Works: true", worker, ip);
                VerificationOutcome::Working
            }
            Err(reason) => {
                info!("[Thread: {}] Current IP: {} | Proxy Works: false ({})", worker, ip, reason);
                VerificationOutcome::Failed(reason)
            }
        }
    }
}
