//! Local mock servers for verifier tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn bind() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").await.unwrap()
}

/// SOCKS server answering a SOCKS4 connect request with `socks4_reply` and a
/// SOCKS5 greeting with `socks5_reply`, then closing. An empty reply closes
/// without writing anything.
pub async fn spawn_socks_server(socks4_reply: &[u8], socks5_reply: &[u8]) -> SocketAddr {
    let listener = bind().await;
    let addr = listener.local_addr().unwrap();
    let socks4_reply: Arc<[u8]> = socks4_reply.into();
    let socks5_reply: Arc<[u8]> = socks5_reply.into();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let socks4_reply = Arc::clone(&socks4_reply);
            let socks5_reply = Arc::clone(&socks5_reply);
            tokio::spawn(async move {
                answer_socks(stream, &socks4_reply, &socks5_reply).await;
            });
        }
    });

    addr
}

async fn answer_socks(mut stream: TcpStream, socks4_reply: &[u8], socks5_reply: &[u8]) {
    let mut version = [0u8; 1];
    if stream.read_exact(&mut version).await.is_err() {
        return;
    }

    // Consume the whole request so closing sends FIN rather than RST.
    let (rest_len, reply) = match version[0] {
        4 => (8, socks4_reply),
        5 => (2, socks5_reply),
        _ => return,
    };
    let mut rest = vec![0u8; rest_len];
    if stream.read_exact(&mut rest).await.is_err() {
        return;
    }

    if !reply.is_empty() {
        let _ = stream.write_all(reply).await;
    }
    let _ = stream.shutdown().await;
}

/// HTTP proxy answering every request with `200 OK` and `body` as JSON
pub async fn spawn_http_proxy(body: &str) -> SocketAddr {
    let listener = bind().await;
    let addr = listener.local_addr().unwrap();
    let body: Arc<str> = body.into();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let body = Arc::clone(&body);
            tokio::spawn(async move {
                if read_request_head(&mut stream).await.is_none() {
                    return;
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

async fn read_request_head(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }
    Some(head)
}

/// Server that accepts connections and never answers
pub async fn spawn_silent_server() -> SocketAddr {
    let listener = bind().await;
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(stream);
            });
        }
    });

    addr
}

/// A local port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = bind().await;
    listener.local_addr().unwrap().port()
}
