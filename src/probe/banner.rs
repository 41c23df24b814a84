//! SSH banner stage
//!
//! Connects, reads the first chunk the server volunteers and checks it for
//! the `SSH-` protocol identification prefix.

use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::debug;

use super::error::StageError;
use super::types::ProbeOutcome;
use super::with_timeout;

/// Maximum banner bytes read
pub const BANNER_READ_LIMIT: usize = 256;
/// Characters of banner text echoed into the detail
pub const BANNER_DETAIL_CHARS: usize = 100;

const SSH_PREFIX: &str = "SSH-";

pub async fn banner_probe(host: &str, port: u16, timeout_secs: u64) -> ProbeOutcome {
    let started = Instant::now();

    match read_banner(host, port, timeout_secs).await {
        Ok(text) => {
            let (ok, detail) = classify_banner(&text);
            if ok {
                ProbeOutcome::success(detail, started)
            } else {
                ProbeOutcome::failure(detail, started)
            }
        }
        Err(e) => {
            debug!("Banner {}:{} failed: {}", host, port, e);
            ProbeOutcome::failure(format!("SSH banner probe failed: {}", e), started)
        }
    }
}

async fn read_banner(host: &str, port: u16, timeout_secs: u64) -> Result<String, StageError> {
    let mut stream = with_timeout(timeout_secs, TcpStream::connect((host, port))).await?;

    let mut buf = [0u8; BANNER_READ_LIMIT];
    let n = with_timeout(timeout_secs, stream.read(&mut buf)).await?;

    Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string())
}

/// Classify decoded banner text into `(ok, detail)`
pub fn classify_banner(text: &str) -> (bool, String) {
    let head: String = text.chars().take(BANNER_DETAIL_CHARS).collect();
    if text.starts_with(SSH_PREFIX) {
        (true, format!("SSH banner received: {}", head))
    } else if !text.is_empty() {
        (false, format!("Non-SSH banner: {}", head))
    } else {
        (false, "No banner received".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    /// Accept connections forever, greet each with `greeting` and hang up
    async fn spawn_greeter(greeting: &'static [u8]) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let _ = sock.write_all(greeting).await;
            }
        });
        addr
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify_banner("SSH-2.0-OpenSSH_9.6"),
            (true, "SSH banner received: SSH-2.0-OpenSSH_9.6".to_string())
        );
        assert_eq!(
            classify_banner("HTTP/1.1 400 Bad Request"),
            (false, "Non-SSH banner: HTTP/1.1 400 Bad Request".to_string())
        );
        assert_eq!(classify_banner(""), (false, "No banner received".to_string()));
    }

    #[test]
    fn test_classify_truncates_detail() {
        let long = format!("SSH-2.0-{}", "x".repeat(300));
        let (ok, detail) = classify_banner(&long);
        assert!(ok);
        assert_eq!(
            detail.chars().count(),
            "SSH banner received: ".len() + BANNER_DETAIL_CHARS
        );
    }

    #[tokio::test]
    async fn test_ssh_server() {
        let addr = spawn_greeter(b"SSH-2.0-OpenSSH_9.6\r\n").await;
        let outcome = banner_probe("127.0.0.1", addr.port(), 2).await;
        assert!(outcome.ok, "{}", outcome.detail);
        assert_eq!(outcome.detail, "SSH banner received: SSH-2.0-OpenSSH_9.6");
    }

    #[tokio::test]
    async fn test_non_ssh_server() {
        let addr = spawn_greeter(b"220 smtp.local ESMTP\r\n").await;
        let outcome = banner_probe("127.0.0.1", addr.port(), 2).await;
        assert!(!outcome.ok);
        assert_eq!(outcome.detail, "Non-SSH banner: 220 smtp.local ESMTP");
    }

    #[tokio::test]
    async fn test_server_hangs_up_silently() {
        let addr = spawn_greeter(b"").await;
        let outcome = banner_probe("127.0.0.1", addr.port(), 2).await;
        assert!(!outcome.ok);
        assert_eq!(outcome.detail, "No banner received");
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let outcome = banner_probe("127.0.0.1", port, 1).await;
        assert!(!outcome.ok);
        assert_eq!(outcome.detail, "SSH banner probe failed: timed out after 1s");
        assert!(outcome.elapsed_ms >= 900);
    }
}
