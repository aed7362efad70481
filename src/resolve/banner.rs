//! HTTP and SMTP banner grabbing for candidates that resolve.

use reqwest::header::SERVER;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::LookupError;

/// `Server` header returned for `http://<domain>/`
pub async fn http_banner(client: &reqwest::Client, domain: &str) -> Result<String, LookupError> {
    let url = format!("http://{}/", domain);
    let response = client
        .head(&url)
        .send()
        .await
        .map_err(|e| LookupError::Banner(e.to_string()))?;

    response
        .headers()
        .get(SERVER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(LookupError::NoAnswer)
}

/// Default SMTP port
pub const SMTP_PORT: u16 = 25;

/// Text of the `220` greeting sent by `mx` on `port`
pub async fn smtp_banner(mx: &str, port: u16, limit: Duration) -> Result<String, LookupError> {
    let mut stream = timeout(limit, TcpStream::connect((mx, port)))
        .await
        .map_err(|_| LookupError::Timeout)??;

    let mut buf = [0u8; 1024];
    let read = timeout(limit, stream.read(&mut buf))
        .await
        .map_err(|_| LookupError::Timeout)??;

    parse_smtp_greeting(&String::from_utf8_lossy(&buf[..read]))
}

fn parse_smtp_greeting(greeting: &str) -> Result<String, LookupError> {
    let line = greeting.lines().next().unwrap_or("");
    match line.strip_prefix("220") {
        Some(rest) => {
            let text = rest.trim_start_matches(['-', ' ']).trim();
            if text.is_empty() {
                Err(LookupError::NoAnswer)
            } else {
                Ok(text.to_string())
            }
        }
        None => Err(LookupError::Banner(format!("unexpected greeting: {line}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_text_is_extracted() {
        assert_eq!(
            parse_smtp_greeting("220 mx.example.com ESMTP Postfix\r\n").unwrap(),
            "mx.example.com ESMTP Postfix"
        );
        assert_eq!(
            parse_smtp_greeting("220-mail.example.net ready\r\n220 more\r\n").unwrap(),
            "mail.example.net ready"
        );
    }

    #[test]
    fn non_220_greeting_is_rejected() {
        assert!(parse_smtp_greeting("554 go away\r\n").is_err());
        assert!(parse_smtp_greeting("").is_err());
        assert!(parse_smtp_greeting("220\r\n").is_err());
    }

    #[tokio::test]
    async fn reads_greeting_from_live_server() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"220 mx.example.net ESMTP Postfix\r\n")
                .await
                .unwrap();
        });

        let banner = smtp_banner("127.0.0.1", port, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(banner, "mx.example.net ESMTP Postfix");
    }

    #[tokio::test]
    async fn reads_server_header() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nServer: nginx/1.25.3\r\n\
                      Content-Length: 0\r\nConnection: close\r\n\r\n",
                )
                .await
                .unwrap();
        });

        let client = reqwest::Client::new();
        let banner = http_banner(&client, &addr.to_string()).await.unwrap();
        assert_eq!(banner, "nginx/1.25.3");
    }
}
