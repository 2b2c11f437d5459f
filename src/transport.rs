//! Outbound HTTP seam
//!
//! Every fetcher talks to upstream through [`HttpSource`] so that the
//! skip-and-continue behaviour can be exercised without a network.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{DeskError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// GET `url` with `query` appended and return the body as text.
    ///
    /// Timeouts, connection errors and non-2xx statuses come back as
    /// recoverable [`DeskError`]s (see [`DeskError::is_recoverable`]).
    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<String>;
}

/// Production source backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestSource {
    http: Client,
}

impl ReqwestSource {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeskError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpSource for ReqwestSource {
    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<String> {
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DeskError::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        let text = resp.text().await?;
        debug!(url, bytes = text.len(), "fetched");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BROWSER_USER_AGENT;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one request with `status_line` and `body`; the handle yields the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "{status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/common.do"), handle)
    }

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_sends_browser_user_agent_and_query() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", "payload").await;
        let source = ReqwestSource::new(&HttpConfig::default()).unwrap();

        let body = source
            .get_text(&url, &query(&[("method", "getLottoNumber"), ("drwNo", "7")]))
            .await
            .unwrap();
        assert_eq!(body, "payload");

        let request = server.await.unwrap();
        let head = request.to_ascii_lowercase();
        assert!(request.starts_with("GET /common.do?method=getLottoNumber&drwNo=7 "), "{request}");
        assert!(
            head.contains(&format!("user-agent: {}", BROWSER_USER_AGENT.to_ascii_lowercase())),
            "{request}"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_recoverable_status_error() {
        let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "busy").await;
        let source = ReqwestSource::new(&HttpConfig::default()).unwrap();

        let err = source.get_text(&url, &[]).await.unwrap_err();
        server.await.unwrap();

        match &err {
            DeskError::Status { status, url: failed } => {
                assert_eq!(*status, 503);
                assert!(failed.ends_with("/common.do"), "{failed}");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(err.is_recoverable());
    }
}
