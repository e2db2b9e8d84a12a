//! HTTP/JSON map-load client.
//!
//! Talks to a map server (or a bridge in front of one) exposing:
//!
//! ```text
//! POST <base_url>/load_map   {"map_url": "<path>"}  ->  {"result": <u8>}
//! GET  <base_url>/           any response means "available"
//! ```

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::client::MapLoadClient;
use super::types::{LoadResult, LoadStatus};
use crate::level::MapAssetPath;

/// Default timeout for one load-map call, in seconds.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;

/// Interval between availability probes.
const AVAILABILITY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
struct LoadMapRequest<'a> {
    map_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoadMapResponse {
    result: u8,
}

/// [`MapLoadClient`] over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct HttpMapLoadClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMapLoadClient {
    /// Create a client for the map server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn load_url(&self) -> String {
        format!("{}/load_map", self.base_url)
    }

    async fn load(client: reqwest::Client, url: String, map_url: String) -> LoadResult {
        let response = match client
            .post(&url)
            .json(&LoadMapRequest { map_url: &map_url })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return LoadResult::TransportError(format!("Request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return LoadResult::TransportError(format!("HTTP {} from {}", status, url));
        }

        match response.json::<LoadMapResponse>().await {
            Ok(body) => LoadResult::from_status(LoadStatus(body.result)),
            Err(e) => LoadResult::TransportError(format!("Invalid response body: {}", e)),
        }
    }
}

impl MapLoadClient for HttpMapLoadClient {
    fn request_load(&self, path: &MapAssetPath) -> BoxFuture<'static, LoadResult> {
        let client = self.client.clone();
        let url = self.load_url();
        let map_url = path.as_str().to_string();
        debug!(url = %url, map_url = %map_url, "Sending load-map request");
        Box::pin(Self::load(client, url, map_url))
    }

    fn wait_until_available(&self, shutdown: CancellationToken) -> BoxFuture<'static, bool> {
        let client = self.client.clone();
        let url = format!("{}/", self.base_url);

        Box::pin(async move {
            loop {
                if client.get(&url).send().await.is_ok() {
                    info!(url = %url, "Map server available");
                    return true;
                }
                info!(url = %url, "Waiting for map server to be available...");

                tokio::select! {
                    _ = shutdown.cancelled() => return false,
                    _ = tokio::time::sleep(AVAILABILITY_POLL_INTERVAL) => {}
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and return the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn path() -> MapAssetPath {
        MapAssetPath::new("/opt/maps/L2.yaml")
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpMapLoadClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.load_url(), "http://localhost:8080/load_map");
    }

    #[tokio::test]
    async fn test_success_response() {
        let url = serve_once("200 OK", r#"{"result": 0}"#).await;
        let client = HttpMapLoadClient::new(url).unwrap();

        assert_eq!(client.request_load(&path()).await, LoadResult::Success);
    }

    #[tokio::test]
    async fn test_failure_code_is_reported() {
        let url = serve_once("200 OK", r#"{"result": 2}"#).await;
        let client = HttpMapLoadClient::new(url).unwrap();

        assert_eq!(
            client.request_load(&path()).await,
            LoadResult::Failure(LoadStatus(2))
        );
    }

    #[tokio::test]
    async fn test_http_error_is_transport_error() {
        let url = serve_once("500 Internal Server Error", "{}").await;
        let client = HttpMapLoadClient::new(url).unwrap();

        let result = client.request_load(&path()).await;
        assert!(matches!(result, LoadResult::TransportError(ref r) if r.contains("500")));
    }

    #[tokio::test]
    async fn test_bad_body_is_transport_error() {
        let url = serve_once("200 OK", r#"{"status": "ok"}"#).await;
        let client = HttpMapLoadClient::new(url).unwrap();

        assert!(matches!(
            client.request_load(&path()).await,
            LoadResult::TransportError(_)
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpMapLoadClient::new(format!("http://{}", addr)).unwrap();
        assert!(matches!(
            client.request_load(&path()).await,
            LoadResult::TransportError(_)
        ));
    }

    #[tokio::test]
    async fn test_wait_until_available_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpMapLoadClient::new(format!("http://{}", addr)).unwrap();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        assert!(!client.wait_until_available(shutdown).await);
    }

    #[tokio::test]
    async fn test_wait_until_available_with_server() {
        let url = serve_once("404 Not Found", "{}").await;
        let client = HttpMapLoadClient::new(url).unwrap();

        assert!(client.wait_until_available(CancellationToken::new()).await);
    }
}
