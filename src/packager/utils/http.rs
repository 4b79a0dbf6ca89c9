//! HTTP download seam.
//!
//! [`Fetcher`] is the only way the crate touches the network, so tests can
//! substitute an in-memory implementation.

use crate::packager::error::{Error, Result};
use std::future::Future;

/// Downloads the body of a URL.
pub trait Fetcher {
    /// Performs a single GET and returns the response body.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// [`Fetcher`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                reason: format!("server responded with {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::Download {
            url: url.to_string(),
            reason: format!("failed to read response: {e}"),
        })?;

        log::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serves a single canned HTTP response on a loopback port.
    async fn serve_once(response: &'static [u8]) -> (String, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await.unwrap();
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        (format!("http://{addr}/tool.zip"), server)
    }

    fn direct_fetcher() -> HttpFetcher {
        HttpFetcher {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
        }
    }

    #[tokio::test]
    async fn not_found_is_a_download_error() {
        let (url, server) = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = direct_fetcher().fetch(&url).await.unwrap_err();

        match err {
            Error::Download {
                url: failed,
                reason,
            } => {
                assert_eq!(failed, url);
                assert!(reason.contains("404"), "got: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn success_returns_body() {
        let (url, server) = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nPK\x03\x04",
        )
        .await;

        let body = direct_fetcher().fetch(&url).await.unwrap();

        assert_eq!(body, b"PK\x03\x04");
        server.await.unwrap();
    }
}
