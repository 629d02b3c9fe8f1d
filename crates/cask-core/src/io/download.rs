//! Streaming artifact downloads with progress reporting.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::fetch_error;
use crate::error::FetchError;
use crate::host::{ArtifactFetcher, FetchRequest};
use crate::reporter::Reporter;

/// [`ArtifactFetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Fetcher using an existing client (see [`super::client`]).
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(
        &self,
        req: FetchRequest<'_>,
        reporter: &dyn Reporter,
    ) -> Result<u64, FetchError> {
        let url = req.url;
        debug!("GET {url} -> {}", req.dest.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_error(url, &e))?;

        let total_size = response.content_length();
        reporter.downloading(req.name, req.version, 0, total_size);

        let mut file = File::create(req.dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fetch_error(url, &e))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            reporter.downloading(req.name, req.version, downloaded, total_size);
        }

        file.flush().await?;
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use crate::types::{PackageName, Version};
    use mockito::Server;
    use std::time::Duration;

    #[tokio::test]
    async fn streams_body_to_dest() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/demo.pkg")
            .with_status(200)
            .with_body(vec![1u8; 100_000])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("demo.pkg");
        let fetcher = HttpFetcher::new(crate::io::client(Duration::from_secs(10)).unwrap());
        let url = format!("{}/demo.pkg", server.url());
        let name = PackageName::from("demo");
        let version = Version::from("1.0");

        let req = FetchRequest {
            name: &name,
            version: &version,
            url: &url,
            dest: &dest,
        };
        let bytes = fetcher.fetch(req, &NullReporter).await.unwrap();
        assert_eq!(bytes, 100_000);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 100_000);
    }

    #[tokio::test]
    async fn http_errors_carry_status() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.pkg")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.pkg");
        let fetcher = HttpFetcher::new(Client::new());
        let url = format!("{}/missing.pkg", server.url());
        let name = PackageName::from("demo");
        let version = Version::from("1.0");

        let req = FetchRequest {
            name: &name,
            version: &version,
            url: &url,
            dest: &dest,
        };
        let err = fetcher.fetch(req, &NullReporter).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!dest.exists());
    }
}
