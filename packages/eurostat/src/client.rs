//! Production [`DatasetFetcher`] backed by the Eurostat dissemination API.

use std::time::Duration;

use async_trait::async_trait;
use eraswap_metrics_models::EntityLookup;

use crate::{Dataset, DatasetEndpoint, DatasetFetcher, SourceError, http, sdmx};

/// HTTP client for the two metrics datasets.
#[derive(Debug, Clone)]
pub struct EurostatClient {
    client: reqwest::Client,
    waste: DatasetEndpoint,
    population: DatasetEndpoint,
}

impl EurostatClient {
    /// Creates a client for the given endpoints.
    ///
    /// `timeout` bounds each request end to end; `None` leaves requests
    /// unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying HTTP client cannot
    /// be built (e.g., the TLS backend fails to initialize).
    pub fn new(
        waste: DatasetEndpoint,
        population: DatasetEndpoint,
        timeout: Option<Duration>,
    ) -> Result<Self, SourceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            waste,
            population,
        })
    }

    /// Returns the endpoint used for `dataset`.
    #[must_use]
    pub const fn endpoint(&self, dataset: Dataset) -> &DatasetEndpoint {
        match dataset {
            Dataset::Waste => &self.waste,
            Dataset::Population => &self.population,
        }
    }
}

#[async_trait]
impl DatasetFetcher for EurostatClient {
    async fn fetch_dataset(&self, dataset: Dataset) -> Result<EntityLookup, SourceError> {
        let endpoint = self.endpoint(dataset);
        log::info!("Fetching Eurostat {dataset} data from {}", endpoint.url);

        let body = http::send_text(self.client.get(&endpoint.url).query(&endpoint.query)).await?;
        let lookup = sdmx::parse_sdmx_str(&body)?;

        log::info!("Parsed {} {dataset} entries", lookup.len());
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves one HTTP request on loopback with `response`, returning the
    /// base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}")
    }

    fn endpoint(url: &str) -> DatasetEndpoint {
        DatasetEndpoint {
            url: url.to_string(),
            query: std::iter::once(("time".to_string(), "2023".to_string())).collect(),
        }
    }

    #[test]
    fn selects_endpoint_per_dataset() {
        let client = EurostatClient::new(
            endpoint("http://127.0.0.1:9/waste"),
            endpoint("http://127.0.0.1:9/population"),
            Some(Duration::from_secs(1)),
        )
        .unwrap();

        assert!(client.endpoint(Dataset::Waste).url.ends_with("/waste"));
        assert!(
            client
                .endpoint(Dataset::Population)
                .url
                .ends_with("/population")
        );
    }

    #[tokio::test]
    async fn connection_refused_is_a_network_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let client = EurostatClient::new(
            endpoint("http://127.0.0.1:9/waste"),
            endpoint("http://127.0.0.1:9/population"),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let err = client.fetch_dataset(Dataset::Waste).await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let base = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;
        let client = EurostatClient::new(
            endpoint(&format!("{base}/waste")),
            endpoint(&format!("{base}/population")),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let err = client.fetch_dataset(Dataset::Waste).await.unwrap_err();

        match &err {
            SourceError::Status { url, status } => {
                assert_eq!(*status, 503);
                assert!(url.contains("/waste?time=2023"), "unexpected url: {url}");
            }
            other => panic!("expected status error, got {other}"),
        }
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn success_body_is_parsed() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 99\r\n\
             Connection: close\r\n\r\n\
             {\"value\":{\"0\":512.0},\"dimension\":{\"geo\":{\"category\":\
             {\"index\":{\"PT\":0},\"label\":{\"PT\":\"Portugal\"}}}}}",
        )
        .await;
        let client = EurostatClient::new(
            endpoint(&format!("{base}/waste")),
            endpoint(&format!("{base}/population")),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let lookup = client.fetch_dataset(Dataset::Waste).await.unwrap();

        assert_eq!(lookup["PT"].name, "Portugal");
        assert!((lookup["PT"].value - 512.0).abs() < f64::EPSILON);
    }
}
