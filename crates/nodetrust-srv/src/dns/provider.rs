//! The DNS provider seam and its HTTP REST adapter.

use async_trait::async_trait;
use nodetrust_core::{DnsNameEntry, DnsRecord, NodetrustError, Result};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout for provider calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// External DNS provider API: list, add and clear records.
///
/// The provider's internals are opaque; implementations only promise
/// these three calls. Failures surface as
/// [`NodetrustError::Provider`].
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// All names currently held at the provider.
    async fn get_names(&self) -> Result<Vec<DnsNameEntry>>;

    /// Add the given records.
    async fn add_names(&self, records: &[DnsRecord]) -> Result<()>;

    /// Delete every record under `name`.
    async fn clear_domain(&self, name: &str) -> Result<()>;
}

/// DNS provider backed by a REST API.
///
/// Exchanges JSON with `GET /names`, `POST /names` and
/// `DELETE /names/{domain}` under the configured base URL.
pub struct HttpDnsProvider {
    http: HttpClient,
    base_url: Url,
}

impl HttpDnsProvider {
    /// Create a provider client for the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NodetrustError::Config(format!("provider url: {e}")))?;
        let http = HttpClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| NodetrustError::Provider(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| NodetrustError::Config("provider url cannot be a base".into()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl DnsProvider for HttpDnsProvider {
    async fn get_names(&self) -> Result<Vec<DnsNameEntry>> {
        let url = self.endpoint(&["names"])?;
        debug!(url = %url, "provider get_names");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| NodetrustError::Provider(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NodetrustError::Provider(format!(
                "get_names returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| NodetrustError::Provider(e.to_string()))
    }

    async fn add_names(&self, records: &[DnsRecord]) -> Result<()> {
        let url = self.endpoint(&["names"])?;
        debug!(url = %url, records = records.len(), "provider add_names");
        let response = self
            .http
            .post(url)
            .json(records)
            .send()
            .await
            .map_err(|e| NodetrustError::Provider(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NodetrustError::Provider(format!(
                "add_names returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn clear_domain(&self, name: &str) -> Result<()> {
        let url = self.endpoint(&["names", name])?;
        debug!(url = %url, "provider clear_domain");
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| NodetrustError::Provider(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NodetrustError::Provider(format!(
                "clear_domain returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodetrust_core::RecordType;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_names_parses_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/names"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "ciabc.example.com"},
                {"name": "www.example.com"}
            ])))
            .mount(&server)
            .await;

        let provider = HttpDnsProvider::new(&server.uri()).unwrap();
        let names = provider.get_names().await.unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name, "ciabc.example.com");
    }

    #[tokio::test]
    async fn test_add_names_posts_records() {
        let server = MockServer::start().await;
        let records = vec![
            DnsRecord::new("peer1.example.com", RecordType::A, "1.2.3.4"),
            DnsRecord::new("peer1.example.com", RecordType::AAAA, "::1"),
        ];
        Mock::given(method("POST"))
            .and(path("/names"))
            .and(body_json(&records))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpDnsProvider::new(&server.uri()).unwrap();
        provider.add_names(&records).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_domain_deletes() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/names/peer1.example.com"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpDnsProvider::new(&server.uri()).unwrap();
        provider.clear_domain("peer1.example.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_maps_to_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/names"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = HttpDnsProvider::new(&server.uri()).unwrap();
        let err = provider.get_names().await.unwrap_err();
        assert!(err.is_provider());
    }
}
