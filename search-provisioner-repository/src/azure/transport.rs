//! Azure AI Search transport implementation.
//!
//! Issues one `PUT {endpoint}/{collection}/{name}?api-version=...` per
//! resource, authenticated with the admin `api-key` header.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::TransportConfig;
use crate::errors::ProvisionError;
use crate::interfaces::{SearchServiceTransport, TransportResponse};
use search_provisioner_shared::ResourceKind;

/// REST transport for Azure AI Search.
///
/// # Example
///
/// ```ignore
/// let transport = AzureSearchTransport::new(
///     "https://my-service.search.windows.net",
///     admin_key,
///     TransportConfig::default(),
/// )?;
/// let response = transport
///     .put(ResourceKind::Index, "docs", &json!({ "name": "docs" }))
///     .await?;
/// ```
pub struct AzureSearchTransport {
    http: Client,
    endpoint: Url,
    api_key: String,
    api_version: String,
}

impl AzureSearchTransport {
    /// Create a transport for the given service endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The search service URL (e.g., "https://svc.search.windows.net")
    /// * `api_key` - Admin key sent as the `api-key` header
    /// * `config` - API version and timeout
    ///
    /// # Returns
    ///
    /// * `Ok(AzureSearchTransport)` - A new transport instance
    /// * `Err(ProvisionError)` - If the endpoint is not a usable base URL or the client fails to build
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        config: TransportConfig,
    ) -> Result<Self, ProvisionError> {
        let parsed = Url::parse(endpoint).map_err(|e| {
            ProvisionError::transport(format!("Invalid endpoint {}: {}", endpoint, e))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ProvisionError::transport(format!(
                "Endpoint {} cannot be used as a base URL",
                endpoint
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ProvisionError::transport(e.to_string()))?;

        info!(
            endpoint = %parsed,
            api_version = %config.api_version,
            "Created search service transport"
        );

        Ok(Self {
            http,
            endpoint: parsed,
            api_key: api_key.into(),
            api_version: config.api_version,
        })
    }

    /// URL a resource is declared at.
    pub fn resource_url(&self, kind: ResourceKind, name: &str) -> Result<Url, ProvisionError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ProvisionError::transport("Endpoint cannot be used as a base URL"))?
            .pop_if_empty()
            .push(kind.collection())
            .push(name);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

#[async_trait]
impl SearchServiceTransport for AzureSearchTransport {
    #[instrument(skip(self, body), fields(collection = kind.collection()))]
    async fn put(
        &self,
        kind: ResourceKind,
        name: &str,
        body: &Value,
    ) -> Result<TransportResponse, ProvisionError> {
        let url = self.resource_url(kind, name)?;
        debug!(url = %url, "Sending PUT");

        let response = self
            .http
            .put(url)
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProvisionError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = body_text(status, response.text().await);

        Ok(TransportResponse { status, body })
    }
}

/// Response body for diagnostics. A body that cannot be read is described
/// instead of dropped.
fn body_text<E: fmt::Display>(status: u16, body: Result<String, E>) -> String {
    body.unwrap_or_else(|e| {
        warn!(status, error = %e, "Failed to read response body");
        format!("<unreadable body: {}>", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(endpoint: &str) -> AzureSearchTransport {
        AzureSearchTransport::new(endpoint, "admin-key", TransportConfig::default()).unwrap()
    }

    #[test]
    fn test_resource_url() {
        let t = transport("https://svc.search.windows.net");
        let url = t.resource_url(ResourceKind::Skillset, "skill1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://svc.search.windows.net/skillsets/skill1?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_resource_url_trailing_slash() {
        let t = transport("https://svc.search.windows.net/");
        let url = t.resource_url(ResourceKind::DataSource, "ds1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://svc.search.windows.net/datasources/ds1?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_resource_url_custom_version() {
        let t = AzureSearchTransport::new(
            "https://svc.search.windows.net",
            "k",
            TransportConfig::default().with_api_version("2024-05-01-preview"),
        )
        .unwrap();
        let url = t.resource_url(ResourceKind::Indexer, "job1").unwrap();
        assert_eq!(url.query(), Some("api-version=2024-05-01-preview"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result =
            AzureSearchTransport::new("not a url", "k", TransportConfig::default());
        assert!(matches!(result, Err(ProvisionError::Transport(_))));
    }

    #[tokio::test]
    async fn test_put_sends_key_version_and_body() {
        let server = MockServer::start().await;
        let payload = json!({ "name": "idx1", "fields": [] });

        Mock::given(method("PUT"))
            .and(path("/indexes/idx1"))
            .and(query_param("api-version", "2024-07-01"))
            .and(header("api-key", "admin-key"))
            .and(header("content-type", "application/json"))
            .and(body_json(payload.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport(&server.uri())
            .put(ResourceKind::Index, "idx1", &payload)
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, "{}");
    }

    #[tokio::test]
    async fn test_put_returns_rejection_status() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/datasources/ds1"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("{\"error\":\"bad credentials\"}"),
            )
            .mount(&server)
            .await;

        let response = transport(&server.uri())
            .put(ResourceKind::DataSource, "ds1", &json!({}))
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert!(response.body.contains("bad credentials"));
    }

    #[test]
    fn test_unreadable_body_is_described() {
        assert_eq!(body_text::<String>(400, Ok("bad".to_string())), "bad");
        assert_eq!(
            body_text(502, Err("connection reset")),
            "<unreadable body: connection reset>"
        );
    }

    #[tokio::test]
    async fn test_put_connection_failure() {
        let t = transport("http://127.0.0.1:1");
        let result = t.put(ResourceKind::Index, "idx1", &json!({})).await;
        assert!(matches!(result, Err(ProvisionError::Transport(_))));
    }
}
