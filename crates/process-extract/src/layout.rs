//! Auto-layout service seam
//!
//! An auto-layout service takes a complete process document and returns the
//! same document with recomputed geometry. It is optional and untrusted:
//! the extractor builds a valid document first and only swaps in the
//! service's output when the call succeeds.

use async_trait::async_trait;

use crate::error::LayoutError;

/// Recomputes diagram geometry for a whole process document
#[async_trait]
pub trait AutoLayoutService: Send + Sync {
    /// Return a re-laid-out copy of `xml`
    async fn layout(&self, xml: &str) -> Result<String, LayoutError>;
}

/// Check that a service response looks like a process document
pub fn validate_layout_output(xml: &str) -> Result<(), LayoutError> {
    let trimmed = xml.trim();
    if trimmed.is_empty() {
        return Err(LayoutError::InvalidResponse("empty document".to_string()));
    }
    if !trimmed.contains("definitions") {
        return Err(LayoutError::InvalidResponse(
            "document has no definitions element".to_string(),
        ));
    }
    Ok(())
}

/// Layout service reached over HTTP
///
/// The document is POSTed as `application/xml` and the response body is
/// taken as the laid-out document.
pub struct HttpLayoutService {
    /// HTTP client for layout requests
    http_client: reqwest::Client,
    /// Endpoint accepting the document
    endpoint: String,
}

impl HttpLayoutService {
    /// Create a client for the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Use an existing HTTP client (shared connection pool, proxies, etc.)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AutoLayoutService for HttpLayoutService {
    async fn layout(&self, xml: &str) -> Result<String, LayoutError> {
        log::debug!("Requesting layout from {}", self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(xml.to_string())
            .send()
            .await
            .map_err(LayoutError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LayoutError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let laid_out = response.text().await.map_err(LayoutError::Http)?;
        validate_layout_output(&laid_out)?;
        Ok(laid_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_layout_output() {
        assert!(validate_layout_output("<bpmn:definitions></bpmn:definitions>").is_ok());
        assert!(matches!(
            validate_layout_output("   "),
            Err(LayoutError::InvalidResponse(_))
        ));
        assert!(matches!(
            validate_layout_output("<html>oops</html>"),
            Err(LayoutError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_http_service_unreachable() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let service = HttpLayoutService::new("http://127.0.0.1:9/layout");
        let result = service.layout("<bpmn:definitions />").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_service_with_shared_client() {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();
        let service = HttpLayoutService::new("http://127.0.0.1:9/layout").with_client(client);
        assert_eq!(service.endpoint(), "http://127.0.0.1:9/layout");
        assert!(matches!(
            service.layout("<bpmn:definitions />").await,
            Err(LayoutError::Http(_))
        ));
    }
}
