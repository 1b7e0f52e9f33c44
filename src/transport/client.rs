use super::{Transport, TransportRequest, TransportResponse};
use crate::Result;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// Blocking HTTPS transport backed by reqwest.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            e
        })?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: TransportRequest<'_>) -> Result<TransportResponse> {
        let response = self
            .client
            .post(&request.url)
            .header(AUTHORIZATION, format!("Bearer {}", request.api_key))
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", request.url, e);
                e
            })?;

        let status = response.status();
        let body = response.bytes()?.to_vec();

        if !status.is_success() {
            tracing::error!(
                "OpenAI API returned status {} ({} bytes)",
                status,
                body.len()
            );
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}
