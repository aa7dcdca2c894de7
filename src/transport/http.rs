//! HTTP request/response transport for collection CRUD.
//!
//! Every call sends one request, reads the whole body and decodes it as
//! JSON. The status code is not inspected unless the client opted in with
//! `error_for_status`, so a server-side failure normally arrives as a
//! successfully decoded error body.

// ============================================================================
// Imports
// ============================================================================

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Content type for request bodies.
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// HttpTransport
// ============================================================================

/// Thin JSON layer over a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    error_for_status: bool,
}

impl HttpTransport {
    /// Creates a transport over an existing HTTP client.
    #[inline]
    #[must_use]
    pub fn new(client: reqwest::Client, error_for_status: bool) -> Self {
        Self {
            client,
            error_for_status,
        }
    }

    /// Returns the underlying HTTP client.
    #[inline]
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Sends a request without a body.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`] on network failure
    /// - [`Error::Json`] if the response body is not valid JSON for `T`
    /// - [`Error::Status`] on a non-2xx status, only with `error_for_status`
    pub async fn send<T>(&self, method: Method, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        trace!(%method, %url, "HTTP request");
        let request = self.client.request(method.clone(), url);
        self.execute(method, request).await
    }

    /// Sends a request with a JSON body.
    ///
    /// Sets `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`Error::Json`] if `body` cannot
    /// be serialized.
    pub async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        trace!(%method, %url, bytes = payload.len(), "HTTP request with JSON body");

        let request = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(payload);

        self.execute(method, request).await
    }

    /// Sends the request and decodes the response body.
    async fn execute<T>(&self, method: Method, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;

        debug!(%method, %url, %status, bytes = body.len(), "HTTP response");

        if self.error_for_status && !status.is_success() {
            return Err(Error::status(status, String::from_utf8_lossy(&body)));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<HttpTransport>();
    }

    #[tokio::test]
    async fn test_unserializable_body_is_decode_error() {
        use std::collections::BTreeMap;

        // Non-string map keys cannot be encoded as JSON object keys.
        let mut body = BTreeMap::new();
        body.insert(vec![1u8], "x");

        let transport = HttpTransport::new(reqwest::Client::new(), false);
        let url = Url::parse("http://127.0.0.1:9/users").expect("url");
        let err = transport
            .send_json::<_, serde_json::Value>(Method::POST, url, &body)
            .await
            .unwrap_err();

        assert!(err.is_decode_error());
    }

    #[tokio::test]
    async fn test_network_failure_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let transport = HttpTransport::new(reqwest::Client::new(), false);
        let url = Url::parse(&format!("http://127.0.0.1:{port}/users")).expect("url");
        let err = transport
            .send::<serde_json::Value>(Method::GET, url)
            .await
            .unwrap_err();

        assert!(err.is_transport_error());
    }
}
