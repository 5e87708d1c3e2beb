//! HTTP probe for the shop API.
//!
//! Sends one request and hands back the raw response body. A non-2xx status
//! is not an error here: the API reports failures in its JSON body, and each
//! check decides what the body means. Only transport failures are errors.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use shop_smoke_core::BearerToken;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors that can occur while probing the API.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    /// The request path could not be joined onto the base URL.
    #[error("Invalid request path {path}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// The request body could not be encoded.
    #[error("Failed to encode request body for {path}: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be sent or its body could not be read.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A single request against the API.
#[derive(Debug)]
pub struct ProbeRequest<'a> {
    method: Method,
    path: &'a str,
    bearer: Option<&'a BearerToken>,
    body: Option<Value>,
}

impl<'a> ProbeRequest<'a> {
    /// A `GET` request for `path`.
    #[must_use]
    pub const fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            bearer: None,
            body: None,
        }
    }

    /// A `POST` request for `path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Encode` if `body` cannot be serialized.
    pub fn post(path: &'a str, body: &impl Serialize) -> Result<Self, ProbeError> {
        let body = serde_json::to_value(body).map_err(|source| ProbeError::Encode {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self {
            method: Method::POST,
            path,
            bearer: None,
            body: Some(body),
        })
    }

    /// Attach a bearer credential.
    #[must_use]
    pub fn bearer(mut self, token: &'a BearerToken) -> Self {
        self.bearer = Some(token);
        self
    }
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiProbe {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiProbe {
    /// Create a probe for `base_url`.
    ///
    /// The base URL should end in `/`; request paths are joined beneath it.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Client` if the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shop-smoke/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self { client, base_url })
    }

    /// Resolve an API path (with or without a leading `/`) to a full URL.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::InvalidPath` if the path cannot be joined.
    pub fn url_for(&self, path: &str) -> Result<Url, ProbeError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ProbeError::InvalidPath {
                path: path.to_owned(),
                source,
            })
    }

    /// Send `request` and return the response body as text.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Transport` if the request cannot be sent or the
    /// body cannot be read. The response status is never an error.
    #[instrument(skip(self, request), fields(method = %request.method, path = request.path))]
    pub async fn call(&self, request: ProbeRequest<'_>) -> Result<String, ProbeError> {
        let url = self.url_for(request.path)?;
        let transport = |source: reqwest::Error| ProbeError::Transport {
            url: url.to_string(),
            source,
        };

        let mut builder = self.client.request(request.method, url.clone());
        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        debug!(%status, bytes = body.len(), "Received response");
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shop_smoke_core::CartItemRequest;

    use super::*;

    fn probe(base: &str) -> ApiProbe {
        ApiProbe::new(Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn test_url_for_joins_under_base() {
        let probe = probe("http://localhost:3001/");
        assert_eq!(
            probe.url_for("/api/products").unwrap().as_str(),
            "http://localhost:3001/api/products"
        );
        assert_eq!(
            probe.url_for("api/cart/items").unwrap().as_str(),
            "http://localhost:3001/api/cart/items"
        );
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let probe = probe("https://staging.example.com/shop/");
        assert_eq!(
            probe.url_for("/api/orders").unwrap().as_str(),
            "https://staging.example.com/shop/api/orders"
        );
    }

    #[test]
    fn test_post_encodes_body() {
        let request = ProbeRequest::post("/api/cart/items", &CartItemRequest::sample()).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.body,
            Some(serde_json::json!({"productId": 1, "quantity": 2}))
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port 9 (discard) is not expected to have an HTTP listener.
        let probe = probe("http://127.0.0.1:9/");
        let err = probe.call(ProbeRequest::get("/api/products")).await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport { .. }));
    }
}
