//! Authenticated HTTP transport for the Trazo API
//!
//! This module implements [`Transport`], the single boundary between the
//! client and the server. It owns the `reqwest` client, the validated base
//! URL, and the process-wide credential slot that resource calls read on
//! every dispatch.
//!
//! # Credential attachment
//!
//! The token lives in an `Arc<RwLock<Option<String>>>` with exactly one
//! writer (the session manager) and many readers (every resource call).
//! [`Transport::set_token`] completes the write before it returns, so a
//! call issued after `login()` resolves always carries the fresh token.
//! Requests built through [`Transport::request`] attach
//! `Authorization: Token <token>` when a token is present; requests built
//! through [`Transport::request_public`] never attach one, even when a
//! stale token is still set (login and registration must not carry
//! credentials).
//!
//! # Response classification
//!
//! Every response passes through one classification point that maps HTTP
//! status codes onto [`ApiError`] variants and extracts the server's
//! `detail` / field-error payload exactly once. Callers match on error
//! kinds; no status codes or response shapes leak past this module.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::error::{ApiError, Result};

/// HTTP transport with automatic credential attachment.
///
/// Cloning is cheap: clones share the underlying connection pool and the
/// token slot, so a token written through one handle is visible to all.
#[derive(Debug, Clone)]
pub struct Transport {
    /// Underlying reqwest HTTP client.
    http_client: reqwest::Client,
    /// Validated API base URL; endpoint paths are joined onto it.
    base: Url,
    /// Process-wide token slot. Single writer, many readers.
    token: Arc<RwLock<Option<String>>>,
}

impl Transport {
    /// Construct a transport targeting `base_url`.
    ///
    /// No network I/O is performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base_url` does not parse
    /// as an absolute URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        // Url::join treats the last path segment as a file when the base
        // lacks a trailing slash, which would drop it from every request.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http_client: reqwest::Client::new(),
            base,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Replace the credential used by subsequent requests.
    ///
    /// The write completes before this returns: any request dispatched
    /// afterwards observes the new value. `None` clears the credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use trazo::transport::Transport;
    ///
    /// # tokio_test::block_on(async {
    /// let transport = Transport::new("http://localhost:8000/api/").unwrap();
    /// transport.set_token(Some("abc123".to_string())).await;
    /// assert_eq!(transport.current_token().await.as_deref(), Some("abc123"));
    /// # });
    /// ```
    pub async fn set_token(&self, token: Option<String>) {
        let mut slot = self.token.write().await;
        *slot = token;
    }

    /// The currently attached token, if any.
    pub async fn current_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Join an endpoint path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", path, e)))
    }

    /// Build a request that attaches the current token when one is set.
    async fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.endpoint(path)?;
        let mut req = self.http_client.request(method, url);
        {
            let token = self.token.read().await;
            if let Some(ref token) = *token {
                req = req.header("Authorization", format!("Token {}", token));
            }
        }
        Ok(req)
    }

    /// Build a request that never carries a credential, for the public
    /// login and registration endpoints.
    fn request_public(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.endpoint(path)?;
        Ok(self.http_client.request(method, url))
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!("GET {}", path);
        let req = self.request(Method::GET, path).await?;
        let response = req.send().await?;
        let response = classify(path, response).await?;
        read_json(response).await
    }

    /// POST `body` to `path` and decode the JSON body.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {}", path);
        let req = self.request(Method::POST, path).await?;
        let response = req.json(body).send().await?;
        let response = classify(path, response).await?;
        read_json(response).await
    }

    /// POST `body` to `path`, ignoring any response body.
    pub async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<()> {
        tracing::debug!("POST {}", path);
        let req = self.request(Method::POST, path).await?;
        let response = req.json(body).send().await?;
        classify(path, response).await?;
        Ok(())
    }

    /// POST to `path` with no body, ignoring any response body.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        tracing::debug!("POST {}", path);
        let req = self.request(Method::POST, path).await?;
        let response = req.send().await?;
        classify(path, response).await?;
        Ok(())
    }

    /// PUT `body` to `path`, ignoring any response body.
    pub async fn put_no_content<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        tracing::debug!("PUT {}", path);
        let req = self.request(Method::PUT, path).await?;
        let response = req.json(body).send().await?;
        classify(path, response).await?;
        Ok(())
    }

    /// PUT `body` to `path` and decode the JSON body.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("PUT {}", path);
        let req = self.request(Method::PUT, path).await?;
        let response = req.json(body).send().await?;
        let response = classify(path, response).await?;
        read_json(response).await
    }

    /// PATCH `body` to `path` and decode the JSON body.
    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("PATCH {}", path);
        let req = self.request(Method::PATCH, path).await?;
        let response = req.json(body).send().await?;
        let response = classify(path, response).await?;
        read_json(response).await
    }

    /// DELETE `path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        tracing::debug!("DELETE {}", path);
        let req = self.request(Method::DELETE, path).await?;
        let response = req.send().await?;
        classify(path, response).await?;
        Ok(())
    }

    /// POST `body` to `path` without credentials and decode the JSON body.
    ///
    /// Used only by the login and registration flows.
    pub async fn post_public<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {} (public)", path);
        let req = self.request_public(Method::POST, path)?;
        let response = req.json(body).send().await?;
        let response = classify(path, response).await?;
        read_json(response).await
    }
}

/// Map a non-success response onto the error taxonomy, consuming the body
/// for its `detail` payload. Success responses pass through untouched.
async fn classify(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body, status.as_u16());
    tracing::debug!("{} returned {}: {}", path, status, detail);

    match status.as_u16() {
        401 => Err(ApiError::AuthenticationRequired),
        403 => Err(ApiError::PermissionDenied(detail)),
        404 => Err(ApiError::NotFound(path.to_string())),
        405 => Err(ApiError::MethodNotAllowed(path.to_string())),
        409 => Err(ApiError::VersionConflict),
        400 | 422 => Err(ApiError::ValidationFailed { detail }),
        status => Err(ApiError::Server { status, detail }),
    }
}

/// Extract a human-readable detail string from an error body.
///
/// The server reports errors either as `{"detail": "..."}` or as a map of
/// field names to message lists. Both are flattened here, once, so no
/// other module inspects error bodies.
fn extract_detail(body: &str, status: u16) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return format!("HTTP {}", status);
        }
        return trimmed.to_string();
    };

    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return detail.to_string();
    }

    if let Some(map) = value.as_object() {
        let mut parts = Vec::new();
        for (field, messages) in map {
            let rendered = match messages {
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            parts.push(format!("{}: {}", field, rendered));
        }
        if !parts.is_empty() {
            return parts.join("; ");
        }
    }

    format!("HTTP {}", status)
}

/// Decode a success response body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to decode response body: {}", e);
        ApiError::Decode(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = Transport::new("not a url");
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_new_accepts_http_base_url() {
        let transport = Transport::new("http://localhost:8000/api/").unwrap();
        let url = transport.endpoint("/projects/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/projects/");
    }

    #[test]
    fn test_new_normalizes_a_missing_trailing_slash() {
        let transport = Transport::new("http://localhost:8000/api").unwrap();
        let url = transport.endpoint("/projects/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/projects/");
    }

    #[test]
    fn test_endpoint_joins_nested_paths() {
        let transport = Transport::new("http://localhost:8000/api/").unwrap();
        let url = transport.endpoint("/projects/3/collaborators/").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/projects/3/collaborators/"
        );
    }

    #[tokio::test]
    async fn test_set_token_is_visible_to_readers() {
        let transport = Transport::new("http://localhost:8000/").unwrap();
        assert!(transport.current_token().await.is_none());

        transport.set_token(Some("abc123".to_string())).await;
        assert_eq!(transport.current_token().await.as_deref(), Some("abc123"));

        transport.set_token(None).await;
        assert!(transport.current_token().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_the_token_slot() {
        let transport = Transport::new("http://localhost:8000/").unwrap();
        let clone = transport.clone();
        transport.set_token(Some("abc123".to_string())).await;
        assert_eq!(clone.current_token().await.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_detail_prefers_detail_field() {
        let body = r#"{"detail": "Invalid token."}"#;
        assert_eq!(extract_detail(body, 401), "Invalid token.");
    }

    #[test]
    fn test_extract_detail_flattens_field_errors() {
        let body = r#"{"name": ["This field is required."]}"#;
        assert_eq!(extract_detail(body, 400), "name: This field is required.");
    }

    #[test]
    fn test_extract_detail_falls_back_to_raw_body() {
        assert_eq!(extract_detail("gateway timeout", 504), "gateway timeout");
    }

    #[test]
    fn test_extract_detail_empty_body_reports_status() {
        assert_eq!(extract_detail("", 500), "HTTP 500");
    }
}
