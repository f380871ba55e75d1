//! HTTP client for the platform REST API.
//!
//! [`RestClient`] wraps a shared `reqwest::Client` and maps non-2xx
//! responses through the platform error body `{ "code": int, "message":
//! string }` into [`RestError::Api`]. Every request carries an
//! `x-request-id` header (UUID v7) for correlation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::CirrusConfig;
use crate::errors::{RestError, RestResult};
use crate::urls::Urls;

/// JSON client over the platform REST API.
#[derive(Clone, Debug)]
pub struct RestClient {
    config: Arc<CirrusConfig>,
    client: reqwest::Client,
}

impl RestClient {
    /// Create a client for the given configuration.
    pub fn new(config: Arc<CirrusConfig>) -> RestResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self { config, client })
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(config: Arc<CirrusConfig>, client: reqwest::Client) -> RestResult<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &CirrusConfig {
        &self.config
    }

    /// Endpoint catalog rooted at this client's application path.
    #[must_use]
    pub fn urls(&self) -> Urls {
        Urls::new(self.config.app_path())
    }

    /// GET a JSON resource.
    pub async fn get_json<R: DeserializeOwned>(&self, url: &str) -> RestResult<R> {
        let response = self
            .client
            .get(url)
            .headers(base_headers())
            .send()
            .await?;
        Self::decode(url, "GET", response).await
    }

    /// POST a JSON body, decode a JSON response.
    pub async fn post_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> RestResult<R> {
        let response = self
            .client
            .post(url)
            .headers(base_headers())
            .json(body)
            .send()
            .await?;
        Self::decode(url, "POST", response).await
    }

    /// PUT a JSON body, decode a JSON response.
    pub async fn put_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> RestResult<R> {
        let response = self
            .client
            .put(url)
            .headers(base_headers())
            .json(body)
            .send()
            .await?;
        Self::decode(url, "PUT", response).await
    }

    /// DELETE a resource, ignoring any response body.
    pub async fn delete(&self, url: &str) -> RestResult<()> {
        let response = self
            .client
            .delete(url)
            .headers(base_headers())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            debug!(url, method = "DELETE", status = status.as_u16(), "request ok");
            return Ok(());
        }
        Err(Self::api_error(url, "DELETE", status.as_u16(), response).await)
    }

    async fn decode<R: DeserializeOwned>(
        url: &str,
        method: &str,
        response: reqwest::Response,
    ) -> RestResult<R> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(url, method, status.as_u16(), response).await);
        }
        debug!(url, method, status = status.as_u16(), "request ok");
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn api_error(
        url: &str,
        method: &str,
        status: u16,
        response: reqwest::Response,
    ) -> RestError {
        let body = response.text().await.unwrap_or_default();
        let (message, code, retryable) = parse_api_error(&body, status);
        error!(url, method, status, code, retryable, "API error");
        RestError::Api {
            status,
            code,
            message,
            retryable,
        }
    }
}

/// Headers attached to every request.
fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&Uuid::now_v7().to_string()) {
        let _ = headers.insert("x-request-id", value);
    }
    headers
}

/// Parse a platform error response body.
///
/// Expected shape: `{ "code": 1000, "message": "..." }`. Anything else
/// falls back to an `HTTP <status>` message.
fn parse_api_error(body: &str, status: u16) -> (String, Option<i64>, bool) {
    let retryable = status == 429 || status >= 500;
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();
        let code = json["code"].as_i64();
        (message, code, retryable)
    } else {
        (format!("HTTP {status}: {body}"), None, retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> Arc<CirrusConfig> {
        let mut config = CirrusConfig::new("app-1", "key-1");
        config.base_url = base_url.into();
        config.request_timeout_ms = 2_000;
        Arc::new(config)
    }

    async fn client(server: &MockServer) -> RestClient {
        RestClient::new(test_config(&server.uri())).unwrap()
    }

    // ── Construction ────────────────────────────────────────────────

    #[test]
    fn new_rejects_invalid_config() {
        let config = Arc::new(CirrusConfig::default());
        assert_matches!(
            RestClient::new(config),
            Err(RestError::InvalidConfig { .. })
        );
    }

    #[test]
    fn urls_rooted_at_app_path() {
        let config = test_config("https://api.example.com");
        let client = RestClient::new(config).unwrap();
        assert_eq!(
            client.urls().root(),
            "https://api.example.com/app-1/key-1"
        );
    }

    // ── parse_api_error ─────────────────────────────────────────────

    #[test]
    fn parse_api_error_platform_body() {
        let (msg, code, retryable) =
            parse_api_error(r#"{"code":1009,"message":"Table not found"}"#, 404);
        assert_eq!(msg, "Table not found");
        assert_eq!(code, Some(1009));
        assert!(!retryable);
    }

    #[test]
    fn parse_api_error_non_json_body() {
        let (msg, code, retryable) = parse_api_error("Bad Gateway", 502);
        assert!(msg.contains("502"));
        assert!(code.is_none());
        assert!(retryable);
    }

    #[test]
    fn parse_api_error_429_retryable() {
        let (_, _, retryable) = parse_api_error(r#"{"message":"slow down"}"#, 429);
        assert!(retryable);
    }

    // ── Requests ────────────────────────────────────────────────────

    #[tokio::test]
    async fn get_json_decodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .and(header_exists("x-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": 1})))
            .mount(&server)
            .await;

        let value: Value = client(&server)
            .await
            .get_json(&format!("{}/thing", server.uri()))
            .await
            .unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn post_json_sends_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/thing"))
            .and(body_json(json!({"name": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let value: Value = client(&server)
            .await
            .post_json(&format!("{}/thing", server.uri()), &json!({"name": "x"}))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn api_error_mapped_from_platform_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"code": 1009, "message": "Table not found"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get_json::<Value>(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            RestError::Api { status: 404, code: Some(1009), retryable: false, .. }
        );
    }

    #[tokio::test]
    async fn server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get_json::<Value>(&format!("{}/x", server.uri()))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/thing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(1_693_000_000)))
            .mount(&server)
            .await;

        client(&server)
            .await
            .delete(&format!("{}/thing", server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn malformed_success_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .get_json::<Value>(&format!("{}/x", server.uri()))
            .await
            .unwrap_err();
        assert_matches!(err, RestError::Json(_));
    }
}
