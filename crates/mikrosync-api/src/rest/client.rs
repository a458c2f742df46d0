// RouterOS REST HTTP client
//
// Wraps `reqwest::Client` with basic auth, `/rest` URL construction and
// RouterOS error-body decoding. Menu-specific calls live in `commands.rs`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::record::{RawRecord, records_from_value};
use crate::transport::TransportConfig;

/// HTTP client for the RouterOS v7 REST API.
///
/// Every menu path (`/ip/arp`) maps onto `{base}/rest/ip/arp`. All calls
/// authenticate with HTTP basic auth; the router keeps no session state.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the router root, e.g. `https://192.168.88.1`.
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, username, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username: username.into(),
            password,
        }
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the REST URL for a menu path: `{base}/rest/{path}`.
    pub(crate) fn rest_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/rest/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the record list.
    pub(crate) async fn get(&self, url: Url) -> Result<Vec<RawRecord>, Error> {
        debug!("GET {}", url);
        let req = self.http.get(url);
        self.send(req).await
    }

    /// Send a POST request with JSON body and decode the record list.
    pub(crate) async fn post(&self, url: Url, body: &Value) -> Result<Vec<RawRecord>, Error> {
        debug!("POST {}", url);
        let req = self.http.post(url).json(body);
        self.send(req).await
    }

    /// Send a PATCH request with JSON body and decode the record list.
    pub(crate) async fn patch(&self, url: Url, body: &Value) -> Result<Vec<RawRecord>, Error> {
        debug!("PATCH {}", url);
        let req = self.http.patch(url).json(body);
        self.send(req).await
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Vec<RawRecord>, Error> {
        let resp = req
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_records(resp).await
    }

    /// Decode a response body into records, translating RouterOS error
    /// bodies (`{"error": 400, "message": ..., "detail": ...}`) into
    /// `Error::Router`.
    async fn parse_records(resp: reqwest::Response) -> Result<Vec<RawRecord>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("router answered HTTP {}", status.as_u16()),
            });
        }

        // Menus missing on this model or firmware read as "no data".
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("menu not found, treating as empty");
            return Ok(Vec::new());
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Router {
                status: status.as_u16(),
                message: router_error_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

        records_from_value(value).ok_or_else(|| Error::Deserialization {
            message: "expected a JSON object or array".into(),
            body,
        })
    }
}

/// Pull the most specific message out of a RouterOS error body.
fn router_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
        })
        .map_or_else(|| body.trim().to_owned(), str::to_owned)
}
