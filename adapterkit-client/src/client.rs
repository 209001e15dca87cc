//! Token-authenticated client with a bounded connection pool.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use adapterkit_model::{Identifier, Key, Object, now_millis};
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::{debug, info, warn};

/// Page size used by [`TokenAuthHttpClient::query_for_resources`].
pub const DEFAULT_PAGE_SIZE: usize = 1000;

const RESOURCE_QUERY_PATH: &str = "/resources/query";

/// A session token and the epoch millisecond it stops being accepted.
#[derive(Debug, Clone)]
struct AuthToken {
    token: String,
    validity: i64,
}

impl AuthToken {
    fn is_valid(&self, margin_secs: u64) -> bool {
        let margin_ms = i64::try_from(margin_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        self.validity > now_millis().saturating_add(margin_ms)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
    auth_source: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: String,
    validity: i64,
    #[serde(default)]
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceKey {
    adapter_kind_key: String,
    resource_kind_key: String,
    name: String,
    #[serde(default)]
    resource_identifiers: Vec<ResourceIdentifier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceIdentifier {
    identifier_type: IdentifierType,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifierType {
    name: String,
    is_part_of_uniqueness: bool,
}

impl From<ResourceKey> for Key {
    fn from(key: ResourceKey) -> Self {
        let identifiers = key
            .resource_identifiers
            .into_iter()
            .map(|id| Identifier {
                key: id.identifier_type.name,
                value: id.value,
                is_part_of_uniqueness: id.identifier_type.is_part_of_uniqueness,
            })
            .collect();
        Key::new(
            key.adapter_kind_key,
            key.resource_kind_key,
            key.name,
            identifiers,
        )
    }
}

/// HTTP client for the host API.
///
/// The client starts unauthenticated. The first request acquires a token;
/// a request answered with 401 drops the token, acquires a new one and is
/// retried exactly once. Token acquisition is serialized, so concurrent
/// callers that all see a 401 share one re-acquisition.
///
/// At most `max_connections` requests are in flight; further callers wait.
/// Call [`close`](Self::close) when done to release the token on the host.
pub struct TokenAuthHttpClient {
    config: ClientConfig,
    http: Client,
    token: Mutex<Option<AuthToken>>,
    throttle: RwLock<Arc<Semaphore>>,
}

impl TokenAuthHttpClient {
    /// Creates an unauthenticated client.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::InvalidConfig("base_url is empty".to_string()));
        }
        if config.max_connections == 0 {
            return Err(ClientError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to create HTTP client: {e}")))?;

        let throttle = RwLock::new(Arc::new(Semaphore::new(config.max_connections)));
        Ok(Self {
            config,
            http,
            token: Mutex::new(None),
            throttle,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Acquires a token now unless a usable one is already held.
    pub async fn authenticate(&self) -> ClientResult<()> {
        self.current_token().await.map(|_| ())
    }

    /// Changes the connection limit.
    ///
    /// Requests already in flight finish under the old limit.
    pub async fn set_max_connections(&self, max_connections: usize) -> ClientResult<()> {
        if max_connections == 0 {
            return Err(ClientError::InvalidConfig(
                "max_connections must be at least 1".to_string(),
            ));
        }
        *self.throttle.write().await = Arc::new(Semaphore::new(max_connections));
        debug!(max_connections, "connection limit changed");
        Ok(())
    }

    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        self.send(Method::DELETE, path, None).await
    }

    /// Fetches every page of a paginated GET endpoint and returns the
    /// concatenated `array_field` elements in page order.
    pub async fn get_paged(
        &self,
        path: &str,
        array_field: &str,
        page_size: usize,
    ) -> ClientResult<Vec<Value>> {
        self.paged(Method::GET, path, None, array_field, page_size)
            .await
    }

    /// Like [`get_paged`](Self::get_paged), posting `body` with every page request.
    pub async fn post_paged(
        &self,
        path: &str,
        body: &Value,
        array_field: &str,
        page_size: usize,
    ) -> ClientResult<Vec<Value>> {
        self.paged(Method::POST, path, Some(body), array_field, page_size)
            .await
    }

    /// Runs a resource query and returns an object for every resource found.
    ///
    /// The host only honours the first entry of a `name` list, so a query
    /// naming several resources is sent once per name. Entries without a
    /// well-formed `resourceKey` are skipped.
    pub async fn query_for_resources(&self, query: &Value) -> ClientResult<Vec<Object>> {
        if query.get("name").is_some() && query.get("regex").is_some() {
            warn!(
                "'name' and 'regex' are mutually exclusive in resource queries; 'regex' is ignored"
            );
        }

        let queries = match query.get("name").and_then(Value::as_array) {
            Some(names) if names.len() > 1 => names
                .iter()
                .map(|name| {
                    let mut single = query.clone();
                    single["name"] = Value::Array(vec![name.clone()]);
                    single
                })
                .collect(),
            _ => vec![query.clone()],
        };

        let mut objects = Vec::new();
        for body in &queries {
            let resources = self
                .post_paged(RESOURCE_QUERY_PATH, body, "resourceList", DEFAULT_PAGE_SIZE)
                .await?;
            for mut resource in resources {
                let Some(raw) = resource.get_mut("resourceKey").map(Value::take) else {
                    debug!("resource without resourceKey skipped");
                    continue;
                };
                match serde_json::from_value::<ResourceKey>(raw) {
                    Ok(key) => objects.push(Object::new(key.into())),
                    Err(e) => debug!("malformed resourceKey skipped: {e}"),
                }
            }
        }
        debug!(count = objects.len(), "resource query finished");
        Ok(objects)
    }

    /// Releases the token on the host, if one is held, and forgets it.
    ///
    /// A failed release is logged and otherwise ignored.
    pub async fn close(&self) {
        let Some(token) = self.token.lock().await.take() else {
            return;
        };
        if !token.is_valid(self.config.token_expiry_margin_secs) {
            return;
        }
        match self.release(&token.token).await {
            Ok(()) => debug!("token released"),
            Err(e) => warn!(
                "could not release token, it has likely been invalidated already: {e}"
            ),
        }
    }

    // ── Requests ─────────────────────────────────────────────────

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> ClientResult<Value> {
        let url = self.url(path);
        let token = self.current_token().await?;

        let semaphore = self.throttle.read().await.clone();
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| ClientError::Network(format!("connection pool closed: {e}")))?;

        let mut response = self.execute(&method, &url, path, body, &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%method, %url, "request unauthorized, re-acquiring token");
            let fresh = self.refresh_token(&token).await?;
            response = self.execute(&method, &url, path, body, &fresh).await?;
        }

        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "request completed");
        if !status.is_success() {
            return Err(ClientError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(format!("failed to read response from {url}: {e}")))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        path: &str,
        body: Option<&Value>,
        token: &str,
    ) -> ClientResult<reqwest::Response> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                self.config.auth_header.as_str(),
                format!("{} {token}", self.config.auth_scheme),
            );
        if path.contains("internal") {
            debug!(path, "using unsupported API");
            request = request.header(self.config.unsupported_api_header.as_str(), "true");
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("{method} {url} failed: {e}")))
    }

    async fn paged(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        array_field: &str,
        page_size: usize,
    ) -> ClientResult<Vec<Value>> {
        if page_size == 0 {
            return Err(ClientError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }

        let mut elements = Vec::new();
        let mut page = 0usize;
        loop {
            let mut response = self
                .send(method.clone(), &with_paging(path, page, page_size), body)
                .await?;
            let total = response
                .pointer("/pageInfo/totalCount")
                .and_then(Value::as_u64);
            let items = match response.get_mut(array_field).map(Value::take) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };

            let received = items.len();
            elements.extend(items);
            debug!(path, page, received, ?total, "fetched page");

            let reached_total = total.is_some_and(|total| elements.len() as u64 >= total);
            if received < page_size || reached_total {
                break;
            }
            page += 1;
        }
        Ok(elements)
    }

    /// Resolves `path` below the API base path. Paths under `/internal/`
    /// live beside the API rather than below it.
    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let api_prefix = format!("{}/", self.config.api_base_path);
        if path.starts_with("/internal/") || path.starts_with(&api_prefix) {
            format!("{base}{path}")
        } else {
            format!("{base}{}{path}", self.config.api_base_path)
        }
    }

    // ── Token lifecycle ──────────────────────────────────────────

    async fn current_token(&self) -> ClientResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard
            .as_ref()
            .filter(|t| t.is_valid(self.config.token_expiry_margin_secs))
        {
            return Ok(token.token.clone());
        }
        let fresh = self.acquire().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    /// Replaces `stale` after a 401. If another caller already replaced it,
    /// the newer token is reused.
    async fn refresh_token(&self, stale: &str) -> ClientResult<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| {
            t.token != stale && t.is_valid(self.config.token_expiry_margin_secs)
        }) {
            return Ok(token.token.clone());
        }
        *guard = None;
        let fresh = self.acquire().await?;
        let token = fresh.token.clone();
        *guard = Some(fresh);
        Ok(token)
    }

    async fn acquire(&self) -> ClientResult<AuthToken> {
        let url = self.url("/auth/token/acquire");
        debug!(%url, user = %self.config.username, "acquiring token");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&TokenRequest {
                username: &self.config.username,
                password: &self.config.password,
                auth_source: &self.config.auth_source,
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("token acquire failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth {
                status: Some(status.as_u16()),
                message: format!("token acquire returned {status}: {message}"),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| ClientError::Auth {
            status: Some(status.as_u16()),
            message: format!("failed to parse token response: {e}"),
        })?;
        info!(expires_at = ?token.expires_at, "token acquired");
        Ok(AuthToken {
            token: token.token,
            validity: token.validity,
        })
    }

    async fn release(&self, token: &str) -> ClientResult<()> {
        let url = self.url("/auth/token/release");
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                self.config.auth_header.as_str(),
                format!("{} {token}", self.config.auth_scheme),
            )
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("token release failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Status {
                method: Method::POST.to_string(),
                url,
                status: status.as_u16(),
            })
        }
    }
}

fn with_paging(path: &str, page: usize, page_size: usize) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}page={page}&pageSize={page_size}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_parameters_are_appended() {
        assert_eq!(with_paging("/resources", 0, 2), "/resources?page=0&pageSize=2");
        assert_eq!(
            with_paging("/resources?name=a", 3, 50),
            "/resources?name=a&page=3&pageSize=50"
        );
    }

    #[test]
    fn token_validity_respects_margin() {
        let soon = AuthToken {
            token: "t".into(),
            validity: now_millis() + 5_000,
        };
        assert!(!soon.is_valid(10));
        assert!(soon.is_valid(0));
    }

    #[test]
    fn urls_resolve_below_api_base() {
        let client = TokenAuthHttpClient::new(ClientConfig {
            base_url: "https://ops.example.com/suite-api/".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.url("/resources"),
            "https://ops.example.com/suite-api/api/resources"
        );
        assert_eq!(
            client.url("versions/current"),
            "https://ops.example.com/suite-api/api/versions/current"
        );
        assert_eq!(
            client.url("/api/resources"),
            "https://ops.example.com/suite-api/api/resources"
        );
        assert_eq!(
            client.url("/internal/solution"),
            "https://ops.example.com/suite-api/internal/solution"
        );
    }
}
