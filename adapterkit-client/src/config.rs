//! Client configuration.

use adapterkit_pipe::ClusterConnectionInfo;
use serde::{Deserialize, Serialize};

/// Settings for [`TokenAuthHttpClient`](crate::TokenAuthHttpClient).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and path prefix of the host API (e.g. `https://ops.example.com/suite-api`).
    pub base_url: String,
    /// Path of the REST API below `base_url`.
    pub api_base_path: String,
    pub username: String,
    pub password: String,
    /// Authentication source sent with the token request.
    pub auth_source: String,
    /// Header that carries the session token.
    pub auth_header: String,
    /// Scheme written before the token in `auth_header`.
    pub auth_scheme: String,
    /// Maximum number of requests in flight at once.
    pub max_connections: usize,
    pub request_timeout_secs: u64,
    /// Hosts commonly run with self-signed certificates.
    pub accept_invalid_certs: bool,
    /// A token this close to expiry is re-acquired before use.
    pub token_expiry_margin_secs: u64,
    /// Header sent with requests to unsupported (`internal`) APIs.
    pub unsupported_api_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_base_path: "/api".to_string(),
            username: String::new(),
            password: String::new(),
            auth_source: "LOCAL".to_string(),
            auth_header: "Authorization".to_string(),
            auth_scheme: "vRealizeOpsToken".to_string(),
            max_connections: 10,
            request_timeout_secs: 60,
            accept_invalid_certs: true,
            token_expiry_margin_secs: 10,
            unsupported_api_header: "X-vRealizeOps-API-use-unsupported".to_string(),
        }
    }
}

impl ClientConfig {
    /// Builds a config for the host described in an adapter instance.
    ///
    /// `host_name` may be a bare host or a URL; `https://` and the
    /// `/suite-api` prefix are added when missing.
    pub fn from_connection_info(info: &ClusterConnectionInfo) -> Self {
        let host = info.host_name.trim().trim_end_matches('/');
        let mut base_url = if host.starts_with("https://") || host.starts_with("http://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        if !base_url.ends_with("/suite-api") {
            base_url.push_str("/suite-api");
        }

        Self {
            base_url,
            username: info.user_name.clone(),
            password: info.password.clone(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_base_path", &self.api_base_path)
            .field("username", &self.username)
            .field("password", &"***")
            .field("auth_source", &self.auth_source)
            .field("max_connections", &self.max_connections)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish_non_exhaustive()
    }
}
