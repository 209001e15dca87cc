//! HTTP client for the adapter host's REST API.
//!
//! [`TokenAuthHttpClient`] acquires a session token from the host, attaches
//! it to every request, re-acquires it once when a request comes back 401,
//! bounds concurrent requests with a connection limit, and walks
//! `page`/`pageSize` paginated endpoints.

mod client;
mod config;
mod error;

pub use client::{DEFAULT_PAGE_SIZE, TokenAuthHttpClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
