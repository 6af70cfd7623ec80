//! Reqwest-backed gateway adapters.
//!
//! The transport owns HTTP details only: endpoint construction, bearer
//! attachment, timeout and transport error mapping, and envelope decoding.
//! One [`ApiTransport`] is shared by every gateway; the session token store
//! is injected rather than read from ambient state.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ClientError, ClientResult, TokenStore};

pub mod auth;
pub mod content;
pub mod envelope;
pub mod users;

pub use self::auth::HttpAuthGateway;
pub use self::content::{HttpProjectsGateway, HttpTemplatesGateway};
pub use self::envelope::{Envelope, Meta};
pub use self::users::HttpUsersGateway;

const DEFAULT_USER_AGENT: &str = concat!("minihome-console/", env!("CARGO_PKG_VERSION"));
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Whether a request needs the session credential attached.
///
/// The envelope decoder also branches on this: a 401 only means the session
/// expired when the request actually carried the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Public endpoint; no credential.
    Public,
    /// Protected endpoint; fails with `Unauthenticated` when no token is
    /// stored, before any network traffic.
    Bearer,
}

/// Outbound identity settings for the transport.
pub struct TransportIdentity {
    /// HTTP user-agent sent with every request.
    pub user_agent: String,
    /// Whole-request timeout applied by the underlying client.
    pub request_timeout: Duration,
}

impl Default for TransportIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared HTTP transport for all resource gateways.
pub struct ApiTransport {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl ApiTransport {
    /// Build a transport with the default outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, tokens: Arc<dyn TokenStore>) -> Result<Self, reqwest::Error> {
        Self::with_identity(base_url, tokens, TransportIdentity::default())
    }

    /// Build a transport with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base_url: Url,
        tokens: Arc<dyn TokenStore>,
        identity: TransportIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(identity.user_agent)
            .timeout(identity.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Join a relative operation path onto the configured base URL, keeping
    /// the base's own path segments (e.g. `/api`) intact.
    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|error| ClientError::request_failed(format!("invalid endpoint {path}: {error}")))
    }

    fn builder(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
    ) -> ClientResult<reqwest::RequestBuilder> {
        let url = self.endpoint(path)?;
        let mut builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        if auth == Auth::Bearer {
            let token = self.tokens.get().ok_or(ClientError::Unauthenticated)?;
            builder = builder.bearer_auth(token.as_str());
        }
        Ok(builder)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: reqwest::RequestBuilder,
        auth: Auth,
    ) -> ClientResult<Envelope<T>> {
        debug!(%method, path, "issuing API request");
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(%method, path, status = status.as_u16(), "API response received");

        let decoded = envelope::decode(status, &body, auth);
        match &decoded {
            Err(ClientError::SessionExpired) => {
                // The credential is dead; drop it so later calls fail fast.
                info!(path, "server rejected the session token; clearing it");
                self.tokens.clear();
            }
            Err(error) => {
                warn!(
                    %method,
                    path,
                    status = status.as_u16(),
                    body = %body_preview(&body),
                    %error,
                    "API request failed"
                );
            }
            Ok(_) => {}
        }
        decoded
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<Envelope<T>> {
        let mut builder = self.builder(Method::GET, path, Auth::Bearer)?;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.execute(Method::GET, path, builder, Auth::Bearer).await
    }

    pub(crate) async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> ClientResult<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.builder(Method::POST, path, auth)?.json(body);
        self.execute(Method::POST, path, builder, auth).await
    }

    pub(crate) async fn patch<B, T>(&self, path: &str, body: &B) -> ClientResult<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.builder(Method::PATCH, path, Auth::Bearer)?.json(body);
        self.execute(Method::PATCH, path, builder, Auth::Bearer).await
    }

    /// PATCH without a body, used by action endpoints such as approve.
    pub(crate) async fn patch_empty<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> ClientResult<Envelope<T>> {
        let builder = self.builder(Method::PATCH, path, Auth::Bearer)?;
        self.execute(Method::PATCH, path, builder, Auth::Bearer).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Envelope<T>> {
        let builder = self.builder(Method::DELETE, path, Auth::Bearer)?;
        self.execute(Method::DELETE, path, builder, Auth::Bearer).await
    }
}

fn map_transport_error(error: reqwest::Error) -> ClientError {
    if error.is_timeout() {
        ClientError::network(format!("request timed out: {error}"))
    } else {
        ClientError::network(error.to_string())
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for endpoint joining and pre-network failure paths.

    use rstest::rstest;

    use super::*;
    use crate::outbound::session::InMemoryTokenStore;

    fn transport() -> ApiTransport {
        let base = Url::parse("https://api.minihome.page/api").expect("base URL parses");
        ApiTransport::new(base, Arc::new(InMemoryTokenStore::new()))
            .expect("client builds with defaults")
    }

    #[rstest]
    #[case("admin/users/list", "https://api.minihome.page/api/admin/users/list")]
    #[case("/admin/users/7", "https://api.minihome.page/api/admin/users/7")]
    #[case("public/auth/login", "https://api.minihome.page/api/public/auth/login")]
    fn endpoint_joins_keep_the_base_path(#[case] path: &str, #[case] expected: &str) {
        let url = transport().endpoint(path).expect("endpoint joins");
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn protected_calls_fail_fast_without_a_token() {
        let err = transport()
            .builder(Method::GET, "admin/users/list", Auth::Bearer)
            .expect_err("no token stored");
        assert_eq!(err, ClientError::Unauthenticated);
    }

    #[test]
    fn public_calls_need_no_token() {
        assert!(
            transport()
                .builder(Method::POST, "public/auth/login", Auth::Public)
                .is_ok()
        );
    }

    #[test]
    fn long_bodies_are_previewed_compactly() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 163);
    }
}
