//! Gateway adapter for the unauthenticated auth endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ApiTransport, Auth, Envelope};
use crate::domain::{
    AuthGateway, ClientError, ClientResult, LoginCredentials, LoginOutcome, NewRegistration,
    SessionToken, User,
};

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct RegisteredData {
    user: User,
}

/// Reqwest-backed [`AuthGateway`].
pub struct HttpAuthGateway {
    transport: Arc<ApiTransport>,
}

impl HttpAuthGateway {
    /// Build the gateway over a shared transport.
    #[must_use]
    pub const fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<LoginOutcome> {
        let payload = json!({
            "username": credentials.username(),
            "password": credentials.password(),
        });
        let envelope: Envelope<LoginData> = self
            .transport
            .post("public/auth/login", &payload, Auth::Public)
            .await?;
        let token = SessionToken::new(envelope.data.token)
            .map_err(|_| ClientError::request_failed("login response carried an empty token"))?;
        Ok(LoginOutcome {
            token,
            user: envelope.data.user,
        })
    }

    async fn register(&self, registration: &NewRegistration) -> ClientResult<User> {
        let envelope: Envelope<RegisteredData> = self
            .transport
            .post("public/auth/register", registration, Auth::Public)
            .await?;
        Ok(envelope.data.user)
    }
}
