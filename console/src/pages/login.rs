//! Sign-in workflow.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    AuthGateway, FieldErrors, LoginCredentials, TokenStore, User,
};

/// Sign-in screen: validates credentials, performs the login, and persists
/// the session token on success.
///
/// Every failure is reported as [`FieldErrors`] so the screen renders it
/// inline next to the offending input. Transport and rejection failures are
/// folded under the `password` field, matching where the form shows its
/// general error line.
pub struct LoginPage<A, S> {
    auth: Arc<A>,
    tokens: Arc<S>,
}

impl<A, S> LoginPage<A, S>
where
    A: AuthGateway,
    S: TokenStore,
{
    /// Bind the screen to its gateway and token store.
    pub const fn new(auth: Arc<A>, tokens: Arc<S>) -> Self {
        Self { auth, tokens }
    }

    /// Validate the form and attempt the sign-in.
    ///
    /// On success the session token is stored and the signed-in account is
    /// returned. On failure nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for blank inputs, rejected credentials,
    /// and transport failures.
    pub async fn submit(&self, username: &str, password: &str) -> Result<User, FieldErrors> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| FieldErrors::single(err.field(), err.to_string()))?;

        match self.auth.login(&credentials).await {
            Ok(outcome) => {
                self.tokens.set(outcome.token);
                info!(username = credentials.username(), "signed in");
                Ok(outcome.user)
            }
            Err(error) => {
                warn!(username = credentials.username(), error = %error, "sign-in failed");
                Err(FieldErrors::single("password", error.inline_message()))
            }
        }
    }
}
