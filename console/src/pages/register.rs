//! Account registration workflow.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{AuthGateway, FieldErrors, RegistrationForm, User};

/// Registration screen: validates the form locally, then submits it.
///
/// Local validation runs first and blocks the network call entirely when any
/// field fails, so the screen can show every problem at once. Server-side
/// rejections (for example a taken username) are folded under the `password`
/// field, where the form renders its general error line.
pub struct RegisterPage<A> {
    auth: Arc<A>,
}

impl<A: AuthGateway> RegisterPage<A> {
    /// Bind the screen to its gateway.
    pub const fn new(auth: Arc<A>) -> Self {
        Self { auth }
    }

    /// Validate the form and submit the registration.
    ///
    /// The created account awaits administrator approval; the caller shows a
    /// confirmation rather than signing the user in.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when local validation fails or the server
    /// rejects the registration.
    pub async fn submit(&self, form: &RegistrationForm) -> Result<User, FieldErrors> {
        let registration = form.validate()?;
        match self.auth.register(&registration).await {
            Ok(user) => {
                info!(username = %user.username, "account registered; awaiting approval");
                Ok(user)
            }
            Err(error) => {
                warn!(error = %error, "registration failed");
                Err(FieldErrors::single("password", error.inline_message()))
            }
        }
    }
}
