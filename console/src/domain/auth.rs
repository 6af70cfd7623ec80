//! Authentication primitives: credentials, session tokens, and the
//! registration form.
//!
//! Constructors validate string inputs before a page talks to a gateway, so
//! invalid payloads never reach the network. Passwords live in zeroizing
//! buffers and the session token redacts itself from debug output.

use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

use super::error::FieldErrors;

/// Minimum password length accepted by the registration form.
pub const PASSWORD_MIN: usize = 8;
/// Minimum username length accepted by the registration form.
pub const USERNAME_MIN: usize = 3;
/// Minimum display-name length accepted by the registration form.
pub const DISPLAY_NAME_MIN: usize = 2;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::EmptyPassword => write!(f, "Password is required"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl LoginValidationError {
    /// Name of the form field this failure belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }
}

/// Validated login credentials used by the auth gateway.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use minihome_console::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("master_gil", "secret123").unwrap();
/// assert_eq!(creds.username(), "master_gil");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Error raised when constructing a [`SessionToken`] from an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSessionToken;

impl fmt::Display for InvalidSessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session token must not be empty")
    }
}

impl std::error::Error for InvalidSessionToken {}

/// Opaque bearer credential attached to protected requests.
///
/// The raw value never appears in debug output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw bearer string, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionToken> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidSessionToken);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw bearer string for header construction.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Raw registration screen state, validated before submission.
///
/// Mirrors the register form: display name, email, username, password with
/// confirmation, and the terms checkbox. [`RegistrationForm::validate`]
/// returns either the wire payload or field-scoped messages; validation
/// failure blocks the network call.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    /// Display name input value.
    pub display_name: String,
    /// Email input value.
    pub email: String,
    /// Username input value.
    pub username: String,
    /// Password input value.
    pub password: String,
    /// Password confirmation input value.
    pub confirm_password: String,
    /// Terms-and-conditions checkbox state.
    pub agree_to_terms: bool,
}

/// Wire payload for the register operation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    /// Address the account is registered under.
    pub email: String,
    /// Unique handle used for login.
    pub username: String,
    /// Plain-text password; sent once over TLS.
    pub password: String,
    /// Optional public display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl RegistrationForm {
    /// Run the screen's synchronous validation rules.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldErrors`] map with one message per offending field;
    /// the first failing rule per field wins.
    pub fn validate(&self) -> Result<NewRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            errors.insert("displayName", "Display name is required");
        } else if display_name.chars().count() < DISPLAY_NAME_MIN {
            errors.insert(
                "displayName",
                format!("Display name must be at least {DISPLAY_NAME_MIN} characters"),
            );
        }

        if self.email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !email_has_plausible_shape(&self.email) {
            errors.insert("email", "Email is invalid");
        }

        let username = self.username.trim();
        if username.is_empty() {
            errors.insert("username", "Username is required");
        } else if username.chars().count() < USERNAME_MIN {
            errors.insert(
                "username",
                format!("Username must be at least {USERNAME_MIN} characters"),
            );
        }

        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        } else if self.password.chars().count() < PASSWORD_MIN {
            errors.insert(
                "password",
                format!("Password must be at least {PASSWORD_MIN} characters"),
            );
        }

        if self.confirm_password.is_empty() {
            errors.insert("confirmPassword", "Please confirm your password");
        } else if self.password != self.confirm_password {
            errors.insert("confirmPassword", "Passwords do not match");
        }

        if !self.agree_to_terms {
            errors.insert("terms", "You must agree to the terms and conditions");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewRegistration {
            email: self.email.clone(),
            username: username.to_owned(),
            password: self.password.clone(),
            display_name: Some(display_name.to_owned()),
        })
    }
}

/// `non-space "@" non-space "." non-space`. Deliberately loose; the server
/// is the authority on deliverability.
fn email_has_plausible_shape(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    matches!(domain.split_once('.'), Some((host, tld)) if !host.is_empty() && !tld.is_empty())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for credential and form validation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  master_gil  ", "secret")]
    #[case("alice", "correct horse battery staple")]
    fn valid_credentials_trim_username(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username(), username.trim());
        assert_eq!(creds.password(), password);
    }

    #[test]
    fn session_token_redacts_debug_output() {
        let token = SessionToken::new("very-secret-bearer").expect("non-empty token");
        assert_eq!(format!("{token:?}"), "SessionToken(<redacted>)");
        assert_eq!(token.as_str(), "very-secret-bearer");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn session_token_rejects_blank_values(#[case] raw: &str) {
        assert_eq!(SessionToken::new(raw), Err(InvalidSessionToken));
    }

    fn complete_form() -> RegistrationForm {
        RegistrationForm {
            display_name: "Gil".to_owned(),
            email: "gil@minihome.page".to_owned(),
            username: "master_gil".to_owned(),
            password: "longenough".to_owned(),
            confirm_password: "longenough".to_owned(),
            agree_to_terms: true,
        }
    }

    #[test]
    fn complete_form_produces_wire_payload() {
        let payload = complete_form().validate().expect("form should validate");
        assert_eq!(payload.username, "master_gil");
        assert_eq!(payload.display_name.as_deref(), Some("Gil"));
    }

    #[rstest]
    #[case::short_password("short", "short", "password")]
    #[case::empty_password("", "", "password")]
    fn flags_password_rules(
        #[case] password: &str,
        #[case] confirm: &str,
        #[case] field: &str,
    ) {
        let mut form = complete_form();
        form.password = password.to_owned();
        form.confirm_password = confirm.to_owned();
        let errors = form.validate().expect_err("password rule must fail");
        assert!(errors.get(field).is_some(), "expected message for {field}");
    }

    #[test]
    fn flags_mismatched_confirmation() {
        let mut form = complete_form();
        form.confirm_password = "different-pass".to_owned();
        let errors = form.validate().expect_err("mismatch must fail");
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
    }

    #[rstest]
    #[case("plainaddress", false)]
    #[case("has space@x.y", false)]
    #[case("@missing-local.com", false)]
    #[case("no-dot@domain", false)]
    #[case("gil@minihome.page", true)]
    fn email_shape_check(#[case] email: &str, #[case] plausible: bool) {
        assert_eq!(email_has_plausible_shape(email), plausible, "{email}");
    }

    #[test]
    fn unticked_terms_block_submission() {
        let mut form = complete_form();
        form.agree_to_terms = false;
        let errors = form.validate().expect_err("terms must be agreed");
        assert!(errors.get("terms").is_some());
    }
}
