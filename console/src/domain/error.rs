//! Client-side error taxonomy.
//!
//! These errors are transport agnostic and clonable so cached query state can
//! carry the failure alongside previously fetched data. Gateways never
//! swallow a failure; every fallible call resolves to one of these variants.

use std::collections::BTreeMap;

use thiserror::Error;

/// Fallback shown when a failed response carries no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "The request could not be completed. Please try again.";

/// Failure categories surfaced by gateways and the query orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// No session token was present when a protected call was attempted.
    /// Raised before any network traffic; callers redirect to the login flow.
    #[error("authentication required; sign in first")]
    Unauthenticated,
    /// The server rejected the bearer token. The token has been invalidated;
    /// callers redirect to the login flow.
    #[error("session expired; sign in again")]
    SessionExpired,
    /// The server answered with a non-success status and (where available) a
    /// human-readable message, surfaced verbatim.
    #[error("{message}")]
    RequestFailed {
        /// Server-supplied message, or [`GENERIC_FAILURE_MESSAGE`].
        message: String,
    },
    /// The request never completed: connection refused, DNS failure, or
    /// timeout. Retryable.
    #[error("network failure: {message}")]
    NetworkFailure {
        /// Transport failure description.
        message: String,
    },
    /// Local form validation rejected the input before any network call.
    #[error("validation failed for {} field(s)", fields.len())]
    Validation {
        /// Field-scoped messages for inline display.
        fields: FieldErrors,
    },
}

impl ClientError {
    /// Build a [`ClientError::RequestFailed`] from a server message.
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
        }
    }

    /// Build a [`ClientError::NetworkFailure`] from a transport failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Whether an automatic retry may reasonably change the outcome.
    ///
    /// Session and validation failures are deterministic; retrying them only
    /// delays the redirect or the inline error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure { .. } | Self::RequestFailed { .. }
        )
    }

    /// Message suitable for an inline UI slot.
    #[must_use]
    pub fn inline_message(&self) -> String {
        match self {
            Self::RequestFailed { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Field-scoped validation messages keyed by form field name.
///
/// Ordering is stable (lexicographic by field) so rendered error lists do not
/// jitter between renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a message for one field, replacing any previous message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Message recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether any field carries a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields carrying a message.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convenience constructor for a single-field failure.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }
}

impl From<FieldErrors> for ClientError {
    fn from(fields: FieldErrors) -> Self {
        Self::Validation { fields }
    }
}

/// Convenient result alias for gateway and orchestrator calls.
pub type ClientResult<T> = Result<T, ClientError>;
