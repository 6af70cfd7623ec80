//! The uniform response envelope and its decoder.
//!
//! Every endpoint wraps its payload as `{ code, message, data, meta? }`.
//! Decoding separates the *decision* from the *effect*: a 401 on a
//! session-scoped request yields [`ClientError::SessionExpired`] and it is
//! the transport's job to drop the
//! stored token, keeping this module testable without any session state.

use std::collections::BTreeMap;

use pagination::PageMeta;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::Auth;
use crate::domain::{ClientError, ClientResult, GENERIC_FAILURE_MESSAGE};

/// Application-level code the backend uses for successful operations.
pub const CODE_SUCCESS: i64 = 1;

/// Uniform wrapper around every API response.
///
/// ## Invariants
/// - `code` and `message` are always present.
/// - `data`'s shape is determined solely by the requested operation.
/// - `meta` appears only on list/aggregate operations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    /// Application-level status code ([`CODE_SUCCESS`] on success).
    pub code: i64,
    /// Human-readable outcome description.
    pub message: String,
    /// Operation-specific payload.
    pub data: T,
    /// Counts, pagination, and aggregate statistics for list operations.
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// List/aggregate metadata attached to an envelope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Meta {
    /// Number of records matching the request.
    #[serde(default)]
    pub count: Option<i64>,
    /// Window served, when the request was paginated.
    #[serde(default)]
    pub pagination: Option<PageMeta>,
    /// Loose aggregate counters keyed by name.
    #[serde(default)]
    pub stats: Option<BTreeMap<String, i64>>,
}

/// Decode one HTTP exchange into an envelope or a typed failure.
///
/// Non-success statuses map to the error taxonomy. A 401 means the session
/// is gone only when the request carried the session credential; on a public
/// endpoint (login, register) a 401 is an ordinary rejection and its
/// `message` must reach the user. Every other failure surfaces the body's
/// `message` field verbatim, falling back to [`GENERIC_FAILURE_MESSAGE`]
/// when the body is absent or not JSON.
///
/// # Errors
///
/// Returns [`ClientError::SessionExpired`] on 401 for [`Auth::Bearer`]
/// requests, and [`ClientError::RequestFailed`] for other non-2xx statuses
/// or an undecodable success body.
pub fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    auth: Auth,
) -> ClientResult<Envelope<T>> {
    if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
        return Err(ClientError::SessionExpired);
    }
    if !status.is_success() {
        return Err(ClientError::request_failed(failure_message(body)));
    }
    serde_json::from_slice(body).map_err(|error| {
        ClientError::request_failed(format!("response payload was not valid: {error}"))
    })
}

/// Pull the server's `message` out of a failure body, if there is one.
fn failure_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned())
}
