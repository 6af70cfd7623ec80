//! Domain types, validation, ports, and query orchestration.
//!
//! Purpose: everything here is transport agnostic. Records document their
//! serialisation contract (serde) in their own Rustdoc; gateways and token
//! stores are ports implemented by the `outbound` adapters; the query module
//! owns every cached read.
//!
//! Public surface:
//! - `ClientError` / `FieldErrors` — failure taxonomy shared by all calls.
//! - `LoginCredentials`, `RegistrationForm`, `SessionToken` — auth inputs.
//! - `User`, `Content` and their request payloads — resource records.
//! - `UserListFilter`, `content_matches_search` — pure list narrowing.
//! - `QueryClient`, `MutationHandle` — fetch/cache/invalidate lifecycle.

pub mod auth;
pub mod content;
pub mod error;
pub mod filters;
pub mod ports;
pub mod query;
pub mod user;

pub use self::auth::{
    InvalidSessionToken, LoginCredentials, LoginValidationError, NewRegistration,
    RegistrationForm, SessionToken,
};
pub use self::content::{Content, ContentForm, ContentListPage, ContentPatch, NewContent};
pub use self::error::{ClientError, ClientResult, FieldErrors, GENERIC_FAILURE_MESSAGE};
pub use self::filters::{UserListFilter, content_matches_search};
pub use self::ports::{AuthGateway, ContentGateway, LoginOutcome, TokenStore, UsersGateway};
#[cfg(test)]
pub use self::ports::{
    MockAuthGateway, MockContentGateway, MockTokenStore, MockUsersGateway,
};
pub use self::query::{
    Invalidation, MutationHandle, QueryClient, QueryKey, QuerySnapshot,
};
pub use self::user::{NewUser, RecordId, User, UserListPage, UserPatch, UserStats};
