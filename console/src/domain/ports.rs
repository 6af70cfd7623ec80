//! Ports the screens drive and the adapters implement.
//!
//! Each trait exposes the shared [`ClientError`] taxonomy so adapters map
//! transport failures into predictable variants instead of bespoke error
//! types. Mocks are generated for tests so screen workflows are exercised
//! without a network.

use async_trait::async_trait;
use pagination::PageCursor;

use super::auth::{LoginCredentials, NewRegistration, SessionToken};
use super::content::{Content, ContentListPage, ContentPatch, NewContent};
use super::error::ClientResult;
use super::filters::UserListFilter;
use super::user::{NewUser, RecordId, User, UserListPage, UserPatch};

/// Successful login payload: the bearer credential and the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Bearer credential; callers persist it via a [`TokenStore`].
    pub token: SessionToken,
    /// Account that signed in.
    pub user: User,
}

/// Holder of the session credential.
///
/// ## Contract
/// - `get` before any `set` returns `None` and never fails.
/// - The store exclusively owns the credential; nothing else caches it.
/// - Implementations decide persistence: in memory for ephemeral sessions,
///   on disk to survive a restart within the same profile.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// Current credential, if a session is established.
    fn get(&self) -> Option<SessionToken>;
    /// Persist a credential, replacing any previous one.
    fn set(&self, token: SessionToken);
    /// Drop the credential, ending the session.
    fn clear(&self);
}

/// Gateway for the unauthenticated auth endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session token and the account record.
    async fn login(&self, credentials: &LoginCredentials) -> ClientResult<LoginOutcome>;
    /// Register a new account; the account awaits approval afterwards.
    async fn register(&self, registration: &NewRegistration) -> ClientResult<User>;
}

/// Gateway for the protected users resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersGateway: Send + Sync {
    /// List accounts matching the filter, with count and header stats.
    async fn list<'a>(
        &self,
        filter: &UserListFilter,
        page: Option<&'a PageCursor>,
    ) -> ClientResult<UserListPage>;
    /// Fetch one account by id.
    async fn get(&self, id: RecordId) -> ClientResult<User>;
    /// Create an account.
    async fn create(&self, new_user: &NewUser) -> ClientResult<User>;
    /// Apply a partial update to an account.
    async fn update(&self, id: RecordId, patch: &UserPatch) -> ClientResult<User>;
    /// Delete an account, returning its final state.
    async fn delete(&self, id: RecordId) -> ClientResult<User>;
    /// Approve an account, returning its updated state.
    async fn approve(&self, id: RecordId) -> ClientResult<User>;
}

/// Gateway for one protected content resource (projects or templates).
///
/// Both resources share the [`Content`] shape; an implementation is bound to
/// one resource and reports it via [`ContentGateway::resource`] so screens
/// can build cache keys without knowing routes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Resource name used in cache keys, e.g. `"projects"`.
    fn resource(&self) -> &'static str;
    /// List records, optionally windowed by an opaque cursor.
    async fn list<'a>(&self, page: Option<&'a PageCursor>) -> ClientResult<ContentListPage>;
    /// Fetch one record by id.
    async fn get(&self, id: RecordId) -> ClientResult<Content>;
    /// Create a record.
    async fn create(&self, draft: &NewContent) -> ClientResult<Content>;
    /// Apply a partial update to a record.
    async fn update(&self, id: RecordId, patch: &ContentPatch) -> ClientResult<Content>;
    /// Delete a record, returning its final state.
    async fn delete(&self, id: RecordId) -> ClientResult<Content>;
}
