//! User administration workflow.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    ClientResult, Invalidation, MutationHandle, NewUser, QueryClient, QueryKey, QuerySnapshot,
    RecordId, User, UserListFilter, UserListPage, UserPatch, UsersGateway,
};

/// Cache resource name for every users list, whatever its filters.
const USERS_RESOURCE: &str = "users";

/// Destructive action awaiting a second confirmation from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Delete the account with this id.
    Delete(RecordId),
    /// Approve the account with this id.
    Approve(RecordId),
}

/// User administration screen: filtered listing, account CRUD, and the
/// confirm-before-apply flow for approval and deletion.
///
/// Reads go through the shared [`QueryClient`] under a key derived from the
/// current filter, so two screens showing the same filter share one fetch.
/// Every successful mutation invalidates the whole `users` resource; a
/// change to one account affects every filtered view of the list.
pub struct UsersPage<G> {
    gateway: Arc<G>,
    queries: QueryClient,
    filter: UserListFilter,
    pending: Option<PendingAction>,
    mutations: MutationHandle,
}

impl<G: UsersGateway + 'static> UsersPage<G> {
    /// Bind the screen to its gateway and the shared query cache.
    #[must_use]
    pub fn new(gateway: Arc<G>, queries: QueryClient) -> Self {
        let mutations = MutationHandle::new(queries.clone())
            .invalidating(Invalidation::Resource(USERS_RESOURCE.to_owned()));
        Self {
            gateway,
            queries,
            filter: UserListFilter::default(),
            pending: None,
            mutations,
        }
    }

    /// Current filter set.
    #[must_use]
    pub const fn filter(&self) -> &UserListFilter {
        &self.filter
    }

    /// Replace the whole filter set.
    pub fn set_filter(&mut self, filter: UserListFilter) {
        self.filter = filter;
    }

    /// Update only the search term; blank input clears it.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter = self.filter.clone().with_search(term);
    }

    /// Reset every flag and the search term.
    pub fn clear_filters(&mut self) {
        self.filter = UserListFilter::default();
    }

    /// Cache key for the current filter.
    #[must_use]
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(USERS_RESOURCE).with_params(self.filter.to_query_pairs())
    }

    /// Fetch (or serve from cache) the list for the current filter.
    pub async fn load(&self) -> QuerySnapshot<UserListPage> {
        let gateway = Arc::clone(&self.gateway);
        let filter = self.filter.clone();
        self.queries
            .query(self.query_key(), move || {
                let gateway = Arc::clone(&gateway);
                let filter = filter.clone();
                async move { gateway.list(&filter, None).await }
            })
            .await
    }

    /// Fetch one account directly, bypassing the list cache.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn get(&self, id: RecordId) -> ClientResult<User> {
        self.gateway.get(id).await
    }

    /// Create an account and refresh every cached list.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; the cache is left untouched.
    pub async fn create(&self, new_user: &NewUser) -> ClientResult<User> {
        self.mutations.execute(self.gateway.create(new_user)).await
    }

    /// Patch an account and refresh every cached list.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; the cache is left untouched.
    pub async fn update(&self, id: RecordId, patch: &UserPatch) -> ClientResult<User> {
        self.mutations.execute(self.gateway.update(id, patch)).await
    }

    /// Stage a deletion; nothing happens until [`Self::confirm_pending`].
    pub fn request_delete(&mut self, id: RecordId) {
        self.pending = Some(PendingAction::Delete(id));
    }

    /// Stage an approval; nothing happens until [`Self::confirm_pending`].
    pub fn request_approve(&mut self, id: RecordId) {
        self.pending = Some(PendingAction::Approve(id));
    }

    /// Currently staged action, if one awaits confirmation.
    #[must_use]
    pub const fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    /// Discard the staged action without applying it.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Apply the staged action. Returns `Ok(None)` when nothing was staged.
    ///
    /// The staged action is consumed either way; after a failure the
    /// operator re-requests it.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; the cache is left untouched.
    pub async fn confirm_pending(&mut self) -> ClientResult<Option<User>> {
        let Some(action) = self.pending.take() else {
            return Ok(None);
        };
        let user = match action {
            PendingAction::Delete(id) => {
                let user = self.mutations.execute(self.gateway.delete(id)).await?;
                info!(id, "user deleted");
                user
            }
            PendingAction::Approve(id) => {
                let user = self.mutations.execute(self.gateway.approve(id)).await?;
                info!(id, "user approved");
                user
            }
        };
        Ok(Some(user))
    }

    /// Whether a mutation is currently in flight.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        self.mutations.is_pending()
    }
}
