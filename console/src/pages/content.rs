//! Portfolio content administration workflow.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    ClientError, ClientResult, Content, ContentForm, ContentGateway, ContentListPage,
    Invalidation, MutationHandle, QueryClient, QueryKey, QuerySnapshot, RecordId,
    content_matches_search,
};

/// Content administration screen, shared by the Projects and Templates
/// resources; the bound gateway decides which one.
///
/// Listing goes through the shared [`QueryClient`] under the gateway's
/// resource name. The search box narrows the cached list client side via
/// [`content_matches_search`], so typing never issues a request. Mutations
/// invalidate the resource, and deletion uses the same confirm-before-apply
/// flow as the users screen.
pub struct ContentPage<G> {
    gateway: Arc<G>,
    queries: QueryClient,
    search: String,
    pending_delete: Option<RecordId>,
    mutations: MutationHandle,
}

impl<G: ContentGateway + 'static> ContentPage<G> {
    /// Bind the screen to its gateway and the shared query cache.
    #[must_use]
    pub fn new(gateway: Arc<G>, queries: QueryClient) -> Self {
        let mutations = MutationHandle::new(queries.clone())
            .invalidating(Invalidation::Resource(gateway.resource().to_owned()));
        Self {
            gateway,
            queries,
            search: String::new(),
            pending_delete: None,
            mutations,
        }
    }

    /// Resource this screen administers, `"projects"` or `"templates"`.
    #[must_use]
    pub fn resource(&self) -> &'static str {
        self.gateway.resource()
    }

    /// Update the search term applied to the cached list.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Cache key for the full list; search narrows client side and never
    /// forks the key.
    #[must_use]
    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(self.gateway.resource())
    }

    /// Fetch (or serve from cache) the full list.
    pub async fn load(&self) -> QuerySnapshot<ContentListPage> {
        let gateway = Arc::clone(&self.gateway);
        self.queries
            .query(self.query_key(), move || {
                let gateway = Arc::clone(&gateway);
                async move { gateway.list(None).await }
            })
            .await
    }

    /// Records from the cached list matching the current search term.
    ///
    /// Returns an empty list until a fetch has succeeded.
    #[must_use]
    pub fn filtered(&self) -> Vec<Content> {
        self.queries
            .snapshot::<ContentListPage>(&self.query_key())
            .and_then(|snapshot| snapshot.data)
            .map(|page| {
                page.items
                    .into_iter()
                    .filter(|item| content_matches_search(item, &self.search))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fetch one record directly, bypassing the list cache.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure.
    pub async fn get(&self, id: RecordId) -> ClientResult<Content> {
        self.gateway.get(id).await
    }

    /// Validate the create modal and submit the new record.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without touching the network when
    /// the form is invalid; otherwise propagates the gateway failure.
    pub async fn create(&self, form: &ContentForm) -> ClientResult<Content> {
        let draft = form.validate().map_err(ClientError::from)?;
        let created = self.mutations.execute(self.gateway.create(&draft)).await?;
        info!(resource = self.resource(), id = created.id, "content created");
        Ok(created)
    }

    /// Validate the edit modal and submit the update.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without touching the network when
    /// the form is invalid; otherwise propagates the gateway failure.
    pub async fn update(&self, id: RecordId, form: &ContentForm) -> ClientResult<Content> {
        let patch = form.validate_patch().map_err(ClientError::from)?;
        let updated = self
            .mutations
            .execute(self.gateway.update(id, &patch))
            .await?;
        info!(resource = self.resource(), id, "content updated");
        Ok(updated)
    }

    /// Stage a deletion; nothing happens until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, id: RecordId) {
        self.pending_delete = Some(id);
    }

    /// Record staged for deletion, if any.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<RecordId> {
        self.pending_delete
    }

    /// Discard the staged deletion without applying it.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Apply the staged deletion. Returns `Ok(None)` when nothing was
    /// staged.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; the cache is left untouched.
    pub async fn confirm_delete(&mut self) -> ClientResult<Option<Content>> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(None);
        };
        let deleted = self.mutations.execute(self.gateway.delete(id)).await?;
        info!(resource = self.resource(), id, "content deleted");
        Ok(Some(deleted))
    }

    /// Whether a mutation is currently in flight.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        self.mutations.is_pending()
    }
}
