//! List filters and the pure search predicates applied to cached records.
//!
//! Boolean filters are tri-state: `None` means "no filter", which is distinct
//! from filtering on `false`. Only explicitly set flags reach the query
//! string. Search predicates are pure functions over records so the screens
//! can narrow cached results without touching the fetch layer.

use super::content::Content;
use super::user::User;

/// Tri-state filter set for the users list.
///
/// # Examples
/// ```
/// use minihome_console::domain::UserListFilter;
///
/// let filter = UserListFilter::default().with_approved(true);
/// assert_eq!(
///     filter.to_query_pairs(),
///     vec![("isApproved", "true".to_owned())]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListFilter {
    /// Approval flag; `None` disables the filter.
    pub approved: Option<bool>,
    /// Active flag; `None` disables the filter.
    pub active: Option<bool>,
    /// Master flag; `None` disables the filter.
    pub master: Option<bool>,
    /// Free-text search across email, username, and display name.
    pub search: Option<String>,
}

impl UserListFilter {
    /// Set the approval filter.
    #[must_use]
    pub const fn with_approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// Set the active filter.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Set the master filter.
    #[must_use]
    pub const fn with_master(mut self, master: bool) -> Self {
        self.master = Some(master);
        self
    }

    /// Set the free-text search term; blank input clears it.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.trim().is_empty() {
            None
        } else {
            Some(search)
        };
        self
    }

    /// Whether no flag or search term is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.approved.is_none()
            && self.active.is_none()
            && self.master.is_none()
            && self.search.is_none()
    }

    /// Serialise the filter as query parameters.
    ///
    /// Unset flags are omitted entirely; `isApproved=false` only appears when
    /// the caller filtered on `false` explicitly.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(approved) = self.approved {
            pairs.push(("isApproved", approved.to_string()));
        }
        if let Some(active) = self.active {
            pairs.push(("isActive", active.to_string()));
        }
        if let Some(master) = self.master {
            pairs.push(("isMaster", master.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    /// Pure narrowing predicate: whether a record satisfies every set flag
    /// and the search term. Never widens a result set.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        if self.approved.is_some_and(|wanted| user.is_approved != wanted) {
            return false;
        }
        if self.active.is_some_and(|wanted| user.is_active != wanted) {
            return false;
        }
        if self.master.is_some_and(|wanted| user.is_master != wanted) {
            return false;
        }
        match &self.search {
            Some(needle) => {
                contains_ignore_case(&user.email, needle)
                    || contains_ignore_case(&user.username, needle)
                    || user
                        .display_name
                        .as_deref()
                        .is_some_and(|name| contains_ignore_case(name, needle))
            }
            None => true,
        }
    }
}

/// Case-insensitive substring search over a content record's title,
/// category, and description, matching the screen's client-side filter.
/// A blank needle matches everything.
#[must_use]
pub fn content_matches_search(content: &Content, needle: &str) -> bool {
    if needle.trim().is_empty() {
        return true;
    }
    contains_ignore_case(&content.title, needle)
        || contains_ignore_case(&content.category, needle)
        || content
            .desc
            .as_deref()
            .is_some_and(|desc| contains_ignore_case(desc, needle))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
