//! Gateway adapter for the protected users resource.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageCursor;
use serde::Deserialize;

use super::{ApiTransport, Auth, Envelope};
use crate::domain::{
    ClientResult, NewUser, RecordId, User, UserListFilter, UserListPage, UserPatch, UserStats,
    UsersGateway,
};

#[derive(Debug, Deserialize)]
struct UsersData {
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: User,
}

/// Reqwest-backed [`UsersGateway`].
pub struct HttpUsersGateway {
    transport: Arc<ApiTransport>,
}

impl HttpUsersGateway {
    /// Build the gateway over a shared transport.
    #[must_use]
    pub const fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl UsersGateway for HttpUsersGateway {
    async fn list<'a>(
        &self,
        filter: &UserListFilter,
        page: Option<&'a PageCursor>,
    ) -> ClientResult<UserListPage> {
        let mut query = filter.to_query_pairs();
        if let Some(cursor) = page {
            query.push(("cursor", cursor.as_str().to_owned()));
        }
        let envelope: Envelope<UsersData> =
            self.transport.get("admin/users/list", &query).await?;
        let users = envelope.data.users;
        let meta = envelope.meta.unwrap_or_default();
        let count = meta
            .count
            .unwrap_or_else(|| i64::try_from(users.len()).unwrap_or(i64::MAX));
        Ok(UserListPage {
            users,
            count,
            stats: meta.stats.map(UserStats::from),
        })
    }

    async fn get(&self, id: RecordId) -> ClientResult<User> {
        let envelope: Envelope<UserData> =
            self.transport.get(&format!("admin/users/{id}"), &[]).await?;
        Ok(envelope.data.user)
    }

    async fn create(&self, new_user: &NewUser) -> ClientResult<User> {
        let envelope: Envelope<UserData> = self
            .transport
            .post("admin/users", new_user, Auth::Bearer)
            .await?;
        Ok(envelope.data.user)
    }

    async fn update(&self, id: RecordId, patch: &UserPatch) -> ClientResult<User> {
        let envelope: Envelope<UserData> = self
            .transport
            .patch(&format!("admin/users/{id}"), patch)
            .await?;
        Ok(envelope.data.user)
    }

    async fn delete(&self, id: RecordId) -> ClientResult<User> {
        let envelope: Envelope<UserData> =
            self.transport.delete(&format!("admin/users/{id}")).await?;
        Ok(envelope.data.user)
    }

    async fn approve(&self, id: RecordId) -> ClientResult<User> {
        let envelope: Envelope<UserData> = self
            .transport
            .patch_empty(&format!("admin/users/{id}/approve"))
            .await?;
        Ok(envelope.data.user)
    }
}
