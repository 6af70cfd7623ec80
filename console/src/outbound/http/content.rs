//! Gateway adapters for the content resources (projects and templates).
//!
//! The two resources share the wire shape and differ only in route and
//! payload key, so the adapters are generated from one macro. Keeping the
//! generated types distinct (rather than parameterising one struct) keeps
//! the envelope payload keys checked by serde at compile time.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageCursor;

use super::{ApiTransport, Auth, Envelope};
use crate::domain::{
    ClientResult, Content, ContentGateway, ContentListPage, ContentPatch, NewContent, RecordId,
};

macro_rules! content_gateway {
    ($kind:ident, $resource:literal, $singular:ident, $plural:ident) => {
        paste::paste! {
            #[derive(Debug, serde::Deserialize)]
            struct [<$kind ItemData>] {
                $singular: Content,
            }

            #[derive(Debug, serde::Deserialize)]
            struct [<$kind ListData>] {
                $plural: Vec<Content>,
            }

            #[doc = concat!("Reqwest-backed [`ContentGateway`] for the ", $resource, " resource.")]
            pub struct [<Http $kind Gateway>] {
                transport: Arc<ApiTransport>,
            }

            impl [<Http $kind Gateway>] {
                /// Build the gateway over a shared transport.
                #[must_use]
                pub const fn new(transport: Arc<ApiTransport>) -> Self {
                    Self { transport }
                }
            }

            #[async_trait]
            impl ContentGateway for [<Http $kind Gateway>] {
                fn resource(&self) -> &'static str {
                    $resource
                }

                async fn list<'a>(
                    &self,
                    page: Option<&'a PageCursor>,
                ) -> ClientResult<ContentListPage> {
                    let mut query: Vec<(&str, String)> = Vec::new();
                    if let Some(cursor) = page {
                        query.push(("cursor", cursor.as_str().to_owned()));
                    }
                    let envelope: Envelope<[<$kind ListData>]> = self
                        .transport
                        .get(concat!("admin/", $resource), &query)
                        .await?;
                    let items = envelope.data.$plural;
                    let count = envelope
                        .meta
                        .and_then(|meta| meta.count)
                        .unwrap_or_else(|| i64::try_from(items.len()).unwrap_or(i64::MAX));
                    Ok(ContentListPage { items, count })
                }

                async fn get(&self, id: RecordId) -> ClientResult<Content> {
                    let envelope: Envelope<[<$kind ItemData>]> = self
                        .transport
                        .get(&format!(concat!("admin/", $resource, "/{}"), id), &[])
                        .await?;
                    Ok(envelope.data.$singular)
                }

                async fn create(&self, draft: &NewContent) -> ClientResult<Content> {
                    let envelope: Envelope<[<$kind ItemData>]> = self
                        .transport
                        .post(concat!("admin/", $resource), draft, Auth::Bearer)
                        .await?;
                    Ok(envelope.data.$singular)
                }

                async fn update(&self, id: RecordId, patch: &ContentPatch) -> ClientResult<Content> {
                    let envelope: Envelope<[<$kind ItemData>]> = self
                        .transport
                        .patch(&format!(concat!("admin/", $resource, "/{}"), id), patch)
                        .await?;
                    Ok(envelope.data.$singular)
                }

                async fn delete(&self, id: RecordId) -> ClientResult<Content> {
                    let envelope: Envelope<[<$kind ItemData>]> = self
                        .transport
                        .delete(&format!(concat!("admin/", $resource, "/{}"), id))
                        .await?;
                    Ok(envelope.data.$singular)
                }
            }
        }
    };
}

content_gateway!(Projects, "projects", project, projects);
content_gateway!(Templates, "templates", template, templates);
