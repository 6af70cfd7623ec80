//! Outbound adapters: HTTP gateways for the admin API and session token
//! persistence.

pub mod http;
pub mod session;

pub use http::{ApiTransport, HttpAuthGateway, HttpProjectsGateway, HttpTemplatesGateway,
    HttpUsersGateway, TransportIdentity};
pub use session::{FileTokenStore, InMemoryTokenStore};
