//! Screen workflows.
//!
//! Each page owns the state its screen renders and drives the ports for its
//! resource. Pages never touch the transport directly; they validate input,
//! fold failures into per-field messages where the screen shows them inline,
//! and route reads through the shared [`QueryClient`](crate::domain::QueryClient)
//! so mutations invalidate the right caches.

mod content;
mod login;
mod register;
mod users;

pub use content::ContentPage;
pub use login::LoginPage;
pub use register::RegisterPage;
pub use users::{PendingAction, UsersPage};
