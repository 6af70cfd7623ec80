//! Client core for the MiniHome admin console.
//!
//! The crate is split along a hexagonal seam: `domain` holds records,
//! validation, ports, and the query cache; `outbound` implements the ports
//! over HTTP and the filesystem; `pages` drives the ports as screen
//! workflows; `config` loads runtime settings.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod pages;

pub use config::ConsoleSettings;
pub use domain::{ClientError, ClientResult, QueryClient};
