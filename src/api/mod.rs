//! HTTP API.
//!
//! Resources are mounted at `/doctors`, `/patients`, `/payments`, `/meet`
//! and `/gpt`, with documentation under `/api-docs`. Handlers translate
//! workflow outcomes into status codes; 212 marks requests that were
//! processed but not applied.

pub mod docs;
pub mod endpoints;
pub mod error;
pub mod form;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
pub mod views;

pub use router::api_router;
pub use server::{start_server, ApiServer, ServerError};
pub use types::ApiContext;
