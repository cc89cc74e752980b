//! Counsel API crate - axum HTTP transport for the assistant.
//!
//! Exposes the chat turn endpoint and a health check, with bearer-token
//! identity resolution, rate limiting, CORS, and request tracing.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use auth::{IdentityResolver, StaticTokenResolver};
pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
