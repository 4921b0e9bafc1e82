//! HTTP API layer for tribune.
//!
//! - **Endpoints**: public reader routes and the `/admin` newsroom routes
//! - **Extractors**: session-backed user guards
//! - **Middleware**: cookie session resolution
//!
//! Built on Axum 0.8. The server nests [`router`] under `/api`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{app, router};
pub use middleware::{AppState, session_middleware};
