//! API endpoints.

#![allow(missing_docs)]

mod admin_live_coverages;
mod alerts;
mod applications;
mod articles;
mod auth;
mod elections;
mod live_coverages;
mod users;

use axum::{Router, middleware::from_fn_with_state};
use serde::Deserialize;

use crate::middleware::{AppState, session_middleware};

pub(crate) const DEFAULT_LIMIT: u64 = 20;
pub(crate) const MAX_LIMIT: u64 = 100;

/// `?limit=&offset=` pagination.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

impl Pagination {
    /// Requested page size, clamped to `1..=100`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/live-coverages", live_coverages::router())
        .nest("/articles", articles::router())
        .nest("/elections", elections::router())
        .nest("/alerts", alerts::router())
        .nest("/applications", applications::router())
        .nest("/admin", admin_router())
}

fn admin_router() -> Router<AppState> {
    Router::new()
        .nest("/live-coverages", admin_live_coverages::router())
        .nest("/articles", articles::admin_router())
        .nest("/elections", elections::admin_router())
        .nest("/alerts", alerts::admin_router())
        .nest("/applications", applications::admin_router())
        .nest("/users", users::admin_router())
}

/// The API with session resolution, ready to be nested under `/api`.
pub fn app(state: AppState) -> Router {
    router()
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps_limit() {
        let default = Pagination::default();
        assert_eq!(default.limit(), 20);

        let huge = Pagination {
            limit: Some(10_000),
            offset: 0,
        };
        assert_eq!(huge.limit(), 100);

        let zero = Pagination {
            limit: Some(0),
            offset: 0,
        };
        assert_eq!(zero.limit(), 1);
    }
}
