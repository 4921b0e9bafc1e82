//! API middleware and shared state.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;
use sea_orm::DatabaseConnection;
use tribune_common::Config;
use tribune_core::{
    AlertService, ApplicationService, ArticleService, ElectionService, LiveCoverageService,
    SessionService, UserService,
};
use tribune_db::repositories::{
    AlertRepository, ApplicationRepository, ArticleRepository, ElectionRepository,
    LiveCoverageRepository, SessionRepository, UserRepository,
};

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub live_coverage_service: LiveCoverageService,
    pub article_service: ArticleService,
    pub election_service: ElectionService,
    pub alert_service: AlertService,
    pub application_service: ApplicationService,
    pub user_service: UserService,
    pub session_service: SessionService,
    pub cookie: CookieSettings,
    pub poll_interval_secs: u64,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let article_repo = ArticleRepository::new(Arc::clone(&db));

        let live_coverage_service = LiveCoverageService::new(
            LiveCoverageRepository::new(Arc::clone(&db)),
            user_repo.clone(),
            article_repo.clone(),
            &config.live_coverage,
        );

        Self {
            live_coverage_service,
            article_service: ArticleService::new(article_repo),
            election_service: ElectionService::new(ElectionRepository::new(Arc::clone(&db))),
            alert_service: AlertService::new(AlertRepository::new(Arc::clone(&db))),
            application_service: ApplicationService::new(ApplicationRepository::new(
                Arc::clone(&db),
            )),
            user_service: UserService::new(user_repo.clone()),
            session_service: SessionService::new(
                SessionRepository::new(db),
                user_repo,
                &config.session,
            ),
            cookie: CookieSettings {
                name: config.session.cookie_name.clone(),
                secure: config.session.secure_cookie,
            },
            poll_interval_secs: config.live_coverage.poll_interval_secs,
        }
    }
}

/// Session middleware.
///
/// Resolves the session cookie and attaches the user row to the request.
/// An unknown, expired or unreadable session leaves the request anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    if let Some(cookie) = jar.get(&state.cookie.name) {
        match state.session_service.resolve(cookie.value()).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve session");
            }
        }
    }

    next.run(req).await
}
