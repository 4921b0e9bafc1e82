//! Repositories for database access.

#![allow(missing_docs)]

mod alert;
mod application;
mod article;
mod election;
mod live_coverage;
mod session;
mod user;

pub use alert::AlertRepository;
pub use application::ApplicationRepository;
pub use article::{ArticleFilter, ArticleRepository, ArticleSort};
pub use election::ElectionRepository;
pub use live_coverage::LiveCoverageRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

use sea_orm::{DbErr, SqlErr};
use tribune_common::AppError;

/// Map an insert failure, turning unique-constraint violations into `Conflict`.
pub(crate) fn insert_error(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// Map a delete failure, turning foreign-key violations into `Conflict`.
pub(crate) fn delete_error(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::Conflict(format!("{what} is still referenced"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
