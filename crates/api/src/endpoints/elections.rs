//! Election dashboard endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tribune_common::{AppError, AppResult};
use tribune_core::{CreateElectionInput, ElectionWithWarnings, UpdateElectionInput};
use tribune_db::entities::{election, election::ChartDisplay};

use super::Pagination;
use crate::{
    extractors::StaffUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the public election router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_elections))
        .route("/{id}", get(get_election))
}

/// Create the admin election router.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_election))
        .route("/{id}", put(update_election).delete(delete_election))
}

/// Election response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResponse {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub election_type: String,
    pub round: Option<i32>,
    pub location: Option<String>,
    pub total_votes: Option<i64>,
    pub results: serde_json::Value,
    pub display: ChartDisplay,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<election::Model> for ElectionResponse {
    fn from(election: election::Model) -> Self {
        Self {
            id: election.id,
            title: election.title,
            date: election.date,
            election_type: election.election_type,
            round: election.round,
            location: election.location,
            total_votes: election.total_votes,
            results: election.results,
            display: election.display,
            created_at: election.created_at.with_timezone(&Utc),
            updated_at: election.updated_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}

/// Saved election with soft validation warnings.
#[derive(Debug, Serialize)]
pub struct SavedElectionResponse {
    pub election: ElectionResponse,
    pub warnings: Vec<String>,
}

impl From<ElectionWithWarnings> for SavedElectionResponse {
    fn from(saved: ElectionWithWarnings) -> Self {
        Self {
            election: saved.election.into(),
            warnings: saved.warnings,
        }
    }
}

async fn list_elections(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<ElectionResponse>>> {
    let elections = state
        .election_service
        .list(page.limit(), page.offset)
        .await?;

    Ok(ApiResponse::ok(
        elections.into_iter().map(Into::into).collect(),
    ))
}

async fn get_election(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ElectionResponse>> {
    let election = state
        .election_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Election not found: {id}")))?;

    Ok(ApiResponse::ok(election.into()))
}

async fn create_election(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Json(input): Json<CreateElectionInput>,
) -> AppResult<(StatusCode, ApiResponse<SavedElectionResponse>)> {
    let saved = state.election_service.create(input).await?;

    Ok(ApiResponse::created(saved.into()))
}

async fn update_election(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateElectionInput>,
) -> AppResult<ApiResponse<SavedElectionResponse>> {
    let saved = state
        .election_service
        .update(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Election not found: {id}")))?;

    Ok(ApiResponse::ok(saved.into()))
}

async fn delete_election(
    StaffUser(_): StaffUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.election_service.delete(&id).await? {
        Ok(no_content())
    } else {
        Err(AppError::NotFound(format!("Election not found: {id}")))
    }
}
