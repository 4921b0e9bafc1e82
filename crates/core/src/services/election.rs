//! Election dashboard service.

use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tribune_common::{AppError, AppResult, IdGenerator};
use tribune_db::{
    entities::{election, election::ChartDisplay},
    repositories::ElectionRepository,
};
use validator::Validate;

/// Allowed distance between the sum of percentages and 100.
pub const PERCENTAGE_TOLERANCE: f64 = 5.0;

/// One candidate or list in an election result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(max = 256))]
    pub party: Option<String>,

    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: f64,

    #[validate(range(min = 0))]
    pub votes: Option<i64>,

    /// CSS colour used by the chart.
    #[validate(length(max = 32))]
    pub color: Option<String>,
}

/// A results chart, as embedded in a feed update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ElectionChart {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[serde(default)]
    pub display: ChartDisplay,

    #[validate(length(min = 1), nested)]
    pub candidates: Vec<CandidateResult>,
}

impl ElectionChart {
    /// Soft check on the candidates' percentages.
    #[must_use]
    pub fn percentage_warning(&self) -> Option<String> {
        percentage_warning(&self.candidates)
    }
}

/// Warn when percentages do not add up to roughly 100.
///
/// This never rejects: rounding and partial counts legitimately drift.
#[must_use]
pub fn percentage_warning(candidates: &[CandidateResult]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }

    let total: f64 = candidates.iter().map(|c| c.percentage).sum();

    if (total - 100.0).abs() > PERCENTAGE_TOLERANCE {
        Some(format!("Percentages add up to {total:.1}%, expected about 100%"))
    } else {
        None
    }
}

/// Input for creating an election dashboard.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectionInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    pub date: NaiveDate,

    #[validate(length(min = 1, max = 64))]
    pub election_type: String,

    #[validate(range(min = 1, max = 2))]
    pub round: Option<i32>,

    #[validate(length(max = 256))]
    pub location: Option<String>,

    #[validate(range(min = 0))]
    pub total_votes: Option<i64>,

    #[validate(length(min = 1), nested)]
    pub results: Vec<CandidateResult>,

    #[serde(default)]
    pub display: ChartDisplay,
}

/// Input for updating an election dashboard.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateElectionInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    pub date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 64))]
    pub election_type: Option<String>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub round: Option<Option<i32>>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub location: Option<Option<String>>,

    #[serde(default, deserialize_with = "tribune_common::serde_helpers::double_option")]
    pub total_votes: Option<Option<i64>>,

    #[validate(length(min = 1), nested)]
    pub results: Option<Vec<CandidateResult>>,

    pub display: Option<ChartDisplay>,
}

/// An election row together with soft validation warnings.
#[derive(Debug, Clone)]
pub struct ElectionWithWarnings {
    pub election: election::Model,
    pub warnings: Vec<String>,
}

/// Service for election dashboards.
#[derive(Clone)]
pub struct ElectionService {
    election_repo: ElectionRepository,
    id_gen: IdGenerator,
}

impl ElectionService {
    /// Create a new election service.
    #[must_use]
    pub const fn new(election_repo: ElectionRepository) -> Self {
        Self {
            election_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an election by ID.
    pub async fn get(&self, id: &str) -> AppResult<Option<election::Model>> {
        self.election_repo.find_by_id(id).await
    }

    /// List elections, most recent first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<election::Model>> {
        self.election_repo.list(limit, offset).await
    }

    /// Create an election dashboard.
    pub async fn create(&self, input: CreateElectionInput) -> AppResult<ElectionWithWarnings> {
        input.validate()?;

        let warnings = results_warnings(&input.title, &input.results);
        let results = serde_json::to_value(&input.results)
            .map_err(|e| AppError::Internal(format!("Failed to encode results: {e}")))?;

        let model = election::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            date: Set(input.date),
            election_type: Set(input.election_type),
            round: Set(input.round),
            location: Set(input.location),
            total_votes: Set(input.total_votes),
            results: Set(results),
            display: Set(input.display),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let election = self.election_repo.create(model).await?;

        info!(election_id = %election.id, title = %election.title, "Election created");

        Ok(ElectionWithWarnings { election, warnings })
    }

    /// Update an election dashboard. `None` when it does not exist.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateElectionInput,
    ) -> AppResult<Option<ElectionWithWarnings>> {
        input.validate()?;

        let Some(existing) = self.election_repo.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut warnings = Vec::new();
        let mut active: election::ActiveModel = existing.clone().into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(election_type) = input.election_type {
            active.election_type = Set(election_type);
        }
        if let Some(round) = input.round {
            active.round = Set(round);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(total_votes) = input.total_votes {
            active.total_votes = Set(total_votes);
        }
        if let Some(results) = input.results {
            warnings = results_warnings(&existing.title, &results);
            let value = serde_json::to_value(&results)
                .map_err(|e| AppError::Internal(format!("Failed to encode results: {e}")))?;
            active.results = Set(value);
        }
        if let Some(display) = input.display {
            active.display = Set(display);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        let election = self.election_repo.update(active).await?;

        Ok(Some(ElectionWithWarnings { election, warnings }))
    }

    /// Delete an election. Returns whether it existed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let deleted = self.election_repo.delete(id).await?;

        if deleted {
            info!(election_id = %id, "Election deleted");
        }

        Ok(deleted)
    }
}

fn results_warnings(title: &str, results: &[CandidateResult]) -> Vec<String> {
    percentage_warning(results)
        .inspect(|w| warn!(title = %title, warning = %w, "Election percentages out of tolerance"))
        .into_iter()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn candidate(name: &str, percentage: f64) -> CandidateResult {
        CandidateResult {
            name: name.to_string(),
            party: None,
            percentage,
            votes: None,
            color: None,
        }
    }

    fn create_test_election(id: &str) -> election::Model {
        election::Model {
            id: id.to_string(),
            title: "Municipales Lyon".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            election_type: "municipal".to_string(),
            round: Some(1),
            location: Some("Lyon".to_string()),
            total_votes: None,
            results: json!([]),
            display: ChartDisplay::Pie,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_percentage_warning_within_tolerance() {
        let results = vec![candidate("A", 51.2), candidate("B", 46.0)];
        assert!(percentage_warning(&results).is_none());
    }

    #[test]
    fn test_percentage_warning_out_of_tolerance() {
        let results = vec![candidate("A", 40.0), candidate("B", 30.0)];
        let warning = percentage_warning(&results).unwrap();
        assert!(warning.contains("70.0"));
    }

    #[test]
    fn test_percentage_warning_empty() {
        assert!(percentage_warning(&[]).is_none());
    }

    #[test]
    fn test_chart_rejects_percentage_above_100() {
        let chart = ElectionChart {
            title: "Second tour".to_string(),
            display: ChartDisplay::Bar,
            candidates: vec![candidate("A", 120.0)],
        };
        assert!(chart.validate().is_err());
    }

    #[test]
    fn test_chart_serializes_camel_case() {
        let chart = ElectionChart {
            title: "Second tour".to_string(),
            display: ChartDisplay::Pie,
            candidates: vec![candidate("A", 50.0)],
        };
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(value["display"], "pie");
        assert_eq!(value["candidates"][0]["percentage"], 50.0);
    }

    #[tokio::test]
    async fn test_create_returns_warnings() {
        let election = create_test_election("el1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[election]])
                .into_connection(),
        );

        let service = ElectionService::new(ElectionRepository::new(db));
        let input = CreateElectionInput {
            title: "Municipales Lyon".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            election_type: "municipal".to_string(),
            round: Some(1),
            location: Some("Lyon".to_string()),
            total_votes: None,
            results: vec![candidate("A", 20.0), candidate("B", 20.0)],
            display: ChartDisplay::Pie,
        };

        let result = service.create(input).await.unwrap();

        assert_eq!(result.election.id, "el1");
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<election::Model>::new()])
                .into_connection(),
        );

        let service = ElectionService::new(ElectionRepository::new(db));
        let result = service
            .update("missing", UpdateElectionInput::default())
            .await
            .unwrap();

        assert!(result.is_none());
    }
}
