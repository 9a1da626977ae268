use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use warp::http::StatusCode;

use tally_core::{AliasDirectory, parse_result_date, parse_summary, plan_ingest, results_date_for};
use tally_persistence::{AliasRepository, ResultRepository};
use tally_types::{IngestReport, RefreshReport, SummarySubmission, TallyError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No results found in summary")]
    NotRecognized,
    #[error("Summary posted by unexpected author {0}")]
    UnexpectedAuthor(String),
    #[error("Invalid date {0}")]
    InvalidDate(String),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::NotRecognized => StatusCode::UNPROCESSABLE_ENTITY,
            IngestError::UnexpectedAuthor(_) => StatusCode::FORBIDDEN,
            IngestError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            IngestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_tally_error(&self) -> TallyError {
        match self {
            IngestError::NotRecognized => TallyError::SummaryNotRecognized,
            IngestError::UnexpectedAuthor(author_id) => TallyError::UnexpectedAuthor {
                author_id: author_id.clone(),
            },
            IngestError::InvalidDate(value) => TallyError::InvalidDate {
                value: value.clone(),
            },
            IngestError::Storage(_) => TallyError::InternalError {
                message: "Failed to store results".to_string(),
            },
        }
    }
}

/// Turns posted summaries into stored results and owns the alias directory
/// used to resolve plain handles.
pub struct IngestService {
    result_repository: Arc<ResultRepository>,
    alias_repository: Arc<AliasRepository>,
    directory: Arc<RwLock<AliasDirectory>>,
    summary_author_id: Option<String>,
}

impl IngestService {
    pub fn new(
        result_repository: Arc<ResultRepository>,
        alias_repository: Arc<AliasRepository>,
        summary_author_id: Option<String>,
    ) -> Self {
        Self {
            result_repository,
            alias_repository,
            directory: Arc::new(RwLock::new(AliasDirectory::new())),
            summary_author_id,
        }
    }

    pub fn directory(&self) -> Arc<RwLock<AliasDirectory>> {
        self.directory.clone()
    }

    /// Reload aliases and member names from storage into the directory
    pub async fn refresh_aliases(&self) -> anyhow::Result<RefreshReport> {
        let aliases = self.alias_repository.list_aliases().await?;
        let members = self.result_repository.member_names().await?;

        let mut directory = self.directory.write().await;
        Ok(directory.refresh(aliases, members))
    }

    /// Parse, resolve and store one summary. `today` is the local date the
    /// summary was received, used when the submission carries no date.
    pub async fn ingest(
        &self,
        submission: &SummarySubmission,
        today: NaiveDate,
    ) -> Result<IngestReport, IngestError> {
        if let Some(expected) = &self.summary_author_id {
            let author = submission.author_id.as_deref().unwrap_or_default();
            if author != expected {
                tracing::debug!("ignoring summary from {}", author);
                return Err(IngestError::UnexpectedAuthor(author.to_string()));
            }
        }

        let date_iso = match &submission.date {
            Some(date) => {
                parse_result_date(date).map_err(|_| IngestError::InvalidDate(date.clone()))?
            }
            None => results_date_for(today),
        };

        let message = parse_summary(&submission.content).ok_or(IngestError::NotRecognized)?;

        let plan = {
            let directory = self.directory.read().await;
            plan_ingest(&message, &submission.content, &date_iso, &*directory)
        };

        self.result_repository.upsert_results(&plan.rows).await?;

        tracing::info!(
            "ingested {} result(s) for {} ({} unresolved)",
            plan.rows.len(),
            date_iso,
            plan.unresolved.len()
        );

        Ok(IngestReport {
            puzzle_number: plan.puzzle_number,
            date_iso: plan.date_iso,
            ingested: plan.rows.len() as u32,
            unresolved: plan.unresolved,
        })
    }
}
