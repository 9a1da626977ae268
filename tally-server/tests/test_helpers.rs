#![allow(dead_code)]

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use tally_persistence::{AliasRepository, ResultRepository, connect_to_memory_database};
use tally_server::ingest::{IngestError, IngestService};
use tally_types::{IngestReport, SummarySubmission};

/// The day summaries are "received" in tests
pub fn received_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
}

/// Builds a submission without author or explicit date
pub fn submission(content: &str) -> SummarySubmission {
    SummarySubmission {
        content: content.to_string(),
        author_id: None,
        date: None,
    }
}

/// Builds a submission pinned to a date
pub fn dated_submission(content: &str, date: &str) -> SummarySubmission {
    SummarySubmission {
        date: Some(date.to_string()),
        ..submission(content)
    }
}

/// Test setup that provides all necessary components over an in-memory database
pub struct TestTallySetup {
    pub result_repository: Arc<ResultRepository>,
    pub alias_repository: Arc<AliasRepository>,
    pub ingest_service: Arc<IngestService>,
}

impl TestTallySetup {
    pub async fn new() -> Self {
        Self::with_author(None).await
    }

    pub async fn with_author(summary_author_id: Option<&str>) -> Self {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let result_repository = Arc::new(ResultRepository::new(db.clone()));
        let alias_repository = Arc::new(AliasRepository::new(db));
        let ingest_service = Arc::new(IngestService::new(
            result_repository.clone(),
            alias_repository.clone(),
            summary_author_id.map(str::to_string),
        ));

        Self {
            result_repository,
            alias_repository,
            ingest_service,
        }
    }

    /// Store aliases and reload the directory
    pub async fn add_aliases(&self, aliases: &[(&str, &str)]) {
        for (handle, user_id) in aliases {
            self.alias_repository
                .set_alias(handle, user_id)
                .await
                .unwrap();
        }
        self.ingest_service.refresh_aliases().await.unwrap();
    }

    pub async fn ingest(&self, submission: &SummarySubmission) -> Result<IngestReport, IngestError> {
        self.ingest_service.ingest(submission, received_on()).await
    }
}
