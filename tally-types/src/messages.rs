use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;

/// Body of `POST /summaries`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SummarySubmission {
    pub content: String,
    pub author_id: Option<String>,
    pub date: Option<String>, // YYYY-MM-DD, defaults to the previous day
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngestReport {
    pub puzzle_number: Option<u32>,
    pub date_iso: String,
    pub ingested: u32,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AliasUpdate {
    pub handle: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisplayNameUpdate {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefreshReport {
    pub generation: u64,
    pub aliases: u32,
    pub members: u32,
}
