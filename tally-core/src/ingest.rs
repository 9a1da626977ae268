use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_types::{ParsedMessage, ResultRow};

use crate::HandleResolver;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rows ready for persistence plus the handles nobody could be matched to.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestPlan {
    pub puzzle_number: Option<u32>,
    pub date_iso: String,
    pub rows: Vec<ResultRow>,
    pub unresolved: Vec<String>,
}

/// Resolve every entry of a parsed summary to a user id and turn it into a
/// result row for `date_iso`. A user listed twice keeps their last line.
pub fn plan_ingest(
    message: &ParsedMessage,
    raw: &str,
    date_iso: &str,
    resolver: &impl HandleResolver,
) -> IngestPlan {
    let mut rows: Vec<ResultRow> = Vec::new();
    let mut row_index: HashMap<String, usize> = HashMap::new();
    let mut unresolved: Vec<String> = Vec::new();

    for entry in &message.entries {
        let Some(user_id) = resolver.resolve(&entry.user_id) else {
            if !unresolved.contains(&entry.user_id) {
                tracing::warn!(handle = %entry.user_id, "no alias for handle");
                unresolved.push(entry.user_id.clone());
            }
            continue;
        };

        let row = ResultRow {
            user_id: user_id.clone(),
            puzzle_number: message.puzzle_number,
            date_iso: date_iso.to_string(),
            guesses: if entry.failed { None } else { entry.guesses },
            failed: entry.failed,
            raw: raw.to_string(),
        };

        match row_index.get(&user_id) {
            Some(&index) => rows[index] = row,
            None => {
                row_index.insert(user_id, rows.len());
                rows.push(row);
            }
        }
    }

    IngestPlan {
        puzzle_number: message.puzzle_number,
        date_iso: date_iso.to_string(),
        rows,
        unresolved,
    }
}

/// Summaries arrive the morning after, so results belong to the previous day
pub fn results_date_for(today: NaiveDate) -> String {
    today
        .pred_opt()
        .unwrap_or(today)
        .format(DATE_FORMAT)
        .to_string()
}

/// Validate a caller-supplied `YYYY-MM-DD` date and return it normalized
pub fn parse_result_date(text: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid result date '{}'", text))?;
    Ok(date.format(DATE_FORMAT).to_string())
}
