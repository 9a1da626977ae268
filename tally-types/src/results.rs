use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Platform-native user id (a decimal digit string) or a lowercase `@handle`
/// awaiting alias resolution.
pub type UserId = String;

/// Highest guess count a solved puzzle can report.
pub const MAX_GUESSES: u8 = 6;

/// Value a failed attempt contributes to guess averages.
pub const FAILED_GUESS_VALUE: u8 = MAX_GUESSES + 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParsedEntry {
    pub user_id: UserId,
    pub guesses: Option<u8>, // None when failed
    pub failed: bool,
}

impl ParsedEntry {
    pub fn solved(user_id: impl Into<UserId>, guesses: u8) -> Self {
        Self {
            user_id: user_id.into(),
            guesses: Some(guesses),
            failed: false,
        }
    }

    pub fn failed(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            guesses: None,
            failed: true,
        }
    }

    /// True when the id is a free-text handle rather than a platform id
    pub fn is_plain_handle(&self) -> bool {
        self.user_id.starts_with('@')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ParsedMessage {
    pub puzzle_number: Option<u32>,
    pub entries: Vec<ParsedEntry>,
}

/// A stored result, unique per `(user_id, date_iso)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultRow {
    pub user_id: UserId,
    pub puzzle_number: Option<u32>,
    pub date_iso: String, // YYYY-MM-DD
    pub guesses: Option<u8>,
    pub failed: bool,
    pub raw: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Solved(u8),
    Failed,
}

impl ResultRow {
    /// Interpret the stored columns. A failed flag always wins; a row that is
    /// neither failed nor carries a guess count has no outcome.
    pub fn outcome(&self) -> Option<Outcome> {
        match (self.failed, self.guesses) {
            (true, _) => Some(Outcome::Failed),
            (false, Some(guesses)) => Some(Outcome::Solved(guesses)),
            (false, None) => None,
        }
    }
}

impl Outcome {
    /// Guess count used for averages, failures count as one past the limit
    pub fn substituted_guesses(self) -> u8 {
        match self {
            Outcome::Solved(guesses) => guesses,
            Outcome::Failed => FAILED_GUESS_VALUE,
        }
    }
}
