use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum TallyError {
    SummaryNotRecognized,
    UnexpectedAuthor { author_id: String },
    InvalidDate { value: String },
    InvalidHandle { handle: String },
    PlayerNotFound { user_id: String },
    InternalError { message: String },
}
