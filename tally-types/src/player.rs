use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::UserId;

/// Explicit mapping from a free-text handle to a platform user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Alias {
    pub handle: String, // lowercase, `@`-prefixed
    pub user_id: UserId,
}

/// A known member name used as a fallback when no explicit alias exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MemberName {
    pub user_id: UserId,
    pub display_name: String,
}
