use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, ItemKind, SwipeDirection};

/// Client-chosen session identifier
pub type SessionId = String;

/// The mutable cursor of a session
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub current_category: Option<CategoryId>,
    pub intent_vector: Option<Vec<f32>>,
}

/// One entry of a session's swipe ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwipeRecord {
    pub session_id: SessionId,
    pub target_id: i64,
    pub kind: ItemKind,
    pub direction: SwipeDirection,
    pub swiped_at: DateTime<Utc>,
}
