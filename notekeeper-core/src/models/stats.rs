use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStats {
    pub total_notes: u64,
    /// Active notes created on the current UTC calendar day.
    pub created_today: u64,
    pub last_updated_note: Option<Uuid>,
}
