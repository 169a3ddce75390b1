use crate::domain::ChatId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub chat_id: ChatId,
    pub created_at: DateTime<Utc>,
}
