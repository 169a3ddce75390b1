use crate::domain::{ChatId, Subscriber};
use crate::schema::chats;
use chrono::offset::Utc;
use chrono::DateTime;

#[derive(Queryable, Debug)]
pub struct Chat {
    pub chat_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[table_name = "chats"]
pub struct NewChat<'a> {
    pub chat_id: &'a i64,
    pub created_at: &'a DateTime<Utc>,
}

impl From<Chat> for Subscriber {
    fn from(chat: Chat) -> Self {
        Subscriber {
            chat_id: ChatId(chat.chat_id),
            created_at: chat.created_at,
        }
    }
}
