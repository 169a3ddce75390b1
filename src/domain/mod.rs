mod chat_id;
mod date_range;
mod notification_item;
mod subscriber;

pub use chat_id::ChatId;
pub use date_range::{render_date_ranges, DateRange};
pub use notification_item::{NotificationItem, TextField};
pub use subscriber::Subscriber;
