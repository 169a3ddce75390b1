use crate::domain::{NotificationItem, TextField};

pub const DATES_LABEL: &str = "Дата проведения: ";

/// Render an item as a chat message, one non-empty field per line.
///
/// The image is not part of the text; it travels as the photo of a photo message.
pub fn format(item: &NotificationItem) -> String {
    let mut message = String::new();
    for (field, value) in item.text_fields() {
        let value = match value {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        if field == TextField::Dates {
            message.push_str(DATES_LABEL);
        }
        message.push_str(value);
        message.push('\n');
    }
    message
}
