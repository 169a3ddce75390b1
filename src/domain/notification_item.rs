/// One upstream record (collection, event, movie or news entry) in the shape the
/// formatter and dispatcher understand.
///
/// Fields that do not apply to a source kind stay `None` and are left out of the
/// serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct NotificationItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
}

impl NotificationItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Text fields in the order they are rendered. The image never appears here.
    pub fn text_fields(&self) -> [(TextField, Option<&str>); 6] {
        [
            (TextField::Title, Some(self.title.as_str())),
            (TextField::Description, self.description.as_deref()),
            (TextField::Place, self.place.as_deref()),
            (TextField::Price, self.price.as_deref()),
            (TextField::Dates, self.dates.as_deref()),
            (TextField::SiteUrl, self.site_url.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Description,
    Place,
    Price,
    Dates,
    SiteUrl,
}
