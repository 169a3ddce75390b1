use crate::domain::DateRange;

/// Paginated envelope shared by every list endpoint of the events API.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<T>,
}

// `places` answers `"results": null` for unknown ids.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let results: Option<Vec<T>> = serde::Deserialize::deserialize(deserializer)?;
    Ok(results.unwrap_or_default())
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ImageSource {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Image {
    pub image: String,
    #[serde(default)]
    pub source: Option<ImageSource>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct PlaceRef {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Event {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dates: Vec<DateRange>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub place: Option<PlaceRef>,
    #[serde(default)]
    pub price: Option<String>,
}

impl Event {
    pub fn place_id(&self) -> Option<i64> {
        self.place.as_ref().and_then(|place| place.id)
    }
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Place {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Collection {
    pub title: String,
    pub site_url: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Movie {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct News {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub site_url: String,
}

/// URL of the first image, if the record carries any.
pub fn first_image(images: &[Image]) -> Option<String> {
    images.first().map(|image| image.image.clone())
}
