use crate::configuration::ContentApiSettings;
use crate::content_api::{
    Collection, ContentApi, Event, Movie, News, Page, Place, UpstreamError,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;

const EVENTS_PAGE_SIZE: u32 = 5;
const PLACES_PAGE_SIZE: u32 = 1;
const COLLECTIONS_PAGE_SIZE: u32 = 2;
const MOVIES_PAGE_SIZE: u32 = 3;
const NEWS_PAGE_SIZE: u32 = 1;

/// `ContentApi` over the KudaGo public API.
pub struct KudaGoClient {
    http_client: reqwest::Client,
    base_url: String,
    location: String,
}

impl KudaGoClient {
    /// `http_client` is shared with the bot transport so both reuse one connection pool.
    pub fn new(http_client: reqwest::Client, settings: &ContentApiSettings) -> Self {
        Self {
            http_client,
            base_url: settings.full_url(),
            location: settings.location.clone(),
        }
    }

    fn base_query(&self, page_size: u32, fields: &str) -> Vec<(&'static str, String)> {
        vec![
            ("page", "1".to_string()),
            ("page_size", page_size.to_string()),
            ("fields", fields.to_string()),
            ("text_format", "text".to_string()),
        ]
    }

    fn located_query(&self, page_size: u32, fields: &str) -> Vec<(&'static str, String)> {
        let mut query = self.base_query(page_size, fields);
        query.push(("location", self.location.clone()));
        query
    }

    #[tracing::instrument(name = "Fetch a page from the events API", skip(self, query))]
    async fn get_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&'static str, String)],
    ) -> Result<Page<T>, UpstreamError> {
        let url = format!("{}/{}", self.base_url, resource);
        let transport = |source| UpstreamError::Transport {
            endpoint: resource.to_string(),
            source,
        };

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                endpoint: resource.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Malformed {
            endpoint: resource.to_string(),
            source,
        })
    }
}

fn unix_now() -> String {
    Utc::now().timestamp().to_string()
}

#[async_trait]
impl ContentApi for KudaGoClient {
    async fn fetch_events(&self) -> Result<Page<Event>, UpstreamError> {
        let mut query = self.located_query(
            EVENTS_PAGE_SIZE,
            "images,dates,title,place,description,price",
        );
        query.push(("actual_since", unix_now()));
        self.get_page("events", &query).await
    }

    async fn fetch_place_by_id(&self, place_id: i64) -> Result<Page<Place>, UpstreamError> {
        let mut query = self.base_query(PLACES_PAGE_SIZE, "id,title,address");
        query.push(("ids", place_id.to_string()));
        self.get_page("places", &query).await
    }

    async fn fetch_collections(&self) -> Result<Page<Collection>, UpstreamError> {
        let query = self.located_query(COLLECTIONS_PAGE_SIZE, "title,site_url");
        self.get_page("lists", &query).await
    }

    async fn fetch_movies(&self) -> Result<Page<Movie>, UpstreamError> {
        let mut query = self.located_query(MOVIES_PAGE_SIZE, "id,title,description,images");
        query.push(("actual_since", unix_now()));
        self.get_page("movies", &query).await
    }

    async fn fetch_news(&self) -> Result<Page<News>, UpstreamError> {
        let mut query = self.located_query(NEWS_PAGE_SIZE, "title,description,images,site_url");
        query.push(("actual_only", "1".to_string()));
        self.get_page("news", &query).await
    }
}
