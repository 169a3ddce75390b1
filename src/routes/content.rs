//! Read-only views of the events API, as the notifier sees it.

use crate::content_api::{
    Collection, ContentApi, Event, Movie, News, Page, Place, UpstreamError,
};
use crate::domain::NotificationItem;
use crate::notifier::{AggregationError, Notifier};
use crate::routes::error_chain_fmt;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::{json, Json, Value};
use rocket::{Request, State};
use std::sync::Arc;

#[get("/events")]
pub async fn events(
    content: &State<Arc<dyn ContentApi>>,
) -> Result<Json<Page<Event>>, ContentError> {
    Ok(Json(content.fetch_events().await?))
}

#[get("/places/<place_id>")]
pub async fn places(
    place_id: i64,
    content: &State<Arc<dyn ContentApi>>,
) -> Result<Json<Page<Place>>, ContentError> {
    Ok(Json(content.fetch_place(Some(place_id)).await?))
}

#[get("/collections")]
pub async fn collections(
    content: &State<Arc<dyn ContentApi>>,
) -> Result<Json<Page<Collection>>, ContentError> {
    Ok(Json(content.fetch_collections().await?))
}

#[get("/movies")]
pub async fn movies(
    content: &State<Arc<dyn ContentApi>>,
) -> Result<Json<Page<Movie>>, ContentError> {
    Ok(Json(content.fetch_movies().await?))
}

#[get("/news")]
pub async fn news(content: &State<Arc<dyn ContentApi>>) -> Result<Json<Page<News>>, ContentError> {
    Ok(Json(content.fetch_news().await?))
}

#[tracing::instrument(name = "Preview the collected notifications", skip(notifier))]
#[get("/collect")]
pub async fn collect(
    notifier: &State<Arc<Notifier>>,
) -> Result<Json<Vec<NotificationItem>>, ContentError> {
    Ok(Json(notifier.aggregator().collect().await?))
}

#[derive(thiserror::Error)]
pub enum ContentError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl std::fmt::Debug for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl<'r> Responder<'r, 'static> for ContentError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        tracing::warn!("ContentError: {:?}", self);
        let body: Value = json!({ "ok": false, "error": self.to_string() });
        (Status::BadGateway, body).respond_to(request)
    }
}
