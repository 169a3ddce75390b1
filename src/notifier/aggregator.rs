use crate::content_api::{
    first_image, Collection, ContentApi, Event, Movie, News, Page, Place, UpstreamError,
};
use crate::domain::{render_date_ranges, NotificationItem};
use crate::routes::error_chain_fmt;
use chrono::{DateTime, Local, Utc};
use futures::future::join_all;
use std::sync::Arc;

/// Fetches everything one digest needs and flattens it into items.
pub struct Aggregator {
    content: Arc<dyn ContentApi>,
}

impl Aggregator {
    pub fn new(content: Arc<dyn ContentApi>) -> Self {
        Self { content }
    }

    /// Items in category order: collections, events, movies, news.
    ///
    /// Any of the four list calls failing fails the whole run. A place that
    /// cannot be resolved only blanks the `place` of its event.
    #[tracing::instrument(name = "Collect notifications", skip(self))]
    pub async fn collect(&self) -> Result<Vec<NotificationItem>, AggregationError> {
        let (collections, events, movies, news) = tokio::try_join!(
            self.content.fetch_collections(),
            self.content.fetch_events(),
            self.content.fetch_movies(),
            self.content.fetch_news(),
        )?;

        let now = Utc::now();
        let mut items = Vec::with_capacity(
            collections.results.len()
                + events.results.len()
                + movies.results.len()
                + news.results.len(),
        );
        items.extend(collections.results.into_iter().map(collection_item));
        items.extend(self.event_items(events.results, now).await);
        items.extend(movies.results.into_iter().map(movie_item));
        items.extend(news.results.into_iter().map(news_item));

        tracing::info!(items = items.len(), "Collected notifications");
        Ok(items)
    }

    async fn event_items(&self, events: Vec<Event>, now: DateTime<Utc>) -> Vec<NotificationItem> {
        let places = join_all(events.iter().map(|event| self.resolve_place(event))).await;
        events
            .into_iter()
            .zip(places)
            .map(|(event, place)| event_item(event, place, now))
            .collect()
    }

    async fn resolve_place(&self, event: &Event) -> String {
        match self.content.fetch_place(event.place_id()).await {
            Ok(page) => place_label(&page),
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    place_id = ?event.place_id(),
                    "Failed to resolve the place of an event, leaving it blank",
                );
                String::new()
            }
        }
    }
}

/// `"{title}, {address}"` of the first place on the page.
///
/// A page without places, or a place with neither title nor address, is the same
/// as no place at all.
fn place_label(page: &Page<Place>) -> String {
    let place = match page.results.first() {
        Some(place) => place,
        None => return String::new(),
    };
    [place.title.as_deref(), place.address.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn collection_item(collection: Collection) -> NotificationItem {
    NotificationItem {
        site_url: Some(collection.site_url),
        ..NotificationItem::new(collection.title)
    }
}

fn event_item(event: Event, place: String, now: DateTime<Utc>) -> NotificationItem {
    let dates = render_date_ranges(&event.dates, now, &Local);
    NotificationItem {
        description: event.description,
        image: first_image(&event.images),
        place: Some(place),
        price: event.price,
        dates: (!dates.is_empty()).then(|| dates),
        ..NotificationItem::new(event.title)
    }
}

fn movie_item(movie: Movie) -> NotificationItem {
    NotificationItem {
        description: movie.description,
        image: first_image(&movie.images),
        ..NotificationItem::new(movie.title)
    }
}

fn news_item(news: News) -> NotificationItem {
    NotificationItem {
        description: news.description,
        image: first_image(&news.images),
        site_url: Some(news.site_url),
        ..NotificationItem::new(news.title)
    }
}

#[derive(thiserror::Error)]
pub enum AggregationError {
    #[error("Failed to fetch the notifications from the events API.")]
    Upstream(#[from] UpstreamError),
}

impl std::fmt::Debug for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
