use crate::helpers::{
    collection, event, movie, news, place, spawn_app_with, FakeContent, RecordingMessenger,
    SentMessage,
};
use event_notifier::domain::ChatId;
use event_notifier::notifier::BroadcastReport;
use event_notifier::scheduler::{run_daily, DailySchedule};
use std::sync::atomic::Ordering;
use std::time::Duration;

fn a_full_digest() -> FakeContent {
    FakeContent {
        collections: vec![collection("Куда сходить в выходные", "https://kudago.com/spb/list/1/")],
        events: vec![event("Концерт", Some(336))],
        movies: vec![movie("Дюна")],
        news: vec![news("openings")],
        places: [(336, place(336, "клуб А2", "просп. Медиков, д. 3"))]
            .into_iter()
            .collect(),
        ..FakeContent::default()
    }
}

#[tokio::test]
async fn every_subscriber_gets_every_item_in_order() {
    // arrange
    let app = spawn_app_with(a_full_digest(), RecordingMessenger::default()).await;
    app.subscribe(&[ChatId(1), ChatId(2)]).await;

    // act
    let report = app.notifier().broadcast_to_subscribers().await.unwrap();

    // assert
    assert_eq!(
        report,
        BroadcastReport {
            items: 4,
            recipients: 2,
            delivered: 8,
            failed: 0,
        }
    );
    let first = app.messenger.sent_to(ChatId(1));
    let second = app.messenger.sent_to(ChatId(2));
    assert_eq!(first.len(), 4);
    assert!(first[0].body().starts_with("Куда сходить в выходные\n"));
    assert!(first[1].body().starts_with("Концерт\n"));
    assert!(first[2].body().starts_with("Дюна\n"));
    assert!(first[3].body().starts_with("openings\n"));
    let texts = |messages: &[SentMessage]| {
        messages.iter().map(SentMessage::body).collect::<Vec<_>>()
    };
    assert_eq!(texts(&first), texts(&second));
}

#[tokio::test]
async fn items_with_an_image_go_out_as_photos() {
    // arrange
    let app = spawn_app_with(a_full_digest(), RecordingMessenger::default()).await;

    // act
    app.notifier().notify_chat(ChatId(1)).await.unwrap();

    // assert
    let sent = app.messenger.sent_to(ChatId(1));
    assert!(matches!(sent[0], SentMessage::Text { .. }));
    match &sent[1] {
        SentMessage::Photo {
            image_url, caption, ..
        } => {
            assert_eq!(image_url, "https://media.example/Концерт.jpg");
            assert!(caption.contains("клуб А2, просп. Медиков, д. 3\n"));
            assert!(caption.contains("Дата проведения: С "));
        }
        other => panic!("Expected a photo, got {:?}", other),
    }
    assert!(matches!(sent[2], SentMessage::Photo { .. }));
    assert!(matches!(sent[3], SentMessage::Text { .. }));
}

#[tokio::test]
async fn a_failing_chat_does_not_stop_delivery_to_the_others() {
    // arrange
    let app = spawn_app_with(
        a_full_digest(),
        RecordingMessenger::failing_for(&[ChatId(2)]),
    )
    .await;
    app.subscribe(&[ChatId(1), ChatId(2), ChatId(3)]).await;

    // act
    let report = app.notifier().broadcast_to_subscribers().await.unwrap();

    // assert
    assert_eq!(app.messenger.sent_to(ChatId(1)).len(), 4);
    assert!(app.messenger.sent_to(ChatId(2)).is_empty());
    assert_eq!(app.messenger.sent_to(ChatId(3)).len(), 4);
    assert_eq!(report.delivered, 8);
    assert_eq!(report.failed, 4);
}

#[tokio::test]
async fn the_digest_is_collected_once_per_broadcast() {
    // arrange
    let app = spawn_app_with(a_full_digest(), RecordingMessenger::default()).await;
    app.subscribe(&[ChatId(1), ChatId(2), ChatId(3)]).await;

    // act
    app.notifier().broadcast_to_subscribers().await.unwrap();

    // assert
    assert_eq!(app.content.list_calls.load(Ordering::SeqCst), 4);
    assert_eq!(app.content.place_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nothing_is_fetched_without_subscribers() {
    // arrange
    let app = spawn_app_with(a_full_digest(), RecordingMessenger::default()).await;

    // act
    let report = app.notifier().broadcast_to_subscribers().await.unwrap();

    // assert
    assert_eq!(report, BroadcastReport::default());
    assert_eq!(app.content.list_calls.load(Ordering::SeqCst), 0);
    assert!(app.messenger.sent_messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn an_upstream_failure_fails_the_broadcast_before_anything_is_sent() {
    // arrange
    let content = FakeContent {
        fail_events: true,
        ..a_full_digest()
    };
    let app = spawn_app_with(content, RecordingMessenger::default()).await;
    app.subscribe(&[ChatId(1)]).await;

    // act
    let outcome = app.notifier().broadcast_to_subscribers().await;

    // assert
    assert!(outcome.is_err());
    assert!(app.messenger.sent_messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn the_daily_job_stops_when_the_server_shuts_down() {
    // arrange
    let app = spawn_app_with(a_full_digest(), RecordingMessenger::default()).await;
    app.subscribe(&[ChatId(1)]).await;
    let schedule = DailySchedule::new(9, 0).unwrap();

    // act
    let stopped = tokio::time::timeout(
        Duration::from_secs(5),
        run_daily(app.notifier().clone(), schedule, std::future::ready(())),
    )
    .await;

    // assert
    assert!(stopped.is_ok(), "The daily job ignored the shutdown signal.");
    assert!(app.messenger.sent_messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sends_in_flight_never_exceed_the_configured_cap() {
    // arrange
    let content = FakeContent {
        collections: vec![collection("A", "http://x"), collection("B", "http://y")],
        ..FakeContent::default()
    };
    let app = spawn_app_with(
        content,
        RecordingMessenger::with_latency(Duration::from_millis(20)),
    )
    .await;
    let recipients: Vec<ChatId> = (1..=50).map(ChatId).collect();
    app.subscribe(&recipients).await;

    // act
    let report = app.notifier().broadcast_to_subscribers().await.unwrap();

    // assert
    assert_eq!(report.delivered, 100);
    assert_eq!(report.failed, 0);
    let max_in_flight = app.messenger.max_in_flight.load(Ordering::SeqCst);
    assert!(max_in_flight > 1, "Sends were not concurrent.");
    assert!(
        max_in_flight <= app.max_concurrent_sends,
        "{} sends were in flight, the cap is {}.",
        max_in_flight,
        app.max_concurrent_sends
    );
    for chat_id in recipients {
        assert_eq!(app.messenger.sent_to(chat_id).len(), 2);
    }
}
