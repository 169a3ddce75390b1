use crate::helpers::launch_upstream;
use event_notifier::configuration::{ContentApiSettings, TelegramSettings};
use event_notifier::content_api::{ContentApi, KudaGoClient, UpstreamError};
use event_notifier::domain::ChatId;
use event_notifier::telegram::{Messenger, TelegramClient};
use reqwest::StatusCode;
use rocket::http::uri::Origin;
use rocket::http::{ContentType, Status};
use rocket::serde::json::Json;
use rocket::State;
use secrecy::Secret;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "123456:secret-token";
const UNKNOWN_CHAT: i64 = 666;

#[derive(Clone, Copy)]
enum Behaviour {
    Healthy,
    ServerError,
    Garbage,
}

struct Recorder {
    behaviour: Behaviour,
    requests: Mutex<Vec<Recorded>>,
}

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    query: HashMap<String, String>,
    body: Option<Value>,
}

impl Recorder {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn record(&self, uri: &Origin<'_>, body: Option<Value>) {
        let url = reqwest::Url::parse(&format!("http://upstream{}", uri))
            .expect("Rocket handed us an invalid origin.");
        self.requests.lock().unwrap().push(Recorded {
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
            body,
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn canned_page(resource: &str) -> Value {
    let results = match resource {
        "events" => json!([{
            "title": "Концерт",
            "description": "Живой звук",
            "dates": [{ "start": 4102444800i64, "end": 4102452000i64 }],
            "images": [{ "image": "https://media.example/1.jpg", "source": { "name": "", "link": "" } }],
            "place": { "id": 336 },
            "price": "от 1500 руб."
        }]),
        "places" => json!([{ "id": 336, "title": "клуб А2", "address": "просп. Медиков, д. 3" }]),
        "lists" => json!([{ "title": "A", "site_url": "http://x" }]),
        "movies" => json!([{ "id": 1, "title": "Дюна", "description": null, "images": [] }]),
        "news" => json!([{ "title": "Открытие", "description": "", "images": [], "site_url": "http://n" }]),
        _ => json!([]),
    };
    json!({ "count": 1, "next": null, "previous": null, "results": results })
}

#[rocket::get("/<_>/<resource>")]
fn content_api(
    resource: &str,
    uri: &Origin<'_>,
    recorder: &State<Arc<Recorder>>,
) -> (Status, (ContentType, String)) {
    recorder.record(uri, None);
    match recorder.behaviour {
        Behaviour::Healthy => (
            Status::Ok,
            (ContentType::JSON, canned_page(resource).to_string()),
        ),
        Behaviour::ServerError => (
            Status::InternalServerError,
            (ContentType::HTML, "<h1>oops</h1>".into()),
        ),
        Behaviour::Garbage => (
            Status::Ok,
            (ContentType::JSON, "{\"results\": [{\"title\": 1}]}".into()),
        ),
    }
}

#[rocket::get("/<_>/getMe")]
fn get_me(uri: &Origin<'_>, recorder: &State<Arc<Recorder>>) -> Value {
    recorder.record(uri, None);
    json!({
        "ok": true,
        "result": { "id": 123456, "is_bot": true, "first_name": "events", "username": "city_events_bot" }
    })
}

#[rocket::post("/<_>/<_>", data = "<body>")]
fn bot_method(
    body: Json<Value>,
    uri: &Origin<'_>,
    recorder: &State<Arc<Recorder>>,
) -> (Status, Value) {
    let body = body.into_inner();
    recorder.record(uri, Some(body.clone()));
    if body["chat_id"] == json!(UNKNOWN_CHAT) {
        return (
            Status::BadRequest,
            json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }),
        );
    }
    (Status::Ok, json!({ "ok": true, "result": true }))
}

async fn content_client(behaviour: Behaviour) -> (KudaGoClient, Arc<Recorder>) {
    let recorder = Recorder::new(behaviour);
    let base_url = launch_upstream(
        rocket::build()
            .manage(recorder.clone())
            .mount("/", rocket::routes![content_api]),
    )
    .await;
    let settings = ContentApiSettings {
        base_url,
        api_version: "v1.4".into(),
        location: "spb".into(),
    };
    (KudaGoClient::new(http_client(), &settings), recorder)
}

async fn bot_client() -> (TelegramClient, Arc<Recorder>) {
    let recorder = Recorder::new(Behaviour::Healthy);
    let base_url = launch_upstream(
        rocket::build()
            .manage(recorder.clone())
            .mount("/", rocket::routes![get_me, bot_method]),
    )
    .await;
    (TelegramClient::new(http_client(), &telegram(base_url)), recorder)
}

fn telegram(base_url: String) -> TelegramSettings {
    TelegramSettings {
        base_url,
        token: Secret::new(TOKEN.into()),
        max_concurrent_sends: NonZeroUsize::new(1).unwrap(),
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn events_are_requested_for_the_configured_city_from_now_on() {
    // arrange
    let (client, recorder) = content_client(Behaviour::Healthy).await;
    let before = chrono::Utc::now().timestamp();

    // act
    let page = client.fetch_events().await.unwrap();

    // assert
    assert_eq!(page.results[0].title, "Концерт");
    assert_eq!(page.results[0].place_id(), Some(336));
    let request = &recorder.requests()[0];
    assert_eq!(request.path, "/v1.4/events");
    assert_eq!(request.query["page"], "1");
    assert_eq!(request.query["page_size"], "5");
    assert_eq!(
        request.query["fields"],
        "images,dates,title,place,description,price"
    );
    assert_eq!(request.query["text_format"], "text");
    assert_eq!(request.query["location"], "spb");
    let actual_since: i64 = request.query["actual_since"].parse().unwrap();
    assert!(actual_since >= before);
}

#[tokio::test]
async fn every_list_asks_for_its_own_page_size() {
    // arrange
    let (client, recorder) = content_client(Behaviour::Healthy).await;

    // act
    client.fetch_collections().await.unwrap();
    client.fetch_movies().await.unwrap();
    client.fetch_news().await.unwrap();

    // assert
    let requests = recorder.requests();
    let test_cases = vec![
        ("/v1.4/lists", "2", "title,site_url"),
        ("/v1.4/movies", "3", "id,title,description,images"),
        ("/v1.4/news", "1", "title,description,images,site_url"),
    ];
    for (request, (path, page_size, fields)) in requests.iter().zip(test_cases) {
        assert_eq!(request.path, path);
        assert_eq!(request.query["page_size"], page_size, "{}", path);
        assert_eq!(request.query["fields"], fields, "{}", path);
        assert_eq!(request.query["location"], "spb", "{}", path);
    }
    assert!(requests[1].query.contains_key("actual_since"));
    assert_eq!(requests[2].query["actual_only"], "1");
}

#[tokio::test]
async fn places_are_fetched_by_id_and_skipped_without_one() {
    // arrange
    let (client, recorder) = content_client(Behaviour::Healthy).await;

    // act
    let found = client.fetch_place(Some(336)).await.unwrap();
    let skipped = client.fetch_place(None).await.unwrap();

    // assert
    assert_eq!(found.results[0].address.as_deref(), Some("просп. Медиков, д. 3"));
    assert!(skipped.results.is_empty());
    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1.4/places");
    assert_eq!(requests[0].query["ids"], "336");
    assert_eq!(requests[0].query["page_size"], "1");
    assert!(!requests[0].query.contains_key("location"));
}

#[tokio::test]
async fn a_server_error_is_reported_with_its_status() {
    // arrange
    let (client, _) = content_client(Behaviour::ServerError).await;

    // act
    let error = client.fetch_collections().await.unwrap_err();

    // assert
    assert!(
        matches!(error, UpstreamError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR),
        "{:?}",
        error
    );
}

#[tokio::test]
async fn a_body_of_the_wrong_shape_is_malformed() {
    // arrange
    let (client, _) = content_client(Behaviour::Garbage).await;

    // act
    let error = client.fetch_news().await.unwrap_err();

    // assert
    assert!(matches!(error, UpstreamError::Malformed { .. }), "{:?}", error);
}

#[tokio::test]
async fn the_bot_identity_is_read_from_get_me() {
    // arrange
    let (client, recorder) = bot_client().await;

    // act
    let identity = client.check_identity().await.unwrap();

    // assert
    assert!(identity.is_bot);
    assert_eq!(identity.username.as_deref(), Some("city_events_bot"));
    assert_eq!(recorder.requests()[0].path, format!("/bot{}/getMe", TOKEN));
}

#[tokio::test]
async fn text_and_photo_messages_are_posted_as_json() {
    // arrange
    let (client, recorder) = bot_client().await;

    // act
    client.send_text(ChatId(42), "Привет").await.unwrap();
    client
        .send_photo(ChatId(42), "https://media.example/1.jpg", "Концерт\n")
        .await
        .unwrap();
    client
        .set_webhook("https://bot.example/webhook")
        .await
        .unwrap();

    // assert
    let requests = recorder.requests();
    assert_eq!(requests[0].path, format!("/bot{}/sendMessage", TOKEN));
    assert_eq!(
        requests[0].body.as_ref().unwrap()["text"],
        json!("Привет")
    );
    assert_eq!(requests[0].body.as_ref().unwrap()["chat_id"], json!(42));
    assert_eq!(requests[1].path, format!("/bot{}/sendPhoto", TOKEN));
    let photo = requests[1].body.as_ref().unwrap();
    assert_eq!(photo["photo"], json!("https://media.example/1.jpg"));
    assert_eq!(photo["caption"], json!("Концерт\n"));
    assert_eq!(requests[2].path, format!("/bot{}/setWebhook", TOKEN));
    assert_eq!(
        requests[2].body.as_ref().unwrap()["url"],
        json!("https://bot.example/webhook")
    );
}

#[tokio::test]
async fn a_refusal_carries_the_platform_description() {
    // arrange
    let (client, _) = bot_client().await;

    // act
    let error = client
        .send_text(ChatId(UNKNOWN_CHAT), "Привет")
        .await
        .unwrap_err();

    // assert
    match error {
        UpstreamError::Rejected { description, .. } => {
            assert_eq!(description, "Bad Request: chat not found")
        }
        other => panic!("Expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn transport_errors_do_not_leak_the_token() {
    // arrange
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = TelegramClient::new(
        http_client(),
        &telegram(format!("http://127.0.0.1:{}", port)),
    );

    // act
    let error = client.send_text(ChatId(1), "Привет").await.unwrap_err();

    // assert
    assert!(matches!(error, UpstreamError::Transport { .. }));
    assert!(!format!("{:?}", error).contains(TOKEN));
}
