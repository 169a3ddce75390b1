use rocket::serde::json::{json, Value};

#[get("/health_check")]
pub fn health() {}

#[get("/")]
pub fn index() -> Value {
    json!({ "ok": "Сервер запущен" })
}
