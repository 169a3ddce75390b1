use rocket::serde::json::{json, Value};
use rocket::Request;

#[catch(500)]
pub fn internal_error(req: &Request) -> Value {
    tracing::error!(uri = %req.uri(), "Request failed");
    json!({ "ok": false, "error": "internal server error" })
}
