use rocket::http::Status;
use rocket::serde::json::{json, Value};
use rocket::Request;

/// A body that is JSON but not a bot update is the sender's fault.
#[catch(422)]
pub fn unprocessable_entity_to_bad_request(req: &Request) -> (Status, Value) {
    tracing::warn!(uri = %req.uri(), "Rejected an update that could not be parsed");
    (
        Status::BadRequest,
        json!({ "ok": false, "error": "malformed update" }),
    )
}
