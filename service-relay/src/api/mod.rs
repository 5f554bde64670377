pub mod ws;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub async fn not_found() -> Response {
    let body = Json(json!({"error": "Not found"}));
    (StatusCode::NOT_FOUND, body).into_response()
}
