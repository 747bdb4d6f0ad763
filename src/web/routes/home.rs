use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn home() -> Json<Value> {
    Json(json!({ "message": "API da academia. Veja /membros/, /planos/ e /assinaturas/" }))
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
