//! Token builders and an in-process fake server shared by unit tests.

use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Json, Path};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

/// Build an unsigned three-segment token around `payload`.
pub(crate) fn make_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

pub(crate) fn fresh_token() -> String {
    make_token(&json!({ "sub": "user-1", "exp": 9_999_999_999_u64 }))
}

pub(crate) fn expired_token() -> String {
    make_token(&json!({ "sub": "user-1", "exp": 1 }))
}

// =============================================================================
// In-process fake yak server
// =============================================================================

pub(crate) const GOOD_PASSWORD: &str = "hunter2";

/// Bind `router` on an ephemeral port and return its origin.
pub(crate) async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub(crate) async fn spawn_yak_server() -> String {
    spawn_server(yak_router()).await
}

fn failure(status: StatusCode, description: &str) -> Response {
    let body = json!({ "ok": false, "error_code": status.as_u16(), "description": description });
    (status, Json(body)).into_response()
}

fn success(status: StatusCode, result: Value) -> Response {
    (status, Json(json!({ "ok": true, "result": result }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("authorization")?.to_str().ok()?;
    raw.starts_with("Bearer").then(|| raw.to_owned())
}

async fn signup(Json(body): Json<Value>) -> Response {
    if body["name"] == "taken" {
        return failure(StatusCode::CONFLICT, "Name already exists");
    }
    success(StatusCode::CREATED, json!({ "name": body["name"] }))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != GOOD_PASSWORD {
        return failure(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let token = if body["name"] == "stale" { expired_token() } else { fresh_token() };
    success(StatusCode::CREATED, json!({ "id": "1", "name": body["name"], "token": token }))
}

async fn group_names(headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return failure(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    success(StatusCode::OK, json!(["A", "B"]))
}

async fn group(headers: HeaderMap, Path(group_name): Path<String>) -> Response {
    if bearer(&headers).is_none() {
        return failure(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    match group_name.as_str() {
        "missing" => failure(StatusCode::NOT_FOUND, "Group not found"),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(50)).await;
            success(StatusCode::OK, json!({ "group": group_name }))
        }
        _ => success(StatusCode::OK, json!({ "group": group_name })),
    }
}

async fn score_bet(method: Method, Path(match_id): Path<String>, body: Bytes) -> Response {
    let body = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);
    success(StatusCode::OK, json!({ "method": method.as_str(), "match_id": match_id, "body": body }))
}

async fn scores(headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return failure(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    success(StatusCode::OK, json!([{ "match_id": "m1" }]))
}

async fn score_board(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(authorization) => success(StatusCode::OK, json!({ "authorization": authorization })),
        None => failure(StatusCode::UNAUTHORIZED, "Invalid token"),
    }
}

async fn compute_points() -> StatusCode {
    StatusCode::OK
}

pub(crate) fn yak_router() -> Router {
    Router::new()
        .route("/api/v1/signup", post(signup))
        .route("/api/v1/login", post(login))
        .route("/api/v1/groups/names", get(group_names))
        .route("/api/v1/bets/groups/{group_name}", get(group))
        .route("/api/v1/bets/scores", get(scores))
        .route("/api/v1/bets/scores/{match_id}", get(score_bet).post(score_bet).patch(score_bet))
        .route("/api/v1/score_board", get(score_board))
        .route("/api/v1/compute_points", post(compute_points))
}
