//! Axum routing layer
//!
//! Thin translation between HTTP and the core: extract the token header
//! and raw body, call the engine, map the error taxonomy to a status.
//! No business logic lives here.
//!
//! Routes:
//! - `PUT /addresses` — submit an address update (204 on success)
//! - `GET /origin` — the caller's apparent source address
//! - anything else — 404 "Unknown action."

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use zonesync_core::{Error, SyncEngine, client_origin};

const TOKEN_HEADER: &str = "x-auth-token";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Build the daemon router
pub fn build_router(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/addresses", put(submit_update))
        .route("/origin", get(origin))
        .fallback(unknown_action)
        .with_state(engine)
}

/// `PUT /addresses` — token in `X-Auth-Token`, JSON body
async fn submit_update(
    State(engine): State<Arc<SyncEngine>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let token = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());

    match engine.submit_update(token, &body).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!(zone = engine.zone(), "update rejected: {e}");
            status_for(&e).into_response()
        }
    }
}

/// `GET /origin` — forwarded-for wins over the transport peer
async fn origin(ConnectInfo(peer): ConnectInfo<SocketAddr>, headers: HeaderMap) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok());
    client_origin(forwarded, peer.ip())
}

async fn unknown_action() -> Response {
    (StatusCode::NOT_FOUND, "Unknown action.").into_response()
}

/// Map the core error taxonomy to an HTTP status
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::BadRequest(_) => StatusCode::BAD_REQUEST,
        e if e.is_unprocessable() => StatusCode::UNPROCESSABLE_ENTITY,
        Error::ReloadFailed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
