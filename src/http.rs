//! # HTTP Handlers
//!
//! Axum router exposing the filter pipeline. Every response is `200 OK`
//! with a JSON envelope; logical failures are reported in the body.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::gateway::StoreConnector;
use crate::service::FilterService;

/// Header naming the target container
pub const CONTAINER_HEADER: &str = "container";

pub fn router<C>(service: Arc<FilterService<C>>) -> Router
where
    C: StoreConnector + 'static,
{
    Router::new()
        .route("/api/filter", post(filter::<C>))
        .route("/api/columns", get(columns::<C>))
        .with_state(service)
}

async fn filter<C: StoreConnector + 'static>(
    State(service): State<Arc<FilterService<C>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = service.handle(container(&headers), &body).await;
    json_ok(body)
}

async fn columns<C: StoreConnector + 'static>(
    State(service): State<Arc<FilterService<C>>>,
    headers: HeaderMap,
) -> Response {
    let body = service.describe_columns(container(&headers)).await.into_json();
    json_ok(body)
}

fn container(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CONTAINER_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn json_ok(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}
