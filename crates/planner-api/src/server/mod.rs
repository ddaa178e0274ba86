use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, ErrorCode, InlineSimulationRequest, SimulationRequest, SimulationResult,
    TopItemsResponse, SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::PlannerApi;

include!("error.rs");
include!("state.rs");
include!("routes/simulation.rs");
include!("routes/dashboard.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, api: PlannerApi) -> Result<(), ServerError> {
    let app = router(api);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "planner api listening");
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(api: PlannerApi) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/simulate", post(simulate_inline))
        .route(
            "/api/v1/users/{user_id}/simulation",
            post(simulate_for_user),
        )
        .route("/api/v1/users/{user_id}/top_items", get(get_top_items))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(AppState::new(api))
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
