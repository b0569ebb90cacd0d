use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use server_api::{submit_rsvp, ApiContext, SubmissionError};
use sheets::GoogleSheetsClient;
use shared::{
    error::ErrorCode,
    protocol::{RsvpResponse, RSVP_ACCEPTED_MESSAGE, RSVP_ROUTE},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const MAX_RSVP_BODY_BYTES: usize = 64 * 1024;
const BODY_TOO_LARGE_MESSAGE: &str = "Request body is too large";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let sheets_config = settings.sheets_config().map_err(|error| {
        error!(%error, "spreadsheet credentials are not configured");
        error
    })?;
    info!(
        spreadsheet_id = %sheets_config.spreadsheet_id,
        service_account = %sheets_config.credentials.client_email,
        range = %settings.sheet_range,
        "spreadsheet target configured"
    );

    let api = ApiContext {
        sheet: Arc::new(GoogleSheetsClient::new(sheets_config)),
        range: settings.sheet_range,
    };
    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(RSVP_ROUTE, post(http_submit_rsvp))
        .layer(RequestBodyLimitLayer::new(MAX_RSVP_BODY_BYTES))
        .layer(map_response(json_body_limit_response))
        .with_state(state)
}

/// The limit layer answers an oversized `Content-Length` with plain text
/// before any handler runs; callers always get the RSVP JSON shape instead.
async fn json_body_limit_response(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(RsvpResponse::failure(BODY_TOO_LARGE_MESSAGE)),
        )
            .into_response();
    }
    response
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_submit_rsvp(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<RsvpResponse>) {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let status = rejection.status();
            warn!(%status, error = %rejection.body_text(), "rsvp body rejected");
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                BODY_TOO_LARGE_MESSAGE.to_string()
            } else {
                rejection.body_text()
            };
            return (status, Json(RsvpResponse::failure(message)));
        }
    };

    match submit_rsvp(&state.api, &body).await {
        Ok(receipt) => {
            info!(rows = receipt.rows_appended, "rsvp accepted");
            (
                StatusCode::OK,
                Json(RsvpResponse::success(RSVP_ACCEPTED_MESSAGE)),
            )
        }
        Err(err) => {
            if !matches!(err, SubmissionError::Persistence(_)) {
                warn!(code = ?err.code(), error = %err, "rsvp rejected");
            }
            (
                status_for(err.code()),
                Json(RsvpResponse::failure(err.public_message())),
            )
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Parse | ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
