//! Local HTTP front for the handler.
//!
//! Requests on `/` and `/translate` are converted into [`HttpEvent`]s and
//! answered with whatever the handler returns, so the same code path serves
//! both the function runtime and a plain HTTP listener.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::core::error::HandlerError;
use crate::core::types::{HttpEvent, HttpResponse};
use crate::handler::TranslationHandler;

/// Builds the router. Bodies over `max_body_bytes` are answered with the
/// handler's error envelope instead of axum's plain-text rejection.
pub fn router(handler: Arc<TranslationHandler>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", any(dispatch))
        .route("/translate", any(dispatch))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(ServerState {
            handler,
            max_body_bytes,
        })
}

#[derive(Clone)]
struct ServerState {
    handler: Arc<TranslationHandler>,
    max_body_bytes: usize,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn dispatch(
    State(state): State<ServerState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> HttpResponse {
    let handler = &state.handler;
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let error = body_rejection_error(&rejection, state.max_body_bytes);
            return handler.error_response(&error);
        }
    };

    let body = if body.is_empty() {
        None
    } else {
        match String::from_utf8(body.to_vec()) {
            Ok(body) => Some(body),
            Err(error) => {
                return handler.error_response(&HandlerError::MalformedBody {
                    message: error.to_string(),
                });
            }
        }
    };

    let event = HttpEvent {
        http_method: method.as_str().to_string(),
        headers: Some(event_headers(&headers)),
        body,
    };

    handler.handle(&event).await
}

fn body_rejection_error(rejection: &BytesRejection, max_body_bytes: usize) -> HandlerError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        HandlerError::BodyTooLarge {
            limit_bytes: max_body_bytes,
        }
    } else {
        HandlerError::MalformedBody {
            message: rejection.body_text(),
        }
    }
}

fn event_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => warn!(header = %name, "dropping response header that is not valid HTTP"),
            }
        }

        response
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
