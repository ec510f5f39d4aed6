//! The single place where failures become HTTP error bodies.

use std::any::Any;

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, Failure, Panicked};

/// Header carrying the request identifier, set by `SetRequestIdLayer`.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Whether error bodies carry the raw message and cause chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    pub enabled: bool,
}

/// Wraps every request. Responses without a [`Failure`] pass through
/// untouched; a failed response is logged once and replaced by the
/// [`crate::error::ErrorBody`] envelope for its kind.
pub async fn error_boundary(
    State(diagnostics): State<Diagnostics>,
    request: Request,
    next: Next,
) -> Response {
    let trace_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let response = next.run(request).await;

    let Some(Failure(error)) = response.extensions().get::<Failure>().cloned() else {
        return response;
    };

    error.log(&trace_id);
    let body = error.to_body(&trace_id, diagnostics.enabled);
    (error.status(), Json(body)).into_response()
}

/// `CatchPanicLayer` handler: a panicking handler is an unclassified failure.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let fault = Panicked::from_payload(payload.as_ref());
    AppError::Internal {
        message: "Request handler panicked".into(),
        source: Some(Box::new(fault)),
    }
    .into_response()
}
