use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Field name to the list of messages reported for it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Body message for [`AppError::Database`]; the driver message never leaves the process.
pub const DATABASE_ERROR_MESSAGE: &str = "A database error occurred. Please try again later.";

/// Body message for [`AppError::Internal`].
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Error envelope returned by every endpoint on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Mirrors the HTTP status of the response.
    #[schema(example = 400)]
    pub status_code: u16,
    /// One of `Not Found`, `Validation Error`, `Business Rule Violation`,
    /// `Database Error`, `Internal Server Error`.
    #[serde(rename = "type")]
    #[schema(example = "Validation Error")]
    pub kind: &'static str,
    #[schema(example = "Validation error in field 'Id'.")]
    pub message: String,
    /// Raw error message. Development mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Request identifier, echoed in the `x-request-id` response header.
    pub trace_id: String,
    pub timestamp: DateTime<Utc>,
    /// Per-field messages. Validation errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Rendered cause chain. Development mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// Application-level error type.
///
/// Each variant is one failure kind of the HTTP surface. Once raised, a
/// variant travels through the service and handler layers unchanged; only
/// [`crate::middleware::error_boundary`] turns it into a response body.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or out-of-policy input. Never reaches the store.
    Validation {
        message: String,
        errors: FieldErrors,
    },
    /// Well-formed request without a matching entity.
    NotFound(String),
    /// Fault that is neither the caller's input nor the store's.
    Business {
        message: String,
        source: Option<BoxError>,
    },
    /// Store-layer fault, including timeouts.
    Database {
        message: String,
        source: Option<BoxError>,
    },
    /// Anything unclassified, e.g. a panicking handler.
    Internal {
        message: String,
        source: Option<BoxError>,
    },
}

impl AppError {
    /// Validation failure on a single field.
    pub fn validation(field: impl Into<String>, error: impl Into<String>) -> Self {
        let field = field.into();
        AppError::Validation {
            message: format!("Validation error in field '{field}'."),
            errors: FieldErrors::from([(field, vec![error.into()])]),
        }
    }

    /// Validation failure spanning the given fields.
    pub fn validation_errors(errors: FieldErrors) -> Self {
        if errors.len() == 1
            && let Some(field) = errors.keys().next()
        {
            return AppError::Validation {
                message: format!("Validation error in field '{field}'."),
                errors,
            };
        }
        AppError::Validation {
            message: "One or more validation errors occurred.".into(),
            errors,
        }
    }

    /// Validation failure not tied to a field.
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors: FieldErrors::new(),
        }
    }

    pub fn not_found(resource: &str, key: impl fmt::Display) -> Self {
        AppError::NotFound(format!("{resource} with id '{key}' was not found."))
    }

    pub fn business(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        AppError::Business {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn database(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        AppError::Database {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Business { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the envelope's `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "Not Found",
            AppError::Validation { .. } => "Validation Error",
            AppError::Business { .. } => "Business Rule Violation",
            AppError::Database { .. } => "Database Error",
            AppError::Internal { .. } => "Internal Server Error",
        }
    }

    /// The message as raised, before any redaction.
    pub fn raw_message(&self) -> &str {
        match self {
            AppError::NotFound(message) => message,
            AppError::Validation { message, .. }
            | AppError::Business { message, .. }
            | AppError::Database { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Database { .. } => DATABASE_ERROR_MESSAGE.into(),
            AppError::Internal { .. } => INTERNAL_ERROR_MESSAGE.into(),
            other => other.raw_message().to_owned(),
        }
    }

    /// Render this error and its sources, outermost first.
    pub fn cause_chain(&self) -> String {
        let mut lines = vec![format!("0: {self}")];
        let mut current = self.source();
        while let Some(cause) = current {
            lines.push(format!("{}: {cause}", lines.len()));
            current = cause.source();
        }
        lines.join("\n")
    }

    /// Build the response envelope. `diagnostics` adds the raw message and cause chain.
    pub fn to_body(&self, trace_id: &str, diagnostics: bool) -> ErrorBody {
        let errors = match self {
            AppError::Validation { errors, .. } => Some(errors.clone()),
            _ => None,
        };

        ErrorBody {
            status_code: self.status().as_u16(),
            kind: self.kind(),
            message: self.public_message(),
            details: diagnostics.then(|| self.raw_message().to_owned()),
            trace_id: trace_id.to_owned(),
            timestamp: Utc::now(),
            errors,
            stack_trace: diagnostics.then(|| self.cause_chain()),
        }
    }

    /// Emit one log record at the level matching the kind.
    pub fn log(&self, trace_id: &str) {
        match self {
            AppError::NotFound(message) => {
                tracing::warn!(%trace_id, "Resource not found: {message}");
            }
            AppError::Validation { message, errors } => {
                tracing::warn!(%trace_id, ?errors, "Validation error: {message}");
            }
            AppError::Business { message, .. } => {
                let cause = self.cause_chain();
                tracing::warn!(%trace_id, %cause, "Business rule violation: {message}");
            }
            AppError::Database { message, .. } => {
                let cause = self.cause_chain();
                tracing::error!(%trace_id, %cause, "Database error: {message}");
            }
            AppError::Internal { message, .. } => {
                let cause = self.cause_chain();
                tracing::error!(%trace_id, %cause, "Unexpected error: {message}");
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_message())
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AppError::Business { source, .. }
            | AppError::Database { source, .. }
            | AppError::Internal { source, .. } => source
                .as_deref()
                .map(|err| err as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

/// Response extension carrying the error a handler failed with.
///
/// The response produced by [`AppError::into_response`] has no body; the
/// error boundary reads this marker and writes the envelope.
#[derive(Clone, Debug)]
pub struct Failure(pub Arc<AppError>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(Failure(Arc::new(self)));
        response
    }
}

/// A panic payload turned into an error value.
#[derive(Debug, thiserror::Error)]
#[error("panicked: {0}")]
pub struct Panicked(pub String);

impl Panicked {
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Panicked(message)
    }
}
