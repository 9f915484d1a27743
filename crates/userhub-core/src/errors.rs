//! Error taxonomy for the userhub API.
//!
//! Every failure that leaves a handler is one of four kinds:
//!
//! | Kind | Status | Body |
//! |------|--------|------|
//! | [`AppError::Validation`] | 400 | `{"error": "data validation error", "fields": [...]}` |
//! | [`AppError::Request`] | the carried status | `{"error": "<message>"}` |
//! | [`AppError::Shutdown`] | 500 | `{"error": "Internal Server Error"}` |
//! | [`AppError::Unclassified`] | 500 | `{"error": "Internal Server Error"}` |
//!
//! Lower layers are free to wrap errors with `anyhow` context. [`AppError::cause`]
//! digs through those layers and the `source()` chain to find the innermost
//! classified error before the response is built.

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// Message used for every 500 response body.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Message used for the body of a validation failure.
pub const DATA_VALIDATION_ERROR: &str = "data validation error";

/// A failure the caller can act on, carrying the HTTP status to respond with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    pub status: StatusCode,
    pub message: String,
}

impl RequestError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// A single invalid field in a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// The set of invalid fields found while decoding a request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, error: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, error);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, error: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            error: error.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns true if any entry names `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.error))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    error: error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();

        // HashMap iteration order is unstable; keep responses deterministic.
        fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.error.cmp(&b.error)));
        Self(fields)
    }
}

/// An integrity failure after which the service should stop taking traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ShutdownError {
    pub message: String,
}

impl ShutdownError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures raised by the user store and its repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("authentication failed")]
    AuthenticationFailure,
    #[error("attempted action is not allowed")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("ID is not in its proper form")]
    InvalidId,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    #[error("password hashing failed")]
    Hashing(#[source] anyhow::Error),
    #[error("database failure")]
    Database(#[source] anyhow::Error),
}

impl StoreError {
    /// The request-level error this failure maps to, or `None` when it is an
    /// internal failure the caller must not see.
    pub fn to_request_error(&self) -> Option<RequestError> {
        let status = match self {
            StoreError::AuthenticationFailure => StatusCode::UNAUTHORIZED,
            StoreError::Forbidden => StatusCode::FORBIDDEN,
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::InvalidId => StatusCode::BAD_REQUEST,
            StoreError::DeadlineExceeded => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Hashing(_) | StoreError::Database(_) => return None,
        };
        Some(RequestError::new(status, self.to_string()))
    }
}

/// JSON body written for every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

#[derive(Debug)]
pub enum AppError {
    Validation(FieldErrors),
    Request(RequestError),
    Shutdown(ShutdownError),
    Unclassified(anyhow::Error),
}

impl AppError {
    pub fn request(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Request(RequestError::new(status, message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::request(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::request(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::request(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::request(StatusCode::NOT_FOUND, message)
    }

    pub fn shutdown(message: impl Into<String>) -> Self {
        AppError::Shutdown(ShutdownError::new(message))
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        AppError::Unclassified(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Request(e) => e.status,
            AppError::Shutdown(_) | AppError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, AppError::Shutdown(_))
    }

    /// Resolves an unclassified error to the innermost classified error it
    /// wraps. Already classified errors are returned unchanged.
    pub fn cause(self) -> AppError {
        match self {
            AppError::Unclassified(err) => classify(err),
            other => other,
        }
    }

    /// The body sent to the client. Internal details never leave the process.
    pub fn body(&self) -> ErrorResponse {
        match self {
            AppError::Validation(fields) => ErrorResponse {
                error: DATA_VALIDATION_ERROR.to_string(),
                fields: Some(fields.clone()),
            },
            AppError::Request(e) => ErrorResponse {
                error: e.message.clone(),
                fields: None,
            },
            AppError::Shutdown(_) | AppError::Unclassified(_) => ErrorResponse {
                error: INTERNAL_SERVER_ERROR.to_string(),
                fields: None,
            },
        }
    }
}

fn classify(err: anyhow::Error) -> AppError {
    for source in err.chain() {
        if let Some(e) = source.downcast_ref::<RequestError>() {
            return AppError::Request(e.clone());
        }
        if let Some(e) = source.downcast_ref::<FieldErrors>() {
            return AppError::Validation(e.clone());
        }
        if let Some(e) = source.downcast_ref::<ShutdownError>() {
            return AppError::Shutdown(e.clone());
        }
        if let Some(e) = source.downcast_ref::<StoreError>() {
            if let Some(request) = e.to_request_error() {
                return AppError::Request(request);
            }
        }
    }
    AppError::Unclassified(err)
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(fields) => write!(f, "{}: {}", DATA_VALIDATION_ERROR, fields),
            AppError::Request(e) => write!(f, "{}", e),
            AppError::Shutdown(e) => write!(f, "shutdown: {}", e),
            AppError::Unclassified(e) => write!(f, "{:#}", e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Unclassified(err)
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        AppError::Request(err)
    }
}

impl From<FieldErrors> for AppError {
    fn from(err: FieldErrors) -> Self {
        AppError::Validation(err)
    }
}

impl From<ShutdownError> for AppError {
    fn from(err: ShutdownError) -> Self {
        AppError::Shutdown(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err.to_request_error() {
            Some(request) => AppError::Request(request),
            None => AppError::Unclassified(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::AuthenticationFailure, StatusCode::UNAUTHORIZED),
            (StoreError::Forbidden, StatusCode::FORBIDDEN),
            (StoreError::NotFound, StatusCode::NOT_FOUND),
            (StoreError::InvalidId, StatusCode::BAD_REQUEST),
            (StoreError::DeadlineExceeded, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn database_failure_is_unclassified() {
        let err = AppError::from(StoreError::Database(anyhow::anyhow!("connection reset")));
        assert!(matches!(err, AppError::Unclassified(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().error, INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn cause_finds_request_error_under_context() {
        let inner = anyhow::Error::new(RequestError::new(StatusCode::NOT_FOUND, "user missing"));
        let wrapped = inner.context("querying user").context("handling request");

        match AppError::Unclassified(wrapped).cause() {
            AppError::Request(e) => {
                assert_eq!(e.status, StatusCode::NOT_FOUND);
                assert_eq!(e.message, "user missing");
            }
            other => panic!("expected request error, got {:?}", other),
        }
    }

    #[test]
    fn cause_finds_store_error_in_source_chain() {
        let result: Result<(), StoreError> = Err(StoreError::Forbidden);
        let err = result.context("deleting user").unwrap_err();

        assert_eq!(
            AppError::Unclassified(err).cause().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn cause_finds_field_and_shutdown_errors() {
        let fields = anyhow::Error::new(FieldErrors::single("name", "name is a required field"));
        assert!(matches!(
            AppError::Unclassified(fields).cause(),
            AppError::Validation(_)
        ));

        let shutdown = anyhow::Error::new(ShutdownError::new("integrity")).context("outer");
        assert!(AppError::Unclassified(shutdown).cause().is_shutdown());
    }

    #[test]
    fn cause_leaves_plain_errors_unclassified() {
        let err = anyhow::anyhow!("disk on fire").context("writing");
        assert!(matches!(
            AppError::Unclassified(err).cause(),
            AppError::Unclassified(_)
        ));
    }

    #[test]
    fn cause_keeps_classified_errors() {
        let err = AppError::forbidden("nope").cause();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_body_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.push("email", "email must be a valid email address");
        let body = serde_json::to_value(AppError::Validation(fields).body()).unwrap();

        assert_eq!(body["error"], DATA_VALIDATION_ERROR);
        assert_eq!(body["fields"][0]["field"], "email");
        assert_eq!(
            body["fields"][0]["error"],
            "email must be a valid email address"
        );
    }

    #[test]
    fn request_body_omits_fields() {
        let body = serde_json::to_value(AppError::unauthorized("who are you").body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "who are you" }));
    }

    #[test]
    fn shutdown_body_is_generic() {
        let err = AppError::shutdown("web value missing from context");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().error, INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_convert_sorted() {
        use validator::Validate;

        #[derive(Validate)]
        struct Payload {
            #[validate(length(min = 1, message = "name is a required field"))]
            name: String,
            #[validate(email(message = "email must be a valid email address"))]
            email: String,
        }

        let errors = Payload {
            name: String::new(),
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();

        let fields = FieldErrors::from(errors);
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["email", "name"]);
    }
}
