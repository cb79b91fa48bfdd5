//! Maps every failure that escapes the HTTP surface to a problem detail body.
//!
//! Handlers convert service errors with [`ApiError::from`], the extractor configs
//! returned by [`json_config`], [`path_config`] and [`query_config`] cover bodies
//! and parameters actix-web fails to read, [`no_handler_found`] is the default
//! service for unmatched paths and [`method_not_allowed`] the one for known paths
//! requested with an unsupported method.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use chrono::Utc;

use crate::api::ProblemDetail;
use crate::books_repository::BookRepositoryError;
use crate::services::{BookServiceError, DomainError};

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

const PROBLEM_TYPE_PREFIX: &str = "https://example.com/probs/";
const INTERNAL_ERROR_DETAIL: &str = "An unexpected error occurred. Please try again later.";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Domain(Box<dyn DomainError>),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Constraint violation: {}", .0.join(", "))]
    ConstraintViolation(Vec<String>),

    #[error("{0} parameter is missing")]
    MissingParameter(String),

    #[error("Malformed JSON request: {0}")]
    MessageNotReadable(String),

    #[error("{name} should be of type {expected}")]
    ArgumentTypeMismatch { name: String, expected: String },

    #[error("No handler found for {method} {path}")]
    NoHandlerFound { method: String, path: String },

    #[error("Request method {method} is not supported for {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<BookServiceError> for ApiError {
    fn from(err: BookServiceError) -> Self {
        match err {
            BookServiceError::NotFound(err) => ApiError::Domain(Box::new(err)),
            BookServiceError::AlreadyExists(err) => ApiError::Domain(Box::new(err)),
            BookServiceError::Repository(BookRepositoryError::ConstraintViolation(errors)) => {
                ApiError::ConstraintViolation(errors)
            }
            BookServiceError::Repository(err) => ApiError::Internal(err.into()),
        }
    }
}

impl ApiError {
    /// Renders the error for the request at `instance`.
    /// Internal errors are logged with their cause, which never reaches the client.
    pub fn into_problem_detail(self, instance: &str) -> ProblemDetail {
        let (status, problem_type, title, detail, errors, error_code) = match &self {
            ApiError::Domain(err) => (
                err.status(),
                err.kind(),
                err.kind().to_string(),
                err.to_string(),
                None,
                err.error_code(),
            ),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation-error",
                "Validation Error".to_string(),
                "Validation failed for the request.".to_string(),
                Some(errors.clone()),
                "VALIDATION_ERROR".to_string(),
            ),
            ApiError::ConstraintViolation(errors) => (
                StatusCode::BAD_REQUEST,
                "constraint-violation",
                "Constraint Violation".to_string(),
                "One or more validation errors occurred.".to_string(),
                Some(errors.clone()),
                "CONSTRAINT_VIOLATION".to_string(),
            ),
            ApiError::MissingParameter(_) => (
                StatusCode::BAD_REQUEST,
                "missing-parameter",
                "Missing Parameter".to_string(),
                self.to_string(),
                None,
                "MISSING_PARAMETER".to_string(),
            ),
            ApiError::MessageNotReadable(_) => (
                StatusCode::BAD_REQUEST,
                "message-not-readable",
                "Malformed JSON Request".to_string(),
                "Malformed JSON request".to_string(),
                None,
                "MESSAGE_NOT_READABLE".to_string(),
            ),
            ApiError::ArgumentTypeMismatch { .. } => (
                StatusCode::BAD_REQUEST,
                "method-argument-type-mismatch",
                "Method Argument Type Mismatch".to_string(),
                self.to_string(),
                None,
                "ARGUMENT_TYPE_MISMATCH".to_string(),
            ),
            ApiError::NoHandlerFound { .. } => (
                StatusCode::NOT_FOUND,
                "no-handler-found",
                "No Handler Found".to_string(),
                self.to_string(),
                None,
                "NO_HANDLER_FOUND".to_string(),
            ),
            ApiError::MethodNotAllowed { .. } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method-not-allowed",
                "Method Not Allowed".to_string(),
                self.to_string(),
                None,
                "METHOD_NOT_ALLOWED".to_string(),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal-server-error",
                "Internal Server Error".to_string(),
                INTERNAL_ERROR_DETAIL.to_string(),
                None,
                "INTERNAL_SERVER_ERROR".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Unhandled error for {}: {:?}", instance, self);
        } else {
            tracing::warn!("Request to {} failed: {}", instance, self);
        }

        ProblemDetail {
            problem_type: format!("{PROBLEM_TYPE_PREFIX}{problem_type}"),
            title,
            status: status.as_u16(),
            detail,
            instance: instance.to_string(),
            errors,
            timestamp: Utc::now(),
            error_code,
        }
    }
}

impl ResponseError for ProblemDetail {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(APPLICATION_PROBLEM_JSON)
            .json(self)
    }
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    ApiError::MessageNotReadable(err.to_string())
        .into_problem_detail(req.path())
        .into()
}

fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!("Failed to read path of {}: {}", req.path(), err);
    // every parameterized route takes a single integer id
    let name = req
        .match_info()
        .iter()
        .next()
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "path".to_string());

    ApiError::ArgumentTypeMismatch {
        name,
        expected: "integer".to_string(),
    }
    .into_problem_detail(req.path())
    .into()
}

fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    let api_error = match missing_field_name(&message) {
        Some(name) => ApiError::MissingParameter(name.to_string()),
        None => ApiError::MessageNotReadable(message),
    };
    api_error.into_problem_detail(req.path()).into()
}

/// Extracts `name` from serde's "missing field `name`" message
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = &message[message.find("missing field `")? + "missing field `".len()..];
    rest.split('`').next()
}

/// Default service, answers every request no route matched
pub async fn no_handler_found(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
    Err(ApiError::NoHandlerFound {
        method: req.method().to_string(),
        path: req.path().to_string(),
    }
    .into_problem_detail(req.path())
    .into())
}

/// Default service of every resource, answers methods the resource has no route for
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, actix_web::Error> {
    Err(ApiError::MethodNotAllowed {
        method: req.method().to_string(),
        path: req.path().to_string(),
    }
    .into_problem_detail(req.path())
    .into())
}
