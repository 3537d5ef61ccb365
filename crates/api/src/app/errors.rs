use core::str::FromStr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use airhouse_auth::account::BAD_CREDENTIALS;
use airhouse_core::{DomainError, FieldErrors};
use airhouse_infra::{IdentityError, LedgerError};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 422 with every field and non-field message (`field: null`).
pub fn validation_error(status: StatusCode, errors: &FieldErrors) -> Response {
    (
        status,
        axum::Json(json!({
            "error": "validation_error",
            "message": errors.to_string(),
            "errors": errors,
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(errors) => validation_error(StatusCode::UNPROCESSABLE_ENTITY, &errors),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> Response {
    match err {
        LedgerError::Domain(e) => domain_error_to_response(e),
        LedgerError::Store(e) => {
            error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

pub fn identity_error_to_response(err: IdentityError) -> Response {
    match err {
        IdentityError::Domain(e) => domain_error_to_response(e),
        IdentityError::InvalidCredentials => {
            let mut errors = FieldErrors::new();
            errors.push_non_field(BAD_CREDENTIALS);
            validation_error(StatusCode::UNAUTHORIZED, &errors)
        }
        IdentityError::Token(e) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string()),
        IdentityError::Password(e) => {
            error!(error = %e, "password hashing failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        IdentityError::Store(e) => {
            error!(error = %e, "account store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

/// Parse a path identifier; garbage is a 400 `invalid_id`.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}
