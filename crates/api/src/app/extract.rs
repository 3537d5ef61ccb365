//! Request body extraction with the API's error envelope.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::Response;
use serde::de::DeserializeOwned;

use airhouse_core::FieldErrors;

use crate::app::errors;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// `Json<T>` whose type mismatches come back as a 422 `validation_error`
/// naming the offending field.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_to_response(rejection)),
        }
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> Response {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            errors::validation_error(StatusCode::UNPROCESSABLE_ENTITY, &data_error_fields(&e.body_text()))
        }
        JsonRejection::JsonSyntaxError(e) => {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_json", e.body_text())
        }
        JsonRejection::MissingJsonContentType(e) => {
            errors::json_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type", e.body_text())
        }
        other => errors::json_error(other.status(), "invalid_body", other.body_text()),
    }
}

/// Split `path: message` from a deserialization failure into a field error.
/// Failures without a field path become a non-field error.
fn data_error_fields(text: &str) -> FieldErrors {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    let mut errors = FieldErrors::new();
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && path != "." && !path.contains(char::is_whitespace) => {
            errors.push_field(path, message)
        }
        _ => errors.push_non_field(detail),
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_field_mismatch_names_the_field() {
        let errors = data_error_fields(
            "Failed to deserialize the JSON body into the target type: adjust_amount: invalid type: string \"abc\", expected i64 at line 1 column 24",
        );
        assert_eq!(
            errors.messages_for(Some("adjust_amount")),
            vec!["invalid type: string \"abc\", expected i64 at line 1 column 24"]
        );
    }

    #[test]
    fn nested_line_paths_are_kept() {
        let errors = data_error_fields(
            "Failed to deserialize the JSON body into the target type: lines[1].quantity: invalid type: string \"two\", expected i64",
        );
        assert_eq!(errors.messages_for(Some("lines[1].quantity")).len(), 1);
    }

    #[test]
    fn pathless_failure_is_non_field() {
        let errors = data_error_fields(
            "Failed to deserialize the JSON body into the target type: invalid type: sequence, expected struct RestockRequest",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.messages_for(None).len(), 1);
    }
}
