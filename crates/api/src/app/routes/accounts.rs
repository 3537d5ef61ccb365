use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::extract::JsonBody;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/logout", get(logout))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<dto::LoginRequest>,
) -> Response {
    match services.identity.login(&body.into()).await {
        Ok(issued) => (
            StatusCode::OK,
            Json(json!({
                "token": issued.token,
                "expires_at": issued.session.expires_at.to_rfc3339(),
                "user": dto::account_to_json(&issued.account),
            })),
        )
            .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<dto::SignupRequest>,
) -> Response {
    match services.identity.signup(&body.into()).await {
        Ok(issued) => (
            StatusCode::CREATED,
            Json(json!({
                "token": issued.token,
                "expires_at": issued.session.expires_at.to_rfc3339(),
                "user": dto::account_to_json(&issued.account),
            })),
        )
            .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
) -> Response {
    services.identity.logout(session.session_id());
    (StatusCode::OK, Json(json!({ "logged_out": true }))).into_response()
}
