//! Entry, index and static informational pages.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(entry))
        .route("/index", get(index))
        .route("/billing", get(billing))
        .route("/returns", get(returns))
        .route("/projects", get(projects))
        .route("/refer", get(refer))
        .route("/help", get(help))
}

/// Landing page. Arriving here ends any session the caller still carries.
pub async fn entry(
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<SessionContext>,
) -> Response {
    let logged_out = session
        .map(|s| services.identity.logout(s.session_id()))
        .unwrap_or(false);

    Json(json!({
        "page": "entry",
        "logged_out": logged_out,
    }))
    .into_response()
}

/// Index page; names the signed-in user when there is one.
pub async fn index(
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<SessionContext>,
) -> Response {
    let user = match session {
        Some(s) => match services.identity.account(s.owner().user_id()).await {
            Ok(account) => Some(dto::account_to_json(&account)),
            Err(e) => return errors::identity_error_to_response(e),
        },
        None => None,
    };

    Json(json!({
        "page": "index",
        "title": "Inventory management",
        "user": user,
    }))
    .into_response()
}

pub async fn billing(_session: SessionContext) -> Response {
    page("billing", "Billing")
}

pub async fn returns(_session: SessionContext) -> Response {
    page("returns", "Returns")
}

pub async fn projects(_session: SessionContext) -> Response {
    page("projects", "Projects")
}

pub async fn refer(_session: SessionContext) -> Response {
    page("refer", "Refer a friend")
}

pub async fn help(_session: SessionContext) -> Response {
    page("help", "Help")
}

fn page(name: &'static str, title: &'static str) -> Response {
    Json(json!({ "page": name, "title": title })).into_response()
}
