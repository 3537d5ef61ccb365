use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/dashboard", get(dashboard))
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Query(query): Query<dto::DashboardQuery>,
) -> Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory.list(session.owner(), &filter).await {
        Ok(view) => (StatusCode::OK, Json(dto::dashboard_to_json(&view))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
