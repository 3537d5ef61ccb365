use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::extract::JsonBody;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new().route("/categories", get(list_categories).post(create_category))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    _session: SessionContext,
) -> Response {
    match services.categories.list().await {
        Ok(categories) => (
            StatusCode::OK,
            Json(json!({
                "categories": categories.iter().map(dto::category_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    _session: SessionContext,
    JsonBody(body): JsonBody<dto::CategoryRequest>,
) -> Response {
    match services.categories.create(&body.name).await {
        Ok(category) => (StatusCode::CREATED, Json(dto::category_to_json(&category))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
