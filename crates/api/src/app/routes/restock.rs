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
    Router::new().route("/restock", get(restock_page).post(restock))
}

pub async fn restock_page(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
) -> Response {
    match services.inventory.restock_view(session.owner()).await {
        Ok(view) => (StatusCode::OK, Json(dto::restock_to_json(&view))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// Apply an adjustment, then answer with the refreshed restock page.
pub async fn restock(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    JsonBody(body): JsonBody<dto::RestockRequest>,
) -> Response {
    let (item_id, direction, amount) = match body.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item = match services
        .inventory
        .adjust(session.owner(), item_id, direction, amount)
        .await
    {
        Ok(item) => item,
        Err(e) => return errors::ledger_error_to_response(e),
    };

    match services.inventory.restock_view(session.owner()).await {
        Ok(view) => {
            let mut page = dto::restock_to_json(&view);
            page["adjusted"] = json!(dto::item_to_json(&item, services.low_quantity()));
            (StatusCode::OK, Json(page)).into_response()
        }
        Err(e) => errors::ledger_error_to_response(e),
    }
}
