use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use airhouse_core::ItemId;

use crate::app::services::AppServices;
use crate::app::extract::JsonBody;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/items", post(create_item))
        .route("/items/:id", get(get_item))
        .route("/items/:id/edit", post(update_item).put(update_item))
        .route("/items/:id/delete", post(delete_item).delete(delete_item))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    JsonBody(body): JsonBody<dto::ItemRequest>,
) -> Response {
    let fields = match body.into_fields() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory.create(session.owner(), &fields).await {
        Ok(item) => (
            StatusCode::CREATED,
            Json(dto::item_to_json(&item, services.low_quantity())),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.get(session.owner(), id).await {
        Ok(item) => (StatusCode::OK, Json(dto::item_to_json(&item, services.low_quantity()))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<dto::ItemRequest>,
) -> Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let fields = match body.into_fields() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory.update(session.owner(), id, &fields).await {
        Ok(item) => (StatusCode::OK, Json(dto::item_to_json(&item, services.low_quantity()))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.delete(session.owner(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
