use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use airhouse_core::OrderId;

use crate::app::services::AppServices;
use crate::app::extract::JsonBody;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/edit", post(update_order).put(update_order))
        .route("/orders/:id/delete", post(delete_order).delete(delete_order))
}

/// Anonymous callers get an empty list rather than a 401.
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    session: Option<SessionContext>,
    Query(query): Query<dto::OrderListQuery>,
) -> Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.orders.list(session.as_ref().map(|s| s.owner()), &filter).await {
        Ok(orders) => (
            StatusCode::OK,
            Json(json!({
                "orders": orders.iter().map(dto::order_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    JsonBody(body): JsonBody<dto::OrderRequest>,
) -> Response {
    let form = body.into_form();

    match services.orders.create(session.owner(), &form).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Response {
    let id: OrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.get(session.owner(), id).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<dto::OrderRequest>,
) -> Response {
    let id: OrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let form = body.into_form();

    match services.orders.update(session.owner(), id, &form).await {
        Ok(order) => (StatusCode::OK, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Path(id): Path<String>,
) -> Response {
    let id: OrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.orders.delete(session.owner(), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
