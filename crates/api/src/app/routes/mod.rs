use axum::Router;

pub mod accounts;
pub mod categories;
pub mod dashboard;
pub mod items;
pub mod orders;
pub mod pages;
pub mod restock;
pub mod system;

/// Router for every endpoint except `/health`.
///
/// Authentication is decided per handler: extracting
/// [`crate::context::SessionContext`] requires a verified session.
pub fn router() -> Router {
    Router::new()
        .merge(pages::router())
        .merge(accounts::router())
        .merge(dashboard::router())
        .merge(categories::router())
        .merge(items::router())
        .merge(restock::router())
        .merge(orders::router())
}
