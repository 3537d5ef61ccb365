use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use airhouse_core::Owner;
use airhouse_infra::IdentityService;

use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub identity: IdentityService,
}

/// Verify a presented bearer token and attach the [`SessionContext`].
///
/// Requests without a valid token pass through anonymously; handlers that
/// extract `SessionContext` answer them with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = extract_bearer(req.headers()).ok().and_then(|token| {
        state
            .identity
            .authenticate(token, Utc::now())
            .map_err(|e| debug!(error = %e, "bearer token rejected"))
            .ok()
    });

    if let Some(who) = session {
        req.extensions_mut()
            .insert(SessionContext::new(Owner::new(who.user_id), who.session_id));
    }

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
