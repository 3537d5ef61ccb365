use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;

use airhouse_auth::SessionId;
use airhouse_core::Owner;

use crate::app::errors;

/// Authenticated session for a request.
///
/// Inserted by [`crate::middleware::auth_middleware`] once the bearer token and
/// its server-side session have been verified. Extracting it in a handler
/// makes the route require authentication; `Option<SessionContext>` makes it
/// optional.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    owner: Owner,
    session_id: SessionId,
}

impl SessionContext {
    pub fn new(owner: Owner, session_id: SessionId) -> Self {
        Self { owner, session_id }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .copied()
            .ok_or_else(|| errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required"))
    }
}
