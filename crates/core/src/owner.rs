//! Ownership capability.

use crate::entity::Owned;
use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// Proof that the caller is an authenticated user.
///
/// Every ownership-scoped accessor takes `&Owner`. The API layer mints one
/// only after a token and its session have been verified, so holding an
/// `Owner` is what grants access to that user's rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    user_id: UserId,
}

impl Owner {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn owns<E: Owned>(&self, entity: &E) -> bool {
        entity.owner_id() == self.user_id
    }

    /// Hand the entity back only if this owner holds it.
    ///
    /// Rows owned by someone else are reported as `NotFound`, never as a
    /// permission error, so ids of other users' rows are not disclosed.
    pub fn guard<E: Owned>(&self, entity: E) -> DomainResult<E> {
        if self.owns(&entity) {
            Ok(entity)
        } else {
            Err(DomainError::NotFound)
        }
    }
}
