//! Entity traits: identity, and ownership for user-scoped records.

use crate::id::UserId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that belongs directly to one user.
pub trait Owned: Entity {
    fn owner_id(&self) -> UserId;
}
