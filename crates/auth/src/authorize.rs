//! Authorization gate: single-owner rule for resource mutation.

use tracing::debug;

use stockroom_core::{Entity, UserId};

use crate::error::AuthError;

/// Operation an authenticated actor wants to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Reads and creation only need a resolved identity; mutations of an
    /// existing resource also need ownership.
    pub fn requires_ownership(self) -> bool {
        matches!(self, Operation::Update | Operation::Delete)
    }
}

/// A resource bound to the identity that created it.
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

/// Strict owner equality. No hierarchy, no override, no shared ownership.
pub fn can_mutate(actor_id: UserId, resource_owner_id: UserId) -> bool {
    actor_id == resource_owner_id
}

/// Gate an operation that targets no existing resource (listing, creation).
///
/// A resolved `actor` is all these need. Ownership-gated operations always
/// name a resource, so reaching here with one reports `NotFound`, the same as
/// [`authorize`] with a missing resource.
pub fn authorize_access(actor: UserId, operation: Operation) -> Result<(), AuthError> {
    if operation.requires_ownership() {
        debug!(actor = %actor, ?operation, "ownership-gated operation without a target");
        return Err(AuthError::NotFound);
    }
    Ok(())
}

/// Decide whether `actor` may perform `operation` on an existing-or-missing
/// resource.
///
/// Existence is checked before ownership: a missing resource is `NotFound`
/// for everyone, an existing one owned by someone else is `Forbidden`.
///
/// - No IO
/// - No panics
pub fn authorize<R>(actor: UserId, operation: Operation, resource: Option<R>) -> Result<R, AuthError>
where
    R: Owned + Entity,
{
    let resource = resource.ok_or(AuthError::NotFound)?;

    if operation.requires_ownership() && !can_mutate(actor, resource.owner_id()) {
        debug!(
            actor = %actor,
            owner = %resource.owner_id(),
            resource_id = %resource.id(),
            ?operation,
            "authorization denied"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(resource)
}
