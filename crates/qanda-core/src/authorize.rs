//! Authorization predicates over an explicit actor identity.
//!
//! Every lifecycle operation takes the authenticated actor as a parameter and
//! calls one of these checks before mutating anything. There is no ambient
//! security context.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::MemberId;
use crate::member::Role;

/// The authenticated identity making a request, as resolved from a verified
/// bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub member_id: MemberId,
    pub email: String,
    pub roles: Vec<Role>,
}

impl Actor {
    /// Creates an actor from resolved identity data.
    #[must_use]
    pub fn new(member_id: MemberId, email: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            member_id,
            email: email.into(),
            roles,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Derives the role set for a new identity. Allow-listed emails become
/// admins; everyone else is an ordinary user. Called exactly once, at
/// registration.
#[must_use]
pub fn derive_roles(email: &str, admin_allowlist: &[String]) -> Vec<Role> {
    if admin_allowlist.iter().any(|admin| admin == email) {
        vec![Role::Admin, Role::User]
    } else {
        vec![Role::User]
    }
}

/// Fails unless the actor owns the resource or holds the admin role.
///
/// # Errors
///
/// Returns `CoreError::Unauthorized` when the check does not pass.
pub fn ensure_owner_or_admin(actor: &Actor, owner: MemberId) -> CoreResult<()> {
    if actor.member_id == owner || actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::unauthorized(format!(
            "member {} may not act on a resource owned by {owner}",
            actor.member_id
        )))
    }
}

/// Fails unless the actor holds the admin role.
///
/// # Errors
///
/// Returns `CoreError::Unauthorized` when the actor is not an admin.
pub fn ensure_admin(actor: &Actor) -> CoreResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::unauthorized(format!(
            "member {} does not hold the admin role",
            actor.member_id
        )))
    }
}
