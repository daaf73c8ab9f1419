//! Member registration, lookup, and the quit cascade.

use std::sync::Arc;

use tracing::{debug, info};

use qanda_core::{
    derive_roles, ensure_owner_or_admin, Actor, CoreError, CoreResult, MemberDescriptor, MemberId,
    MemberRepository, Page, PageRequest,
};
use qanda_metadata::password;

/// Patch for member-editable profile fields. Absent fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Business service for member identities.
pub struct MemberService {
    members: Arc<dyn MemberRepository>,
    admin_emails: Vec<String>,
}

impl MemberService {
    /// Creates the service over its repository and the admin allowlist.
    #[must_use]
    pub fn new(members: Arc<dyn MemberRepository>, admin_emails: Vec<String>) -> Self {
        Self {
            members,
            admin_emails,
        }
    }

    /// Registers a new member. The email must be unused; roles are derived
    /// once, here, and never change afterwards.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` for a duplicate email, `ValidationError` for empty
    /// fields.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        phone: &str,
        plain_password: &str,
    ) -> CoreResult<MemberDescriptor> {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(CoreError::validation("a valid email is required"));
        }
        if name.trim().is_empty() {
            return Err(CoreError::validation("name must not be empty"));
        }
        if plain_password.len() < 8 {
            return Err(CoreError::validation(
                "password must be at least 8 characters",
            ));
        }

        if self.members.get_by_email(email).await?.is_some() {
            return Err(CoreError::already_exists("member", email));
        }

        let roles = derive_roles(email, &self.admin_emails);
        let mut member = MemberDescriptor::new(email, name, phone, roles);
        member.password_hash = password::hash_password(plain_password)?;

        self.members.create(&member).await?;
        info!(member_id = %member.member_id, "registered member");
        Ok(member)
    }

    /// Fetches a member profile; only the member themselves or an admin may
    /// read it.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for other actors, `NotFound` when absent.
    pub async fn find(&self, member_id: MemberId, actor: &Actor) -> CoreResult<MemberDescriptor> {
        ensure_owner_or_admin(actor, member_id)?;
        self.members
            .get(member_id)
            .await?
            .ok_or_else(|| CoreError::not_found("member", member_id.to_string()))
    }

    /// Lists members, newest first.
    pub async fn list(&self, request: PageRequest) -> CoreResult<Page<MemberDescriptor>> {
        let items = self.members.list(request.limit(), request.offset()).await?;
        let total = self.members.count().await?;
        Ok(Page::new(items, request, total))
    }

    /// Applies a partial profile update.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless the actor is the member or an admin.
    pub async fn update(
        &self,
        member_id: MemberId,
        actor: &Actor,
        patch: MemberPatch,
    ) -> CoreResult<MemberDescriptor> {
        ensure_owner_or_admin(actor, member_id)?;

        let mut member = self
            .members
            .get(member_id)
            .await?
            .ok_or_else(|| CoreError::not_found("member", member_id.to_string()))?;

        if let Some(name) = patch.name {
            member.name = name;
        }
        if let Some(phone) = patch.phone {
            member.phone = phone;
        }
        member.touch();

        self.members.update(&member).await?;
        Ok(member)
    }

    /// Quits a member: one-way `Active -> Quit`, cascading deactivation onto
    /// every question they authored in the same store transaction.
    ///
    /// # Errors
    ///
    /// `NotFound` when the member is absent or has already quit; re-quitting
    /// is rejected, not absorbed.
    pub async fn quit(&self, member_id: MemberId, actor: &Actor) -> CoreResult<()> {
        ensure_owner_or_admin(actor, member_id)?;

        let deactivated = self.members.quit(member_id).await?;
        debug!(member_id = %member_id, deactivated, "deactivated questions of quit member");
        Ok(())
    }
}
