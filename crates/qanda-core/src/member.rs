//! Member domain model: registration identity, roles, and quit lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ids::MemberId;

/// Registered member of the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub member_id: MemberId,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String, // Argon2 hash
    pub roles: Vec<Role>,
    pub status: MemberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Member status lifecycle. `Active -> Quit` happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Member can authenticate and act.
    Active,
    /// Member has left the board; their questions are deactivated.
    Quit,
}

/// Roles assigned at registration, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Ordinary member.
    User,
    /// Board operator: may answer questions and act on any resource.
    Admin,
}

impl MemberDescriptor {
    /// Creates a new active member. The password hash is set by the caller
    /// after hashing the plaintext credential.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        let now = Utc::now();
        Self {
            member_id: MemberId::new(),
            email: email.into(),
            name: name.into(),
            phone: phone.into(),
            password_hash: String::new(),
            roles,
            status: MemberStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the member as quit.
    pub fn quit(&mut self) {
        self.status = MemberStatus::Quit;
        self.touch();
    }

    /// Updates the `updated_at` timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

impl Role {
    /// Convert role to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

impl MemberStatus {
    /// Convert status to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Quit => "quit",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "quit" => Ok(MemberStatus::Quit),
            _ => Err(format!("invalid member status: {s}")),
        }
    }
}
