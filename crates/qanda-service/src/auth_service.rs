//! Login, token refresh, and advisory logout.

use std::sync::Arc;

use tracing::{info, warn};

use qanda_core::{Actor, CoreError, CoreResult, MemberRepository};
use qanda_metadata::password;

use crate::token::{TokenKind, TokenPair, TokenService};

/// Business service for authentication flows.
pub struct AuthService {
    members: Arc<dyn MemberRepository>,
    tokens: TokenService,
}

impl AuthService {
    /// Creates the service over the member store and token signer.
    #[must_use]
    pub fn new(members: Arc<dyn MemberRepository>, tokens: TokenService) -> Self {
        Self { members, tokens }
    }

    /// Authenticates a member by email and password and issues a token pair.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown email; `Unauthorized` for a wrong password
    /// or a member who has quit.
    pub async fn login(&self, email: &str, plain_password: &str) -> CoreResult<TokenPair> {
        let member = self
            .members
            .get_by_email(email)
            .await?
            .ok_or_else(|| CoreError::not_found("member", email))?;

        if !password::verify_password(plain_password, &member.password_hash)? {
            warn!(member_id = %member.member_id, "login failed: bad credentials");
            return Err(CoreError::unauthorized("invalid credentials"));
        }
        if !member.is_active() {
            warn!(member_id = %member.member_id, "login failed: member has quit");
            return Err(CoreError::unauthorized("member is no longer active"));
        }

        let access_token =
            self.tokens
                .issue_access_token(member.member_id, &member.email, &member.roles)?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(member.member_id, &member.email)?;

        info!(member_id = %member.member_id, "issued token pair");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a fresh access token. The member row is
    /// re-resolved so roles are current and quit members are shut out even
    /// while their refresh token is still unexpired.
    ///
    /// # Errors
    ///
    /// `ExpiredToken` / `InvalidSignature` for a bad token; `Unauthorized`
    /// when the member has quit; `NotFound` when the member row is gone.
    pub async fn refresh(&self, refresh_token: &str) -> CoreResult<String> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let actor = claims.to_actor()?;

        let member = self
            .members
            .get(actor.member_id)
            .await?
            .ok_or_else(|| CoreError::not_found("member", actor.member_id.to_string()))?;
        if !member.is_active() {
            return Err(CoreError::unauthorized("member is no longer active"));
        }

        self.tokens
            .issue_access_token(member.member_id, &member.email, &member.roles)
    }

    /// Advisory logout. Tokens are stateless and carry no server-side
    /// session, so outstanding tokens stay valid until they expire; this
    /// only gives clients a uniform endpoint and an audit line.
    pub fn logout(&self, actor: &Actor) {
        info!(member_id = %actor.member_id, "member logged out (advisory; tokens expire naturally)");
    }
}
