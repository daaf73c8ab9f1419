//! Stateless signed bearer tokens.
//!
//! Tokens are a pure function of the signing key: nothing is persisted
//! server-side, so verification works on any instance holding the key. The
//! flip side is that logout cannot invalidate an outstanding access token;
//! it stays usable until it expires.

use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use qanda_core::{Actor, CoreError, CoreResult, MemberId, Role};

/// Distinguishes access from refresh tokens so one cannot stand in for the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by a signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Member id of the subject.
    pub sub: String,
    /// Subject's email.
    pub email: String,
    /// Role names; empty for refresh tokens.
    pub roles: Vec<String>,
    /// Which kind of token this is.
    pub kind: TokenKind,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiration, seconds since the epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Resolves the claims into an actor identity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSignature` when the subject or roles are not parseable;
    /// a well-formed token from our own signer never fails here.
    pub fn to_actor(&self) -> CoreResult<Actor> {
        let member_id = MemberId::from_str(&self.sub).map_err(|_| CoreError::InvalidSignature)?;
        let roles = self
            .roles
            .iter()
            .map(|r| Role::from_str(r).map_err(|_| CoreError::InvalidSignature))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Actor::new(member_id, self.email.clone(), roles))
    }
}

/// Access and refresh token pair returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies HMAC-signed bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Creates a token service from the signing key and per-kind lifetimes.
    #[must_use]
    pub fn new(secret: &str, access_ttl_minutes: i64, refresh_ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::minutes(refresh_ttl_minutes),
        }
    }

    /// Issues an access token carrying the subject's identity and roles.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if signing fails.
    pub fn issue_access_token(
        &self,
        member_id: MemberId,
        email: &str,
        roles: &[Role],
    ) -> CoreResult<String> {
        self.issue(member_id, email, roles, TokenKind::Access, self.access_ttl)
    }

    /// Issues a refresh token carrying the subject only.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if signing fails.
    pub fn issue_refresh_token(&self, member_id: MemberId, email: &str) -> CoreResult<String> {
        self.issue(member_id, email, &[], TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(
        &self,
        member_id: MemberId,
        email: &str,
        roles: &[Role],
        kind: TokenKind,
        ttl: Duration,
    ) -> CoreResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: member_id.to_string(),
            email: email.to_string(),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CoreError::internal(format!("token signing failed: {e}")))
    }

    /// Verifies a token of the expected kind and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `ExpiredToken` for tokens past their expiration and
    /// `InvalidSignature` for everything else that fails verification,
    /// including a kind mismatch.
    pub fn verify(&self, token: &str, expected: TokenKind) -> CoreResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CoreError::ExpiredToken,
                _ => CoreError::InvalidSignature,
            }
        })?;

        if data.claims.kind != expected {
            return Err(CoreError::InvalidSignature);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 30, 420)
    }

    #[test]
    fn access_token_round_trip() {
        let service = service();
        let member_id = MemberId::new();
        let token = service
            .issue_access_token(member_id, "a@example.com", &[Role::Admin, Role::User])
            .unwrap();

        let claims = service.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, member_id.to_string());
        assert_eq!(claims.email, "a@example.com");

        let actor = claims.to_actor().unwrap();
        assert_eq!(actor.member_id, member_id);
        assert!(actor.is_admin());
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let expired = TokenService::new("test-secret", -5, -5);
        let token = expired
            .issue_access_token(MemberId::new(), "a@example.com", &[Role::User])
            .unwrap();

        let err = service().verify(&token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, CoreError::ExpiredToken));
    }

    #[test]
    fn tampered_token_is_rejected_as_invalid_signature() {
        let token = service()
            .issue_access_token(MemberId::new(), "a@example.com", &[Role::User])
            .unwrap();

        let mut tampered = token.into_bytes();
        let last = tampered.last_mut().unwrap();
        *last = if *last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        let err = service().verify(&tampered, TokenKind::Access).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSignature));
    }

    #[test]
    fn wrong_key_is_rejected_as_invalid_signature() {
        let token = TokenService::new("other-secret", 30, 420)
            .issue_access_token(MemberId::new(), "a@example.com", &[Role::User])
            .unwrap();

        let err = service().verify(&token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSignature));
    }

    #[test]
    fn refresh_token_cannot_authenticate_as_access_token() {
        let service = service();
        let refresh = service
            .issue_refresh_token(MemberId::new(), "a@example.com")
            .unwrap();

        assert!(matches!(
            service.verify(&refresh, TokenKind::Access).unwrap_err(),
            CoreError::InvalidSignature
        ));
        assert!(service.verify(&refresh, TokenKind::Refresh).is_ok());
    }
}
