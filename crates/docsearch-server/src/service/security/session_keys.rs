//! Access token signing and verification.

use std::fmt;
use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{ErrorKind, Result};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username the token was issued to.
    pub sub: String,
    /// Issued-at time in Unix seconds.
    pub iat: i64,
    /// Expiry time in Unix seconds.
    pub exp: i64,
}

/// HMAC keys used to issue and verify access tokens.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    token_lifetime: SignedDuration,
}

impl SessionKeys {
    /// Derives both keys from a shared secret.
    pub fn from_secret(secret: &str, token_lifetime_minutes: u64) -> Self {
        let minutes = i64::try_from(token_lifetime_minutes).unwrap_or(i64::MAX / 60);
        let inner = SessionKeysInner {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            token_lifetime: SignedDuration::from_mins(minutes),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns how long issued tokens stay valid.
    #[inline]
    pub fn token_lifetime(&self) -> SignedDuration {
        self.inner.token_lifetime
    }

    /// Validation rules for HS256 tokens with a mandatory expiry.
    pub fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }

    /// Issues a token for `username`, valid from `now`.
    pub fn issue_at(&self, username: &str, now: Timestamp) -> Result<String> {
        let claims = TokenClaims {
            sub: username.to_owned(),
            iat: now.as_second(),
            exp: now.as_second().saturating_add(self.inner.token_lifetime.as_secs()),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, self.encoding_key())
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %e,
                    "Failed to sign access token"
                );
                ErrorKind::InternalServerError
                    .with_message("Token issuance failed")
                    .with_resource("authentication")
            })
    }

    /// Issues a token for `username`, valid from now.
    #[inline]
    pub fn issue(&self, username: &str) -> Result<String> {
        self.issue_at(username, Timestamp::now())
    }

    /// Verifies the signature and expiry of `token` and returns its claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, self.decoding_key(), &Self::validation())?;
        Ok(data.claims)
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("token_lifetime", &self.inner.token_lifetime)
            .finish_non_exhaustive()
    }
}
