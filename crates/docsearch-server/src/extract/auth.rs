//! Bearer token authentication.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use derive_more::Deref;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind};
use crate::service::{SessionKeys, TokenClaims};

/// Verified claims of the access token sent with the request.
///
/// Rejects with `401` when the `Authorization: Bearer` header is missing,
/// malformed, expired, or signed with another key. Claims are cached in the
/// request extensions so repeated extraction is free.
#[must_use]
#[derive(Debug, Clone, Deref)]
pub struct AuthClaims(pub TokenClaims);

impl AuthClaims {
    /// Username the token was issued to.
    #[inline]
    pub fn username(&self) -> &str {
        &self.0.sub
    }

    #[inline]
    pub fn into_inner(self) -> TokenClaims {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Sync + Send,
    SessionKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Self>() {
            return Ok(claims.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let header = match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(header) => header,
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                        .with_message("Authentication required")
                        .with_resource("authentication"),
                    _ => ErrorKind::MalformedAuthToken
                        .with_message("Invalid token format")
                        .with_context("Authorization header must contain a Bearer token")
                        .with_resource("authentication"),
                };
                return Err(error);
            }
        };

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(header.token()).inspect_err(|error| {
            tracing::debug!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "rejected access token"
            );
        })?;

        let claims = Self(claims);
        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

impl aide::OperationInput for AuthClaims {}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::FromRef;
    use axum::routing::get;
    use axum_test::TestServer;
    use jiff::{SignedDuration, Timestamp};

    use super::*;

    #[derive(Clone)]
    struct TestState {
        keys: SessionKeys,
    }

    impl FromRef<TestState> for SessionKeys {
        fn from_ref(state: &TestState) -> Self {
            state.keys.clone()
        }
    }

    async fn whoami(claims: AuthClaims) -> String {
        claims.username().to_owned()
    }

    fn server(keys: SessionKeys) -> anyhow::Result<TestServer> {
        let router = Router::new()
            .route("/whoami", get(whoami))
            .with_state(TestState { keys });
        Ok(TestServer::new(router)?)
    }

    #[tokio::test]
    async fn accepts_valid_token() -> anyhow::Result<()> {
        let keys = SessionKeys::from_secret("test-secret", 60);
        let token = keys.issue("alice")?;
        let server = server(keys)?;

        let response = server
            .get("/whoami")
            .authorization_bearer(token)
            .await;
        response.assert_status_ok();
        response.assert_text("alice");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_missing_header() -> anyhow::Result<()> {
        let server = server(SessionKeys::from_secret("test-secret", 60))?;

        let response = server.get("/whoami").await;
        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "missing_auth_token");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_foreign_signature() -> anyhow::Result<()> {
        let token = SessionKeys::from_secret("other-secret", 60).issue("alice")?;
        let server = server(SessionKeys::from_secret("test-secret", 60))?;

        let response = server
            .get("/whoami")
            .authorization_bearer(token)
            .await;
        response.assert_status_unauthorized();
        Ok(())
    }

    #[tokio::test]
    async fn rejects_expired_token() -> anyhow::Result<()> {
        let keys = SessionKeys::from_secret("test-secret", 60);
        let issued = Timestamp::now() - SignedDuration::from_hours(2);
        let token = keys.issue_at("alice", issued)?;
        let server = server(keys)?;

        let response = server
            .get("/whoami")
            .authorization_bearer(token)
            .await;
        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Access token has expired.");
        Ok(())
    }
}
