//! Account registration and login handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use docsearch_core::ErrorKind as CoreErrorKind;
use docsearch_core::types::Account as AccountModel;

use crate::extract::{Form, Json, ValidateJson};
use crate::handler::request::{Login, Register};
use crate::handler::response::{AccessToken, Account, ErrorResponse};
use crate::handler::{ErrorKind, Result};
use crate::service::{AccountRepository, PasswordHasher, ServiceState, SessionKeys};

/// Tracing target for authentication handlers.
const TRACING_TARGET: &str = "docsearch_server::handler::authentication";

/// Creates a new account.
#[tracing::instrument(skip_all, fields(username = %request.username))]
async fn register(
    State(accounts): State<AccountRepository>,
    State(password_hasher): State<PasswordHasher>,
    ValidateJson(request): ValidateJson<Register>,
) -> Result<(StatusCode, Json<Account>)> {
    tracing::trace!(target: TRACING_TARGET, "registration attempt");

    let password_hash = password_hasher.hash_password(&request.password)?;
    let account = AccountModel::new(request.username.clone(), password_hash);

    let account = accounts.create(account).await.map_err(|error| {
        if error.kind() == CoreErrorKind::Conflict {
            ErrorKind::Conflict
                .with_message(format!("Username {} already exists.", request.username))
                .with_resource("account")
        } else {
            error.into()
        }
    })?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "account registered"
    );

    Ok((StatusCode::CREATED, Json(Account::from_model(account))))
}

fn register_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Register account")
        .description("Creates an account from a username and a password.")
        .response::<201, Json<Account>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<409, Json<ErrorResponse>>()
}

/// Exchanges credentials for an access token.
#[tracing::instrument(skip_all, fields(username = %request.username))]
async fn login(
    State(accounts): State<AccountRepository>,
    State(password_hasher): State<PasswordHasher>,
    State(session_keys): State<SessionKeys>,
    Form(request): Form<Login>,
) -> Result<(StatusCode, Json<AccessToken>)> {
    tracing::trace!(target: TRACING_TARGET, "login attempt");

    let Some(account) = accounts.find_by_username(&request.username).await? else {
        tracing::debug!(target: TRACING_TARGET, "login failed: unknown user");
        return Err(ErrorKind::NotFound
            .with_message(format!("User {} not found.", request.username))
            .with_resource("account"));
    };

    password_hasher
        .verify_password(&request.password, &account.password_hash)
        .inspect_err(|_| {
            tracing::warn!(target: TRACING_TARGET, "login failed: wrong password");
        })?;

    let access_token = session_keys.issue(&account.username)?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %account.id,
        "access token issued"
    );

    Ok((StatusCode::OK, Json(AccessToken::bearer(access_token))))
}

fn login_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Login")
        .description(
            "Verifies a username and password sent as an OAuth2 password form \
             and returns a bearer access token.",
        )
        .response::<200, Json<AccessToken>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/auth/register", post_with(register, register_docs))
        .api_route("/auth/login", post_with(login, login_docs))
        .with_path_items(|item| item.tag("Authentication"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::handler::response::{AccessToken, Account};
    use crate::handler::test::TestContext;

    #[tokio::test]
    async fn register_then_login() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;

        let response = ctx
            .server
            .post("/api/v1/auth/register")
            .json(&json!({"username": "alice", "password": "correct-horse"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let account: Account = response.json();
        assert_eq!(account.username, "alice");

        let response = ctx
            .server
            .post("/api/v1/auth/login")
            .form(&[("username", "alice"), ("password", "correct-horse")])
            .await;
        response.assert_status_ok();
        let token: AccessToken = response.json();
        assert_eq!(token.token_type, "Bearer");

        let claims = ctx.state.session_keys().verify(&token.access_token)?;
        assert_eq!(claims.sub, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;
        let body = json!({"username": "alice", "password": "correct-horse"});

        ctx.server.post("/api/v1/auth/register").json(&body).await;
        let response = ctx.server.post("/api/v1/auth/register").json(&body).await;

        response.assert_status(axum::http::StatusCode::CONFLICT);
        let error: serde_json::Value = response.json();
        assert_eq!(error["message"], "Username alice already exists.");
        Ok(())
    }

    #[tokio::test]
    async fn short_password_is_rejected() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;

        let response = ctx
            .server
            .post("/api/v1/auth/register")
            .json(&json!({"username": "alice", "password": "short"}))
            .await;

        response.assert_status_bad_request();
        assert_eq!(ctx.accounts.len(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;

        let response = ctx
            .server
            .post("/api/v1/auth/login")
            .form(&[("username", "bob"), ("password", "whatever-it-is")])
            .await;

        response.assert_status_not_found();
        let error: serde_json::Value = response.json();
        assert_eq!(error["message"], "User bob not found.");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;
        ctx.server
            .post("/api/v1/auth/register")
            .json(&json!({"username": "alice", "password": "correct-horse"}))
            .await;

        let response = ctx
            .server
            .post("/api/v1/auth/login")
            .form(&[("username", "alice"), ("password", "battery-staple")])
            .await;

        response.assert_status_unauthorized();
        let error: serde_json::Value = response.json();
        assert_eq!(error["message"], "Incorrect username or password");
        Ok(())
    }
}
