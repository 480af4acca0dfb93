#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process::ExitCode;

use anyhow::Context;
use axum::Router;
use docsearch_server::handler::routes;
use docsearch_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use docsearch_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig, create_dependencies};

pub const TRACING_TARGET_SERVER_STARTUP: &str = "docsearch_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "docsearch_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "docsearch_cli::config";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if tracing::enabled!(target: TRACING_TARGET_SERVER_SHUTDOWN, tracing::Level::ERROR) {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = format!("{error:#}"),
                    "Exiting"
                );
            } else {
                eprintln!("docsearch: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let dependencies = create_dependencies(&cli).await?;
    let state = ServiceState::from_dependencies(&cli.service, dependencies)
        .context("failed to create service state")?;

    let body_limit = cli.middleware.body_limit(&cli.service);
    let router = create_router(state, &cli.middleware, body_limit);

    server::serve(router, cli.server)
        .await
        .context("HTTP server stopped with an error")
}

/// Wraps the API routes in middleware, outermost first: recovery,
/// observability, security, then client IP resolution.
fn create_router(
    state: ServiceState,
    middleware: &MiddlewareConfig,
    body_limit: usize,
) -> Router {
    let api: Router = routes(state.clone())
        .with_state::<()>(state)
        .with_open_api(&middleware.openapi);

    api.layer(middleware.client_ip_source().into_extension())
        .with_security(
            &middleware.cors,
            &SecurityHeadersConfig::default(),
            body_limit,
        )
        .with_observability()
        .with_recovery(&middleware.recovery)
}
