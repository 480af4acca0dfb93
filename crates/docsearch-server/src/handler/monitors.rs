//! Liveness handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;

use crate::extract::Json;
use crate::handler::response::MonitorStatus;
use crate::handler::Result;
use crate::service::ServiceState;

async fn health_status() -> Result<(StatusCode, Json<MonitorStatus>)> {
    Ok((StatusCode::OK, Json(MonitorStatus::default())))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health check")
        .description("Reports that the server is up, with its version.")
        .response::<200, Json<MonitorStatus>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}
