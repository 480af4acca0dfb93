//! Document upload handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::{AuthClaims, Json, Multipart};
use crate::handler::response::{ErrorResponse, UploadedFile, UploadedFiles};
use crate::handler::Result;
use crate::service::{ServiceState, UploadService};

/// Tracing target for upload handlers.
const TRACING_TARGET: &str = "docsearch_server::handler::upload";

/// Name of the multipart field carrying the documents.
const FILES_FIELD: &str = "files";

/// Stores uploaded documents and returns signed read URLs for them.
#[tracing::instrument(skip_all, fields(username = %auth_claims.username()))]
async fn upload_files(
    State(upload_service): State<UploadService>,
    auth_claims: AuthClaims,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadedFiles>)> {
    let files = multipart.collect_files(FILES_FIELD).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        file_count = files.len(),
        "received upload"
    );

    let stored = upload_service.upload(files).await?;
    let files = stored.into_iter().map(UploadedFile::from_stored).collect();

    Ok((StatusCode::CREATED, Json(UploadedFiles { files })))
}

fn upload_files_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Upload documents")
        .description(
            "Stores images or PDFs sent as `files` parts of a multipart form and \
             returns a signed read URL for each, ready to be sent to the OCR endpoint.",
        )
        .response::<201, Json<UploadedFiles>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
        .response::<415, Json<ErrorResponse>>()
        .response::<503, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/upload", post_with(upload_files, upload_files_docs))
        .with_path_items(|item| item.tag("Documents"))
}
