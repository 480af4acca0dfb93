//! OCR ingestion handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;

use crate::extract::{AuthClaims, Json};
use crate::handler::request::IngestDocuments;
use crate::handler::response::ErrorResponse;
use crate::handler::{ErrorKind, Result};
use crate::middleware::rate_limit_by_ip;
use crate::service::{IngestService, ServiceState};

/// Tracing target for OCR handlers.
const TRACING_TARGET: &str = "docsearch_server::handler::ocr";

/// Embeds and indexes the OCR paragraphs of uploaded documents.
#[tracing::instrument(skip_all, fields(username = %auth_claims.username()))]
async fn ingest_documents(
    State(ingest_service): State<IngestService>,
    auth_claims: AuthClaims,
    Json(request): Json<IngestDocuments>,
) -> Result<StatusCode> {
    let urls = request.into_urls();
    if urls.is_empty() {
        return Err(ErrorKind::BadRequest
            .with_message("At least one URL is required.")
            .with_resource("urls"));
    }

    let report = ingest_service.ingest(&urls).await?;

    tracing::info!(
        target: TRACING_TARGET,
        url_count = urls.len(),
        files_processed = report.files_processed,
        files_skipped = report.files_skipped,
        records_upserted = report.records_upserted,
        chunks_upserted = report.chunks_upserted,
        "documents ingested"
    );

    Ok(StatusCode::NO_CONTENT)
}

fn ingest_documents_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Ingest documents")
        .description(
            "Validates the signed URLs of uploaded documents, then embeds their \
             OCR paragraphs and stores the vectors under the document's file id. \
             Accepts `urls` or a single `url`.",
        )
        .response::<204, ()>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<429, Json<ErrorResponse>>()
        .response::<503, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// Requests are rate limited per client IP before they reach the handler.
///
/// [`Router`]: axum::routing::Router
pub fn routes(state: ServiceState) -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/ocr", post_with(ingest_documents, ingest_documents_docs))
        .route_layer(from_fn_with_state(state, rate_limit_by_ip))
        .with_path_items(|item| item.tag("Documents"))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode};
    use docsearch_core::mock::MockFixtureSource;
    use jiff::Timestamp;
    use serde_json::json;

    use crate::handler::test::{TestContext, forwarded_for};

    fn signed_url(file_id: &str) -> String {
        let expires = Timestamp::now().as_second() + 600;
        format!("https://storage.googleapis.com/new-bucket/{file_id}?Expires={expires}")
    }

    fn fixtures() -> MockFixtureSource {
        MockFixtureSource::new().with_paragraphs("report.pdf", ["Alpha.", "Beta.", "Gamma."])
    }

    #[tokio::test]
    async fn ingests_signed_urls() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.1"))
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"urls": [signed_url("report.pdf")]}))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(ctx.index.records().len(), 3);
        assert_eq!(ctx.embedder.embed_many_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn accepts_single_url_alias() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.1"))
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"url": signed_url("report.pdf")}))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(ctx.index.records().len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn absent_extraction_completes_without_records() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.1"))
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"urls": [signed_url("never-scanned.pdf")]}))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(ctx.fixtures.fetch_calls(), 1);
        assert_eq!(ctx.embedder.embed_many_calls(), 0);
        assert_eq!(ctx.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_empty_url_list() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.1"))
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"urls": []}))
            .await;

        response.assert_status_bad_request();
        assert_eq!(ctx.embedder.embed_many_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_foreign_bucket() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;
        let expires = Timestamp::now().as_second() + 600;
        let url = format!("https://storage.googleapis.com/other-bucket/report.pdf?Expires={expires}");

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.1"))
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"urls": [url]}))
            .await;

        response.assert_status_bad_request();
        assert_eq!(ctx.fixtures.fetch_calls(), 0);
        assert_eq!(ctx.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn embedding_outage_is_unavailable() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;
        ctx.embedder.set_failing(true);

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.1"))
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"urls": [signed_url("report.pdf")]}))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let error: serde_json::Value = response.json();
        assert_eq!(error["name"], "service_unavailable");
        assert_eq!(ctx.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn sixth_request_in_a_minute_is_limited() -> anyhow::Result<()> {
        let ctx = TestContext::with_fixtures(fixtures())?;
        let token = ctx.access_token()?;

        for _ in 0..5 {
            let response = ctx
                .server
                .post("/api/v1/ocr")
                .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.7"))
                .authorization_bearer(token.clone())
                .json(&json!({"urls": [signed_url("report.pdf")]}))
                .await;
            response.assert_status(StatusCode::NO_CONTENT);
        }

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.7"))
            .authorization_bearer(token.clone())
            .json(&json!({"urls": [signed_url("report.pdf")]}))
            .await;
        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));

        let response = ctx
            .server
            .post("/api/v1/ocr")
            .add_header(forwarded_for(), HeaderValue::from_static("10.0.0.8"))
            .authorization_bearer(token)
            .json(&json!({"urls": [signed_url("report.pdf")]}))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
        Ok(())
    }
}
