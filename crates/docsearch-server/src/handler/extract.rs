//! Semantic search handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::{AuthClaims, Json, ValidateJson};
use crate::handler::request::ExtractText;
use crate::handler::response::{ErrorResponse, ExtractedText};
use crate::handler::Result;
use crate::service::{SearchService, ServiceState};

/// Tracing target for search handlers.
const TRACING_TARGET: &str = "docsearch_server::handler::extract";

/// Returns the paragraphs of one document closest to a query.
#[tracing::instrument(
    skip_all,
    fields(
        username = %auth_claims.username(),
        file_id = %request.file_id,
    )
)]
async fn extract_text(
    State(search_service): State<SearchService>,
    auth_claims: AuthClaims,
    ValidateJson(request): ValidateJson<ExtractText>,
) -> Result<(StatusCode, Json<ExtractedText>)> {
    let data = search_service
        .search(&request.query_text, &request.file_id)
        .await?;

    tracing::debug!(
        target: TRACING_TARGET,
        match_count = data.len(),
        "search completed"
    );

    Ok((StatusCode::OK, Json(ExtractedText { data })))
}

fn extract_text_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Search a document")
        .description(
            "Embeds the query and returns the best matching paragraphs of the given \
             document with their similarity scores. Results are cached per query and document.",
        )
        .response::<200, Json<ExtractedText>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<503, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/extract", post_with(extract_text, extract_text_docs))
        .with_path_items(|item| item.tag("Search"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use docsearch_core::types::{QueryMatch, RecordMetadata};
    use serde_json::json;

    use crate::handler::response::ExtractedText;
    use crate::handler::test::TestContext;
    use crate::service::cache_key;

    #[tokio::test]
    async fn returns_matches_and_caches_them() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;
        ctx.index.set_canned_matches(vec![
            QueryMatch {
                id: "a".to_owned(),
                score: 0.91,
                metadata: Some(RecordMetadata::new("Alpha.", "report.pdf")),
            },
            QueryMatch {
                id: "b".to_owned(),
                score: 0.42,
                metadata: None,
            },
        ]);
        let body = json!({"query_text": "what is alpha", "file_id": "report.pdf"});

        let response = ctx
            .server
            .post("/api/v1/extract")
            .authorization_bearer(ctx.access_token()?)
            .json(&body)
            .await;

        response.assert_status_ok();
        let first: ExtractedText = response.json();
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.data[0].text, "Alpha.");
        assert_eq!(first.data[1].text, "");

        let (_, ttl) = ctx
            .cache
            .entry(&cache_key("what is alpha", "report.pdf"))
            .ok_or_else(|| anyhow::anyhow!("search results were not cached"))?;
        assert_eq!(ttl, 86_400);

        let response = ctx
            .server
            .post("/api/v1/extract")
            .authorization_bearer(ctx.access_token()?)
            .json(&body)
            .await;
        let second: ExtractedText = response.json();
        assert_eq!(second.data, first.data);
        assert_eq!(ctx.embedder.embed_one_calls(), 1);
        assert_eq!(ctx.index.query_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn empty_query_is_rejected() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;

        let response = ctx
            .server
            .post("/api/v1/extract")
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"query_text": "", "file_id": "report.pdf"}))
            .await;

        response.assert_status_bad_request();
        assert_eq!(ctx.embedder.embed_one_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn index_outage_is_unavailable() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;
        ctx.index.set_query_failing(true);

        let response = ctx
            .server
            .post("/api/v1/extract")
            .authorization_bearer(ctx.access_token()?)
            .json(&json!({"query_text": "alpha", "file_id": "report.pdf"}))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ctx.cache.set_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn requires_authentication() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;

        let response = ctx
            .server
            .post("/api/v1/extract")
            .json(&json!({"query_text": "alpha", "file_id": "report.pdf"}))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}
