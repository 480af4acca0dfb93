//! HTTP handlers mounted under `/api/v1`.

mod authentication;
mod error;
mod extract;
mod monitors;
mod ocr;
mod upload;

pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Path prefix of every API route.
pub const API_PREFIX: &str = "/api/v1";

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes nested under [`API_PREFIX`].
///
/// `state` is needed up front by the route-scoped rate limiter.
pub fn routes(state: ServiceState) -> ApiRouter<ServiceState> {
    let api = ApiRouter::new()
        .merge(authentication::routes())
        .merge(upload::routes())
        .merge(ocr::routes(state))
        .merge(extract::routes())
        .merge(monitors::routes());

    ApiRouter::new().nest(API_PREFIX, api).fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use axum::Router;
    use axum::http::HeaderName;
    use axum_client_ip::ClientIpSource;
    use axum_test::TestServer;
    use docsearch_core::mock::{
        MockAccountStore, MockDocumentStore, MockEmbedder, MockFixtureSource, MockSearchCache,
        MockVectorIndex,
    };

    use crate::handler::routes;
    use crate::service::{ServiceConfig, ServiceDependencies, ServiceState};

    /// Header the test server reads client addresses from.
    pub fn forwarded_for() -> HeaderName {
        HeaderName::from_static("x-forwarded-for")
    }

    /// Returns the configuration shared by handler tests.
    pub fn service_config() -> anyhow::Result<ServiceConfig> {
        let config = ServiceConfig::builder()
            .with_jwt_secret_key("handler-test-secret")
            .with_embedding_chunk_size(2_usize)
            .build()?;
        Ok(config)
    }

    /// A running test server and the mocks behind it.
    pub struct TestContext {
        pub server: TestServer,
        pub state: ServiceState,
        pub cache: Arc<MockSearchCache>,
        pub embedder: Arc<MockEmbedder>,
        pub index: Arc<MockVectorIndex>,
        pub fixtures: Arc<MockFixtureSource>,
        pub accounts: Arc<MockAccountStore>,
        pub documents: Arc<MockDocumentStore>,
    }

    impl TestContext {
        pub fn new() -> anyhow::Result<Self> {
            Self::with_fixtures(MockFixtureSource::new())
        }

        pub fn with_fixtures(fixtures: MockFixtureSource) -> anyhow::Result<Self> {
            let config = service_config()?;

            let cache = Arc::new(MockSearchCache::new());
            let embedder = Arc::new(MockEmbedder::new(8));
            let index = Arc::new(MockVectorIndex::new());
            let fixtures = Arc::new(fixtures);
            let accounts = Arc::new(MockAccountStore::new());
            let documents = Arc::new(MockDocumentStore::new(
                &config.storage_domain,
                &config.bucket_name,
            ));

            let dependencies = ServiceDependencies {
                cache: cache.clone(),
                embedder: embedder.clone(),
                index: index.clone(),
                fixtures: fixtures.clone(),
                accounts: accounts.clone(),
                documents: documents.clone(),
            };

            let state = ServiceState::from_dependencies(&config, dependencies)?;
            let app: Router = routes(state.clone()).with_state::<()>(state.clone()).into();
            let app = app.layer(ClientIpSource::RightmostXForwardedFor.into_extension());
            let server = TestServer::new(app)?;

            Ok(Self {
                server,
                state,
                cache,
                embedder,
                index,
                fixtures,
                accounts,
                documents,
            })
        }

        /// Issues a valid access token for `tester`.
        pub fn access_token(&self) -> anyhow::Result<String> {
            Ok(self.state.session_keys().issue("tester")?)
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> anyhow::Result<()> {
        let ctx = TestContext::new()?;

        let response = ctx.server.get("/api/v1/missing").await;
        response.assert_status_not_found();

        let error: serde_json::Value = response.json();
        assert_eq!(error["name"], "not_found");
        Ok(())
    }
}
