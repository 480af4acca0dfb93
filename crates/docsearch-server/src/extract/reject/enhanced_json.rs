//! JSON body extractor and response wrapper.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::short_detail;
use crate::handler::{Error, ErrorKind};

/// [`axum::Json`] whose rejections render as [`Error`] bodies.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        let (message, detail) = match &rejection {
            JsonRejection::MissingJsonContentType(_) => (
                "Invalid content type",
                "Expected Content-Type: application/json".to_owned(),
            ),
            JsonRejection::JsonSyntaxError(err) => {
                ("Invalid JSON syntax in request body", err.body_text())
            }
            JsonRejection::JsonDataError(err) => ("Invalid request data format", err.body_text()),
            JsonRejection::BytesRejection(err) => ("Failed to read request body", err.body_text()),
            other => {
                return ErrorKind::InternalServerError
                    .with_message("Request processing failed")
                    .with_context(format!("unhandled JSON rejection: {other:?}"));
            }
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_context(short_detail(&detail))
    }
}

document_as!(Json<T> => AxumJson<T>, T);

impl<T> aide::OperationOutput for Json<T>
where
    T: schemars::JsonSchema + Serialize,
{
    type Inner = T;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        AxumJson::<T>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumJson::<T>::inferred_responses(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    use super::*;

    fn request(content_type: &str, body: &'static str) -> anyhow::Result<Request> {
        Ok(axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))?)
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() -> anyhow::Result<()> {
        let rejected = Json::<serde_json::Value>::from_request(request("text/plain", "{}")?, &())
            .await
            .err();

        let error = rejected.ok_or_else(|| anyhow::anyhow!("request was accepted"))?;
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Invalid content type"));
        Ok(())
    }

    #[tokio::test]
    async fn syntax_errors_are_bad_requests() -> anyhow::Result<()> {
        let rejected = Json::<serde_json::Value>::from_request(
            request("application/json", "{\"query\":")?,
            &(),
        )
        .await
        .err();

        let error = rejected.ok_or_else(|| anyhow::anyhow!("request was accepted"))?;
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert!(error.context().is_some());
        Ok(())
    }
}
