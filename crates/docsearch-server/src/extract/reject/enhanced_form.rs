//! URL encoded form extractor.

use axum::extract::rejection::FormRejection;
use axum::extract::{Form as AxumForm, FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use super::short_detail;
use crate::handler::{Error, ErrorKind};

/// [`axum::Form`] whose rejections render as [`Error`] bodies.
///
/// Takes `application/x-www-form-urlencoded`, the encoding of the login form.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Form<T>(pub T);

impl<T, S> FromRequest<S> for Form<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumForm(value) = AxumForm::<T>::from_request(req, state)
            .await
            .map_err(form_error)?;
        Ok(Self(value))
    }
}

fn form_error(rejection: FormRejection) -> Error<'static> {
    tracing::debug!(
        target: "docsearch_server::extract::form",
        error = %rejection,
        "Rejected form body"
    );

    match rejection {
        FormRejection::FailedToDeserializeForm(err) => deserialize_error(&err.body_text()),
        FormRejection::FailedToDeserializeFormBody(err) => deserialize_error(&err.body_text()),
        FormRejection::InvalidFormContentType(_) => ErrorKind::BadRequest
            .with_message("Invalid content type for form data")
            .with_context("Expected Content-Type: application/x-www-form-urlencoded"),
        other => ErrorKind::BadRequest
            .with_message("Failed to read form data")
            .with_context(other.body_text()),
    }
}

fn deserialize_error(detail: &str) -> Error<'static> {
    let field = quoted_field(detail).unwrap_or("unknown");
    if detail.contains("missing field") {
        ErrorKind::BadRequest.with_message(format!("Field '{field}' is required"))
    } else if detail.contains("duplicate field") {
        ErrorKind::BadRequest.with_message(format!("Field '{field}' was provided more than once"))
    } else {
        ErrorKind::BadRequest
            .with_message("Invalid form data")
            .with_context(short_detail(detail))
    }
}

/// Field name between the first pair of backticks in a serde message.
fn quoted_field(detail: &str) -> Option<&str> {
    let (_, rest) = detail.split_once('`')?;
    let (field, _) = rest.split_once('`')?;
    Some(field)
}

document_as!(Form<T> => AxumForm<T>, T);
