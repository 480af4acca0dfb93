//! Multipart extractor for document uploads.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use axum::http::StatusCode;
use bytes::Bytes;
use derive_more::{Deref, DerefMut, From};

use crate::handler::{Error, ErrorKind, Result};
use crate::service::IncomingFile;

/// [`axum::extract::Multipart`] whose rejections render as [`Error`] bodies.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl Multipart {
    /// Drains every part named `field_name` into memory.
    ///
    /// Parts under other names are skipped. A part without a filename or a
    /// content type is kept with empty values so the upload policy can
    /// reject it with a precise message.
    pub async fn collect_files(mut self, field_name: &str) -> Result<Vec<IncomingFile>> {
        let mut files = Vec::new();

        while let Some(field) = self.0.next_field().await.map_err(multipart_field_error)? {
            if field.name() != Some(field_name) {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let data: Bytes = field.bytes().await.map_err(multipart_field_error)?;

            files.push(IncomingFile {
                filename,
                content_type,
                data,
            });
        }

        Ok(files)
    }
}

fn multipart_field_error(error: MultipartError) -> Error<'static> {
    let kind = match error.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ErrorKind::PayloadTooLarge,
        _ => ErrorKind::BadRequest,
    };

    kind.with_message("Invalid multipart request")
        .with_context(error.body_text())
}

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = AxumMultipart::from_request(req, state).await?;
        Ok(Self(multipart))
    }
}

impl From<MultipartRejection> for Error<'static> {
    fn from(rejection: MultipartRejection) -> Self {
        let detail = match &rejection {
            MultipartRejection::InvalidBoundary(_) => {
                "Expected multipart/form-data with a boundary".to_owned()
            }
            other => other.body_text(),
        };
        ErrorKind::BadRequest
            .with_message("Invalid multipart request")
            .with_context(detail)
    }
}

document_as!(Multipart => AxumMultipart);
