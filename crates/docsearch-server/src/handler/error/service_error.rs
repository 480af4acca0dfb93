//! Service error to HTTP error conversion.
//!
//! Client errors keep their message and are logged at debug level. Upstream
//! failures become `503 service_unavailable` with the failing stage as context
//! and are logged as errors.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::{IngestError, RateLimitExceeded, SearchError, UploadError};

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "docsearch_server::handler::service";

fn upstream(stage: &'static str, error: &dyn std::error::Error) -> HttpError<'static> {
    tracing::error!(
        target: TRACING_TARGET,
        stage,
        error = %error,
        source = ?std::error::Error::source(error).map(ToString::to_string),
        "Upstream collaborator failed"
    );

    ErrorKind::ServiceUnavailable
        .with_message("A dependent service is unavailable, please try again later.")
        .with_context(stage)
}

impl From<IngestError> for HttpError<'static> {
    fn from(error: IngestError) -> Self {
        match error.stage() {
            Some(stage) => upstream(stage, &error),
            None => {
                tracing::debug!(target: TRACING_TARGET, error = %error, "Rejected ingestion request");
                ErrorKind::BadRequest
                    .with_message(error.to_string())
                    .with_resource("ocr")
            }
        }
    }
}

impl From<SearchError> for HttpError<'static> {
    fn from(error: SearchError) -> Self {
        upstream(error.stage(), &error)
    }
}

impl From<UploadError> for HttpError<'static> {
    fn from(error: UploadError) -> Self {
        let kind = match &error {
            UploadError::Storage(_) => return upstream("document_storage", &error),
            UploadError::UnsupportedType => ErrorKind::UnsupportedMediaType,
            UploadError::TooLarge { .. } => ErrorKind::PayloadTooLarge,
            UploadError::TooManyFiles { .. }
            | UploadError::NoFiles
            | UploadError::MissingExtension { .. } => ErrorKind::BadRequest,
        };

        tracing::debug!(target: TRACING_TARGET, error = %error, "Rejected upload");
        kind.with_message(error.to_string()).with_resource("upload")
    }
}

impl From<RateLimitExceeded> for HttpError<'static> {
    fn from(error: RateLimitExceeded) -> Self {
        ErrorKind::TooManyRequests.with_message(error.to_string())
    }
}

impl From<docsearch_core::Error> for HttpError<'static> {
    fn from(error: docsearch_core::Error) -> Self {
        use docsearch_core::ErrorKind as CoreKind;

        match error.kind() {
            CoreKind::NotFound => ErrorKind::NotFound.with_context(error.to_string()),
            CoreKind::Conflict => ErrorKind::Conflict.with_context(error.to_string()),
            CoreKind::InvalidInput => ErrorKind::BadRequest.with_context(error.to_string()),
            CoreKind::Provider | CoreKind::Timeout => upstream(error.kind_str(), &error),
            _ => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Collaborator failed"
                );
                ErrorKind::InternalServerError.with_context(error.to_string())
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for HttpError<'static> {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtKind;

        tracing::debug!(target: TRACING_TARGET, error = %error, "Rejected access token");

        match error.kind() {
            JwtKind::ExpiredSignature => ErrorKind::Unauthorized
                .with_message("Access token has expired.")
                .with_resource("authentication"),
            JwtKind::InvalidSignature
            | JwtKind::ImmatureSignature
            | JwtKind::InvalidAlgorithm => ErrorKind::Unauthorized
                .with_message("Could not validate credentials.")
                .with_resource("authentication"),
            _ => ErrorKind::MalformedAuthToken
                .with_context(error.to_string())
                .with_resource("authentication"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ValidationError;

    #[test]
    fn validation_errors_keep_their_message() {
        let error = HttpError::from(IngestError::Validation(ValidationError::Expired));
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("Invalid signed URL: expired"));
    }

    #[test]
    fn no_text_is_a_client_error() {
        let error = HttpError::from(IngestError::NoTextExtracted);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn upstream_errors_name_the_stage() {
        let core = docsearch_core::Error::provider().with_message("boom");
        let error = HttpError::from(IngestError::IndexUnavailable(core));
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(error.context(), Some("vector_index"));

        let core = docsearch_core::Error::timeout();
        let error = HttpError::from(SearchError::EmbeddingUnavailable(core));
        assert_eq!(error.context(), Some("embedding"));
    }

    #[test]
    fn fixture_outage_is_unavailable() {
        let core = docsearch_core::Error::provider().with_message("bucket unreachable");
        let error = HttpError::from(IngestError::FixtureUnavailable(core));
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(error.context(), Some("fixture_source"));
    }

    #[test]
    fn upload_errors_map_to_statuses() {
        let too_large = HttpError::from(UploadError::TooLarge {
            filename: "a.pdf".into(),
        });
        assert_eq!(too_large.kind().status_code().as_u16(), 413);

        let unsupported = HttpError::from(UploadError::UnsupportedType);
        assert_eq!(unsupported.kind().status_code().as_u16(), 415);

        let too_many = HttpError::from(UploadError::TooManyFiles { max: 5 });
        assert_eq!(too_many.message(), Some("Maximum number of valid files: 5"));
    }

    #[test]
    fn core_conflict_is_conflict() {
        let error = HttpError::from(docsearch_core::Error::conflict());
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }
}
