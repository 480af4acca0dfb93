//! Handler error carrying an [`ErrorKind`] plus optional details.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Failure returned by request handlers and extractors.
///
/// Only the kind is required. `message` and `resource` reach the client,
/// `context` is kept for logs.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error<'a> {
    kind: ErrorKind,
    context: Option<Cow<'a, str>>,
    message: Option<Cow<'a, str>>,
    resource: Option<Cow<'a, str>>,
}

impl Error<'static> {
    #[inline]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
            message: None,
            resource: None,
        }
    }
}

impl<'a> Error<'a> {
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Overrides the default message of the kind.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Renders the JSON body, starting from the kind's defaults.
    pub fn to_response(&self) -> ErrorResponse<'static> {
        let owned = |value: &Option<Cow<'a, str>>| value.as_deref().map(str::to_owned);
        let base = self.kind.response();

        let base = match owned(&self.message) {
            Some(message) => base.with_message(message),
            None => base,
        };
        let base = match owned(&self.resource) {
            Some(resource) => base.with_resource(resource),
            None => base,
        };
        match owned(&self.context) {
            Some(context) => base.with_context(context),
            None => base,
        }
    }
}

impl Default for Error<'static> {
    #[inline]
    fn default() -> Self {
        Self::new(ErrorKind::default())
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.kind.status_code();
        match self.message() {
            Some(message) => write!(f, "{} {}: {message}", status.as_u16(), self.kind)?,
            None => write!(f, "{} {}", status.as_u16(), self.kind)?,
        }
        if let Some(resource) = self.resource() {
            write!(f, " on {resource}")?;
        }
        if let Some(context) = self.context() {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    #[inline]
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

impl aide::OperationOutput for Error<'_> {
    type Inner = ErrorResponse<'static>;
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result of a request handler.
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Every failure class the API can report.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    /// No bearer token on a protected route.
    MissingAuthToken,
    /// Bearer token present but not a decodable JWT.
    MalformedAuthToken,
    /// Wrong credentials, or an expired or forged token.
    Unauthorized,
    NotFound,
    Conflict,
    PayloadTooLarge,
    UnsupportedMediaType,
    TooManyRequests,

    #[default]
    InternalServerError,
    /// An upstream collaborator (cache, index, embedder, storage) failed.
    ServiceUnavailable,
    GatewayTimeout,
}

impl ErrorKind {
    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Default body for this kind.
    pub fn response(self) -> ErrorResponse<'static> {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::MissingAuthToken => ErrorResponse::MISSING_AUTH_TOKEN,
            Self::MalformedAuthToken => ErrorResponse::MALFORMED_AUTH_TOKEN,
            Self::Unauthorized => ErrorResponse::UNAUTHORIZED,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::Conflict => ErrorResponse::CONFLICT,
            Self::PayloadTooLarge => ErrorResponse::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType => ErrorResponse::UNSUPPORTED_MEDIA_TYPE,
            Self::TooManyRequests => ErrorResponse::TOO_MANY_REQUESTS,
            Self::InternalServerError => ErrorResponse::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => ErrorResponse::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout => ErrorResponse::GATEWAY_TIMEOUT,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.response().name)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [ErrorKind; 12] = [
        ErrorKind::BadRequest,
        ErrorKind::MissingAuthToken,
        ErrorKind::MalformedAuthToken,
        ErrorKind::Unauthorized,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::PayloadTooLarge,
        ErrorKind::UnsupportedMediaType,
        ErrorKind::TooManyRequests,
        ErrorKind::InternalServerError,
        ErrorKind::ServiceUnavailable,
        ErrorKind::GatewayTimeout,
    ];

    #[test]
    fn defaults_to_internal_server_error() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn details_flow_into_the_body() {
        let response = ErrorKind::NotFound
            .with_message("User alice not found.")
            .with_resource("account")
            .with_context("username lookup")
            .to_response();

        assert_eq!(response.name, "not_found");
        assert_eq!(response.message, "User alice not found.");
        assert_eq!(response.resource.as_deref(), Some("account"));
        assert_eq!(response.context.as_deref(), Some("username lookup"));
    }

    #[test]
    fn display_names_status_and_kind() {
        let error = ErrorKind::BadRequest
            .with_message("Given URL is not a valid URL.")
            .with_resource("ocr");

        assert_eq!(
            error.to_string(),
            "400 bad_request: Given URL is not a valid URL. on ocr"
        );
        assert_eq!(ErrorKind::TooManyRequests.into_error().to_string(), "429 too_many_requests");
    }

    #[test]
    fn every_kind_maps_to_an_error_status() {
        for kind in ALL_KINDS {
            let status = kind.status_code();
            assert!(status.is_client_error() || status.is_server_error(), "{kind}");
            assert_eq!(kind.into_response().status(), status);
        }
    }
}
