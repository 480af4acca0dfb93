use std::borrow::Cow;
use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

/// Tracing target for rendered error responses.
const TRACING_TARGET: &str = "docsearch_server::handler::response";

/// One failed validation rule on one request field.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ValidationErrorDetail {
    /// Offending field.
    pub field: String,
    /// Rule identifier, e.g. `length` or `range`.
    pub code: String,
    pub message: String,
    /// Rule parameters such as `min` and `max`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, serde_json::Value>>,
}

impl ValidationErrorDetail {
    fn from_rule(field: &str, error: &ValidationError) -> Self {
        // The rejected input is never echoed back.
        let params: HashMap<_, _> = error
            .params
            .iter()
            .filter(|(name, _)| *name != "value")
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        let message = match &error.message {
            Some(message) => message.to_string(),
            None => format!("Field '{field}' is invalid"),
        };

        Self {
            field: field.to_owned(),
            code: error.code.to_string(),
            message,
            params: if params.is_empty() { None } else { Some(params) },
        }
    }
}

/// JSON body returned for every failed request.
///
/// `context` and `status` stay server side.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// Stable machine readable identifier.
    pub name: Cow<'a, str>,
    /// Message safe to show to the caller.
    pub message: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<ValidationErrorDetail>>,

    #[serde(skip)]
    pub context: Option<Cow<'a, str>>,
    #[serde(skip)]
    pub status: StatusCode,
}

macro_rules! error_responses {
    ($($konst:ident => ($name:literal, $message:literal, $status:ident);)+) => {
        impl ErrorResponse<'_> {
            $(
                pub const $konst: Self = Self::new($name, $message, StatusCode::$status);
            )+
        }
    };
}

error_responses! {
    BAD_REQUEST => ("bad_request", "Invalid request data.", BAD_REQUEST);
    CONFLICT => ("conflict", "Resource state conflict.", CONFLICT);
    MALFORMED_AUTH_TOKEN => ("malformed_auth_token", "Malformed auth token.", UNAUTHORIZED);
    MISSING_AUTH_TOKEN => ("missing_auth_token", "Missing auth token.", UNAUTHORIZED);
    NOT_FOUND => ("not_found", "Resource not found.", NOT_FOUND);
    PAYLOAD_TOO_LARGE => ("payload_too_large", "Payload too large.", PAYLOAD_TOO_LARGE);
    TOO_MANY_REQUESTS => ("too_many_requests", "Rate limit exceeded.", TOO_MANY_REQUESTS);
    UNAUTHORIZED => ("unauthorized", "Invalid credentials.", UNAUTHORIZED);
    UNSUPPORTED_MEDIA_TYPE => ("unsupported_media_type", "Unsupported media type.", UNSUPPORTED_MEDIA_TYPE);
    VALIDATION_ERROR => ("validation_error", "Validation failed.", BAD_REQUEST);
    GATEWAY_TIMEOUT => ("gateway_timeout", "Request timed out.", GATEWAY_TIMEOUT);
    INTERNAL_SERVER_ERROR => ("internal_server_error", "Internal server error.", INTERNAL_SERVER_ERROR);
    SERVICE_UNAVAILABLE => ("service_unavailable", "Service unavailable.", SERVICE_UNAVAILABLE);
}

/// Appends `next` to an optional accumulated value.
fn join<'a>(
    current: Option<Cow<'a, str>>,
    separator: &str,
    next: Cow<'a, str>,
) -> Cow<'a, str> {
    match current {
        Some(current) => Cow::Owned(format!("{current}{separator}{next}")),
        None => next,
    }
}

impl<'a> ErrorResponse<'a> {
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            suggestion: None,
            validation: None,
            context: None,
            status,
        }
    }

    pub fn with_message(self, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            message: message.into(),
            ..self
        }
    }

    /// Scopes the error to a resource; repeated calls build a `a/b` path.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(join(self.resource.take(), "/", resource.into()));
        self
    }

    /// Adds server side context; repeated calls are joined with `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(join(self.context.take(), "; ", context.into()));
        self
    }

    pub fn with_suggestion(self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        Self {
            suggestion: Some(suggestion.into()),
            ..self
        }
    }

    pub fn with_validation_errors(self, errors: Vec<ValidationErrorDetail>) -> Self {
        Self {
            validation: Some(errors),
            ..self
        }
    }

    /// Flattens `validator` output into one detail per failed rule.
    pub fn from_validation_errors(errors: ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, rules)| {
                rules
                    .iter()
                    .map(move |rule| ValidationErrorDetail::from_rule(&field, rule))
            })
            .collect();

        Self::VALIDATION_ERROR.with_validation_errors(details)
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl From<ValidationErrors> for ErrorResponse<'_> {
    #[inline]
    fn from(errors: ValidationErrors) -> Self {
        Self::from_validation_errors(errors)
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        let status = self.status;
        if status.is_server_error() {
            tracing::warn!(
                target: TRACING_TARGET,
                %status,
                name = %self.name,
                context = ?self.context,
                "Request failed"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET,
                %status,
                name = %self.name,
                resource = ?self.resource,
                "Request rejected"
            );
        }

        (status, Json(self)).into_response()
    }
}
