//! JSON extractor that runs `validator` rules on the decoded body.

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use super::Json;
use crate::handler::{Error, ErrorKind};

/// [`Json`] that rejects bodies failing their `#[validate]` rules.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Sentence describing one failed rule on `field`.
fn describe(field: &str, rule: &ValidationError) -> String {
    if let Some(message) = &rule.message {
        return message.to_string();
    }

    let bound = |name: &str| rule.params.get(name).and_then(serde_json::Value::as_u64);
    match (rule.code.as_ref(), bound("min"), bound("max")) {
        ("length", Some(min), Some(max)) => {
            format!("Field '{field}' must be between {min} and {max} characters long")
        }
        ("length", Some(min), None) => format!("Field '{field}' must be at least {min} characters long"),
        ("length", None, Some(max)) => format!("Field '{field}' must be at most {max} characters long"),
        ("required", ..) => format!("Field '{field}' is required and cannot be empty"),
        ("url", ..) => format!("Field '{field}' must be a valid URL"),
        (code, ..) => format!("Field '{field}' failed validation: {code}"),
    }
}

impl From<ValidationErrors> for Error<'static> {
    fn from(errors: ValidationErrors) -> Self {
        let mut sentences: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, rules)| rules.iter().map(move |rule| describe(&field, rule)))
            .collect();
        // HashMap order is random; keep messages stable.
        sentences.sort();

        tracing::debug!(
            target: "docsearch_server::extract::validate",
            failures = sentences.len(),
            "Request body failed validation"
        );

        let message = if sentences.is_empty() {
            "Validation failed".to_owned()
        } else {
            sentences.join(". ")
        };

        ErrorKind::BadRequest
            .with_message(message)
            .with_resource("request")
    }
}

document_as!(ValidateJson<T> => Json<T>, T);
