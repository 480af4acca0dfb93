//! Request extractors with JSON error responses.
//!
//! Drop-in replacements for the axum extractors that turn rejections into
//! [`Error`](crate::handler::Error) responses.

/// Documents `$wrapper` in OpenAPI exactly like the extractor it wraps.
macro_rules! document_as {
    ($wrapper:ty => $inner:ty $(, $generic:ident)?) => {
        impl$(<$generic: schemars::JsonSchema>)? aide::OperationInput for $wrapper {
            fn operation_input(
                ctx: &mut aide::generate::GenContext,
                operation: &mut aide::openapi::Operation,
            ) {
                <$inner as aide::OperationInput>::operation_input(ctx, operation);
            }

            fn inferred_early_responses(
                ctx: &mut aide::generate::GenContext,
                operation: &mut aide::openapi::Operation,
            ) -> Vec<(Option<u16>, aide::openapi::Response)> {
                <$inner as aide::OperationInput>::inferred_early_responses(ctx, operation)
            }
        }
    };
}

mod enhanced_form;
mod enhanced_json;
mod enhanced_multipart;
mod validated_json;

pub use self::enhanced_form::Form;
pub use self::enhanced_json::Json;
pub use self::enhanced_multipart::Multipart;
pub use self::validated_json::ValidateJson;

/// Cuts parser output down to a single log friendly line.
fn short_detail(detail: &str) -> String {
    detail
        .lines()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(200)
        .collect()
}
