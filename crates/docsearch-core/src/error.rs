//! Common error type definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure classes shared by every collaborator behind the core traits.
///
/// The HTTP layer maps each class onto a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    /// The key is taken, e.g. a username that is already registered.
    Conflict,
    Configuration,
    Serialization,
    /// Cache, index, embedder or storage failed or could not be reached.
    Provider,
    Timeout,
    Internal,
}

/// Error returned through the core traits.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
    #[source]
    pub source: Option<BoxedError>,
}

macro_rules! kind_constructors {
    ($($name:ident => $kind:ident),+ $(,)?) => {
        $(
            #[inline]
            pub fn $name() -> Self {
                Self::new(ErrorKind::$kind)
            }
        )+
    };
}

impl Error {
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    kind_constructors! {
        invalid_input => InvalidInput,
        not_found => NotFound,
        conflict => Conflict,
        configuration => Configuration,
        serialization => Serialization,
        provider => Provider,
        timeout => Timeout,
        internal => Internal,
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    pub fn with_source(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.with_boxed_source(Box::new(source))
    }

    pub fn with_boxed_source(self, source: BoxedError) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Snake case name of the kind, for logs and metrics labels.
    #[inline]
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(format!("invalid JSON at line {}", error.line()))
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let error = Error::provider().with_message("upstream closed the connection");
        assert_eq!(
            error.to_string(),
            "Provider: upstream closed the connection"
        );
    }

    #[test]
    fn display_without_message() {
        assert_eq!(Error::timeout().to_string(), "Timeout");
    }

    #[test]
    fn kind_str_is_snake_case() {
        assert_eq!(Error::invalid_input().kind_str(), "invalid_input");
        assert_eq!(Error::not_found().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn json_error_converts_to_serialization() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let error = Error::from(source);
        assert_eq!(error.kind(), ErrorKind::Serialization);
        assert!(std::error::Error::source(&error).is_some());
    }
}
