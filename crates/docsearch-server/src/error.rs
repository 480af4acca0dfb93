//! Errors raised while assembling the service.
//!
//! Request-time failures go through [`handler::Error`](crate::handler::Error).

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A setting is missing or out of range.
    Config,
    /// A collaborator failed while the service was being wired.
    Upstream,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => "config",
            Self::Upstream => "upstream",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind: ErrorKind::Config,
            message: message.into(),
            source: None,
        }
    }

    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<docsearch_core::Error> for Error {
    fn from(error: docsearch_core::Error) -> Self {
        let kind = match error.kind() {
            docsearch_core::ErrorKind::Configuration => ErrorKind::Config,
            _ => ErrorKind::Upstream,
        };
        Self {
            kind,
            message: error.to_string().into(),
            source: Some(Box::new(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_render_their_kind() {
        let error = Error::config("Search top k must be positive");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(
            error.to_string(),
            "config error: Search top k must be positive"
        );
    }

    #[test]
    fn core_errors_keep_their_source() {
        let core = docsearch_core::Error::provider().with_message("index down");
        let error = Error::from(core);
        assert_eq!(error.kind(), ErrorKind::Upstream);
        assert!(StdError::source(&error).is_some());
    }
}
