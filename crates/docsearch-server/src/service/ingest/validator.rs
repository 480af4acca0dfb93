//! Signed URL validation.
//!
//! A signed URL is accepted only when it points at the configured storage
//! service over HTTPS, names the expected bucket and carries an expiry that
//! lies in the future. The checks run in a fixed order and stop at the first
//! failure.

use jiff::Timestamp;
use url::Url;

use crate::TRACING_TARGET_INGEST;

/// Default storage service domain signed URLs must point at.
pub const DEFAULT_STORAGE_DOMAIN: &str = "storage.googleapis.com";

/// Query parameter carrying the expiry as Unix seconds.
const EXPIRES_PARAM: &str = "Expires";

/// Reasons a signed URL is rejected.
///
/// Every variant is a client error. The display text is returned to the
/// caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Given URL is not a valid URL.")]
    MalformedUrl,

    #[error("Signed URL must use HTTPS for secure transmission.")]
    InsecureScheme,

    #[error("Invalid signed URL: must be for the storage service")]
    WrongHost,

    #[error("Signed URL not pointing to expected bucket {bucket}")]
    WrongBucket { bucket: String },

    #[error("Invalid signed URL: missing or invalid expiry")]
    MissingOrInvalidExpiry,

    #[error("Invalid signed URL: expired")]
    Expired,
}

/// Validates signed URLs and extracts the document identifier.
#[derive(Debug, Clone)]
pub struct SignedUrlValidator {
    storage_domain: String,
}

impl Default for SignedUrlValidator {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_DOMAIN)
    }
}

impl SignedUrlValidator {
    /// Creates a validator accepting hosts that end with `storage_domain`.
    pub fn new(storage_domain: impl Into<String>) -> Self {
        Self {
            storage_domain: storage_domain.into(),
        }
    }

    /// Returns the storage domain hosts must end with.
    #[inline]
    pub fn storage_domain(&self) -> &str {
        &self.storage_domain
    }

    /// Validates `url` against the current time and returns its file identifier.
    pub fn validate_and_extract(
        &self,
        url: &str,
        expected_bucket: &str,
    ) -> Result<String, ValidationError> {
        self.validate_at(url, expected_bucket, Timestamp::now())
    }

    /// Validates `url` as if the current time were `now`.
    ///
    /// The returned identifier is the final path segment, unchanged.
    pub fn validate_at(
        &self,
        url: &str,
        expected_bucket: &str,
        now: Timestamp,
    ) -> Result<String, ValidationError> {
        let parsed = Url::parse(url).map_err(|_| ValidationError::MalformedUrl)?;
        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(ValidationError::MalformedUrl)?;

        if parsed.scheme() != "https" {
            return Err(ValidationError::InsecureScheme);
        }

        if !host.ends_with(&self.storage_domain) {
            return Err(ValidationError::WrongHost);
        }

        if !parsed.path().contains(expected_bucket) {
            return Err(ValidationError::WrongBucket {
                bucket: expected_bucket.to_owned(),
            });
        }

        let expires_at = expiry_of(&parsed).ok_or(ValidationError::MissingOrInvalidExpiry)?;
        if expires_at <= now.as_millisecond() as f64 / 1000.0 {
            tracing::debug!(
                target: TRACING_TARGET_INGEST,
                expires_at,
                now = %now,
                "Signed URL has expired"
            );
            return Err(ValidationError::Expired);
        }

        let file_id = parsed
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_owned();

        Ok(file_id)
    }
}

/// Reads the `Expires` parameter of a signed URL as Unix seconds.
fn expiry_of(url: &Url) -> Option<f64> {
    url.query_pairs()
        .find(|(key, _)| key == EXPIRES_PARAM)
        .and_then(|(_, value)| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
