//! Remote storage backend implementations.
//!
//! Two backends with structurally different upload strategies: the share
//! backend exposes an explicit create + ranged-write lifecycle, the drive
//! backend accepts a streamed body in a single call and assigns its own
//! object identifiers.

pub mod drive;
pub mod share;

pub use drive::DriveBackend;
pub use share::ShareBackend;

use futures::TryStreamExt;
use reqwest::{Response, StatusCode};

use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::traits::storage::ByteStream;

/// Pre-acquired bearer credential for one backend.
///
/// Acquisition and refresh happen outside the engine; a credential is
/// treated as valid for the duration of one request.
#[derive(Clone)]
pub struct AccessCredential(String);

impl AccessCredential {
    /// Wrap a bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as an `Authorization` header value.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccessCredential").field(&"<redacted>").finish()
    }
}

/// Map a non-success backend response to an [`AppError`].
///
/// 404 becomes `NotFound`; everything else becomes `BackendRejected`
/// carrying the backend's status code and response body.
pub(crate) async fn rejection(op: &str, key: &str, response: Response) -> AppError {
    let status = response.status();
    let detail = response.text().await.unwrap_or_default();

    if status == StatusCode::NOT_FOUND {
        return AppError::not_found(format!("Object not found: {key}"));
    }

    let mut message = format!("Backend rejected {op} for '{key}' ({status})");
    if !detail.is_empty() {
        message.push_str(&format!(": {detail}"));
    }
    AppError::backend_rejected(status.as_u16(), message)
}

/// Map a transport-level client error to an [`AppError`].
pub(crate) fn transport(op: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::Storage, format!("Backend {op} request failed"), err)
}

/// Adapt a response body into the crate-wide [`ByteStream`] type.
pub(crate) fn body_stream(response: Response) -> ByteStream {
    Box::pin(
        response
            .bytes_stream()
            .map_err(|e| std::io::Error::other(e)),
    )
}

/// Check a response, converting non-success statuses into errors.
pub(crate) async fn ensure_success(op: &str, key: &str, response: Response) -> AppResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(rejection(op, key, response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let cred = AccessCredential::new("super-secret-token");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("redacted"));
    }
}
