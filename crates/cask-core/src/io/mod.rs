//! IO modules - network side effects

pub mod download;
pub mod github;

use crate::error::FetchError;

/// Map a transport error onto [`FetchError`].
pub(crate) fn fetch_error(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = err.status() {
        FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else if err.is_decode() {
        FetchError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// HTTP client with the engine's user agent and timeout.
///
/// # Errors
///
/// Returns a `FetchError::Http` if the TLS backend cannot be initialised.
pub fn client(timeout: std::time::Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Http {
            url: String::new(),
            message: e.to_string(),
        })
}
