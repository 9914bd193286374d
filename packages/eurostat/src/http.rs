//! Single-shot HTTP helpers for dataset requests.
//!
//! Dataset requests are never retried: a failed request fails the whole
//! refresh cycle and the caller falls back to static data. These helpers
//! only turn non-success statuses into errors and log enough response
//! metadata to diagnose a bad body.

use crate::SourceError;

/// Sends `request` and returns the response body as text.
///
/// # Errors
///
/// Returns [`SourceError::Http`] on connection, timeout, or body read
/// failures and [`SourceError::Status`] for any non-2xx status.
#[allow(clippy::future_not_send)]
pub async fn send_text(request: reqwest::RequestBuilder) -> Result<String, SourceError> {
    let response = request.send().await.inspect_err(|e| {
        log::warn!("  request failed: {e}");
    })?;

    let url = response.url().to_string();
    let status = response.status();

    if !status.is_success() {
        log::warn!("  HTTP {status} from {url}");
        return Err(SourceError::Status {
            url,
            status: status.as_u16(),
        });
    }

    let content_length = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    match response.text().await {
        Ok(text) => {
            log::debug!(
                "Received {} bytes from {url} (content-type: {content_type:?})",
                text.len()
            );
            Ok(text)
        }
        Err(e) => {
            log::error!(
                "Response body read failed.\n  \
                 url: {url}\n  \
                 status: {status}\n  \
                 content-length: {content_length:?}\n  \
                 content-type: {content_type:?}\n  \
                 error: {e}",
            );
            Err(SourceError::Http(e))
        }
    }
}
