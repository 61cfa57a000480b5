//! Core layer: pure classification of statuses, bodies and stream faults.

use std::io;

use url::Url;

use crate::FetchError;

/// How a response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    NotFound,
    ClientError,
    Unexpected,
}

pub fn classify_status(status: u16) -> StatusClass {
    match status {
        404 => StatusClass::NotFound,
        200..=299 => StatusClass::Success,
        400..=499 => StatusClass::ClientError,
        _ => StatusClass::Unexpected,
    }
}

/// Extract the user-facing message from a rejected request's body.
///
/// A JSON object with a non-empty string `message` wins; any other non-empty
/// body is used verbatim.
pub fn client_error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .filter(|message| !message.is_empty());

    Some(message.unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()))
}

/// Append path segments to a base URL.
pub fn join_url(base: &str, segments: &[&str]) -> Result<String, FetchError> {
    let invalid = |reason: &str| FetchError::InvalidUrl {
        url:    base.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(base).map_err(|e| invalid(&e.to_string()))?;
    if !segments.is_empty() {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| invalid("URL cannot be a base"))?;
        path.pop_if_empty();
        path.extend(segments.iter().filter(|s| !s.is_empty()));
    }

    Ok(url.into())
}

/// Whether an I/O error surfaced from a response body means the framing was
/// malformed (retryable) rather than the connection failing.
pub fn is_corrupt_frame(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof
    )
}
