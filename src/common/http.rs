//! HTTP helpers shared by the master, volume and filer handles

use crate::common::{Error, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// MIME type used when the caller does not give one
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Error field every master reply may carry
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    error: String,
}

/// Decode a JSON body.
///
/// The master reports failures inside a JSON envelope, often with a non-2xx
/// status. A non-2xx reply is never decoded as `T`: its `error` string becomes
/// [`Error::Directory`], anything else becomes [`Error::Http`].
pub async fn decode_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let url = resp.url().clone();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) if !envelope.error.is_empty() => Error::Directory(envelope.error),
            _ => Error::Http { status, body },
        });
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
        tracing::warn!("Undecodable response from {}: {}", url, e);
        Error::Decode(format!("{}: {}", url.path(), e))
    })
}

/// Fail on any status outside `accepted`, carrying the response text
pub async fn expect_status(resp: Response, accepted: &[reqwest::StatusCode]) -> Result<Response> {
    let status = resp.status();
    if accepted.contains(&status) {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Http { status, body })
}

/// Single-file multipart form under the `file` field
pub fn file_form(filename: &str, mime_type: &str, content: Bytes) -> Result<Form> {
    let mime = if mime_type.is_empty() {
        DEFAULT_MIME
    } else {
        mime_type
    };
    let len = content.len() as u64;
    let part = Part::stream_with_length(content, len)
        .file_name(filename.to_string())
        .mime_str(mime)
        .map_err(|e| Error::InvalidArgument(format!("bad mime type {:?}: {}", mime, e)))?;

    Ok(Form::new().part("file", part))
}
