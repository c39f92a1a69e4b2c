//! Filer handle
//!
//! A filer exposes path-addressed files on top of the volume layer. Only the
//! plain HTTP verbs are wrapped here; directory listing and metadata are the
//! filer's business.

use crate::common::http::{decode_json, expect_status, file_form};
use crate::common::{encode_path, normalize_base_url, Error, Result};
use crate::master::types::UploadResponse;
use bytes::Bytes;
use reqwest::{Client, StatusCode};

#[derive(Debug, Clone)]
pub struct Filer {
    http: Client,
    url: String,
}

impl Filer {
    /// `address` may be `host:port` or a full base URL
    pub fn new(http: Client, address: &str) -> Self {
        Self {
            http,
            url: normalize_base_url(address),
        }
    }

    /// Normalized base URL, also the registry key in [`Client`](crate::Client)
    pub fn url(&self) -> &str {
        &self.url
    }

    fn path_url(&self, path: &str) -> String {
        format!("{}/{}", self.url, encode_path(path.trim_start_matches('/')))
    }

    /// Store `content` at `path`
    pub async fn upload(
        &self,
        path: &str,
        filename: &str,
        mime_type: &str,
        content: impl Into<Bytes>,
    ) -> Result<UploadResponse> {
        let form = file_form(filename, mime_type, content.into())?;
        tracing::debug!("POST {}", self.path_url(path));
        let resp = self
            .http
            .post(self.path_url(path))
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = decode_json(resp).await?;
        if !upload.error.is_empty() {
            return Err(Error::Directory(upload.error));
        }
        Ok(upload)
    }

    pub async fn get(&self, path: &str) -> Result<Bytes> {
        tracing::debug!("GET {}", self.path_url(path));
        let resp = self.http.get(self.path_url(path)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        let resp = expect_status(resp, &[StatusCode::OK, StatusCode::PARTIAL_CONTENT]).await?;
        Ok(resp.bytes().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        tracing::debug!("DELETE {}", self.path_url(path));
        let resp = self.http.delete(self.path_url(path)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        expect_status(
            resp,
            &[StatusCode::OK, StatusCode::ACCEPTED, StatusCode::NO_CONTENT],
        )
        .await?;
        Ok(())
    }
}
