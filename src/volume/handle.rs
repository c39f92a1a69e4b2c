//! Handle to one storage node holding a replica of a volume

use crate::common::http::{decode_json, expect_status, file_form};
use crate::common::{Error, Result};
use crate::master::types::{Location, UploadResponse};
use bytes::Bytes;
use reqwest::{Client, StatusCode};

/// A volume replica chosen by [`Master::lookup`](crate::master::Master::lookup)
#[derive(Debug, Clone)]
pub struct Volume {
    http: Client,
    location: Location,
}

impl Volume {
    pub fn new(http: Client, location: Location) -> Self {
        Self { http, location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// `host:port` for server-to-server traffic
    pub fn url(&self) -> &str {
        &self.location.url
    }

    /// `host:port` advertised to clients
    pub fn public_url(&self) -> &str {
        &self.location.public_url
    }

    /// Object URL on the internal address
    pub fn file_url(&self, fid: &str) -> String {
        format!("http://{}/{}", self.location.url, fid)
    }

    /// Object URL on the public address
    pub fn public_file_url(&self, fid: &str) -> String {
        format!("http://{}/{}", self.location.public_url, fid)
    }

    /// Upload `content` as `fid`. With a multi-count assignment, `index`
    /// selects the n-th key (`fid`, `fid_1`, `fid_2`, ...).
    ///
    /// Returns the size the storage node recorded.
    pub async fn upload(
        &self,
        fid: &str,
        index: u32,
        filename: &str,
        mime_type: &str,
        content: impl Into<Bytes>,
    ) -> Result<u64> {
        let target = indexed_fid(fid, index);
        let form = file_form(filename, mime_type, content.into())?;

        tracing::debug!("POST {}/{} {}", self.location.url, target, filename);
        let resp = self
            .http
            .post(self.file_url(&target))
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = decode_json(resp).await?;
        if !upload.error.is_empty() {
            return Err(Error::Directory(upload.error));
        }
        Ok(upload.size)
    }

    /// Delete `fid` and the `count - 1` keys assigned with it
    pub async fn delete(&self, fid: &str, count: u32) -> Result<()> {
        for index in 0..count.max(1) {
            let target = indexed_fid(fid, index);
            tracing::debug!("DELETE {}/{}", self.location.url, target);
            let resp = self.http.delete(self.file_url(&target)).send().await?;
            expect_status(resp, &[StatusCode::OK, StatusCode::ACCEPTED]).await?;
        }
        Ok(())
    }

    /// Fetch the object body
    pub async fn get(&self, fid: &str) -> Result<Bytes> {
        tracing::debug!("GET {}/{}", self.location.url, fid);
        let resp = self.http.get(self.file_url(fid)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(fid.to_string()));
        }
        let resp = expect_status(resp, &[StatusCode::OK, StatusCode::PARTIAL_CONTENT]).await?;
        Ok(resp.bytes().await?)
    }
}

fn indexed_fid(fid: &str, index: u32) -> String {
    if index == 0 {
        fid.to_string()
    } else {
        format!("{}_{}", fid, index)
    }
}
