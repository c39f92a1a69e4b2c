//! Raw HTTP calls against the master's directory API
//!
//! Stateless and cheap to clone; the background refresh task owns its own
//! copy.

use crate::common::http::{decode_json, file_form};
use crate::common::{Error, Result};
use crate::master::topology::SystemStatus;
use crate::master::types::{AssignOptions, AssignResponse, LookupResponse, UploadResponse};
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Client,
    /// `host:port` of the master
    addr: String,
}

impl DirectoryClient {
    pub fn new(http: Client, addr: impl Into<String>) -> Self {
        Self {
            http,
            addr: addr.into(),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    fn endpoint(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        tracing::debug!("GET {}{} {:?}", self.addr, path, query);
        let resp = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Fire a GET whose body nobody reads; only transport errors count.
    async fn get_discard(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        tracing::debug!("GET {}{} {:?}", self.addr, path, query);
        let resp = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await?;
        tracing::debug!("{} answered {}", path, resp.status());
        Ok(())
    }

    pub async fn assign(&self, options: &AssignOptions) -> Result<AssignResponse> {
        let resp: AssignResponse = self.get_json("/dir/assign", &options.to_query()).await?;
        if !resp.error.is_empty() {
            return Err(Error::Directory(resp.error));
        }
        Ok(resp)
    }

    /// Raw lookup envelope; error/empty handling is the caller's.
    pub async fn lookup(&self, volume_id: u32, collection: &str) -> Result<LookupResponse> {
        let mut query = vec![("volumeId", volume_id.to_string())];
        if !collection.is_empty() {
            query.push(("collection", collection.to_string()));
        }
        self.get_json("/dir/lookup", &query).await
    }

    pub async fn grow(&self, options: &AssignOptions) -> Result<()> {
        self.get_discard("/vol/grow", &options.to_query()).await
    }

    pub async fn vacuum(&self, threshold: f64) -> Result<()> {
        self.get_discard("/vol/vacuum", &[("garbageThreshold", threshold.to_string())])
            .await
    }

    pub async fn status(&self) -> Result<SystemStatus> {
        let status: SystemStatus = self.get_json("/dir/status", &[]).await?;
        if !status.error.is_empty() {
            return Err(Error::Directory(status.error));
        }
        Ok(status)
    }

    pub async fn submit(
        &self,
        filename: &str,
        mime_type: &str,
        content: Bytes,
        options: &AssignOptions,
    ) -> Result<UploadResponse> {
        let form = file_form(filename, mime_type, content)?;
        tracing::debug!("POST {}/submit {}", self.addr, filename);
        let resp = self
            .http
            .post(self.endpoint("/submit"))
            .query(&options.to_query())
            .multipart(form)
            .send()
            .await?;
        let upload: UploadResponse = decode_json(resp).await?;
        if !upload.error.is_empty() {
            return Err(Error::Directory(upload.error));
        }
        Ok(upload)
    }
}
