//! Client facade: master + volume + filer handles behind one type

use crate::common::{normalize_base_url, ClientConfig, Fid, Result};
use crate::filer::Filer;
use crate::master::{AssignOptions, Master};
use crate::volume::Volume;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One entry point for a cluster.
///
/// Resolves fids through the [`Master`], talks to storage nodes through
/// short-lived [`Volume`] handles and keeps one [`Filer`] per address.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    master: Master,
    filers: Mutex<HashMap<String, Arc<Filer>>>,
}

impl Client {
    /// Build a client from `config`. Starts the master's topology refresh,
    /// so it must run inside a tokio runtime.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = config.http_client()?;
        let master = Master::from_config(config, http.clone())?;

        let filers = config
            .filers
            .iter()
            .map(|addr| {
                let filer = Filer::new(http.clone(), addr);
                (filer.url().to_string(), Arc::new(filer))
            })
            .collect();

        tracing::info!(
            "Client ready: master {}, {} filer(s)",
            config.master,
            config.filers.len()
        );

        Ok(Self {
            http,
            master,
            filers: Mutex::new(filers),
        })
    }

    /// Client for `master_addr` with default settings
    pub fn connect(master_addr: impl Into<String>) -> Result<Self> {
        Self::new(&ClientConfig::with_master(master_addr))
    }

    pub fn master(&self) -> &Master {
        &self.master
    }

    /// Resolve the volume holding `fid`
    pub async fn volume(&self, fid: &str, collection: &str, datacenter: &str) -> Result<Volume> {
        let parsed = Fid::parse(fid)?;
        self.master
            .lookup(parsed.volume_id, collection, datacenter)
            .await
    }

    /// `(public_url, url)` of `fid` on the first replica
    pub async fn get_url(&self, fid: &str, collection: &str) -> Result<(String, String)> {
        let vol = self.volume(fid, collection, "").await?;
        Ok((vol.public_file_url(fid), vol.file_url(fid)))
    }

    /// Assign a key and upload `content` under it. Returns `(fid, size)`.
    pub async fn assign_upload(
        &self,
        filename: &str,
        mime_type: &str,
        content: impl Into<Bytes>,
    ) -> Result<(String, u64)> {
        self.assign_upload_args(filename, mime_type, content, &AssignOptions::default())
            .await
    }

    pub async fn assign_upload_args(
        &self,
        filename: &str,
        mime_type: &str,
        content: impl Into<Bytes>,
        options: &AssignOptions,
    ) -> Result<(String, u64)> {
        let assigned = self.master.assign_args(options).await?;
        let vol = self.volume(&assigned.fid, &options.collection, "").await?;
        let size = vol
            .upload(&assigned.fid, 0, filename, mime_type, content)
            .await?;

        tracing::info!("Uploaded {} as {} ({} bytes)", filename, assigned.fid, size);
        Ok((assigned.fid, size))
    }

    /// Delete `fid` and the `count - 1` keys assigned alongside it
    pub async fn delete(&self, fid: &str, count: u32, collection: &str) -> Result<()> {
        let vol = self.volume(fid, collection, "").await?;
        vol.delete(fid, count).await
    }

    /// Download `fid`, preferring a replica in `datacenter`. An empty or
    /// unknown datacenter reads from the first replica.
    pub async fn download(&self, fid: &str, collection: &str, datacenter: &str) -> Result<Bytes> {
        let vol = self.volume(fid, collection, datacenter).await?;
        vol.get(fid).await
    }

    /// Handle for the filer at `address`; the first handle built for an
    /// address is returned on every later call.
    pub fn filer(&self, address: &str) -> Arc<Filer> {
        let key = normalize_base_url(address);
        let mut filers = self.filers.lock().unwrap_or_else(PoisonError::into_inner);
        filers
            .entry(key)
            .or_insert_with(|| Arc::new(Filer::new(self.http.clone(), address)))
            .clone()
    }

    /// Stop background work (the master's topology refresh)
    pub async fn shutdown(&self) {
        self.master.stop().await;
        tracing::info!("Client for {} shut down", self.master.url());
    }
}
