//! Master coordinator client

use crate::common::{ClientConfig, Error, Result};
use crate::master::directory::DirectoryClient;
use crate::master::refresh::{self, RefreshHandle};
use crate::master::topology::{SystemStatus, TopologyCache};
use crate::master::types::{AssignOptions, AssignResponse, GrowOptions, Location, UploadResponse};
use crate::volume::Volume;
use bytes::Bytes;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Client for one master.
///
/// Owns the datacenter cache and the task that keeps it fresh. Construct it
/// inside a tokio runtime; call [`Master::stop`] to tear the task down
/// deterministically. Dropping a `Master` without stopping it only signals the
/// task, it does not wait.
#[derive(Debug)]
pub struct Master {
    directory: DirectoryClient,
    topology: Arc<TopologyCache>,
    refresh: Mutex<Option<RefreshHandle>>,
}

impl Master {
    /// Connect to `addr` (`host:port`) with default settings
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let config = ClientConfig::with_master(addr);
        Self::from_config(&config, config.http_client()?)
    }

    pub fn from_config(config: &ClientConfig, http: reqwest::Client) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_client(
            http,
            config.master.clone(),
            config.refresh_interval(),
        ))
    }

    /// Build on an existing HTTP client and start refreshing every `period`
    pub fn with_client(http: reqwest::Client, addr: impl Into<String>, period: Duration) -> Self {
        let directory = DirectoryClient::new(http, addr);
        let topology = Arc::new(TopologyCache::new());
        let refresh = RefreshHandle::spawn(directory.clone(), topology.clone(), period);

        Self {
            directory,
            topology,
            refresh: Mutex::new(Some(refresh)),
        }
    }

    /// Master address
    pub fn url(&self) -> &str {
        self.directory.addr()
    }

    pub fn topology(&self) -> &TopologyCache {
        &self.topology
    }

    /// Assign one file key
    pub async fn assign(&self) -> Result<AssignResponse> {
        self.assign_args(&AssignOptions::default()).await
    }

    /// Assign `count` consecutive file keys (`0` lets the master decide)
    pub async fn assign_n(&self, count: u32) -> Result<AssignResponse> {
        self.assign_args(&AssignOptions::with_count(count)).await
    }

    pub async fn assign_args(&self, options: &AssignOptions) -> Result<AssignResponse> {
        let resp = self.directory.assign(options).await?;
        tracing::debug!("Assigned {} (count {}) on {}", resp.fid, resp.count, resp.url);
        Ok(resp)
    }

    /// Look up `volume_id` and bind a [`Volume`] to the replica closest to
    /// `datacenter` (`""` = no preference).
    pub async fn lookup(&self, volume_id: u32, collection: &str, datacenter: &str) -> Result<Volume> {
        let resp = self.directory.lookup(volume_id, collection).await?;

        if !resp.error.is_empty() {
            return Err(Error::Directory(resp.error));
        }

        let location = self
            .nearest(&resp.locations, datacenter)
            .ok_or(Error::VolumeLocationNotFound)?;
        tracing::debug!(
            "Volume {} resolved to {} ({} replicas, datacenter {:?})",
            volume_id,
            location.url,
            resp.locations.len(),
            datacenter
        );

        Ok(Volume::new(self.directory.http().clone(), location))
    }

    /// Locality-aware choice among `locations`, see [`TopologyCache::nearest`]
    pub fn nearest(&self, locations: &[Location], datacenter: &str) -> Option<Location> {
        self.topology.nearest(locations, datacenter).cloned()
    }

    /// Pre-allocate volumes
    pub async fn grow(
        &self,
        count: u32,
        collection: &str,
        replication: &str,
        datacenter: &str,
    ) -> Result<()> {
        let options = GrowOptions::with_count(count)
            .collection(collection)
            .replication(replication)
            .data_center(datacenter);
        self.grow_args(&options).await
    }

    /// The master's reply is not inspected: only transport errors surface.
    pub async fn grow_args(&self, options: &GrowOptions) -> Result<()> {
        self.directory.grow(options).await
    }

    /// Force a vacuum of volumes whose garbage ratio exceeds `threshold`.
    ///
    /// The master's reply is not inspected: only transport errors surface.
    pub async fn gc(&self, threshold: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidArgument(format!(
                "garbage threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        self.directory.vacuum(threshold).await
    }

    /// Cluster topology and master version
    pub async fn status(&self) -> Result<SystemStatus> {
        self.directory.status().await
    }

    /// Fetch `/dir/status` now and swap it into the cache, outside the
    /// background schedule. A failure leaves the cache as it was.
    pub async fn refresh_now(&self) -> Result<()> {
        refresh::refresh_once(&self.directory, &self.topology).await
    }

    /// Upload straight through the master (`/submit`), letting it pick the
    /// volume.
    pub async fn submit(
        &self,
        filename: &str,
        mime_type: &str,
        content: impl Into<Bytes>,
        options: &AssignOptions,
    ) -> Result<UploadResponse> {
        self.directory
            .submit(filename, mime_type, content.into(), options)
            .await
    }

    /// Stop the topology refresh and wait for the task to acknowledge.
    ///
    /// Idempotent. Once this returns no further status queries are made.
    pub async fn stop(&self) {
        let handle = self
            .refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}
