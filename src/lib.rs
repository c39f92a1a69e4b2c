//! # miniweed
//!
//! An async client for master/volume/filer blob-storage clusters with:
//! - File id assignment, upload, download and delete
//! - Datacenter-aware replica selection on lookup
//! - A topology cache refreshed in the background, never on the request path
//! - Filer handles registered by address
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │               Client                     │
//! │  Fid codec ─► Master ─► Volume handle    │
//! │               │  ▲                       │
//! │     refresh   ▼  │ url → datacenter      │
//! │     task ──► TopologyCache               │
//! └───────┬──────────────────┬───────────────┘
//!         │ /dir/*, /vol/*   │ POST/GET/DELETE /<fid>
//!   ┌─────▼─────┐     ┌──────▼───────┐
//!   │  Master   │     │ Volume server│  (one per replica)
//!   └───────────┘     └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> miniweed::Result<()> {
//! let client = miniweed::Client::connect("127.0.0.1:9333")?;
//! let (fid, size) = client
//!     .assign_upload("hello.txt", "text/plain", b"hello".to_vec())
//!     .await?;
//! println!("stored {} ({} bytes)", fid, size);
//! client.delete(&fid, 1, "").await?;
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ### CLI
//! ```bash
//! miniweed --master 127.0.0.1:9333 upload ./photo.jpg --collection pics
//! miniweed lookup 3 --datacenter dc2
//! miniweed status
//! ```

pub mod client;
pub mod common;
pub mod filer;
pub mod master;
pub mod volume;

// Re-export commonly used types
pub use client::Client;
pub use common::{ClientConfig, Error, Fid, Result};
pub use filer::Filer;
pub use master::{AssignOptions, Location, Master};
pub use volume::Volume;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
