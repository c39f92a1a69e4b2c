//! Master (directory service) client
//!
//! The master is responsible for:
//! - Assigning file ids
//! - Mapping volume ids to the storage nodes holding them
//! - Growing and vacuuming volumes
//! - Reporting the datacenter → rack → node topology
//!
//! [`Master`] wraps those calls and keeps a datacenter cache fresh in the
//! background so lookups can prefer a replica in the caller's datacenter.

pub mod coordinator;
pub mod directory;
pub mod refresh;
pub mod topology;
pub mod types;

pub use coordinator::Master;
pub use directory::DirectoryClient;
pub use topology::{DataCenter, DataNode, Layout, Rack, SystemStatus, Topology, TopologyCache};
pub use types::{AssignOptions, AssignResponse, GrowOptions, Location, LookupResponse, UploadResponse};
