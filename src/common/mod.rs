//! Common utilities and types shared across miniweed

pub mod config;
pub mod error;
pub mod fid;
pub mod http;
pub mod utils;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use fid::Fid;
pub use utils::{encode_path, format_bytes, normalize_base_url};
