//! Storage node (volume server) access
//!
//! A [`Volume`] is bound to the single replica the master lookup picked and
//! moves bytes to and from it:
//! - Multipart upload of an assigned file id
//! - Download
//! - Delete, including the extra keys of a multi-count assignment

pub mod handle;

pub use handle::Volume;
