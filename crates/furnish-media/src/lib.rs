//! Image store backends.
//!
//! The catalog service talks to object storage only through the
//! `furnish_storage::ImageStore` trait. Two backends are provided: an
//! S3-compatible store (AWS S3 or MinIO) and an in-memory store for the
//! `memory` mode and tests.

pub mod memory;
pub mod s3;

pub use memory::MemoryImageStore;
pub use s3::{S3Config, S3ImageStore};
