//! Catalog orchestration core.
//!
//! [`CatalogService`] coordinates the product repository, the image
//! store and the cache with a fixed ordering and failure-compensation
//! discipline:
//!
//! - uploads are validated before any network call;
//! - the image store and the repository are two independent systems with
//!   no shared transaction, so a failed repository write after a
//!   successful upload is compensated by a best-effort delete of the
//!   fresh blob (forward-only saga);
//! - a replaced image is deleted only after the repository write for the
//!   new state has committed, never before;
//! - cache population and invalidation run as detached tasks that can
//!   neither delay nor fail the caller.

pub mod error;
pub mod keys;
pub mod service;
pub mod upload;

pub use error::{CatalogError, ErrorKind};
pub use service::CatalogService;
pub use upload::{ImageUpload, UploadPolicy};
