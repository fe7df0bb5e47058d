//! Collaborator contracts for the Furnish catalog server.
//!
//! The catalog service consumes three external collaborators: the durable
//! product/user repositories, the best-effort TTL cache, and the image
//! store. This crate defines their traits and error types; concrete
//! backends live in `furnish-db-postgres`, `furnish-db-memory`,
//! `furnish-cache` and `furnish-media`.

pub mod error;
pub mod traits;

pub use error::{ErrorCategory, ImageStoreError, StorageError};
pub use traits::{Cache, ImageStore, ProductRepository, UserRepository};
