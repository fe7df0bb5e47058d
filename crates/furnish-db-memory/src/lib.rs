//! In-memory repository backends.
//!
//! Used by the `memory` storage mode for local development and as the
//! standard collaborator double in service tests. Semantics mirror the
//! Postgres backend: recency ordering, case-insensitive search, NotFound
//! on zero-row updates and deletes.

pub mod products;
pub mod users;

pub use products::MemoryProductRepository;
pub use users::MemoryUserRepository;
