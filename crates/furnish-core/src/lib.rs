//! Core domain types for the Furnish catalog server.
//!
//! This crate holds the entities shared by every other crate: products,
//! users, and the pagination primitives used by list/search operations.

pub mod pagination;
pub mod product;
pub mod user;

pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, ProductPage};
pub use product::{Product, ProductDraft, ProductId};
pub use user::{NewUser, Role, User, UserId};
